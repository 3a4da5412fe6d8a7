//! Crystal symmetry operations for the Laue classes, with pole figure and
//! inverse pole figure colouring built on top of them.

pub mod analysis;
pub mod color;
pub mod compositing;
pub mod conversions;
pub mod cubic;
pub mod cubic_low;
pub mod hexagonal;
pub mod hexagonal_low;
pub mod lambert;
pub mod laue;
pub mod monoclinic;
pub mod orientation;
pub mod orthorhombic;
pub mod output;
pub mod pole_figure;
pub mod quaternion;
pub mod settings;
pub mod slip;
pub mod tetragonal_low;
pub mod texture;
pub mod triclinic;
pub mod trigonal;
pub mod trigonal_low;
