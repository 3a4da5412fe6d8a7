use anyhow::Result;
use crystalops::analysis::Analysis;
use crystalops::settings;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = settings::load_config()?;
    println!("{}", settings);

    let mut analysis = Analysis::new(settings)?;
    analysis.solve()?;
    analysis.writeup()
}
