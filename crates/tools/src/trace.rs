use anyhow::Result;
use tracing_subscriber::prelude::*;

/// Install the global subscriber; `log` records are bridged into it.
pub fn init() -> Result<()> {
    let env_filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new("info"))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(env_filter_layer)
        .try_init()?;

    Ok(())
}
