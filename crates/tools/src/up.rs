use anyhow::Result;
use mr_config::UpConfig;

use crate::utils::run;

pub fn compose_args(config: &UpConfig) -> Vec<String> {
    let mut args = vec!["up".to_string(), "-d".to_string()];
    args.extend(config.services.iter().cloned());
    args
}

/// Start the local development services in the background.
pub fn up(config: &UpConfig) -> Result<()> {
    let args = compose_args(config);
    log::info!("starting services: {}", config.services.join(" "));
    run(&config.compose_bin, args)
}
