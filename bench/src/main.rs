mod config;
mod report;
mod scenarios;

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use config::BenchConfig;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cfg = BenchConfig::parse();
    cfg.validate().context("invalid benchmark configuration")?;
    info!(?cfg, "starting benchmarks");

    for scenario in cfg.scenario.selected() {
        let now = Instant::now();
        let report = scenarios::run(scenario, &cfg)
            .with_context(|| format!("scenario {scenario:?} failed"))?;
        println!("{report}");
        info!(?scenario, elapsed = ?now.elapsed(), "scenario finished");
    }
    Ok(())
}
