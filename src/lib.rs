pub mod analysis;
pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod http;
pub mod rate_limiter;
pub mod retrieval;
pub mod services;

use std::str::FromStr;

use anyhow::{anyhow, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;

use crate::cli::{AnalyzeArgs, Cli, Command};
use crate::config::AppConfig;
use crate::domain::Region;
use crate::services::{AnalysisRequest, AnalysisService};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_analyze(args: &AnalyzeArgs) -> Result<()> {
    let region = Region::from_str(&args.region).map_err(|e| anyhow!(e))?;
    let request = build_request(args)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = AnalysisService::new(region, config)?;
        let cancel = spawn_interrupt_handler();

        let _report = service.run(&request, &cancel).await?;
        Ok(())
    })
}

pub fn handle_init_db() -> Result<()> {
    let config = AppConfig::new();
    let cache = cache::MatchCache::open(&config.database.path)?;
    log::info!(
        "Match cache ready at {} ({} rows)",
        config.database.path,
        cache.count()?
    );
    Ok(())
}

fn build_request(args: &AnalyzeArgs) -> Result<AnalysisRequest> {
    Ok(AnalysisRequest {
        target_name: args.target.clone(),
        required_allies: args.required_allies.clone(),
        excluded_allies: args.excluded_allies.clone(),
        roles: parse_tags(&args.roles)?,
        lanes: parse_tags(&args.lanes)?,
        ally_lanes: parse_tags(&args.ally_lanes)?,
    })
}

fn parse_tags<T: FromStr<Err = String>>(raw: &[String]) -> Result<Option<Vec<T>>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.iter()
        .map(|tag| T::from_str(tag).map_err(|e| anyhow!(e)))
        .collect::<Result<Vec<_>>>()
        .map(Some)
}

/// Ctrl-C aborts in-flight retrieval; matches already cached stay cached.
fn spawn_interrupt_handler() -> CancellationToken {
    let cancel = CancellationToken::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Interrupt received, aborting retrieval");
            signal_cancel.cancel();
        }
    });
    cancel
}
