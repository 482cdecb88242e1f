use std::sync::Arc;

use anyhow::Result;
use log::info;
use tokio_util::sync::CancellationToken;

use crate::analysis::{aggregate, resolve_matches, summarize, MatchStats, SummaryCounts};
use crate::api::MatchServiceClient;
use crate::cache::MatchCache;
use crate::config::{self, AppConfig};
use crate::domain::{FilterSet, Lane, MatchRecord, PlayerProfile, Region, Role};
use crate::errors::FetchError;
use crate::retrieval::MatchRetriever;

/// One analysis invocation: who to analyze and which matches count.
#[derive(Debug, Clone, Default)]
pub struct AnalysisRequest {
    pub target_name: String,
    pub required_allies: Vec<String>,
    pub excluded_allies: Vec<String>,
    pub roles: Option<Vec<Role>>,
    pub lanes: Option<Vec<Lane>>,
    pub ally_lanes: Option<Vec<Lane>>,
}

/// Everything a run produced: per-match stats, the run summary, and the
/// match ids that could not be retrieved.
pub struct AnalysisReport {
    pub target: PlayerProfile,
    pub stats: Vec<MatchStats>,
    pub summary: SummaryCounts,
    pub fetch_errors: Vec<(i64, FetchError)>,
}

pub struct AnalysisService {
    client: Arc<MatchServiceClient>,
    retriever: MatchRetriever<Arc<MatchServiceClient>>,
}

impl AnalysisService {
    pub fn new(region: Region, config: AppConfig) -> Result<Self> {
        let api_key = config::load_api_key()?;
        let client = Arc::new(MatchServiceClient::new(region, api_key, &config.api)?);
        let cache = MatchCache::open(&config.database.path)?;
        let retriever = MatchRetriever::new(cache, Arc::clone(&client), &config.retrieval);

        Ok(Self { client, retriever })
    }

    /// Run the full pipeline: resolve players, pull the match list, retrieve
    /// every match through the cache, filter, aggregate and summarize.
    ///
    /// Per-match fetch failures never abort the run; they are collected into
    /// the report alongside the surviving results.
    pub async fn run(
        &self,
        request: &AnalysisRequest,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        let target = self.client.resolve_player(&request.target_name).await?;
        let filters = self.build_filters(request).await?;

        let descriptors = self.client.get_match_list(&target.account_id).await?;
        let outcomes = self.retriever.retrieve_all(&descriptors, cancel).await?;

        let mut matches: Vec<MatchRecord> = Vec::with_capacity(outcomes.len());
        let mut fetch_errors = Vec::new();
        for (descriptor, outcome) in descriptors.iter().zip(outcomes) {
            match outcome {
                Ok(record) => matches.push(record),
                Err(error) => fetch_errors.push((descriptor.match_id, error)),
            }
        }
        if !fetch_errors.is_empty() {
            info!(
                "{} of {} matches could not be retrieved",
                fetch_errors.len(),
                descriptors.len()
            );
        }

        let matchups = resolve_matches(&matches, &target, &filters);
        let stats: Vec<MatchStats> = matchups.iter().map(aggregate).collect();
        for entry in &stats {
            log_match_stats(entry);
        }

        let summary = summarize(&stats);
        log_summary(&summary);

        Ok(AnalysisReport {
            target,
            stats,
            summary,
            fetch_errors,
        })
    }

    /// Resolve ally names and assemble the filter set. The target is always
    /// matched through its own participant entry, so it never needs to be
    /// listed as a required ally.
    async fn build_filters(&self, request: &AnalysisRequest) -> Result<FilterSet> {
        let required = self.resolve_names(&request.required_allies).await?;
        let excluded = self.resolve_names(&request.excluded_allies).await?;

        Ok(FilterSet {
            required_allies: required.into_iter().map(|p| p.id).collect(),
            excluded_allies: excluded.into_iter().map(|p| p.id).collect(),
            roles: request.roles.clone(),
            lanes: request.lanes.clone(),
            ally_lanes: request.ally_lanes.clone(),
        })
    }

    async fn resolve_names(&self, names: &[String]) -> Result<Vec<PlayerProfile>> {
        let mut profiles = Vec::with_capacity(names.len());
        for name in names {
            profiles.push(self.client.resolve_player(name).await?);
        }
        Ok(profiles)
    }
}

fn log_match_stats(stats: &MatchStats) {
    info!(
        "Match {} lane DR {} ally DR {} G@10 {:+.2} G10-20 {:+.2} total gold {:+} team G@10 {}",
        stats.match_id,
        format_ratio(stats.lane_damage_ratio),
        format_ratio(stats.ally_damage_ratio),
        stats.gold_at_ten_diff,
        stats.gold_ten_twenty_diff,
        stats.total_gold_diff,
        format_diff(stats.ally_gold_at_ten_diff),
    );
}

fn log_summary(summary: &SummaryCounts) {
    if summary.total == 0 {
        info!("No matches survived filtering");
        return;
    }

    info!(
        "{} of {} ({:.2}%) out-damaged their lane relative to allies",
        summary.out_damaged_allies,
        summary.total,
        summary.percent_out_damaged_allies().unwrap_or(0.0)
    );
    info!(
        "{} of {} ({:.2}%) had a gold lead at 10 minutes",
        summary.gold_ahead_at_ten,
        summary.total,
        summary.percent_gold_ahead_at_ten().unwrap_or(0.0)
    );
    info!(
        "{} of {} ({:.2}%) had higher GPM 10-20",
        summary.gold_ahead_ten_twenty,
        summary.total,
        summary.percent_gold_ahead_ten_twenty().unwrap_or(0.0)
    );
    info!(
        "{} of {} ({:.2}%) finished with higher total gold",
        summary.total_gold_ahead,
        summary.total,
        summary.percent_total_gold_ahead().unwrap_or(0.0)
    );
    info!(
        "{} of {} ({:.2}%) had an ally gold lead at 10 minutes",
        summary.allies_ahead_at_ten,
        summary.total,
        summary.percent_allies_ahead_at_ten().unwrap_or(0.0)
    );
    info!(
        "{}W {}L ({:.2}%)",
        summary.wins,
        summary.losses,
        summary.win_rate().unwrap_or(0.0)
    );
}

fn format_ratio(ratio: Option<f64>) -> String {
    match ratio {
        Some(value) => format!("{value:.2}"),
        None => "n/a".to_string(),
    }
}

fn format_diff(diff: Option<f64>) -> String {
    match diff {
        Some(value) => format!("{value:+.2}"),
        None => "n/a".to_string(),
    }
}
