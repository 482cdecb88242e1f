use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::StatusCode;

use crate::api::models::{MatchDto, MatchlistDto, SummonerDto};
use crate::config::ApiSettings;
use crate::domain::{MatchDescriptor, MatchRecord, PlayerProfile, Region};
use crate::errors::FetchError;
use crate::http::RateLimitedClient;
use crate::retrieval::MatchSource;

const API_KEY_HEADER: &str = "X-Riot-Token";

/// Client for the remote match-data service.
pub struct MatchServiceClient {
    client: RateLimitedClient,
    api_key: String,
    base_url: String,
    queue_id: u32,
    season_id: u32,
}

impl MatchServiceClient {
    pub fn new(region: Region, api_key: String, settings: &ApiSettings) -> Result<Self> {
        let client =
            RateLimitedClient::new(settings.user_agent, settings.timeout_secs, settings.rate_limit_ms)?;

        Ok(Self {
            client,
            api_key,
            base_url: format!("https://{}", platform_host(region)),
            queue_id: settings.queue_id,
            season_id: settings.season_id,
        })
    }

    /// Resolve a display name to a stable player identity.
    pub async fn resolve_player(&self, name: &str) -> Result<PlayerProfile> {
        let url = self.build_summoner_url(name);
        debug!("Resolving player {} via {}", name, url);

        let response = self
            .get(&url)
            .await
            .with_context(|| format!("Failed to resolve player {name}"))?;
        if !response.status().is_success() {
            anyhow::bail!("Player lookup for {} returned {}", name, response.status());
        }

        let summoner: SummonerDto = response
            .json()
            .await
            .context("Failed to parse player payload")?;
        info!("Resolved {}", summoner.name);

        Ok(PlayerProfile {
            id: summoner.id,
            account_id: summoner.account_id,
            name: summoner.name,
        })
    }

    /// Fetch the target's ranked match list for the configured queue/season.
    pub async fn get_match_list(&self, account_id: &str) -> Result<Vec<MatchDescriptor>> {
        let url = self.build_matchlist_url(account_id);
        debug!("Fetching match list from {}", url);

        let response = self.get(&url).await.context("Failed to fetch match list")?;
        if !response.status().is_success() {
            anyhow::bail!("Match list request returned {}", response.status());
        }

        let matchlist: MatchlistDto = response
            .json()
            .await
            .context("Failed to parse match list payload")?;
        info!(
            "Retrieved match list with {} entries",
            matchlist.matches.len()
        );

        Ok(matchlist
            .matches
            .into_iter()
            .map(|m| MatchDescriptor { match_id: m.game_id })
            .collect())
    }

    /// Fetch one match by id. No retry here; that policy belongs to the
    /// retrieval orchestrator.
    pub async fn get_match(&self, match_id: i64) -> Result<MatchRecord, FetchError> {
        let url = self.build_match_url(match_id);

        let response = self
            .get(&url)
            .await
            .map_err(|e| transport_error(match_id, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(status_error(match_id, status));
        }

        let dto: MatchDto = response
            .json()
            .await
            .map_err(|e| FetchError::unavailable(format!("match {match_id}: invalid payload: {e}")))?;
        MatchRecord::try_from(dto)
            .map_err(|e| FetchError::unavailable(format!("match {match_id}: {e}")))
    }

    async fn get(&self, url: &str) -> reqwest::Result<reqwest::Response> {
        self.client
            .get(url, &[(API_KEY_HEADER, self.api_key.as_str())])
            .await
    }

    fn build_summoner_url(&self, name: &str) -> String {
        format!(
            "{}/lol/summoner/v4/summoners/by-name/{}",
            self.base_url,
            urlencoding::encode(name)
        )
    }

    fn build_matchlist_url(&self, account_id: &str) -> String {
        format!(
            "{}/lol/match/v4/matchlists/by-account/{}?queue={}&season={}",
            self.base_url,
            urlencoding::encode(account_id),
            self.queue_id,
            self.season_id
        )
    }

    fn build_match_url(&self, match_id: i64) -> String {
        format!("{}/lol/match/v4/matches/{}", self.base_url, match_id)
    }
}

impl MatchSource for MatchServiceClient {
    async fn fetch_match(&self, match_id: i64) -> Result<MatchRecord, FetchError> {
        self.get_match(match_id).await
    }
}

fn platform_host(region: Region) -> &'static str {
    match region {
        Region::Na => "na1.api.riotgames.com",
        Region::Euw => "euw1.api.riotgames.com",
        Region::Eune => "eun1.api.riotgames.com",
        Region::Kr => "kr.api.riotgames.com",
    }
}

fn transport_error(match_id: i64, error: &reqwest::Error) -> FetchError {
    let kind = if error.is_timeout() {
        "timeout"
    } else if error.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    FetchError::unavailable(format!("match {match_id}: {kind}: {error}"))
}

fn status_error(match_id: i64, status: StatusCode) -> FetchError {
    if status == StatusCode::NOT_FOUND {
        FetchError::NotFound(match_id)
    } else {
        // Rate limits and server errors are transient; anything else is
        // surfaced with its status so the operator can see it.
        FetchError::unavailable(format!("match {match_id}: http {status}"))
    }
}
