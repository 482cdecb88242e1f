use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::domain::{
    Lane, MatchRecord, ParticipantIdentity, ParticipantRecord, Role, TeamId, TimeBucket,
};

/// Player account payload from the profile endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummonerDto {
    pub id: String,
    pub account_id: String,
    pub name: String,
}

/// Match-list payload: an ordered sequence of match references.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchlistDto {
    pub matches: Vec<MatchReferenceDto>,
    #[serde(default)]
    pub total_games: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReferenceDto {
    pub game_id: i64,
}

/// Full match payload. Only the fields the analysis consumes are mapped;
/// the cache stores the converted domain record, not this DTO.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDto {
    pub game_id: i64,
    pub game_duration: i64,
    pub participants: Vec<ParticipantDto>,
    pub participant_identities: Vec<ParticipantIdentityDto>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantIdentityDto {
    pub participant_id: i32,
    pub player: PlayerDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDto {
    pub summoner_id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantDto {
    pub participant_id: i32,
    pub team_id: i32,
    pub stats: ParticipantStatsDto,
    pub timeline: ParticipantTimelineDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantStatsDto {
    pub win: bool,
    pub total_damage_dealt_to_champions: i64,
    pub gold_earned: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantTimelineDto {
    pub role: Role,
    pub lane: Lane,
    /// Keyed by wire bucket names ("0-10", "10-20", ...). Buckets the game
    /// never reached are simply absent.
    #[serde(default)]
    pub gold_per_min_deltas: BTreeMap<String, f64>,
}

impl TryFrom<MatchDto> for MatchRecord {
    type Error = anyhow::Error;

    fn try_from(dto: MatchDto) -> Result<Self> {
        let match_id = dto.game_id;
        let participants = dto
            .participants
            .into_iter()
            .map(|p| convert_participant(match_id, p))
            .collect::<Result<Vec<_>>>()?;
        let identities = dto
            .participant_identities
            .into_iter()
            .map(|pi| ParticipantIdentity {
                participant_id: pi.participant_id,
                player_id: pi.player.summoner_id,
            })
            .collect();

        Ok(MatchRecord {
            match_id,
            duration_secs: dto.game_duration,
            participants,
            identities,
        })
    }
}

fn convert_participant(match_id: i64, dto: ParticipantDto) -> Result<ParticipantRecord> {
    let team = TeamId::from_wire(dto.team_id)
        .ok_or_else(|| anyhow!("match {match_id}: unknown team code {}", dto.team_id))?;

    Ok(ParticipantRecord {
        participant_id: dto.participant_id,
        team,
        role: dto.timeline.role,
        lane: dto.timeline.lane,
        win: dto.stats.win,
        damage_to_champions: dto.stats.total_damage_dealt_to_champions,
        gold_earned: dto.stats.gold_earned,
        gold_per_min_deltas: convert_gold_deltas(dto.timeline.gold_per_min_deltas),
    })
}

fn convert_gold_deltas(raw: BTreeMap<String, f64>) -> BTreeMap<TimeBucket, f64> {
    raw.into_iter()
        .filter_map(|(key, delta)| TimeBucket::from_wire_key(&key).map(|bucket| (bucket, delta)))
        .collect()
}
