use log::warn;
use serde::Serialize;

use super::pipeline::LaneMatchup;
use crate::domain::{ParticipantRecord, TimeBucket};

/// Per-match derived statistics.
///
/// `None` in a ratio field marks a degenerate computation (zero opposing
/// damage); `None` in the ally gold field marks an unbalanced team
/// comparison. Neither is ever approximated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchStats {
    pub match_id: i64,
    pub is_loss: bool,
    pub lane_damage_ratio: Option<f64>,
    pub ally_damage_ratio: Option<f64>,
    pub gold_at_ten_diff: f64,
    pub gold_ten_twenty_diff: f64,
    pub total_gold_diff: i64,
    pub ally_gold_at_ten_diff: Option<f64>,
}

/// Derive the per-match statistics for one resolved matchup. Pure and
/// deterministic; diagnostics go to the log, never into control flow.
pub fn aggregate(matchup: &LaneMatchup) -> MatchStats {
    let match_id = matchup.record.match_id;
    let target = matchup.target;
    let opponent = matchup.opponent;

    let ally_damage: i64 = matchup.allies.iter().map(|p| p.damage_to_champions).sum();
    let enemy_damage: i64 = matchup.enemies.iter().map(|p| p.damage_to_champions).sum();

    MatchStats {
        match_id,
        is_loss: !target.win,
        lane_damage_ratio: damage_ratio(
            match_id,
            target.damage_to_champions,
            opponent.damage_to_champions,
            "opposing laner",
        ),
        ally_damage_ratio: damage_ratio(match_id, ally_damage, enemy_damage, "opposing team"),
        gold_at_ten_diff: bucket_diff(match_id, target, opponent, TimeBucket::ZeroToTen),
        gold_ten_twenty_diff: bucket_diff(match_id, target, opponent, TimeBucket::TenToTwenty),
        total_gold_diff: target.gold_earned - opponent.gold_earned,
        ally_gold_at_ten_diff: ally_gold_diff(match_id, &matchup.allies, &matchup.enemies),
    }
}

fn damage_ratio(match_id: i64, damage: i64, opposing_damage: i64, what: &str) -> Option<f64> {
    if opposing_damage == 0 {
        warn!(
            "Match {}: zero {} damage, ratio is degenerate",
            match_id, what
        );
        return None;
    }
    Some(damage as f64 / opposing_damage as f64)
}

/// Differential of one gold bucket between the two laners. A bucket absent
/// on either side defaults the whole differential to 0.
fn bucket_diff(
    match_id: i64,
    target: &ParticipantRecord,
    opponent: &ParticipantRecord,
    bucket: TimeBucket,
) -> f64 {
    match (target.gold_delta(bucket), opponent.gold_delta(bucket)) {
        (Some(own), Some(theirs)) => own - theirs,
        _ => {
            warn!(
                "Match {}: missing {} gold bucket, defaulting differential to 0",
                match_id,
                bucket.as_key()
            );
            0.0
        }
    }
}

/// Team-level 0-10 gold differential, only defined when the ally-lane
/// filter left both sides with the same player count.
fn ally_gold_diff(
    match_id: i64,
    allies: &[&ParticipantRecord],
    enemies: &[&ParticipantRecord],
) -> Option<f64> {
    if allies.len() != enemies.len() {
        warn!(
            "Match {}: imbalanced ally/enemy comparison ({} vs {}), skipping team gold differential",
            match_id,
            allies.len(),
            enemies.len()
        );
        return None;
    }

    let ally_sum = team_bucket_sum(match_id, allies, TimeBucket::ZeroToTen);
    let enemy_sum = team_bucket_sum(match_id, enemies, TimeBucket::ZeroToTen);
    Some(ally_sum - enemy_sum)
}

fn team_bucket_sum(match_id: i64, players: &[&ParticipantRecord], bucket: TimeBucket) -> f64 {
    players
        .iter()
        .map(|p| {
            p.gold_delta(bucket).unwrap_or_else(|| {
                warn!(
                    "Match {}: participant {} missing {} gold bucket, counting 0",
                    match_id,
                    p.participant_id,
                    bucket.as_key()
                );
                0.0
            })
        })
        .sum()
}
