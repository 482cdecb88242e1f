use log::{info, warn};

use crate::domain::{FilterSet, MatchRecord, ParticipantRecord, PlayerProfile};

/// Matches shorter than this were aborted and remade; they carry no usable
/// laning data.
pub const REMAKE_DURATION_SECS: i64 = 300;

/// A match that survived filtering, resolved to the participants the
/// aggregation engine compares.
pub struct LaneMatchup<'a> {
    pub record: &'a MatchRecord,
    pub target: &'a ParticipantRecord,
    pub opponent: &'a ParticipantRecord,
    /// Target-side participants other than the target, post ally-lane filter.
    pub allies: Vec<&'a ParticipantRecord>,
    /// Opposing-side participants other than the opposing laner, post filter.
    pub enemies: Vec<&'a ParticipantRecord>,
}

/// Run the filter pipeline over retrieved matches.
///
/// Output order follows input order; skipped matches are dropped without
/// shifting the survivors. Every skip is logged with its reason.
pub fn resolve_matches<'a>(
    matches: &'a [MatchRecord],
    target: &PlayerProfile,
    filters: &FilterSet,
) -> Vec<LaneMatchup<'a>> {
    matches
        .iter()
        .filter_map(|record| resolve_match(record, target, filters))
        .collect()
}

fn resolve_match<'a>(
    record: &'a MatchRecord,
    target: &PlayerProfile,
    filters: &FilterSet,
) -> Option<LaneMatchup<'a>> {
    let Some(target_participant) = record.participant_for_player(&target.id) else {
        warn!(
            "Skipping malformed match {}: no participant entry for {}",
            record.match_id, target.name
        );
        return None;
    };

    if let Some(missing) = first_missing_required_ally(record, filters) {
        info!(
            "Skipping match {} without required ally {}",
            record.match_id, missing
        );
        return None;
    }

    if let Some(present) = first_excluded_ally_present(record, filters) {
        info!(
            "Skipping match {} with excluded ally {}",
            record.match_id, present
        );
        return None;
    }

    if record.duration_secs < REMAKE_DURATION_SECS {
        info!(
            "Skipping remake {} ({}s)",
            record.match_id, record.duration_secs
        );
        return None;
    }

    if target_participant.role.is_ambiguous() {
        // Diagnostic only; ambiguity alone does not disqualify a match.
        warn!(
            "Encountered ambiguous role {} in match {}",
            target_participant.role, record.match_id
        );
    }

    if !filters.role_allowed(target_participant.role) {
        info!(
            "Skipping match {} with role {}",
            record.match_id, target_participant.role
        );
        return None;
    }

    if !filters.lane_allowed(target_participant.lane) {
        info!(
            "Skipping match {} with lane {}",
            record.match_id, target_participant.lane
        );
        return None;
    }

    let opponent = find_opposing_laner(record, target_participant)?;
    let (allies, enemies) = partition_teams(record, target_participant, opponent, filters);

    Some(LaneMatchup {
        record,
        target: target_participant,
        opponent,
        allies,
        enemies,
    })
}

fn first_missing_required_ally<'f>(
    record: &MatchRecord,
    filters: &'f FilterSet,
) -> Option<&'f str> {
    filters
        .required_allies
        .iter()
        .find(|id| !record.has_player(id))
        .map(String::as_str)
}

fn first_excluded_ally_present<'f>(
    record: &MatchRecord,
    filters: &'f FilterSet,
) -> Option<&'f str> {
    filters
        .excluded_allies
        .iter()
        .find(|id| record.has_player(id))
        .map(String::as_str)
}

/// The unique opposite-team participant sharing the target's role and lane.
///
/// Zero candidates and multiple candidates both skip the match; multiplicity
/// is never broken by taking the first hit.
fn find_opposing_laner<'a>(
    record: &'a MatchRecord,
    target: &ParticipantRecord,
) -> Option<&'a ParticipantRecord> {
    let candidates: Vec<&ParticipantRecord> = record
        .participants
        .iter()
        .filter(|p| p.team != target.team && p.role == target.role && p.lane == target.lane)
        .collect();

    match candidates.as_slice() {
        [laner] => Some(*laner),
        [] => {
            info!(
                "Skipping match {}: no opposing {}/{} laner",
                record.match_id, target.role, target.lane
            );
            None
        }
        many => {
            info!(
                "Skipping match {}: {} opposing laner candidates",
                record.match_id,
                many.len()
            );
            None
        }
    }
}

fn partition_teams<'a>(
    record: &'a MatchRecord,
    target: &ParticipantRecord,
    opponent: &ParticipantRecord,
    filters: &FilterSet,
) -> (Vec<&'a ParticipantRecord>, Vec<&'a ParticipantRecord>) {
    let mut allies = Vec::new();
    let mut enemies = Vec::new();

    for participant in &record.participants {
        if participant.participant_id == target.participant_id
            || participant.participant_id == opponent.participant_id
        {
            continue;
        }
        if !filters.ally_lane_allowed(participant.lane) {
            continue;
        }

        if participant.team == target.team {
            allies.push(participant);
        } else {
            enemies.push(participant);
        }
    }

    (allies, enemies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fixtures::{standard_match, target_profile};
    use crate::domain::{Lane, Role};

    #[test]
    fn resolves_opponent_and_partitions_teams() {
        let matches = vec![standard_match(1)];
        let matchups = resolve_matches(&matches, &target_profile(), &FilterSet::default());

        assert_eq!(matchups.len(), 1);
        let matchup = &matchups[0];
        assert_eq!(matchup.target.participant_id, 1);
        assert_eq!(matchup.opponent.participant_id, 6);
        let ally_ids: Vec<i32> = matchup.allies.iter().map(|p| p.participant_id).collect();
        let enemy_ids: Vec<i32> = matchup.enemies.iter().map(|p| p.participant_id).collect();
        assert_eq!(ally_ids, vec![2, 3, 4, 5]);
        assert_eq!(enemy_ids, vec![7, 8, 9, 10]);
    }

    #[test]
    fn match_without_target_identity_is_malformed() {
        let mut record = standard_match(2);
        record.identities.retain(|pi| pi.player_id != "player-1");

        let records = [record];
        let matchups = resolve_matches(&records, &target_profile(), &FilterSet::default());
        assert!(matchups.is_empty());
    }

    #[test]
    fn missing_required_ally_skips_match() {
        let filters = FilterSet {
            required_allies: vec!["player-3".to_string(), "player-99".to_string()],
            ..FilterSet::default()
        };

        let records = [standard_match(3)];
        let matchups = resolve_matches(&records, &target_profile(), &filters);
        assert!(matchups.is_empty());
    }

    #[test]
    fn present_required_allies_pass() {
        let filters = FilterSet {
            required_allies: vec!["player-2".to_string(), "player-3".to_string()],
            ..FilterSet::default()
        };

        let records = [standard_match(4)];
        let matchups = resolve_matches(&records, &target_profile(), &filters);
        assert_eq!(matchups.len(), 1);
    }

    #[test]
    fn excluded_ally_skips_match() {
        let filters = FilterSet {
            excluded_allies: vec!["player-4".to_string()],
            ..FilterSet::default()
        };

        let records = [standard_match(5)];
        let matchups = resolve_matches(&records, &target_profile(), &filters);
        assert!(matchups.is_empty());
    }

    #[test]
    fn remake_is_excluded_regardless_of_filters() {
        let mut record = standard_match(6);
        record.duration_secs = 250;

        let records = [record];
        let matchups = resolve_matches(&records, &target_profile(), &FilterSet::default());
        assert!(matchups.is_empty());
    }

    #[test]
    fn ambiguous_role_is_diagnostic_not_a_skip() {
        let mut record = standard_match(7);
        // Both bot laners flip to the unspecified-duo sentinel so opponent
        // resolution still finds a unique role/lane mirror.
        record.participants[0].role = Role::Duo;
        record.participants[5].role = Role::Duo;

        let records = [record];
        let matchups = resolve_matches(&records, &target_profile(), &FilterSet::default());
        assert_eq!(matchups.len(), 1);
    }

    #[test]
    fn role_filter_skips_non_matching_target() {
        let filters = FilterSet {
            roles: Some(vec![Role::DuoSupport]),
            ..FilterSet::default()
        };

        let records = [standard_match(8)];
        let matchups = resolve_matches(&records, &target_profile(), &filters);
        assert!(matchups.is_empty());
    }

    #[test]
    fn lane_filter_skips_non_matching_target() {
        let filters = FilterSet {
            lanes: Some(vec![Lane::Middle]),
            ..FilterSet::default()
        };

        let records = [standard_match(9)];
        let matchups = resolve_matches(&records, &target_profile(), &filters);
        assert!(matchups.is_empty());
    }

    #[test]
    fn absent_opposing_laner_skips_match() {
        let mut record = standard_match(10);
        record.participants[5].lane = Lane::Middle;

        let records = [record];
        let matchups = resolve_matches(&records, &target_profile(), &FilterSet::default());
        assert!(matchups.is_empty());
    }

    #[test]
    fn duplicate_opposing_laners_skip_match() {
        let mut record = standard_match(11);
        // Second red participant mirrors the target's role/lane as well.
        record.participants[6].role = Role::DuoCarry;
        record.participants[6].lane = Lane::Bottom;

        let records = [record];
        let matchups = resolve_matches(&records, &target_profile(), &FilterSet::default());
        assert!(matchups.is_empty());
    }

    #[test]
    fn ally_lane_filter_narrows_both_sides() {
        let filters = FilterSet {
            ally_lanes: Some(vec![Lane::Top, Lane::Jungle]),
            ..FilterSet::default()
        };

        let records = [standard_match(12)];
        let matchups = resolve_matches(&records, &target_profile(), &filters);
        assert_eq!(matchups.len(), 1);
        assert_eq!(matchups[0].allies.len(), 2);
        assert_eq!(matchups[0].enemies.len(), 2);
    }

    #[test]
    fn output_preserves_input_order_across_skips() {
        let mut remake = standard_match(21);
        remake.duration_secs = 100;
        let matches = vec![standard_match(20), remake, standard_match(22)];

        let matchups = resolve_matches(&matches, &target_profile(), &FilterSet::default());
        let ids: Vec<i64> = matchups.iter().map(|m| m.record.match_id).collect();
        assert_eq!(ids, vec![20, 22]);
    }
}
