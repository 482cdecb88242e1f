//! Shared match fixtures for the analysis tests.

use std::collections::BTreeMap;

use crate::domain::{
    Lane, MatchRecord, ParticipantIdentity, ParticipantRecord, PlayerProfile, Role, TeamId,
    TimeBucket,
};

pub fn target_profile() -> PlayerProfile {
    PlayerProfile {
        id: "player-1".to_string(),
        account_id: "acct-1".to_string(),
        name: "Target".to_string(),
    }
}

/// A full 5v5 match. Participant 1 (blue duo carry, bottom) is the target;
/// participant 6 mirrors them on red side. Blue wins.
pub fn standard_match(match_id: i64) -> MatchRecord {
    let layout = [
        (Role::DuoCarry, Lane::Bottom),
        (Role::DuoSupport, Lane::Bottom),
        (Role::Solo, Lane::Top),
        (Role::None, Lane::Jungle),
        (Role::Solo, Lane::Middle),
    ];

    let mut participants = Vec::with_capacity(10);
    let mut identities = Vec::with_capacity(10);
    for (idx, (role, lane)) in layout.iter().enumerate() {
        for (offset, team) in [(0, TeamId::Blue), (5, TeamId::Red)] {
            let participant_id = (idx + 1 + offset) as i32;
            participants.push(participant(participant_id, team, *role, *lane));
            identities.push(ParticipantIdentity {
                participant_id,
                player_id: format!("player-{participant_id}"),
            });
        }
    }
    participants.sort_by_key(|p| p.participant_id);
    identities.sort_by_key(|pi| pi.participant_id);

    MatchRecord {
        match_id,
        duration_secs: 1800,
        participants,
        identities,
    }
}

fn participant(participant_id: i32, team: TeamId, role: Role, lane: Lane) -> ParticipantRecord {
    let gold_per_min_deltas: BTreeMap<TimeBucket, f64> = [
        (TimeBucket::ZeroToTen, 200.0),
        (TimeBucket::TenToTwenty, 300.0),
    ]
    .into_iter()
    .collect();

    ParticipantRecord {
        participant_id,
        team,
        role,
        lane,
        win: team == TeamId::Blue,
        damage_to_champions: 10_000,
        gold_earned: 10_000,
        gold_per_min_deltas,
    }
}
