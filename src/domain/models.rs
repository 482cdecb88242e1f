use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Stable player identifier issued by the match-data service.
pub type PlayerId = String;

/// A player identity resolved from a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub id: PlayerId,
    pub account_id: String,
    pub name: String,
}

/// One entry of a player's match list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDescriptor {
    pub match_id: i64,
}

/// Side of the map. The wire format encodes these as 100 and 200.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TeamId {
    Blue,
    Red,
}

impl TeamId {
    /// Map the wire team code. Anything other than 100/200 is malformed.
    pub fn from_wire(code: i32) -> Option<Self> {
        match code {
            100 => Some(Self::Blue),
            200 => Some(Self::Red),
            _ => None,
        }
    }
}

/// Role tag reported by the service for a participant.
///
/// `None` and `Duo` are ambiguity sentinels: the service could not decide
/// which member of a duo lane this participant was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Solo,
    DuoCarry,
    DuoSupport,
    Duo,
    #[serde(other)]
    None,
}

impl Role {
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::None | Self::Duo)
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Solo => "SOLO",
            Self::DuoCarry => "DUO_CARRY",
            Self::DuoSupport => "DUO_SUPPORT",
            Self::Duo => "DUO",
            Self::None => "NONE",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SOLO" => Ok(Self::Solo),
            "DUO_CARRY" | "CARRY" => Ok(Self::DuoCarry),
            "DUO_SUPPORT" | "SUPPORT" => Ok(Self::DuoSupport),
            "DUO" => Ok(Self::Duo),
            "NONE" => Ok(Self::None),
            other => Err(format!("unknown role tag: {other}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Lane tag reported by the service for a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Lane {
    Top,
    Jungle,
    Middle,
    Bottom,
    #[serde(other)]
    None,
}

impl Lane {
    pub fn as_tag(&self) -> &'static str {
        match self {
            Self::Top => "TOP",
            Self::Jungle => "JUNGLE",
            Self::Middle => "MIDDLE",
            Self::Bottom => "BOTTOM",
            Self::None => "NONE",
        }
    }
}

impl FromStr for Lane {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "TOP" => Ok(Self::Top),
            "JUNGLE" | "JG" => Ok(Self::Jungle),
            "MIDDLE" | "MID" => Ok(Self::Middle),
            "BOTTOM" | "BOT" => Ok(Self::Bottom),
            "NONE" => Ok(Self::None),
            other => Err(format!("unknown lane tag: {other}")),
        }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Fixed game-time interval over which a per-minute delta is reported.
///
/// The service omits buckets the game never reached, so lookups go through
/// [`ParticipantRecord::gold_delta`] rather than direct indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeBucket {
    #[serde(rename = "0-10")]
    ZeroToTen,
    #[serde(rename = "10-20")]
    TenToTwenty,
    #[serde(rename = "20-30")]
    TwentyToThirty,
    #[serde(rename = "30-end")]
    ThirtyToEnd,
}

impl TimeBucket {
    pub fn from_wire_key(key: &str) -> Option<Self> {
        match key {
            "0-10" => Some(Self::ZeroToTen),
            "10-20" => Some(Self::TenToTwenty),
            "20-30" => Some(Self::TwentyToThirty),
            "30-end" => Some(Self::ThirtyToEnd),
            _ => None,
        }
    }

    pub fn as_key(&self) -> &'static str {
        match self {
            Self::ZeroToTen => "0-10",
            Self::TenToTwenty => "10-20",
            Self::TwentyToThirty => "20-30",
            Self::ThirtyToEnd => "30-end",
        }
    }
}

/// One participant of a completed match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantRecord {
    pub participant_id: i32,
    pub team: TeamId,
    pub role: Role,
    pub lane: Lane,
    pub win: bool,
    pub damage_to_champions: i64,
    pub gold_earned: i64,
    pub gold_per_min_deltas: BTreeMap<TimeBucket, f64>,
}

impl ParticipantRecord {
    /// Presence-checking lookup of a per-minute gold delta.
    pub fn gold_delta(&self, bucket: TimeBucket) -> Option<f64> {
        self.gold_per_min_deltas.get(&bucket).copied()
    }
}

/// Maps a participant id to the stable player identifier behind it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantIdentity {
    pub participant_id: i32,
    pub player_id: PlayerId,
}

/// A completed game as retrieved from the match-data service.
///
/// Immutable once retrieved; the cache stores the serialized form verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub match_id: i64,
    pub duration_secs: i64,
    pub participants: Vec<ParticipantRecord>,
    pub identities: Vec<ParticipantIdentity>,
}

impl MatchRecord {
    /// Find the participant entry mapped to a player identifier.
    pub fn participant_for_player(&self, player_id: &str) -> Option<&ParticipantRecord> {
        let identity = self
            .identities
            .iter()
            .find(|pi| pi.player_id == player_id)?;
        self.participants
            .iter()
            .find(|p| p.participant_id == identity.participant_id)
    }

    pub fn has_player(&self, player_id: &str) -> bool {
        self.identities.iter().any(|pi| pi.player_id == player_id)
    }
}

/// Analysis configuration: which matches and which participants count.
///
/// Every axis is optional and conjunctive. An empty ally list or an unset
/// role/lane axis means no restriction on that axis.
#[derive(Debug, Clone, Default)]
pub struct FilterSet {
    pub required_allies: Vec<PlayerId>,
    pub excluded_allies: Vec<PlayerId>,
    pub roles: Option<Vec<Role>>,
    pub lanes: Option<Vec<Lane>>,
    pub ally_lanes: Option<Vec<Lane>>,
}

impl FilterSet {
    pub fn role_allowed(&self, role: Role) -> bool {
        match &self.roles {
            Some(roles) => roles.contains(&role),
            None => true,
        }
    }

    pub fn lane_allowed(&self, lane: Lane) -> bool {
        match &self.lanes {
            Some(lanes) => lanes.contains(&lane),
            None => true,
        }
    }

    pub fn ally_lane_allowed(&self, lane: Lane) -> bool {
        match &self.ally_lanes {
            Some(lanes) => lanes.contains(&lane),
            None => true,
        }
    }
}

/// Platform region the target plays on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Region {
    Na,
    Euw,
    Eune,
    Kr,
}

impl FromStr for Region {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "na" | "na1" => Ok(Self::Na),
            "euw" | "euw1" => Ok(Self::Euw),
            "eune" | "eun1" => Ok(Self::Eune),
            "kr" => Ok(Self::Kr),
            other => Err(format!("unknown region: {other}")),
        }
    }
}
