use serde::Serialize;

use super::aggregation::MatchStats;

/// Run-level tallies over the per-match statistics.
///
/// Built by folding an immutable accumulator over the stats sequence; the
/// counts carry the positive side of each comparison, with the non-positive
/// complements available as accessors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SummaryCounts {
    pub total: usize,
    /// Lane damage ratio strictly above the ally-team damage ratio, counted
    /// only for matches where both ratios are defined.
    pub out_damaged_allies: usize,
    pub gold_ahead_at_ten: usize,
    pub gold_ahead_ten_twenty: usize,
    pub total_gold_ahead: usize,
    /// Positive team gold differential, among `ally_diff_samples`.
    pub allies_ahead_at_ten: usize,
    /// Matches where the team gold differential was defined at all.
    pub ally_diff_samples: usize,
    pub wins: usize,
    pub losses: usize,
}

/// Reduce the stats sequence to run-level counts.
pub fn summarize(stats: &[MatchStats]) -> SummaryCounts {
    stats
        .iter()
        .fold(SummaryCounts::default(), SummaryCounts::absorb)
}

impl SummaryCounts {
    fn absorb(mut self, stats: &MatchStats) -> Self {
        self.total += 1;

        if let (Some(lane), Some(ally)) = (stats.lane_damage_ratio, stats.ally_damage_ratio) {
            if lane > ally {
                self.out_damaged_allies += 1;
            }
        }
        if stats.gold_at_ten_diff > 0.0 {
            self.gold_ahead_at_ten += 1;
        }
        if stats.gold_ten_twenty_diff > 0.0 {
            self.gold_ahead_ten_twenty += 1;
        }
        if stats.total_gold_diff > 0 {
            self.total_gold_ahead += 1;
        }
        if let Some(diff) = stats.ally_gold_at_ten_diff {
            self.ally_diff_samples += 1;
            if diff > 0.0 {
                self.allies_ahead_at_ten += 1;
            }
        }
        if stats.is_loss {
            self.losses += 1;
        } else {
            self.wins += 1;
        }

        self
    }

    pub fn gold_behind_at_ten(&self) -> usize {
        self.total - self.gold_ahead_at_ten
    }

    pub fn gold_behind_ten_twenty(&self) -> usize {
        self.total - self.gold_ahead_ten_twenty
    }

    pub fn total_gold_behind(&self) -> usize {
        self.total - self.total_gold_ahead
    }

    pub fn percent_out_damaged_allies(&self) -> Option<f64> {
        self.percent(self.out_damaged_allies)
    }

    pub fn percent_gold_ahead_at_ten(&self) -> Option<f64> {
        self.percent(self.gold_ahead_at_ten)
    }

    pub fn percent_gold_ahead_ten_twenty(&self) -> Option<f64> {
        self.percent(self.gold_ahead_ten_twenty)
    }

    pub fn percent_total_gold_ahead(&self) -> Option<f64> {
        self.percent(self.total_gold_ahead)
    }

    pub fn percent_allies_ahead_at_ten(&self) -> Option<f64> {
        self.percent(self.allies_ahead_at_ten)
    }

    pub fn win_rate(&self) -> Option<f64> {
        self.percent(self.wins)
    }

    /// Undefined over an empty run; callers must handle `None` rather than
    /// divide by zero.
    fn percent(&self, count: usize) -> Option<f64> {
        if self.total == 0 {
            return None;
        }
        Some(100.0 * count as f64 / self.total as f64)
    }
}
