// ********* Input data structures ***********

/// A competitor, as read from the results table.
///
/// In most cases, it is enough to use the higher-level builder API.
#[derive(PartialEq, Debug, Clone)]
pub struct PlayerRecord {
    pub name: String,
    /// One score per round, in column order.
    pub round_scores: Vec<f64>,
    /// Lower spend wins when totals are equal.
    pub spend: f64,
    /// A precomputed total, when the source provides one.
    pub explicit_total: Option<f64>,
}

impl PlayerRecord {
    pub fn new(name: &str, round_scores: &[f64], spend: f64) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            round_scores: round_scores.to_vec(),
            spend,
            explicit_total: None,
        }
    }

    /// The total used for ranking: the explicit total if there is one,
    /// the sum of the round scores otherwise.
    pub fn effective_total(&self) -> f64 {
        match self.explicit_total {
            Some(t) => t,
            None => self.round_scores.iter().sum(),
        }
    }
}

// ******** Output data structures *********

/// A player with its final position on the leaderboard.
#[derive(PartialEq, Debug, Clone)]
pub struct RankedEntry {
    pub player: PlayerRecord,
    pub total: f64,
    /// Positional rank, starting at 1. Never shared between players.
    pub rank: u32,
    /// Players that cannot be separated by total, spend or countback share
    /// the same group. Groups are numbered from 1 in leaderboard order.
    pub tie_group: u32,
    /// True when the tie group has more than one member.
    pub tie_highlight: bool,
}
