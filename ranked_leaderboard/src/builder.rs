pub use crate::config::*;

/// A builder for assembling the players of a leaderboard.
///
/// ```
/// pub use ranked_leaderboard::builder::Builder;
///
/// let mut builder = Builder::new();
/// builder.add_player_simple("Alice", &[4.0, 6.0], 5.0);
/// builder.add_player_simple("Bob", &[7.0, 3.0], 3.0);
/// builder.add_player_with_total("Carol", &[8.0], 0.0, 8.0);
///
/// let ranked = builder.rank();
/// assert_eq!(ranked[0].player.name, "Bob");
/// assert_eq!(ranked[2].rank, 3);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Builder {
    pub(crate) _players: Vec<PlayerRecord>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            _players: Vec::new(),
        }
    }

    /// Adds a player whose total is the sum of its rounds.
    pub fn add_player_simple(&mut self, name: &str, round_scores: &[f64], spend: f64) {
        self.add_player(PlayerRecord::new(name, round_scores, spend))
    }

    /// Adds a player with a precomputed total. The rounds are still used for
    /// the countback.
    pub fn add_player_with_total(
        &mut self,
        name: &str,
        round_scores: &[f64],
        spend: f64,
        total: f64,
    ) {
        self.add_player(PlayerRecord {
            name: name.to_string(),
            round_scores: round_scores.to_vec(),
            spend,
            explicit_total: Some(total),
        })
    }

    pub fn add_player(&mut self, player: PlayerRecord) {
        self._players.push(player);
    }

    pub fn players(&self) -> &[PlayerRecord] {
        &self._players
    }

    pub fn rank(&self) -> Vec<RankedEntry> {
        crate::rank_players(&self._players)
    }
}
