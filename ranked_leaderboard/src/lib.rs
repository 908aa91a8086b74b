mod config;

pub mod builder;
pub mod manual;

use log::{debug, info};

use std::cmp::Ordering;

pub use crate::config::*;

/// A score quantized to millionths.
///
/// Totals, spends and countback entries are compared through this type so that
/// two values which only differ by floating-point noise are considered equal.
/// The quantized value stays a float: there is no upper bound on the scores.
#[derive(Debug, Clone, Copy)]
pub struct Points(f64);

impl Points {
    pub const ZERO: Points = Points(0.0);

    const SCALE: f64 = 1_000_000.0;

    pub fn from_f64(x: f64) -> Points {
        // Adding zero turns -0.0 into 0.0.
        Points((x * Points::SCALE).round() + 0.0)
    }
}

impl Ord for Points {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Points {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Points {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Points {}

/// The countback sequence of a player: the round scores sorted from highest to
/// lowest, padded with zeros up to `width` entries.
///
/// Comparing two such sequences lexicographically implements the countback
/// rule: the player with the higher score at the first difference wins.
pub fn countback_key(round_scores: &[f64], width: usize) -> Vec<Points> {
    let mut key: Vec<Points> = round_scores.iter().map(|s| Points::from_f64(*s)).collect();
    key.sort_unstable_by(|a, b| b.cmp(a));
    let padded_len = width.max(key.len());
    key.resize(padded_len, Points::ZERO);
    key
}

// Everything that separates two players, except for their names.
// Smaller keys rank higher.
#[derive(Eq, PartialEq, Debug, Clone)]
struct RankingKey {
    total: Points,
    spend: Points,
    countback: Vec<Points>,
}

impl RankingKey {
    fn new(player: &PlayerRecord, width: usize) -> RankingKey {
        RankingKey {
            total: Points::from_f64(player.effective_total()),
            spend: Points::from_f64(player.spend),
            countback: countback_key(&player.round_scores, width),
        }
    }
}

impl Ord for RankingKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .total
            .cmp(&self.total)
            .then_with(|| self.spend.cmp(&other.spend))
            .then_with(|| other.countback.cmp(&self.countback))
    }
}

impl PartialOrd for RankingKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Alphabetical order, ignoring case first. Only used to get a deterministic
/// order inside a tie group.
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Ranks the players.
///
/// The order is, by decreasing priority:
/// * highest total (explicit total when provided, sum of the rounds otherwise)
/// * lowest spend
/// * countback on the round scores
/// * name, alphabetically
///
/// The returned entries are in leaderboard order. Ranks are positional (1..N).
/// Players that only differ by their names share a tie group.
pub fn rank_players(players: &[PlayerRecord]) -> Vec<RankedEntry> {
    info!("rank_players: Processing {:?} players", players.len());

    let width = players
        .iter()
        .map(|p| p.round_scores.len())
        .max()
        .unwrap_or(0);

    let mut keyed: Vec<(RankingKey, usize)> = players
        .iter()
        .enumerate()
        .map(|(idx, p)| (RankingKey::new(p, width), idx))
        .collect();
    // The sort is stable: exact duplicates keep their input order.
    keyed.sort_by(|(ka, ia), (kb, ib)| {
        ka.cmp(kb)
            .then_with(|| compare_names(&players[*ia].name, &players[*ib].name))
    });

    // Equal keys are contiguous after sorting.
    let mut tie_groups: Vec<u32> = Vec::with_capacity(keyed.len());
    let mut group_sizes: Vec<usize> = Vec::new();
    let mut previous: Option<&RankingKey> = None;
    for (key, _) in keyed.iter() {
        if previous != Some(key) {
            group_sizes.push(0);
        }
        let group = group_sizes.len();
        group_sizes[group - 1] += 1;
        tie_groups.push(group as u32);
        previous = Some(key);
    }

    let mut res: Vec<RankedEntry> = Vec::with_capacity(keyed.len());
    for (pos, ((_, idx), tie_group)) in keyed.iter().zip(tie_groups).enumerate() {
        let player = &players[*idx];
        let entry = RankedEntry {
            player: player.clone(),
            total: player.effective_total(),
            rank: (pos + 1) as u32,
            tie_group,
            tie_highlight: group_sizes[(tie_group - 1) as usize] > 1,
        };
        debug!(
            "rank_players: rank: {:?} name: {:?} total: {:?} spend: {:?} tie_group: {:?}",
            entry.rank, entry.player.name, entry.total, entry.player.spend, entry.tie_group
        );
        res.push(entry);
    }

    let num_tied = res.iter().filter(|e| e.tie_highlight).count();
    info!(
        "rank_players: {:?} tie groups, {:?} players in a tie",
        group_sizes.len(),
        num_tied
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn player(name: &str, scores: &[f64], spend: f64) -> PlayerRecord {
        PlayerRecord::new(name, scores, spend)
    }

    fn with_total(name: &str, total: f64, spend: f64) -> PlayerRecord {
        PlayerRecord {
            name: name.to_string(),
            round_scores: vec![],
            spend,
            explicit_total: Some(total),
        }
    }

    fn names(entries: &[RankedEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.player.name.as_str()).collect()
    }

    #[test]
    fn empty_input() {
        init();
        assert!(rank_players(&[]).is_empty());
    }

    #[test]
    fn single_player() {
        init();
        let res = rank_players(&[player("Solo", &[3.0, 4.0], 1.0)]);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].rank, 1);
        assert_eq!(res[0].tie_group, 1);
        assert!(!res[0].tie_highlight);
        assert_eq!(res[0].total, 7.0);
    }

    #[test]
    fn spend_breaks_equal_totals() {
        init();
        let res = rank_players(&[
            with_total("Alice", 10.0, 5.0),
            with_total("Bob", 10.0, 3.0),
            with_total("Carol", 8.0, 0.0),
        ]);
        assert_eq!(names(&res), vec!["Bob", "Alice", "Carol"]);
        assert_eq!(
            res.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(
            res.iter().map(|e| e.tie_group).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert!(res.iter().all(|e| !e.tie_highlight));
    }

    #[test]
    fn total_beats_spend_and_countback() {
        init();
        let res = rank_players(&[
            player("Cheap", &[30.0, 30.0], 0.0),
            player("Rich", &[1.0, 60.0], 100.0),
        ]);
        assert_eq!(names(&res), vec!["Rich", "Cheap"]);
    }

    #[test]
    fn countback_on_highest_score() {
        init();
        let res = rank_players(&[
            player("Beta", &[50.0, 50.0], 10.0),
            player("Alpha", &[40.0, 60.0], 10.0),
        ]);
        assert_eq!(names(&res), vec!["Alpha", "Beta"]);
        assert_ne!(res[0].tie_group, res[1].tie_group);
    }

    #[test]
    fn countback_on_repeated_top_score() {
        init();
        let res = rank_players(&[
            player("Beta", &[60.0, 50.0, 40.0], 10.0),
            player("Alpha", &[40.0, 60.0, 50.0, 0.0], 10.0),
            player("Gamma", &[60.0, 40.0, 60.0], 10.0),
        ]);
        // Gamma is ahead on total; Alpha and Beta have the same sorted scores.
        assert_eq!(res[0].player.name, "Gamma");
        assert_eq!(names(&res[1..]), vec!["Alpha", "Beta"]);
        assert_eq!(res[1].tie_group, res[2].tie_group);
        assert!(res[1].tie_highlight && res[2].tie_highlight);
        assert!(!res[0].tie_highlight);
    }

    #[test]
    fn countback_pads_short_sequences_with_zeros() {
        let short = countback_key(&[5.0, 7.0], 4);
        let long = countback_key(&[7.0, 5.0, 0.0], 4);
        assert_eq!(short, long);
        assert_eq!(short.len(), 4);
        assert!(countback_key(&[7.0, 5.0, 1.0], 4) > short);
    }

    #[test]
    fn full_tie_is_alphabetical_and_grouped() {
        init();
        let res = rank_players(&[
            player("beta", &[50.0, 50.0], 10.0),
            player("Alpha", &[50.0, 50.0], 10.0),
        ]);
        assert_eq!(names(&res), vec!["Alpha", "beta"]);
        assert_eq!(res[0].rank, 1);
        assert_eq!(res[1].rank, 2);
        assert_eq!(res[0].tie_group, res[1].tie_group);
        assert!(res[0].tie_highlight && res[1].tie_highlight);
    }

    #[test]
    fn all_zero_totals() {
        init();
        let res = rank_players(&[
            player("Zed", &[0.0, 0.0], 0.0),
            player("Amy", &[0.0], 0.0),
            player("Max", &[], 2.0),
        ]);
        assert_eq!(names(&res), vec!["Amy", "Zed", "Max"]);
        assert_eq!(res[0].tie_group, 1);
        assert_eq!(res[1].tie_group, 1);
        assert_eq!(res[2].tie_group, 2);
        assert!(!res[2].tie_highlight);
    }

    #[test]
    fn explicit_total_overrides_round_sum() {
        init();
        let mut adjusted = player("Adjusted", &[1.0, 1.0], 0.0);
        adjusted.explicit_total = Some(50.0);
        let res = rank_players(&[player("Plain", &[20.0, 20.0], 0.0), adjusted]);
        assert_eq!(names(&res), vec!["Adjusted", "Plain"]);
        assert_eq!(res[0].total, 50.0);
        assert_eq!(res[1].total, 40.0);
    }

    #[test]
    fn floating_point_noise_is_a_tie() {
        init();
        let res = rank_players(&[
            player("B", &[0.1, 0.2], 0.0),
            player("A", &[0.3, 0.0], 0.0),
        ]);
        // 0.1 + 0.2 != 0.3 in binary, but the totals are equal to the millionth.
        // The countbacks still differ (0.3 > 0.2).
        assert_eq!(names(&res), vec!["A", "B"]);
        assert_ne!(res[0].tie_group, res[1].tie_group);
        assert_eq!(Points::from_f64(0.1 + 0.2), Points::from_f64(0.3));
    }

    #[test]
    fn very_large_totals_keep_their_order() {
        init();
        let res = rank_players(&[
            with_total("Small", 1e13, 0.0),
            with_total("Big", 2e13, 5.0),
            with_total("Huge", 3e20, 9.0),
        ]);
        assert_eq!(names(&res), vec!["Huge", "Big", "Small"]);
        assert!(res.iter().all(|e| !e.tie_highlight));
        assert_eq!(Points::from_f64(-0.0000001), Points::ZERO);
    }

    #[test]
    fn duplicate_names_are_kept() {
        init();
        let res = rank_players(&[player("Sam", &[1.0], 0.0), player("Sam", &[1.0], 0.0)]);
        assert_eq!(res.len(), 2);
        assert_eq!(res[0].tie_group, res[1].tie_group);
        assert!(res[0].tie_highlight);
    }

    #[test]
    fn ranks_are_contiguous_and_totals_ordered() {
        init();
        let players: Vec<PlayerRecord> = (0..25)
            .map(|i| {
                player(
                    &format!("P{:02}", (i * 7) % 25),
                    &[(i % 4) as f64, (i % 3) as f64 * 2.5],
                    (i % 5) as f64,
                )
            })
            .collect();
        let res = rank_players(&players);
        let ranks: Vec<u32> = res.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, (1..=25).collect::<Vec<u32>>());
        for pair in res.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(Points::from_f64(a.total) >= Points::from_f64(b.total));
            if Points::from_f64(a.total) == Points::from_f64(b.total) {
                assert!(Points::from_f64(a.player.spend) <= Points::from_f64(b.player.spend));
            }
            assert!(a.tie_group <= b.tie_group && b.tie_group <= a.tie_group + 1);
        }
    }

    #[test]
    fn ranking_is_deterministic() {
        init();
        let players = vec![
            player("c", &[2.0, 1.0], 1.0),
            player("B", &[1.0, 2.0], 1.0),
            player("a", &[3.0], 1.0),
        ];
        let mut reversed = players.clone();
        reversed.reverse();
        assert_eq!(rank_players(&players), rank_players(&reversed));
    }
}
