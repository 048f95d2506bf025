//! Enumeration of every teammate pairing available to a roster.

use crate::{DrawError, Pair, PlayerSlot, MAX_PLAYERS_PER_TEAM};

/// Every unordered pair a team of a given size can form.
///
/// Pairs are stored in lexicographic order of their canonical form so seeded draws
/// iterate them identically on every run. The universe is immutable apart from
/// [`PairUniverse::excluding`], which callers use to rule partnerships out up front.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PairUniverse {
    team_size: u32,
    pairs: Vec<Pair>,
}

impl PairUniverse {
    /// Builds the complete universe of `team_size * (team_size - 1) / 2` pairs.
    pub fn new(team_size: u32) -> Result<Self, DrawError> {
        if team_size < 2 {
            return Err(DrawError::InsufficientPlayers {
                players_per_team: team_size,
                required: 2,
            });
        }
        if team_size > MAX_PLAYERS_PER_TEAM {
            return Err(DrawError::TooManyPlayers {
                players_per_team: team_size,
                limit: MAX_PLAYERS_PER_TEAM,
            });
        }

        let mut pairs = Vec::with_capacity(combination_count(team_size));
        for first in 1..team_size {
            for second in (first + 1)..=team_size {
                if let Some(pair) = Pair::new(PlayerSlot::new(first), PlayerSlot::new(second)) {
                    pairs.push(pair);
                }
            }
        }

        Ok(Self { team_size, pairs })
    }

    /// Removes the provided pairings from the universe.
    #[must_use]
    pub fn excluding(mut self, excluded: &[Pair]) -> Self {
        self.pairs.retain(|pair| !excluded.contains(pair));
        self
    }

    /// Roster size the universe was built for.
    #[must_use]
    pub const fn team_size(&self) -> u32 {
        self.team_size
    }

    /// Pairs in canonical lexicographic order.
    #[must_use]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Number of pairs still available.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Reports whether every pair has been excluded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Reports whether the pair is available.
    #[must_use]
    pub fn contains(&self, pair: &Pair) -> bool {
        self.pairs.binary_search(pair).is_ok()
    }
}

/// Number of unordered pairs in a roster of `team_size` players.
#[must_use]
pub const fn combination_count(team_size: u32) -> usize {
    let n = team_size as usize;
    if n < 2 {
        0
    } else {
        n.saturating_mul(n - 1) / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_all_pairs() {
        let universe = PairUniverse::new(6).expect("universe");
        assert_eq!(universe.len(), 15);
        assert_eq!(universe.team_size(), 6);
        assert_eq!(universe.pairs()[0], Pair::from_positions(1, 2).expect("pair"));
        assert_eq!(universe.pairs()[14], Pair::from_positions(5, 6).expect("pair"));

        let mut sorted = universe.pairs().to_vec();
        sorted.sort();
        sorted.dedup();
        assert_eq!(sorted.as_slice(), universe.pairs());
    }

    #[test]
    fn smallest_universe_has_one_pair() {
        let universe = PairUniverse::new(2).expect("universe");
        assert_eq!(universe.pairs(), &[Pair::from_positions(1, 2).expect("pair")]);
    }

    #[test]
    fn rejects_rosters_below_two() {
        assert_eq!(
            PairUniverse::new(1),
            Err(DrawError::InsufficientPlayers {
                players_per_team: 1,
                required: 2,
            })
        );
        assert!(PairUniverse::new(0).is_err());
    }

    #[test]
    fn rejects_rosters_too_large_to_enumerate() {
        assert_eq!(
            PairUniverse::new(u32::MAX),
            Err(DrawError::TooManyPlayers {
                players_per_team: u32::MAX,
                limit: MAX_PLAYERS_PER_TEAM,
            })
        );
        let largest = PairUniverse::new(MAX_PLAYERS_PER_TEAM).expect("universe");
        assert_eq!(largest.len(), combination_count(MAX_PLAYERS_PER_TEAM));
    }

    #[test]
    fn excluding_removes_pairs_in_either_order() {
        let excluded = [
            Pair::from_positions(2, 1).expect("pair"),
            Pair::from_positions(4, 3).expect("pair"),
        ];
        let universe = PairUniverse::new(4).expect("universe").excluding(&excluded);
        assert_eq!(universe.len(), 4);
        assert!(!universe.contains(&excluded[0]));
        assert!(universe.contains(&Pair::from_positions(1, 3).expect("pair")));
    }

    #[test]
    fn counts_combinations() {
        assert_eq!(combination_count(0), 0);
        assert_eq!(combination_count(1), 0);
        assert_eq!(combination_count(4), 6);
        assert_eq!(combination_count(12), 66);
    }
}
