#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Backtracking wave/court packer.
//!
//! Given the pairs selected for one team, the packer arranges them into ordered waves
//! of `courts` pairs each so that no player appears twice in a wave and no player
//! appears in more than [`PackerConfig::max_consecutive`] consecutive waves. The search
//! is a depth-first backtrack; every placement returns an explicit undo record that
//! restores the streak bookkeeping of both players when the branch fails.

use doubles_draw_core::{DrawError, Pair, TeamSchedule, Wave, DEFAULT_MAX_CONSECUTIVE};
use tracing::debug;

/// Placements the search may try before it gives up on a selection.
pub const DEFAULT_SEARCH_BUDGET: u64 = 2_000_000;

/// Tuning knobs for the packer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PackerConfig {
    /// Longest run of consecutive waves any player may appear in.
    pub max_consecutive: u32,
    /// Upper bound on placements tried by a single packing search.
    pub search_budget: u64,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            max_consecutive: DEFAULT_MAX_CONSECUTIVE,
            search_budget: DEFAULT_SEARCH_BUDGET,
        }
    }
}

/// Pure system that arranges selected pairs into waves.
#[derive(Clone, Copy, Debug, Default)]
pub struct WavePacker {
    config: PackerConfig,
}

impl WavePacker {
    /// Creates a packer using the provided configuration.
    #[must_use]
    pub const fn new(config: PackerConfig) -> Self {
        Self { config }
    }

    /// Configuration the packer runs with.
    #[must_use]
    pub const fn config(&self) -> PackerConfig {
        self.config
    }

    /// Packs `pairs` into `pairs.len() / courts` waves of `courts` pairs each.
    ///
    /// Pairs are scanned in the order given. Failure to find any legal arrangement, or
    /// running out of search budget, is reported as [`DrawError::PackingFailed`].
    pub fn pack(&self, pairs: &[Pair], courts: usize) -> Result<TeamSchedule, DrawError> {
        if courts == 0 {
            return Err(DrawError::ZeroParameter { name: "courts" });
        }

        let waves = pairs.len() / courts;
        let failure = DrawError::PackingFailed {
            pairs: pairs.len(),
            waves,
            courts,
        };
        if pairs.len() % courts != 0 {
            return Err(failure);
        }

        let mut search = Search::new(pairs, waves, courts, self.config);
        if search.fill(0, 0, 0) {
            return Ok(search.into_schedule());
        }

        if search.budget_exhausted {
            debug!(
                pairs = pairs.len(),
                waves,
                courts,
                budget = self.config.search_budget,
                "packing search budget exhausted"
            );
        }
        Err(failure)
    }
}

/// Consecutive-appearance bookkeeping for one player slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Streak {
    last_wave: Option<usize>,
    run: u32,
}

impl Streak {
    /// Streak after appearing in `wave`, or `None` when the appearance is illegal.
    ///
    /// A slot whose last wave equals `wave` is already playing in that wave.
    fn extended(self, wave: usize, max_consecutive: u32) -> Option<Streak> {
        match self.last_wave {
            Some(last) if last == wave => None,
            Some(last) if last + 1 == wave => {
                let run = self.run + 1;
                (run <= max_consecutive).then_some(Streak {
                    last_wave: Some(wave),
                    run,
                })
            }
            _ => (max_consecutive >= 1).then_some(Streak {
                last_wave: Some(wave),
                run: 1,
            }),
        }
    }
}

/// Undo record returned by a successful placement.
#[derive(Clone, Copy, Debug)]
struct Placement {
    pair_index: usize,
    previous: [Streak; 2],
}

/// Search state owned by a single packing call.
#[derive(Debug)]
struct Search<'a> {
    pairs: &'a [Pair],
    waves: usize,
    courts: usize,
    max_consecutive: u32,
    budget: u64,
    budget_exhausted: bool,
    used: Vec<bool>,
    streaks: Vec<Streak>,
    grid: Vec<Vec<usize>>,
}

impl<'a> Search<'a> {
    fn new(pairs: &'a [Pair], waves: usize, courts: usize, config: PackerConfig) -> Self {
        let slot_count = pairs
            .iter()
            .map(|pair| pair.second().index() + 1)
            .max()
            .unwrap_or(0);
        Self {
            pairs,
            waves,
            courts,
            max_consecutive: config.max_consecutive,
            budget: config.search_budget,
            budget_exhausted: false,
            used: vec![false; pairs.len()],
            streaks: vec![Streak::default(); slot_count],
            grid: vec![Vec::with_capacity(courts); waves],
        }
    }

    /// Fills `court` of `wave` and everything after it.
    ///
    /// Within a wave, candidates start after the pair placed on the previous court so
    /// each set of pairs is tried once regardless of court order.
    fn fill(&mut self, wave: usize, court: usize, start: usize) -> bool {
        if wave == self.waves {
            return true;
        }
        if court == self.courts {
            return self.fill(wave + 1, 0, 0);
        }

        for index in start..self.pairs.len() {
            if self.used[index] {
                continue;
            }
            if self.budget == 0 {
                self.budget_exhausted = true;
                return false;
            }
            self.budget -= 1;

            let Some(placement) = self.place(index, wave) else {
                continue;
            };
            if self.fill(wave, court + 1, index + 1) {
                return true;
            }
            self.undo(placement, wave);
            if self.budget_exhausted {
                return false;
            }
        }

        false
    }

    fn place(&mut self, index: usize, wave: usize) -> Option<Placement> {
        let [first, second] = self.pairs[index].slots();
        let previous = [self.streaks[first.index()], self.streaks[second.index()]];
        let next_first = previous[0].extended(wave, self.max_consecutive)?;
        let next_second = previous[1].extended(wave, self.max_consecutive)?;

        self.streaks[first.index()] = next_first;
        self.streaks[second.index()] = next_second;
        self.used[index] = true;
        self.grid[wave].push(index);

        Some(Placement {
            pair_index: index,
            previous,
        })
    }

    fn undo(&mut self, placement: Placement, wave: usize) {
        let [first, second] = self.pairs[placement.pair_index].slots();
        self.streaks[first.index()] = placement.previous[0];
        self.streaks[second.index()] = placement.previous[1];
        self.used[placement.pair_index] = false;
        let _ = self.grid[wave].pop();
    }

    fn into_schedule(self) -> TeamSchedule {
        let pairs = self.pairs;
        TeamSchedule::new(
            self.grid
                .into_iter()
                .map(|wave| Wave::new(wave.into_iter().map(|index| pairs[index]).collect()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streak_allows_two_consecutive_waves() {
        let start = Streak::default();
        let first = start.extended(0, 2).expect("first appearance");
        let second = first.extended(1, 2).expect("second consecutive");
        assert_eq!(second.run, 2);
        assert!(second.extended(2, 2).is_none(), "third consecutive wave");
        let after_gap = second.extended(3, 2).expect("gap resets the run");
        assert_eq!(after_gap.run, 1);
    }

    #[test]
    fn zero_cap_rejects_every_appearance() {
        assert!(Streak::default().extended(0, 0).is_none());
        let rested = Streak {
            last_wave: Some(0),
            run: 1,
        };
        assert!(rested.extended(5, 0).is_none());
    }

    #[test]
    fn streak_rejects_same_wave() {
        let streak = Streak::default().extended(4, 2).expect("first appearance");
        assert!(streak.extended(4, 2).is_none());
    }

    #[test]
    fn undo_restores_bookkeeping() {
        let pairs = [
            Pair::from_positions(1, 2).expect("pair"),
            Pair::from_positions(3, 4).expect("pair"),
        ];
        let mut search = Search::new(&pairs, 1, 2, PackerConfig::default());
        let placement = search.place(0, 0).expect("placeable");
        assert!(search.used[0]);
        assert_eq!(search.streaks[0].run, 1);

        search.undo(placement, 0);
        assert!(!search.used[0]);
        assert_eq!(search.streaks[0], Streak::default());
        assert!(search.grid[0].is_empty());
    }

    #[test]
    fn zero_budget_fails_immediately() {
        let pairs = [
            Pair::from_positions(1, 2).expect("pair"),
            Pair::from_positions(3, 4).expect("pair"),
        ];
        let packer = WavePacker::new(PackerConfig {
            search_budget: 0,
            ..PackerConfig::default()
        });
        assert!(matches!(
            packer.pack(&pairs, 2),
            Err(DrawError::PackingFailed { .. })
        ));
    }
}
