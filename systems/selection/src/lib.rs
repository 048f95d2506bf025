#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Load-balanced pair selection for a single team.
//!
//! The selector draws pairs one at a time from a [`PairUniverse`], steering each draw
//! towards the players with the fewest appearances so far. It is greedy and
//! randomised: a dead end is reported as [`DrawError::NoFeasibleSelection`] and left
//! to the caller's retry budget rather than resolved with deeper search.

use doubles_draw_core::{balance_tolerance, DrawError, Pair, PairUniverse, PlayerSlot};
use rand::Rng;

/// Pure system that picks the pairs one team will play in a draw.
#[derive(Clone, Copy, Debug, Default)]
pub struct LoadBalancedSelector;

impl LoadBalancedSelector {
    /// Creates a new selector.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Selects exactly `target` distinct pairs with per-player counts as even as possible.
    ///
    /// Pairs are returned in the order they were drawn. The final appearance spread is
    /// checked against [`balance_tolerance`]; an uneven result counts as a dead end.
    pub fn select<R>(
        &self,
        universe: &PairUniverse,
        target: usize,
        rng: &mut R,
    ) -> Result<Vec<Pair>, DrawError>
    where
        R: Rng + ?Sized,
    {
        if universe.len() < target {
            return Err(DrawError::InsufficientCombinations {
                available: universe.len(),
                required: target,
            });
        }

        let mut remaining = universe.pairs().to_vec();
        let mut selected = Vec::with_capacity(target);
        let mut loads = LoadTable::new(universe.team_size());
        let mut candidates = Vec::with_capacity(remaining.len());

        while selected.len() < target {
            let dead_end = DrawError::NoFeasibleSelection {
                selected: selected.len(),
                required: target,
            };
            let Some(bounds) = loads.bounds(&remaining) else {
                return Err(dead_end);
            };

            collect_candidates(&remaining, &loads, bounds, &mut candidates);
            if candidates.is_empty() {
                return Err(dead_end);
            }

            let choice = candidates[rng.gen_range(0..candidates.len())];
            let pair = remaining.swap_remove(choice);
            loads.record(pair);
            selected.push(pair);
        }

        if loads.spread() > balance_tolerance(target, universe.team_size()) {
            return Err(DrawError::NoFeasibleSelection {
                selected: selected.len(),
                required: target,
            });
        }

        Ok(selected)
    }
}

/// Lowest and highest load among players that still have unselected pairs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct LoadBounds {
    min: u32,
    max: u32,
}

/// Appearance count per player slot for the selection in progress.
#[derive(Clone, Debug)]
struct LoadTable {
    loads: Vec<u32>,
    active: Vec<bool>,
}

impl LoadTable {
    fn new(team_size: u32) -> Self {
        let len = team_size as usize;
        Self {
            loads: vec![0; len],
            active: vec![false; len],
        }
    }

    fn load(&self, slot: PlayerSlot) -> u32 {
        self.loads.get(slot.index()).copied().unwrap_or(0)
    }

    fn record(&mut self, pair: Pair) {
        for slot in pair.slots() {
            if let Some(load) = self.loads.get_mut(slot.index()) {
                *load += 1;
            }
        }
    }

    fn bounds(&mut self, remaining: &[Pair]) -> Option<LoadBounds> {
        self.active.fill(false);
        for pair in remaining {
            for slot in pair.slots() {
                if let Some(active) = self.active.get_mut(slot.index()) {
                    *active = true;
                }
            }
        }

        let mut bounds: Option<LoadBounds> = None;
        for (load, _) in self
            .loads
            .iter()
            .zip(&self.active)
            .filter(|(_, active)| **active)
        {
            bounds = Some(match bounds {
                None => LoadBounds {
                    min: *load,
                    max: *load,
                },
                Some(current) => LoadBounds {
                    min: current.min.min(*load),
                    max: current.max.max(*load),
                },
            });
        }
        bounds
    }

    fn spread(&self) -> u32 {
        let min = self.loads.iter().copied().min().unwrap_or(0);
        let max = self.loads.iter().copied().max().unwrap_or(0);
        max - min
    }
}

/// Fills `out` with indices into `remaining` that the next draw may pick from.
///
/// Equal loads leave the pool unrestricted. A gap of one excludes pairs touching a
/// max-load player, falling back to pairs touching a min-load player. A wider gap
/// requires both: no max-load player and at least one min-load player.
fn collect_candidates(
    remaining: &[Pair],
    loads: &LoadTable,
    bounds: LoadBounds,
    out: &mut Vec<usize>,
) {
    out.clear();

    let touches = |pair: &Pair, load: u32| {
        pair.slots()
            .iter()
            .any(|&slot| loads.load(slot) == load)
    };

    match bounds.max - bounds.min {
        0 => out.extend(0..remaining.len()),
        1 => {
            out.extend(
                remaining
                    .iter()
                    .enumerate()
                    .filter(|(_, pair)| !touches(*pair, bounds.max))
                    .map(|(index, _)| index),
            );
            if out.is_empty() {
                out.extend(
                    remaining
                        .iter()
                        .enumerate()
                        .filter(|(_, pair)| touches(*pair, bounds.min))
                        .map(|(index, _)| index),
                );
            }
        }
        _ => out.extend(
            remaining
                .iter()
                .enumerate()
                .filter(|(_, pair)| !touches(*pair, bounds.max) && touches(*pair, bounds.min))
                .map(|(index, _)| index),
        ),
    }
}
