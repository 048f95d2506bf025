#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Audits finished draws against the fairness and legality rules.
//!
//! The generator guarantees these properties by construction; the audit recomputes
//! them from the output alone so adapters can vet draws that arrive from elsewhere,
//! such as a decoded share code, and tests can assert them independently.

use std::{collections::HashSet, fmt};

use doubles_draw_core::{
    balance_tolerance, CombinedSchedule, DrawParameters, Pair, PlayerSlot, Team, TeamSchedule,
};
use serde::Serialize;

mod metrics;

pub use metrics::{appearance_counts, longest_runs, spread};

/// Rule broken by a draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum Violation {
    /// The draw has a different number of waves than requested.
    WaveCountMismatch {
        /// Waves requested.
        expected: usize,
        /// Waves present.
        found: usize,
    },
    /// A wave fills a different number of courts than requested.
    CourtCountMismatch {
        /// Zero-based wave index.
        wave: usize,
        /// Courts requested.
        expected: usize,
        /// Courts present.
        found: usize,
    },
    /// A pairing is scheduled more than once for the same team.
    DuplicatePair {
        /// Team fielding the pair.
        team: Team,
        /// Repeated pair.
        pair: Pair,
    },
    /// A slot plays on two courts in the same wave.
    SlotRepeatedInWave {
        /// Team owning the slot.
        team: Team,
        /// Zero-based wave index.
        wave: usize,
        /// Repeated slot.
        slot: PlayerSlot,
    },
    /// A slot lies outside the roster.
    SlotOutOfRange {
        /// Team owning the slot.
        team: Team,
        /// Offending slot.
        slot: PlayerSlot,
    },
    /// A slot plays more consecutive waves than allowed.
    RunTooLong {
        /// Team owning the slot.
        team: Team,
        /// Offending slot.
        slot: PlayerSlot,
        /// Longest run observed.
        run: u32,
    },
    /// Appearance counts differ by more than integer division allows.
    SpreadAboveTolerance {
        /// Team whose counts are uneven.
        team: Team,
        /// Observed difference between the busiest and idlest player.
        spread: u32,
        /// Largest difference a fair draw may have.
        tolerance: u32,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WaveCountMismatch { expected, found } => {
                write!(f, "expected {expected} waves, found {found}")
            }
            Self::CourtCountMismatch {
                wave,
                expected,
                found,
            } => write!(
                f,
                "wave {} fills {found} courts instead of {expected}",
                wave + 1
            ),
            Self::DuplicatePair { team, pair } => {
                write!(f, "{team} pair {pair} is scheduled more than once")
            }
            Self::SlotRepeatedInWave { team, wave, slot } => write!(
                f,
                "{team} player {slot} appears twice in wave {}",
                wave + 1
            ),
            Self::SlotOutOfRange { team, slot } => {
                write!(f, "{team} player {slot} is not on the roster")
            }
            Self::RunTooLong { team, slot, run } => {
                write!(f, "{team} player {slot} plays {run} waves in a row")
            }
            Self::SpreadAboveTolerance {
                team,
                spread,
                tolerance,
            } => write!(
                f,
                "{team} appearance counts differ by {spread}, more than {tolerance}"
            ),
        }
    }
}

/// Per-team fairness figures and rule violations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TeamAudit {
    team: Team,
    appearances: Vec<u32>,
    longest_runs: Vec<u32>,
    violations: Vec<Violation>,
}

impl TeamAudit {
    /// Team the audit describes.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Matches played per slot, indexed by zero-based slot.
    #[must_use]
    pub fn appearances(&self) -> &[u32] {
        &self.appearances
    }

    /// Matches played by one slot.
    #[must_use]
    pub fn appearances_of(&self, slot: PlayerSlot) -> u32 {
        self.appearances.get(slot.index()).copied().unwrap_or(0)
    }

    /// Longest consecutive-wave run per slot, indexed by zero-based slot.
    #[must_use]
    pub fn longest_runs(&self) -> &[u32] {
        &self.longest_runs
    }

    /// Difference between the busiest and idlest player.
    #[must_use]
    pub fn spread(&self) -> u32 {
        spread(&self.appearances)
    }

    /// Rules broken by this team's schedule.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Reports whether the schedule broke no rule.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }
}

/// Audit of a complete draw.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DrawReport {
    shape: Vec<Violation>,
    red: TeamAudit,
    black: TeamAudit,
}

impl DrawReport {
    /// Audit of the requested team.
    #[must_use]
    pub const fn team(&self, team: Team) -> &TeamAudit {
        match team {
            Team::Red => &self.red,
            Team::Black => &self.black,
        }
    }

    /// Every violation in the draw: grid shape first, then Red, then Black.
    pub fn violations(&self) -> impl Iterator<Item = &Violation> {
        self.shape
            .iter()
            .chain(self.red.violations())
            .chain(self.black.violations())
    }

    /// Reports whether the draw broke no rule.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.violations().next().is_none()
    }
}

/// Audits one team's schedule.
///
/// Checks pair uniqueness, wave disjointness, roster bounds, the consecutive-wave cap,
/// and the appearance spread. Grid shape is checked by [`audit_combined`].
#[must_use]
pub fn audit_team(
    team: Team,
    schedule: &TeamSchedule,
    team_size: u32,
    max_consecutive: u32,
) -> TeamAudit {
    let mut violations = Vec::new();
    let mut seen_pairs = HashSet::new();
    let mut out_of_range = HashSet::new();

    for (wave_index, wave) in schedule.waves().iter().enumerate() {
        let mut in_wave = HashSet::new();
        for pair in wave.iter() {
            if !seen_pairs.insert(*pair) {
                violations.push(Violation::DuplicatePair { team, pair: *pair });
            }
            for slot in pair.slots() {
                if !slot.is_within(team_size) && out_of_range.insert(slot) {
                    violations.push(Violation::SlotOutOfRange { team, slot });
                }
                if !in_wave.insert(slot) {
                    violations.push(Violation::SlotRepeatedInWave {
                        team,
                        wave: wave_index,
                        slot,
                    });
                }
            }
        }
    }

    let runs = longest_runs(schedule, team_size);
    for (index, &run) in runs.iter().enumerate() {
        if run > max_consecutive {
            violations.push(Violation::RunTooLong {
                team,
                slot: PlayerSlot::new(index as u32 + 1),
                run,
            });
        }
    }

    let appearances = appearance_counts(schedule, team_size);
    let pair_count = schedule.pairs().count();
    let tolerance = balance_tolerance(pair_count, team_size);
    let observed = spread(&appearances);
    if observed > tolerance {
        violations.push(Violation::SpreadAboveTolerance {
            team,
            spread: observed,
            tolerance,
        });
    }

    TeamAudit {
        team,
        appearances,
        longest_runs: runs,
        violations,
    }
}

/// Audits a combined draw against the parameters it was generated for.
#[must_use]
pub fn audit_combined(
    schedule: &CombinedSchedule,
    params: &DrawParameters,
    max_consecutive: u32,
) -> DrawReport {
    let mut shape = Vec::new();
    let expected_waves = params.waves() as usize;
    let expected_courts = params.courts() as usize;

    if schedule.wave_count() != expected_waves {
        shape.push(Violation::WaveCountMismatch {
            expected: expected_waves,
            found: schedule.wave_count(),
        });
    }
    for (wave_index, wave) in schedule.waves().iter().enumerate() {
        if wave.len() != expected_courts {
            shape.push(Violation::CourtCountMismatch {
                wave: wave_index,
                expected: expected_courts,
                found: wave.len(),
            });
        }
    }

    let [red, black] = Team::ALL.map(|team| {
        audit_team(
            team,
            &schedule.team_schedule(team),
            params.players_per_team(),
            max_consecutive,
        )
    });

    DrawReport { shape, red, black }
}
