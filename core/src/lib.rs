#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the doubles draw generator.
//!
//! This crate defines the vocabulary that connects the pure draw systems and the
//! adapters. Team rosters are opaque here: a [`PlayerSlot`] is a 1-based position
//! within one team and carries no identity beyond a single generation call. Systems
//! select [`Pair`] values out of a [`PairUniverse`], pack them into [`Wave`] groups to
//! form a [`TeamSchedule`], and the Red and Black schedules are zipped together into a
//! [`CombinedSchedule`] that callers translate back into real players.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod universe;

pub use universe::{combination_count, PairUniverse};

/// Number of generation attempts made per team when the caller does not choose one.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 10;

/// Longest run of consecutive waves a single player may appear in.
pub const DEFAULT_MAX_CONSECUTIVE: u32 = 2;

/// Smallest team that can field two disjoint pairs in a wave.
pub const MIN_PLAYERS_PER_TEAM: u32 = 4;

/// Largest team whose pair universe is enumerated; 256 players form 32,640 pairs.
pub const MAX_PLAYERS_PER_TEAM: u32 = 256;

/// Label mixed into the draw seed to derive the Red team random stream.
pub const RNG_STREAM_RED: &str = "draw-red";

/// Label mixed into the draw seed to derive the Black team random stream.
pub const RNG_STREAM_BLACK: &str = "draw-black";

/// Identifies one of the two teams taking part in a draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Team {
    /// First team; its pair occupies the left side of every combined match.
    Red,
    /// Second team; its pair occupies the right side of every combined match.
    Black,
}

impl Team {
    /// Both teams in the order their schedules are generated.
    pub const ALL: [Team; 2] = [Team::Red, Team::Black];

    /// Label used to derive this team's independent random stream.
    #[must_use]
    pub const fn stream_label(self) -> &'static str {
        match self {
            Team::Red => RNG_STREAM_RED,
            Team::Black => RNG_STREAM_BLACK,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Red => write!(f, "Red"),
            Team::Black => write!(f, "Black"),
        }
    }
}

/// 1-based roster position within a single team.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerSlot(u32);

impl PlayerSlot {
    /// Creates a slot from its 1-based roster position.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the 1-based roster position.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Zero-based index suitable for dense per-slot tables.
    ///
    /// Slot `0` is not a valid roster position; it saturates to index `0`.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.0.saturating_sub(1) as usize
    }

    /// Reports whether the slot lies within a roster of `team_size` players.
    #[must_use]
    pub const fn is_within(&self, team_size: u32) -> bool {
        self.0 >= 1 && self.0 <= team_size
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unordered pairing of two distinct teammates.
///
/// The smaller slot is always stored first so `Pair(a, b) == Pair(b, a)` and the
/// derived hash is independent of argument order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "[u32; 2]", try_from = "[u32; 2]")]
pub struct Pair {
    first: PlayerSlot,
    second: PlayerSlot,
}

impl Pair {
    /// Creates the canonical pair for two slots.
    ///
    /// Returns `None` when both slots match or either slot is `0`.
    #[must_use]
    pub fn new(a: PlayerSlot, b: PlayerSlot) -> Option<Self> {
        if a.get() == 0 || b.get() == 0 {
            return None;
        }
        match a.cmp(&b) {
            std::cmp::Ordering::Less => Some(Self {
                first: a,
                second: b,
            }),
            std::cmp::Ordering::Greater => Some(Self {
                first: b,
                second: a,
            }),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Convenience constructor taking raw 1-based positions.
    #[must_use]
    pub fn from_positions(a: u32, b: u32) -> Option<Self> {
        Self::new(PlayerSlot::new(a), PlayerSlot::new(b))
    }

    /// Lower of the two slots.
    #[must_use]
    pub const fn first(&self) -> PlayerSlot {
        self.first
    }

    /// Higher of the two slots.
    #[must_use]
    pub const fn second(&self) -> PlayerSlot {
        self.second
    }

    /// Both slots in canonical order.
    #[must_use]
    pub const fn slots(&self) -> [PlayerSlot; 2] {
        [self.first, self.second]
    }

    /// Reports whether the pair includes the provided slot.
    #[must_use]
    pub fn contains(&self, slot: PlayerSlot) -> bool {
        self.first == slot || self.second == slot
    }

    /// Returns the teammate paired with `slot`, if `slot` belongs to the pair.
    #[must_use]
    pub fn partner_of(&self, slot: PlayerSlot) -> Option<PlayerSlot> {
        if self.first == slot {
            Some(self.second)
        } else if self.second == slot {
            Some(self.first)
        } else {
            None
        }
    }

    /// Reports whether the two pairs share no slot.
    #[must_use]
    pub fn is_disjoint(&self, other: &Pair) -> bool {
        !other.contains(self.first) && !other.contains(self.second)
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

impl From<Pair> for [u32; 2] {
    fn from(pair: Pair) -> Self {
        [pair.first.get(), pair.second.get()]
    }
}

impl TryFrom<[u32; 2]> for Pair {
    type Error = DrawError;

    fn try_from(value: [u32; 2]) -> Result<Self, Self::Error> {
        if let Some(&zero) = value.iter().find(|&&position| position == 0) {
            return Err(DrawError::InvalidSlot {
                slot: PlayerSlot::new(zero),
            });
        }
        Pair::from_positions(value[0], value[1]).ok_or(DrawError::DegeneratePair {
            slot: PlayerSlot::new(value[0]),
        })
    }
}

/// One round of simultaneous matches; the pairs are listed by court.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Wave {
    pairs: Vec<Pair>,
}

impl Wave {
    /// Creates a wave from pairs ordered by court.
    #[must_use]
    pub fn new(pairs: Vec<Pair>) -> Self {
        Self { pairs }
    }

    /// Pairs assigned to the wave, indexed by court.
    #[must_use]
    pub fn pairs(&self) -> &[Pair] {
        &self.pairs
    }

    /// Number of courts filled in this wave.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Reports whether the wave holds no pairs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Reports whether any pair in the wave uses the slot.
    #[must_use]
    pub fn contains_slot(&self, slot: PlayerSlot) -> bool {
        self.pairs.iter().any(|pair| pair.contains(slot))
    }

    /// Iterator over the pairs in court order.
    pub fn iter(&self) -> impl Iterator<Item = &Pair> {
        self.pairs.iter()
    }
}

/// Ordered waves drawn for a single team.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamSchedule {
    waves: Vec<Wave>,
}

impl TeamSchedule {
    /// Creates a schedule from waves in play order.
    #[must_use]
    pub fn new(waves: Vec<Wave>) -> Self {
        Self { waves }
    }

    /// Waves in play order.
    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Number of waves in the schedule.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Number of courts in the first wave, or zero for an empty schedule.
    #[must_use]
    pub fn court_count(&self) -> usize {
        self.waves.first().map_or(0, Wave::len)
    }

    /// Every pair of the schedule in wave-then-court order.
    pub fn pairs(&self) -> impl Iterator<Item = &Pair> {
        self.waves.iter().flat_map(|wave| wave.iter())
    }
}

/// One court's full matchup: a Red pair against a Black pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombinedMatch {
    /// Pair drawn from the Red roster.
    pub red: Pair,
    /// Pair drawn from the Black roster.
    pub black: Pair,
}

impl CombinedMatch {
    /// Creates a matchup from one pair of each team.
    #[must_use]
    pub const fn new(red: Pair, black: Pair) -> Self {
        Self { red, black }
    }

    /// Pair fielded by the requested team.
    #[must_use]
    pub const fn side(&self, team: Team) -> Pair {
        match team {
            Team::Red => self.red,
            Team::Black => self.black,
        }
    }
}

/// Finished draw: waves of combined matches indexed by court.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinedSchedule {
    waves: Vec<Vec<CombinedMatch>>,
}

impl CombinedSchedule {
    /// Zips two team schedules positionally into full doubles matches.
    ///
    /// Both schedules must have the same number of waves and the same number of
    /// courts in every wave.
    pub fn combine(red: TeamSchedule, black: TeamSchedule) -> Result<Self, DrawError> {
        let shapes_match = red.wave_count() == black.wave_count()
            && red
                .waves()
                .iter()
                .zip(black.waves())
                .all(|(red_wave, black_wave)| red_wave.len() == black_wave.len());
        if !shapes_match {
            return Err(DrawError::MismatchedSchedules {
                red_waves: red.wave_count(),
                black_waves: black.wave_count(),
            });
        }

        let waves = red
            .waves
            .into_iter()
            .zip(black.waves)
            .map(|(red_wave, black_wave)| {
                red_wave
                    .pairs
                    .into_iter()
                    .zip(black_wave.pairs)
                    .map(|(red_pair, black_pair)| CombinedMatch::new(red_pair, black_pair))
                    .collect()
            })
            .collect();

        Ok(Self { waves })
    }

    /// Creates a schedule from already combined waves.
    #[must_use]
    pub fn from_waves(waves: Vec<Vec<CombinedMatch>>) -> Self {
        Self { waves }
    }

    /// Waves of matches, each indexed by court.
    #[must_use]
    pub fn waves(&self) -> &[Vec<CombinedMatch>] {
        &self.waves
    }

    /// Number of waves in the draw.
    #[must_use]
    pub fn wave_count(&self) -> usize {
        self.waves.len()
    }

    /// Number of courts in the first wave, or zero for an empty draw.
    #[must_use]
    pub fn court_count(&self) -> usize {
        self.waves.first().map_or(0, Vec::len)
    }

    /// Total number of combined matches across all waves.
    #[must_use]
    pub fn match_count(&self) -> usize {
        self.waves.iter().map(Vec::len).sum()
    }

    /// Iterator yielding `(wave_index, court_index, match)` in play order.
    pub fn matches(&self) -> impl Iterator<Item = (usize, usize, &CombinedMatch)> {
        self.waves.iter().enumerate().flat_map(|(wave_index, wave)| {
            wave.iter()
                .enumerate()
                .map(move |(court_index, matchup)| (wave_index, court_index, matchup))
        })
    }

    /// Extracts the per-team schedule that was combined into this draw.
    #[must_use]
    pub fn team_schedule(&self, team: Team) -> TeamSchedule {
        let waves = self
            .waves
            .iter()
            .map(|wave| Wave::new(wave.iter().map(|matchup| matchup.side(team)).collect()))
            .collect();
        TeamSchedule::new(waves)
    }
}

/// Dimensions and retry budget for one draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DrawParameters {
    players_per_team: u32,
    waves: u32,
    courts: u32,
    max_attempts: u32,
}

impl DrawParameters {
    /// Creates parameters using [`DEFAULT_MAX_ATTEMPTS`].
    #[must_use]
    pub const fn new(players_per_team: u32, waves: u32, courts: u32) -> Self {
        Self {
            players_per_team,
            waves,
            courts,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Replaces the per-team retry budget.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Number of players on each team.
    #[must_use]
    pub const fn players_per_team(&self) -> u32 {
        self.players_per_team
    }

    /// Number of waves to schedule.
    #[must_use]
    pub const fn waves(&self) -> u32 {
        self.waves
    }

    /// Number of concurrent courts per wave.
    #[must_use]
    pub const fn courts(&self) -> u32 {
        self.courts
    }

    /// Attempts allowed per team before giving up.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Pairs each team needs: one per court per wave.
    #[must_use]
    pub const fn total_slots(&self) -> usize {
        self.waves as usize * self.courts as usize
    }

    /// Smallest roster that can fill every court of a wave with disjoint pairs.
    #[must_use]
    pub const fn required_players(&self) -> u32 {
        let per_wave = self.courts.saturating_mul(2);
        if per_wave > MIN_PLAYERS_PER_TEAM {
            per_wave
        } else {
            MIN_PLAYERS_PER_TEAM
        }
    }

    /// Widest appearance spread a fair draw with these dimensions may have.
    #[must_use]
    pub const fn balance_tolerance(&self) -> u32 {
        balance_tolerance(self.total_slots(), self.players_per_team)
    }

    /// Performs the structural checks that no amount of retrying can fix.
    ///
    /// Checks run in order: zero dimensions, roster size (minimum, then maximum), then
    /// distinct pair count.
    pub fn validate(&self) -> Result<(), DrawError> {
        for (name, value) in [
            ("waves", self.waves),
            ("courts", self.courts),
            ("max_attempts", self.max_attempts),
        ] {
            if value == 0 {
                return Err(DrawError::ZeroParameter { name });
            }
        }

        let required = self.required_players();
        if self.players_per_team < required {
            return Err(DrawError::InsufficientPlayers {
                players_per_team: self.players_per_team,
                required,
            });
        }
        if self.players_per_team > MAX_PLAYERS_PER_TEAM {
            return Err(DrawError::TooManyPlayers {
                players_per_team: self.players_per_team,
                limit: MAX_PLAYERS_PER_TEAM,
            });
        }

        let available = combination_count(self.players_per_team);
        let required = self.total_slots();
        if available < required {
            return Err(DrawError::InsufficientCombinations {
                available,
                required,
            });
        }

        Ok(())
    }
}

/// Difference between the ceiling and floor of the mean appearances per player.
///
/// `pair_count` pairs place `2 * pair_count` players; when that divides evenly across
/// the roster every player must appear equally often, otherwise counts may differ by one.
#[must_use]
pub const fn balance_tolerance(pair_count: usize, team_size: u32) -> u32 {
    if team_size == 0 {
        return 0;
    }
    let uses = pair_count.saturating_mul(2);
    if uses % team_size as usize == 0 {
        0
    } else {
        1
    }
}

/// Failures reported by the draw generator.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum DrawError {
    /// A dimension or retry budget was zero.
    #[error("{name} must be greater than zero")]
    ZeroParameter {
        /// Name of the offending parameter.
        name: &'static str,
    },
    /// The team is too small to form a wave of disjoint pairs.
    #[error("each team needs at least {required} players, got {players_per_team}")]
    InsufficientPlayers {
        /// Players supplied per team.
        players_per_team: u32,
        /// Minimum roster size for the requested courts.
        required: u32,
    },
    /// The team is too large to enumerate every pairing.
    #[error("each team may have at most {limit} players, got {players_per_team}")]
    TooManyPlayers {
        /// Players supplied per team.
        players_per_team: u32,
        /// Largest supported roster.
        limit: u32,
    },
    /// Not enough distinct pairs exist to fill every court without repeating one.
    #[error("only {available} distinct pairs are available but {required} are needed")]
    InsufficientCombinations {
        /// Distinct pairs available to the team.
        available: usize,
        /// Pairs needed to fill every wave and court.
        required: usize,
    },
    /// The load balancer reached a dead end during one attempt.
    #[error("pair selection reached a dead end after {selected} of {required} pairs")]
    NoFeasibleSelection {
        /// Pairs selected before the dead end.
        selected: usize,
        /// Pairs the attempt needed.
        required: usize,
    },
    /// The selected pairs could not be arranged into legal waves.
    #[error("could not pack {pairs} pairs into {waves} waves of {courts} courts")]
    PackingFailed {
        /// Pairs handed to the packer.
        pairs: usize,
        /// Waves requested.
        waves: usize,
        /// Courts per wave requested.
        courts: usize,
    },
    /// Every attempt for a team failed.
    #[error(
        "could not generate a valid draw for the {team} team after {attempts} attempt(s); \
         try adjusting team size, waves, or courts"
    )]
    NoValidScheduleFound {
        /// Team whose generation exhausted its budget.
        team: Team,
        /// Attempts made before giving up.
        attempts: u32,
    },
    /// The Red and Black schedules do not share the same grid shape.
    #[error("cannot combine {red_waves} Red waves with {black_waves} Black waves of differing shape")]
    MismatchedSchedules {
        /// Waves in the Red schedule.
        red_waves: usize,
        /// Waves in the Black schedule.
        black_waves: usize,
    },
    /// The pair universe was built for a different roster size than the draw.
    #[error("pair universe covers {found} players but the draw has {expected} per team")]
    UniverseSizeMismatch {
        /// Players per team requested by the draw.
        expected: u32,
        /// Team size the universe was built for.
        found: u32,
    },
    /// A pair named slot `0`; roster positions start at 1.
    #[error("player slots start at 1, got {slot}")]
    InvalidSlot {
        /// Offending slot.
        slot: PlayerSlot,
    },
    /// A pair named the same slot twice.
    #[error("a pair needs two distinct players, slot {slot} was given twice")]
    DegeneratePair {
        /// Slot that was repeated.
        slot: PlayerSlot,
    },
}

impl DrawError {
    /// Reports whether a fresh attempt with new randomness may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            DrawError::NoFeasibleSelection { .. } | DrawError::PackingFailed { .. }
        )
    }
}
