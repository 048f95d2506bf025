#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Retry orchestration and team combination for doubles draws.
//!
//! Each team's schedule is produced by running the load-balanced selector followed by
//! the wave packer. Attempt-local failures are swallowed and retried with fresh
//! randomness until the attempt budget runs out; structural failures surface
//! immediately. The Red and Black schedules are then zipped into a
//! [`CombinedSchedule`]. Nothing is returned unless both teams succeed.

use doubles_draw_core::{
    CombinedSchedule, DrawError, DrawParameters, PairUniverse, Team, TeamSchedule,
};
use doubles_draw_system_packing::{PackerConfig, WavePacker};
use doubles_draw_system_selection::LoadBalancedSelector;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

pub use doubles_draw_core::DEFAULT_MAX_ATTEMPTS;

/// Pure system that drives selection and packing for both teams.
#[derive(Clone, Copy, Debug, Default)]
pub struct DrawGenerator {
    selector: LoadBalancedSelector,
    packer: WavePacker,
}

impl DrawGenerator {
    /// Creates a generator whose packer uses the provided configuration.
    #[must_use]
    pub const fn new(packer: PackerConfig) -> Self {
        Self {
            selector: LoadBalancedSelector::new(),
            packer: WavePacker::new(packer),
        }
    }

    /// Produces one team's schedule, retrying failed attempts up to the budget.
    pub fn generate_team<R>(
        &self,
        params: &DrawParameters,
        universe: &PairUniverse,
        team: Team,
        rng: &mut R,
    ) -> Result<TeamSchedule, DrawError>
    where
        R: Rng + ?Sized,
    {
        params.validate()?;
        if universe.team_size() != params.players_per_team() {
            return Err(DrawError::UniverseSizeMismatch {
                expected: params.players_per_team(),
                found: universe.team_size(),
            });
        }

        let target = params.total_slots();
        let courts = params.courts() as usize;

        for attempt in 1..=params.max_attempts() {
            let outcome = self
                .selector
                .select(universe, target, rng)
                .and_then(|selected| self.packer.pack(&selected, courts));

            match outcome {
                Ok(schedule) => {
                    debug!(%team, attempt, "team schedule generated");
                    return Ok(schedule);
                }
                Err(error) if error.is_retryable() => {
                    debug!(%team, attempt, %error, "draw attempt failed");
                }
                Err(error) => return Err(error),
            }
        }

        warn!(
            %team,
            attempts = params.max_attempts(),
            "draw attempts exhausted"
        );
        Err(DrawError::NoValidScheduleFound {
            team,
            attempts: params.max_attempts(),
        })
    }

    /// Generates both teams from their own universes and random sources, then combines them.
    pub fn generate_lineup<R, B>(
        &self,
        params: &DrawParameters,
        red_universe: &PairUniverse,
        black_universe: &PairUniverse,
        red_rng: &mut R,
        black_rng: &mut B,
    ) -> Result<CombinedSchedule, DrawError>
    where
        R: Rng + ?Sized,
        B: Rng + ?Sized,
    {
        let red = self.generate_team(params, red_universe, Team::Red, red_rng)?;
        let black = self.generate_team(params, black_universe, Team::Black, black_rng)?;
        let combined = CombinedSchedule::combine(red, black)?;
        info!(
            players_per_team = params.players_per_team(),
            waves = params.waves(),
            courts = params.courts(),
            matches = combined.match_count(),
            "draw generated"
        );
        Ok(combined)
    }
}

/// Generates a full draw using operating-system entropy for both teams.
///
/// Pass [`DEFAULT_MAX_ATTEMPTS`] for `max_attempts` unless the caller has reason to
/// trade runtime for success rate.
pub fn generate_combined_lineup(
    players_per_team: u32,
    waves: u32,
    courts: u32,
    max_attempts: u32,
) -> Result<CombinedSchedule, DrawError> {
    let params =
        DrawParameters::new(players_per_team, waves, courts).with_max_attempts(max_attempts);
    let mut red_rng = ChaCha8Rng::from_entropy();
    let mut black_rng = ChaCha8Rng::from_entropy();
    generate_lineup_with_rngs(&params, &mut red_rng, &mut black_rng)
}

/// Generates a reproducible draw: identical parameters and seed yield identical output.
pub fn generate_seeded_lineup(
    params: &DrawParameters,
    seed: u64,
) -> Result<CombinedSchedule, DrawError> {
    let mut red_rng = team_rng(seed, Team::Red);
    let mut black_rng = team_rng(seed, Team::Black);
    generate_lineup_with_rngs(params, &mut red_rng, &mut black_rng)
}

/// Generates a draw from the full pair universe using caller-provided random sources.
pub fn generate_lineup_with_rngs<R, B>(
    params: &DrawParameters,
    red_rng: &mut R,
    black_rng: &mut B,
) -> Result<CombinedSchedule, DrawError>
where
    R: Rng + ?Sized,
    B: Rng + ?Sized,
{
    params.validate()?;
    let universe = PairUniverse::new(params.players_per_team())?;
    DrawGenerator::default().generate_lineup(params, &universe, &universe, red_rng, black_rng)
}

/// Random stream for one team, derived from the draw seed and the team's label.
#[must_use]
pub fn team_rng(seed: u64, team: Team) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(derive_labeled_seed(seed, team.stream_label()))
}

fn derive_labeled_seed(base: u64, label: &str) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(base.to_le_bytes());
    hasher.update(label.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[0..8]);
    u64::from_le_bytes(bytes)
}
