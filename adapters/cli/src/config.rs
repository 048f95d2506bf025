use std::{fs, path::Path};

use anyhow::{Context, Result};
use doubles_draw_core::DrawParameters;
use doubles_draw_rendering::Roster;
use doubles_draw_system_draw::DEFAULT_MAX_ATTEMPTS;

/// Team size used when neither the flags nor the config file name one.
pub(crate) const DEFAULT_PLAYERS_PER_TEAM: u32 = 12;
/// Wave count used when neither the flags nor the config file name one.
pub(crate) const DEFAULT_WAVES: u32 = 6;
/// Court count used when neither the flags nor the config file name one.
pub(crate) const DEFAULT_COURTS: u32 = 3;

/// Contents of a draw configuration file.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct FileConfig {
    #[serde(default)]
    draw: DrawSection,
    roster: Option<RosterSection>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct DrawSection {
    players_per_team: Option<u32>,
    waves: Option<u32>,
    courts: Option<u32>,
    max_attempts: Option<u32>,
    seed: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct RosterSection {
    red: Vec<String>,
    black: Vec<String>,
}

/// Values supplied on the command line; each one overrides the file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct Overrides {
    /// Players per team.
    pub(crate) players_per_team: Option<u32>,
    /// Number of waves.
    pub(crate) waves: Option<u32>,
    /// Number of courts.
    pub(crate) courts: Option<u32>,
    /// Attempt budget per team.
    pub(crate) max_attempts: Option<u32>,
    /// Seed for a reproducible draw.
    pub(crate) seed: Option<u64>,
}

/// Fully resolved settings for one `generate` run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Settings {
    /// Draw dimensions and attempt budget.
    pub(crate) params: DrawParameters,
    /// Seed for a reproducible draw, or `None` for entropy.
    pub(crate) seed: Option<u64>,
    /// Player names, when the config file lists them.
    pub(crate) roster: Option<Roster>,
}

impl FileConfig {
    /// Reads and parses a configuration file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read draw config at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid draw config at {}", path.display()))
    }

    /// Parses configuration file contents.
    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse draw config toml contents")
    }

    /// Merges command-line overrides over the file values and built-in defaults.
    pub(crate) fn resolve(self, overrides: Overrides) -> Result<Settings> {
        let draw = self.draw;
        let params = DrawParameters::new(
            overrides
                .players_per_team
                .or(draw.players_per_team)
                .unwrap_or(DEFAULT_PLAYERS_PER_TEAM),
            overrides.waves.or(draw.waves).unwrap_or(DEFAULT_WAVES),
            overrides.courts.or(draw.courts).unwrap_or(DEFAULT_COURTS),
        )
        .with_max_attempts(
            overrides
                .max_attempts
                .or(draw.max_attempts)
                .unwrap_or(DEFAULT_MAX_ATTEMPTS),
        );

        let roster = self
            .roster
            .map(|roster| Roster::new(roster.red, roster.black, params.players_per_team()))
            .transpose()
            .context("roster does not fit the draw")?;

        Ok(Settings {
            params,
            seed: overrides.seed.or(draw.seed),
            roster,
        })
    }
}
