#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that generates, shares, and checks doubles draws.

mod config;
mod share_code;

use std::{
    io::{self, Write as _},
    path::PathBuf,
};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use doubles_draw_core::{CombinedSchedule, Team, DEFAULT_MAX_CONSECUTIVE};
use doubles_draw_rendering::{slot_label, DrawRenderer, Roster, TextRenderer};
use doubles_draw_system_analytics::{audit_combined, DrawReport};
use doubles_draw_system_draw::{generate_combined_lineup, generate_seeded_lineup};
use serde::Serialize;
use tracing::{info, warn};

use crate::{
    config::{FileConfig, Overrides},
    share_code::SharedDraw,
};

#[derive(Parser, Debug)]
#[command(name = "doubles-draw", about = "Fair doubles draws for two-team club nights")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a new draw.
    Generate(GenerateArgs),
    /// Decode a share code, audit it, and print the draw.
    Decode(DecodeArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Players on each team.
    #[arg(long)]
    players: Option<u32>,
    /// Number of waves.
    #[arg(long)]
    waves: Option<u32>,
    /// Courts in play per wave.
    #[arg(long)]
    courts: Option<u32>,
    /// Attempts per team before giving up.
    #[arg(long)]
    attempts: Option<u32>,
    /// Seed for a reproducible draw.
    #[arg(long)]
    seed: Option<u64>,
    /// TOML file with `[draw]` and `[roster]` tables.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
    /// Also print a share code for the draw.
    #[arg(long)]
    share: bool,
}

#[derive(clap::Args, Debug)]
struct DecodeArgs {
    /// Share code produced by `generate --share`.
    code: String,
    /// TOML file whose `[roster]` table names the players.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Text)]
    format: Format,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

impl Format {
    fn renderer(self) -> &'static dyn DrawRenderer {
        match self {
            Self::Text => &TextRenderer,
            Self::Json => &JsonRenderer,
        }
    }
}

/// Entry point for the doubles draw command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "doubles_draw=info".into()),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();
    match args.command {
        Command::Generate(generate) => run_generate(generate),
        Command::Decode(decode) => run_decode(decode),
    }
}

fn run_generate(args: GenerateArgs) -> Result<()> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let settings = file.resolve(Overrides {
        players_per_team: args.players,
        waves: args.waves,
        courts: args.courts,
        max_attempts: args.attempts,
        seed: args.seed,
    })?;
    let params = settings.params;

    let schedule = match settings.seed {
        Some(seed) => generate_seeded_lineup(&params, seed),
        None => generate_combined_lineup(
            params.players_per_team(),
            params.waves(),
            params.courts(),
            params.max_attempts(),
        ),
    }
    .context("could not generate a draw")?;

    let report = audit_combined(&schedule, &params, DEFAULT_MAX_CONSECUTIVE);
    log_report(&report);

    let mut stdout = io::stdout().lock();
    args.format
        .renderer()
        .render(&schedule, settings.roster.as_ref(), &mut stdout)?;
    if args.share {
        let code = SharedDraw { params, schedule }.encode()?;
        writeln!(stdout, "{code}")?;
    }
    Ok(())
}

fn run_decode(args: DecodeArgs) -> Result<()> {
    let shared = SharedDraw::decode(&args.code).context("could not read share code")?;
    let roster = match &args.config {
        Some(path) => {
            FileConfig::load(path)?
                .resolve(Overrides {
                    players_per_team: Some(shared.params.players_per_team()),
                    ..Overrides::default()
                })?
                .roster
        }
        None => None,
    };

    let report = audit_combined(&shared.schedule, &shared.params, DEFAULT_MAX_CONSECUTIVE);
    log_report(&report);

    let mut stdout = io::stdout().lock();
    args.format
        .renderer()
        .render(&shared.schedule, roster.as_ref(), &mut stdout)?;

    if !report.is_clean() {
        bail!(
            "share code describes an unfair draw ({} problems)",
            report.violations().count()
        );
    }
    Ok(())
}

fn log_report(report: &DrawReport) {
    for team in Team::ALL {
        let audit = report.team(team);
        info!(
            %team,
            spread = audit.spread(),
            longest_run = audit.longest_runs().iter().copied().max().unwrap_or(0),
            "fairness summary"
        );
    }
    for violation in report.violations() {
        warn!(%violation, "draw rule broken");
    }
}

/// Machine-readable renderer emitting one JSON document per draw.
#[derive(Clone, Copy, Debug, Default)]
struct JsonRenderer;

#[derive(Serialize)]
struct JsonCourt {
    wave: usize,
    court: usize,
    red: [String; 2],
    black: [String; 2],
}

impl DrawRenderer for JsonRenderer {
    fn render(
        &self,
        schedule: &CombinedSchedule,
        roster: Option<&Roster>,
        out: &mut dyn io::Write,
    ) -> Result<()> {
        let courts: Vec<JsonCourt> = schedule
            .matches()
            .map(|(wave, court, combined)| {
                let labels = |team: Team| {
                    combined
                        .side(team)
                        .slots()
                        .map(|slot| slot_label(team, slot, roster))
                };
                JsonCourt {
                    wave: wave + 1,
                    court: court + 1,
                    red: labels(Team::Red),
                    black: labels(Team::Black),
                }
            })
            .collect();
        serde_json::to_writer_pretty(&mut *out, &courts).context("failed to write draw json")?;
        writeln!(out)?;
        Ok(())
    }
}
