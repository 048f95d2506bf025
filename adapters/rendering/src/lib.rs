#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for doubles draw adapters.

use std::{fmt::Write as _, io};

use anyhow::{bail, Result as AnyResult};
use doubles_draw_core::{CombinedSchedule, Pair, PlayerSlot, Team};

/// Player names for both teams, indexed by zero-based slot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    red: Vec<String>,
    black: Vec<String>,
}

impl Roster {
    /// Creates a roster after checking that each team names exactly `players_per_team` players.
    pub fn new(red: Vec<String>, black: Vec<String>, players_per_team: u32) -> AnyResult<Self> {
        for (team, names) in [(Team::Red, &red), (Team::Black, &black)] {
            if names.len() != players_per_team as usize {
                bail!(
                    "{team} roster lists {} players but the draw needs {players_per_team}",
                    names.len()
                );
            }
            if let Some(position) = names.iter().position(|name| name.trim().is_empty()) {
                bail!("{team} roster entry {} is blank", position + 1);
            }
        }

        Ok(Self { red, black })
    }

    /// Name assigned to a slot, if the slot is on the roster.
    #[must_use]
    pub fn name(&self, team: Team, slot: PlayerSlot) -> Option<&str> {
        let names = match team {
            Team::Red => &self.red,
            Team::Black => &self.black,
        };
        names.get(slot.index()).map(String::as_str)
    }
}

/// Label shown for a slot: the roster name when known, otherwise `R1` or `B7` style.
#[must_use]
pub fn slot_label(team: Team, slot: PlayerSlot, roster: Option<&Roster>) -> String {
    roster
        .and_then(|roster| roster.name(team, slot))
        .map_or_else(|| placeholder_label(team, slot), str::to_owned)
}

fn placeholder_label(team: Team, slot: PlayerSlot) -> String {
    let prefix = match team {
        Team::Red => 'R',
        Team::Black => 'B',
    };
    format!("{prefix}{slot}")
}

fn pair_label(team: Team, pair: Pair, roster: Option<&Roster>) -> String {
    format!(
        "{} & {}",
        slot_label(team, pair.first(), roster),
        slot_label(team, pair.second(), roster)
    )
}

/// Renders a draw as plain text: one block per wave, one line per court.
#[must_use]
pub fn render_text(schedule: &CombinedSchedule, roster: Option<&Roster>) -> String {
    let mut output = String::new();
    for (wave_index, wave) in schedule.waves().iter().enumerate() {
        if wave_index > 0 {
            output.push('\n');
        }
        let _ = writeln!(output, "Wave {}", wave_index + 1);
        for (court_index, combined) in wave.iter().enumerate() {
            let _ = writeln!(
                output,
                "  Court {}: {} vs {}",
                court_index + 1,
                pair_label(Team::Red, combined.red, roster),
                pair_label(Team::Black, combined.black, roster)
            );
        }
    }
    output
}

/// Output format capable of presenting a finished draw.
pub trait DrawRenderer {
    /// Writes the draw to `out`, resolving names through `roster` when one is supplied.
    fn render(
        &self,
        schedule: &CombinedSchedule,
        roster: Option<&Roster>,
        out: &mut dyn io::Write,
    ) -> AnyResult<()>;
}

/// Human-readable renderer backed by [`render_text`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TextRenderer;

impl DrawRenderer for TextRenderer {
    fn render(
        &self,
        schedule: &CombinedSchedule,
        roster: Option<&Roster>,
        out: &mut dyn io::Write,
    ) -> AnyResult<()> {
        out.write_all(render_text(schedule, roster).as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doubles_draw_core::CombinedMatch;

    fn pair(a: u32, b: u32) -> Pair {
        Pair::from_positions(a, b).expect("distinct slots")
    }

    fn names(prefix: &str, count: usize) -> Vec<String> {
        (1..=count).map(|index| format!("{prefix}{index}")).collect()
    }

    fn sample() -> CombinedSchedule {
        CombinedSchedule::from_waves(vec![
            vec![
                CombinedMatch::new(pair(1, 2), pair(3, 4)),
                CombinedMatch::new(pair(3, 4), pair(1, 2)),
            ],
            vec![CombinedMatch::new(pair(1, 3), pair(2, 4))],
        ])
    }

    #[test]
    fn placeholder_labels_carry_team_initial() {
        assert_eq!(slot_label(Team::Red, PlayerSlot::new(1), None), "R1");
        assert_eq!(slot_label(Team::Black, PlayerSlot::new(7), None), "B7");
    }

    #[test]
    fn renders_one_block_per_wave() {
        let text = render_text(&sample(), None);
        assert_eq!(
            text,
            "Wave 1\n  Court 1: R1 & R2 vs B3 & B4\n  Court 2: R3 & R4 vs B1 & B2\n\n\
             Wave 2\n  Court 1: R1 & R3 vs B2 & B4\n"
        );
    }

    #[test]
    fn roster_names_replace_placeholders() {
        let roster = Roster::new(
            vec!["Ana".into(), "Bo".into(), "Cy".into(), "Di".into()],
            names("Black ", 4),
            4,
        )
        .expect("valid roster");
        let text = render_text(&sample(), Some(&roster));
        assert!(text.contains("Court 1: Ana & Bo vs Black 3 & Black 4"));
    }

    #[test]
    fn roster_length_must_match_team_size() {
        let error = Roster::new(names("r", 3), names("b", 4), 4).expect_err("short roster");
        assert_eq!(
            error.to_string(),
            "Red roster lists 3 players but the draw needs 4"
        );
    }

    #[test]
    fn blank_roster_entries_are_rejected() {
        let mut black = names("b", 4);
        black[2] = "   ".into();
        let error = Roster::new(names("r", 4), black, 4).expect_err("blank name");
        assert_eq!(error.to_string(), "Black roster entry 3 is blank");
    }

    #[test]
    fn text_renderer_writes_rendered_text() {
        let mut buffer = Vec::new();
        TextRenderer
            .render(&sample(), None, &mut buffer)
            .expect("writes to memory");
        assert_eq!(
            String::from_utf8(buffer).expect("utf8"),
            render_text(&sample(), None)
        );
    }
}
