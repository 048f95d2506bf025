use doubles_draw_core::{
    CombinedSchedule, DrawError, DrawParameters, PairUniverse, Team, DEFAULT_MAX_CONSECUTIVE,
    MAX_PLAYERS_PER_TEAM,
};
use doubles_draw_system_analytics::{audit_combined, DrawReport};
use doubles_draw_system_draw::{
    generate_combined_lineup, generate_seeded_lineup, team_rng, DrawGenerator,
};
use proptest::prelude::*;

fn audit(schedule: &CombinedSchedule, params: &DrawParameters) -> DrawReport {
    audit_combined(schedule, params, DEFAULT_MAX_CONSECUTIVE)
}

fn assert_clean(schedule: &CombinedSchedule, params: &DrawParameters) -> DrawReport {
    let report = audit(schedule, params);
    assert!(
        report.is_clean(),
        "violations: {:?}",
        report.violations().collect::<Vec<_>>()
    );
    report
}

#[test]
fn six_players_three_waves_one_court_use_everyone_once() {
    let params = DrawParameters::new(6, 3, 1);
    for seed in 0..8 {
        let schedule = generate_seeded_lineup(&params, seed).expect("draw succeeds");
        assert_eq!(schedule.match_count(), 3);
        let report = assert_clean(&schedule, &params);
        for team in Team::ALL {
            assert_eq!(report.team(team).appearances(), &[1; 6], "seed {seed}");
        }
    }
}

#[test]
fn six_players_five_waves_one_court_differ_by_at_most_one() {
    let params = DrawParameters::new(6, 5, 1).with_max_attempts(25);
    for seed in 0..8 {
        let schedule = generate_seeded_lineup(&params, seed).expect("draw succeeds");
        let report = assert_clean(&schedule, &params);
        for team in Team::ALL {
            let counts = report.team(team).appearances();
            assert_eq!(counts.iter().sum::<u32>(), 10);
            assert!(counts.iter().all(|&count| count == 1 || count == 2));
        }
    }
}

#[test]
fn four_players_one_wave_two_courts_fill_the_wave() {
    let params = DrawParameters::new(4, 1, 2);
    let schedule = generate_seeded_lineup(&params, 3).expect("draw succeeds");
    assert_eq!(schedule.wave_count(), 1);
    assert_eq!(schedule.court_count(), 2);
    let report = assert_clean(&schedule, &params);
    assert_eq!(report.team(Team::Red).appearances(), &[1; 4]);
    assert_eq!(report.team(Team::Black).appearances(), &[1; 4]);
}

#[test]
fn too_many_courts_for_the_pair_universe_is_rejected() {
    let params = DrawParameters::new(4, 10, 2);
    assert_eq!(
        generate_seeded_lineup(&params, 0),
        Err(DrawError::InsufficientCombinations {
            available: 6,
            required: 20,
        })
    );
    assert_eq!(
        generate_combined_lineup(4, 10, 2, 10),
        Err(DrawError::InsufficientCombinations {
            available: 6,
            required: 20,
        })
    );
}

#[test]
fn twelve_versus_twelve_on_three_courts() {
    let params = DrawParameters::new(12, 6, 3).with_max_attempts(50);
    for seed in 0..4 {
        let schedule = generate_seeded_lineup(&params, seed).expect("draw succeeds");
        assert_eq!(schedule.match_count(), 18);
        let report = assert_clean(&schedule, &params);
        for team in Team::ALL {
            assert_eq!(report.team(team).spread(), 0, "seed {seed}");
            assert!(report
                .team(team)
                .longest_runs()
                .iter()
                .all(|&run| run <= DEFAULT_MAX_CONSECUTIVE));
        }
    }
}

#[test]
fn identical_seeds_replay_identically() {
    let params = DrawParameters::new(8, 4, 2).with_max_attempts(25);
    let first = generate_seeded_lineup(&params, 0xD0B1E5);
    let second = generate_seeded_lineup(&params, 0xD0B1E5);
    assert_eq!(first, second);
}

#[test]
fn red_and_black_draw_from_independent_streams() {
    let params = DrawParameters::new(12, 6, 3).with_max_attempts(50);
    let schedule = generate_seeded_lineup(&params, 11).expect("draw succeeds");
    assert_ne!(
        schedule.team_schedule(Team::Red),
        schedule.team_schedule(Team::Black)
    );
}

#[test]
fn exhausted_universe_fails_every_time() {
    let params = DrawParameters::new(4, 1, 1);
    let everything = PairUniverse::new(4).expect("universe");
    let exhausted = everything.clone().excluding(everything.pairs());
    let generator = DrawGenerator::default();

    for seed in 0..4 {
        let mut rng = team_rng(seed, Team::Red);
        assert_eq!(
            generator.generate_team(&params, &exhausted, Team::Red, &mut rng),
            Err(DrawError::InsufficientCombinations {
                available: 0,
                required: 1,
            })
        );
    }
}

#[test]
fn invalid_parameters_surface_before_any_attempt() {
    assert_eq!(
        generate_combined_lineup(6, 0, 1, 10),
        Err(DrawError::ZeroParameter { name: "waves" })
    );
    assert_eq!(
        generate_combined_lineup(3, 1, 1, 10),
        Err(DrawError::InsufficientPlayers {
            players_per_team: 3,
            required: 4,
        })
    );
    assert_eq!(
        generate_combined_lineup(6, 1, 1, 0),
        Err(DrawError::ZeroParameter {
            name: "max_attempts",
        })
    );
}

#[test]
fn oversized_rosters_are_rejected_without_enumerating_pairs() {
    assert_eq!(
        generate_combined_lineup(u32::MAX, 1, 1, 10),
        Err(DrawError::TooManyPlayers {
            players_per_team: u32::MAX,
            limit: MAX_PLAYERS_PER_TEAM,
        })
    );
    let params = DrawParameters::new(100_000, 1, 1);
    assert_eq!(
        generate_seeded_lineup(&params, 1),
        Err(DrawError::TooManyPlayers {
            players_per_team: 100_000,
            limit: MAX_PLAYERS_PER_TEAM,
        })
    );
}

#[test]
fn entropy_draws_are_legal() {
    let params = DrawParameters::new(8, 4, 2);
    match generate_combined_lineup(8, 4, 2, 25) {
        Ok(schedule) => {
            let _ = assert_clean(&schedule, &params);
        }
        Err(error) => assert!(
            matches!(error, DrawError::NoValidScheduleFound { .. }),
            "unexpected error {error}"
        ),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn successful_draws_keep_every_invariant(
        players in 4u32..=10,
        waves in 1u32..=5,
        courts in 1u32..=2,
        seed in any::<u64>(),
    ) {
        let params = DrawParameters::new(players, waves, courts);
        prop_assume!(params.validate().is_ok());

        match generate_seeded_lineup(&params, seed) {
            Ok(schedule) => {
                prop_assert_eq!(schedule.wave_count(), waves as usize);
                prop_assert_eq!(schedule.match_count(), (waves * courts) as usize);
                let report = audit(&schedule, &params);
                prop_assert!(
                    report.is_clean(),
                    "violations: {:?}",
                    report.violations().collect::<Vec<_>>()
                );
            }
            Err(error) => {
                let exhausted = matches!(error, DrawError::NoValidScheduleFound { .. });
                prop_assert!(exhausted, "unexpected error {:?}", error);
            }
        }
    }
}
