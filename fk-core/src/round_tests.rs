use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;

use crate::config::{Config, GameConfig, PlayerConfig};
use crate::dice::{ChaChaRoller, DiceRoller, ScriptedRoller};
use crate::events::{EndReason, EventLog, GameEvent, NullSink};
use crate::policy::{should_continue, RiskProfile};
use crate::round::RoundController;
use crate::scoring::scoring_indices;
use crate::selection::SelectionError;
use crate::turn::TurnError;

fn config(names: &[&str], target_score: u32) -> Config {
    Config {
        game: GameConfig {
            target_score,
            ..GameConfig::default()
        },
        players: names.iter().map(|n| PlayerConfig::human(*n)).collect(),
        ..Config::default()
    }
}

fn scripted(names: &[&str], target: u32, rolls: Vec<Vec<u8>>) -> (RoundController, EventLog) {
    let log = EventLog::new();
    let mut rc = RoundController::new(
        &config(names, target),
        Box::new(ScriptedRoller::new(rolls)),
        Box::new(log.clone()),
    )
    .unwrap();
    rc.set_strict_contracts(false);
    (rc, log)
}

/// Roll once, bank every scoring die, stop.
fn single_roll_turn(rc: &mut RoundController) {
    let p = rc.current_player_index();
    rc.start_turn(p).unwrap();
    let out = rc.roll(p).unwrap();
    if out.farkle {
        return;
    }
    let r = rc.bank_indices(&scoring_indices(&out.values)).unwrap();
    assert!(r.accepted);
    rc.end_turn().unwrap();
}

#[test]
fn invalid_config_is_rejected_before_play() {
    let mut c = config(&["a"], 100);
    assert!(RoundController::new(&c, Box::new(ChaChaRoller::new(0)), Box::new(NullSink)).is_err());
    c.game.target_score = 1000;
    assert!(RoundController::new(&c, Box::new(ChaChaRoller::new(0)), Box::new(NullSink)).is_ok());
}

#[test]
fn under_entry_minimum_is_discarded_on_end() {
    let (mut rc, _log) = scripted(&["a", "b"], 10_000, vec![vec![5, 2, 3, 4, 6, 6]]);
    rc.start_turn(0).unwrap();
    rc.roll(0).unwrap();
    rc.select_die(0).unwrap();
    assert!(rc.bank_selection().unwrap().accepted);
    let s = rc.end_turn().unwrap();
    assert_eq!(s.turn_score, 50);
    assert_eq!(s.reason, EndReason::BelowEntryMinimum);
    assert!(!s.credited());
    assert_eq!(rc.players()[0].score, 0);
    assert!(!rc.players()[0].has_entered);
    assert_eq!(rc.current_player_index(), 1);
}

#[test]
fn entry_minimum_boundaries() {
    // a: 300 exactly enters. b: 250 does not. a: then 50 counts.
    let (mut rc, _log) = scripted(
        &["a", "b"],
        10_000,
        vec![
            vec![3, 3, 3, 2, 4, 6],
            vec![1, 1, 5, 2, 3, 4],
            vec![5, 2, 3, 4, 6, 6],
        ],
    );
    single_roll_turn(&mut rc);
    assert_eq!(rc.players()[0].score, 300);
    assert!(rc.players()[0].has_entered);

    single_roll_turn(&mut rc);
    assert_eq!(rc.players()[1].score, 0);

    single_roll_turn(&mut rc);
    assert_eq!(rc.players()[0].score, 350);
}

#[test]
fn legacy_entry_minimum_accepts_250() {
    let mut c = config(&["a", "b"], 10_000);
    c.game.entry_minimum = 250;
    let mut rc = RoundController::new(
        &c,
        Box::new(ScriptedRoller::new([vec![1, 1, 5, 2, 3, 4]])),
        Box::new(NullSink),
    )
    .unwrap();
    single_roll_turn(&mut rc);
    assert_eq!(rc.players()[0].score, 250);
}

#[test]
fn farkle_ends_turn_and_forfeits_points() {
    let (mut rc, log) = scripted(
        &["a", "b"],
        10_000,
        vec![vec![5, 5, 5, 2, 3, 4], vec![2, 3, 4]],
    );
    rc.start_turn(0).unwrap();
    rc.roll(0).unwrap();
    rc.bank_indices(&[0, 1, 2]).unwrap();
    let out = rc.roll(0).unwrap();
    assert!(out.farkle);
    assert!(rc.turn().is_none());
    assert_eq!(rc.players()[0].score, 0);
    assert_eq!(rc.current_player_index(), 1);

    let events = log.events();
    assert!(events.contains(&GameEvent::Farkle {
        player_index: 0,
        player: "a".to_string(),
        lost: 500,
    }));
    assert!(matches!(
        events.last(),
        Some(GameEvent::TurnEnded {
            reason: EndReason::Farkle,
            turn_score: 0,
            ..
        })
    ));
}

#[test]
fn rejected_bank_changes_nothing_and_reports_why() {
    let (mut rc, log) = scripted(&["a", "b"], 10_000, vec![vec![3, 3, 1, 4, 6, 2]]);
    rc.start_turn(0).unwrap();
    rc.roll(0).unwrap();
    rc.select_die(0).unwrap();
    rc.select_die(1).unwrap();
    let before = rc.turn().cloned();

    let r = rc.bank_selection().unwrap();
    assert!(!r.accepted);
    assert_eq!(r.score_gained, 0);
    assert_eq!(r.rejection, Some(SelectionError::NoScore));
    assert_eq!(rc.turn().cloned(), before);
    assert_eq!(log.count("selection_rejected"), 1);

    rc.deselect_die(0).unwrap();
    rc.deselect_die(1).unwrap();
    rc.select_die(2).unwrap();
    let r = rc.bank_selection().unwrap();
    assert!(r.accepted);
    assert_eq!(r.score_gained, 100);
}

#[test]
fn hot_dice_event_and_continued_turn() {
    let (mut rc, log) = scripted(
        &["a", "b"],
        10_000,
        vec![vec![1, 2, 3, 4, 5, 6], vec![1, 2, 2, 3, 4, 6]],
    );
    rc.start_turn(0).unwrap();
    rc.roll(0).unwrap();
    let r = rc.bank_indices(&[0, 1, 2, 3, 4, 5]).unwrap();
    assert!(r.hot_dice);
    assert_eq!(rc.turn().unwrap().available_dice(), 6);
    assert_eq!(rc.turn().unwrap().turn_score(), 1500);
    assert_eq!(log.count("hot_dice"), 1);

    rc.roll(0).unwrap();
    rc.bank_indices(&[0]).unwrap();
    let s = rc.end_turn().unwrap();
    assert_eq!(s.total_score, 1600);
}

#[test]
fn final_round_gives_everyone_else_one_turn() {
    let (mut rc, log) = scripted(
        &["a", "b", "c"],
        1000,
        vec![
            vec![1, 1, 1, 2, 3, 4],
            vec![2, 3, 4, 6, 2, 3],
            vec![1, 1, 1, 1, 2, 3],
        ],
    );
    single_roll_turn(&mut rc);
    assert!(rc.final_round());
    assert_eq!(rc.final_round_initiator(), Some(0));
    assert!(!rc.is_game_over());

    single_roll_turn(&mut rc); // b farkles
    assert!(!rc.is_game_over());

    single_roll_turn(&mut rc); // c overtakes
    assert!(rc.is_game_over());
    assert_eq!(rc.winner().unwrap().name, "c");
    assert_eq!(rc.final_round_initiator(), Some(0));
    assert_eq!(log.count("final_round_triggered"), 1);

    let lb = rc.leaderboard();
    assert_eq!(
        lb.iter().map(|s| (s.name.as_str(), s.score)).collect::<Vec<_>>(),
        vec![("c", 2000), ("a", 1000), ("b", 0)]
    );
    match log.events().last() {
        Some(GameEvent::GameEnded {
            winner,
            winner_score,
            tied,
            leaderboard,
            ..
        }) => {
            assert_eq!(winner, "c");
            assert_eq!(*winner_score, 2000);
            assert!(!tied);
            assert_eq!(leaderboard, &lb);
        }
        other => panic!("expected GameEnded, got {:?}", other),
    }

    let summary = rc.summary().unwrap();
    assert_eq!(summary.winner_name, "c");
    assert_eq!(summary.winner_score, 2000);
    assert_eq!(summary.target_score, 1000);
    assert_eq!(summary.total_turns, 3);
}

#[test]
fn tie_goes_to_first_in_seating_order() {
    let (mut rc, log) = scripted(
        &["a", "b"],
        1000,
        vec![vec![1, 1, 1, 2, 3, 4], vec![1, 1, 1, 2, 3, 4]],
    );
    single_roll_turn(&mut rc);
    single_roll_turn(&mut rc);
    assert!(rc.is_game_over());
    assert_eq!(rc.winner().unwrap().name, "a");
    assert!(matches!(
        log.events().last(),
        Some(GameEvent::GameEnded { tied: true, .. })
    ));
}

#[test]
fn operations_after_game_end_are_rejected() {
    let (mut rc, _log) = scripted(&["solo"], 1000, vec![vec![1, 1, 1, 2, 3, 4]]);
    single_roll_turn(&mut rc);
    assert!(rc.is_game_over());
    assert_eq!(rc.summary().unwrap().total_turns, 1);
    assert!(matches!(
        rc.start_turn(0),
        Err(TurnError::InvalidState { msg: "game has ended" })
    ));
}

#[test]
fn contract_violations_are_reported_in_lenient_mode() {
    let (mut rc, _log) = scripted(&["a", "b"], 10_000, vec![vec![1, 2, 3, 4, 6, 6]]);
    assert!(rc.roll(0).is_err()); // no turn started
    assert!(rc.start_turn(1).is_err()); // not b's turn
    rc.start_turn(0).unwrap();
    assert!(rc.start_turn(0).is_err());
    assert!(rc.end_turn().is_err()); // nothing rolled
    rc.roll(0).unwrap();
    assert!(matches!(
        rc.roll(0),
        Err(TurnError::IllegalTransition { .. })
    ));
    assert!(rc.summary().is_none());
}

#[test]
#[should_panic(expected = "contract violation")]
fn strict_mode_panics_on_contract_violation() {
    let mut rc = RoundController::new(
        &config(&["a", "b"], 10_000),
        Box::new(ChaChaRoller::new(0)),
        Box::new(NullSink),
    )
    .unwrap();
    rc.set_strict_contracts(true);
    let _ = rc.end_turn();
}

/// Play automated turns until the game ends; returns turns taken after the trigger.
fn play_out(rc: &mut RoundController, rng: &mut ChaCha8Rng, profile: RiskProfile) -> u32 {
    let n = rc.players().len() as u32;
    let mut after_trigger = 0u32;
    let mut guard = 0;
    while !rc.is_game_over() {
        guard += 1;
        assert!(guard < 100_000, "game did not terminate");
        let was_final = rc.final_round();
        let p = rc.current_player_index();
        rc.start_turn(p).unwrap();
        loop {
            let out = rc.roll(p).unwrap();
            if out.farkle {
                break;
            }
            let r = rc.bank_indices(&scoring_indices(&out.values)).unwrap();
            assert!(r.accepted);
            let left = if r.hot_dice {
                0
            } else {
                rc.turn().unwrap().available_dice()
            };
            if !should_continue(r.turn_score, left, profile, rng) {
                rc.end_turn().unwrap();
                break;
            }
        }
        if was_final {
            after_trigger += 1;
        }
        // Once set, the final round stays set.
        if was_final {
            assert!(rc.final_round());
        }
    }
    assert!(after_trigger <= n);
    after_trigger
}

#[test]
fn simulated_games_end_one_round_after_trigger() {
    for seed in 0..40u64 {
        let names = ["a", "b", "c", "d"];
        let n = names.len();
        let mut rc = RoundController::new(
            &config(&names, 2000),
            Box::new(ChaChaRoller::new(seed)),
            Box::new(NullSink),
        )
        .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let profile = RiskProfile::ALL[(seed % 3) as usize];
        let after = play_out(&mut rc, &mut rng, profile);

        assert_eq!(after as usize, n - 1, "seed {seed}");
        let winner = rc.winner().unwrap();
        let max = rc.players().iter().map(|p| p.score).max().unwrap();
        assert_eq!(winner.score, max);
        let first_max = rc.players().iter().position(|p| p.score == max).unwrap();
        assert_eq!(rc.state().winner, Some(first_max));
        assert!(rc.players()[rc.final_round_initiator().unwrap()].score >= 2000);
        assert_eq!(rc.current_player_index(), rc.final_round_initiator().unwrap());
        for p in rc.players() {
            assert_eq!(p.score % 50, 0);
            assert_eq!(p.has_entered, p.score > 0);
        }
    }
}

#[test]
fn roller_trait_object_is_usable_directly() {
    let mut r: Box<dyn DiceRoller> = Box::new(ScriptedRoller::new([vec![4, 4]]));
    assert_eq!(r.roll(2).values(), &[4, 4]);
}
