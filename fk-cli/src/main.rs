//! fk: CLI binary for the Farkle engine.
//!
//! Subcommands:
//! - sim
//! - score
//! - config

use std::env;
use std::process;

use fk_core::rules::{is_face, DEFAULT_TARGET_SCORE, DICE_PER_TURN, ENTRY_MINIMUM};
use fk_core::{
    dead_dice, decompose, validate_selection, AiConfig, ChaChaRoller, ComboKind, Config,
    EventSink, GameConfig, NullSink, PlayerConfig, RiskProfile, RollResult,
};
use fk_logging::{append_summary, GameSummaryV1, NdjsonEventSink};
use fk_runtime::{Session, StepStatus};

fn value_of<'a>(args: &'a [String], i: usize, flag: &str) -> &'a str {
    if i + 1 >= args.len() {
        eprintln!("Missing value for {flag}");
        process::exit(1);
    }
    &args[i + 1]
}

fn parse_num<T: std::str::FromStr>(s: &str, flag: &str) -> T {
    s.parse().unwrap_or_else(|_| {
        eprintln!("Invalid {flag} value: {s}");
        process::exit(1);
    })
}

fn parse_profiles(s: &str) -> Vec<RiskProfile> {
    s.split(',')
        .filter(|p| !p.trim().is_empty())
        .map(|p| {
            p.parse().unwrap_or_else(|e: String| {
                eprintln!("{e}");
                process::exit(1);
            })
        })
        .collect()
}

#[derive(Debug, Default, Clone)]
struct SeatTally {
    wins: u32,
    points: u64,
}

fn cmd_sim(args: &[String]) {
    let mut games: u64 = 100;
    let mut seed: u64 = 0;
    let mut target: u32 = DEFAULT_TARGET_SCORE;
    let mut profiles = vec![
        RiskProfile::Aggressive,
        RiskProfile::Moderate,
        RiskProfile::Conservative,
    ];
    let mut log_path: Option<String> = None;
    let mut summaries_path: Option<String> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"fk sim

USAGE:
    fk sim [--games N] [--seed S] [--target T] [--profiles a,m,c] [--log PATH] [--summaries PATH]

OPTIONS:
    --games N           Number of games to simulate (default: 100)
    --seed S            RNG seed (default: 0)
    --target T          Target score (default: 10000)
    --profiles LIST     One risk profile per seat: c|m|a or full names (default: a,m,c)
    --log PATH          Append every game event as NDJSON
    --summaries PATH    Append completed-game summaries as NDJSON
"#
                );
                return;
            }
            "--games" => {
                games = parse_num(value_of(args, i, "--games"), "--games");
                i += 2;
            }
            "--seed" => {
                seed = parse_num(value_of(args, i, "--seed"), "--seed");
                i += 2;
            }
            "--target" => {
                target = parse_num(value_of(args, i, "--target"), "--target");
                i += 2;
            }
            "--profiles" => {
                profiles = parse_profiles(value_of(args, i, "--profiles"));
                i += 2;
            }
            "--log" => {
                log_path = Some(value_of(args, i, "--log").to_string());
                i += 2;
            }
            "--summaries" => {
                summaries_path = Some(value_of(args, i, "--summaries").to_string());
                i += 2;
            }
            other => {
                eprintln!("Unknown option for `fk sim`: {}", other);
                eprintln!("Run `fk sim --help` for usage.");
                process::exit(1);
            }
        }
    }

    let config = Config {
        game: GameConfig {
            target_score: target,
            ..GameConfig::default()
        },
        players: profiles
            .iter()
            .enumerate()
            .map(|(i, &p)| PlayerConfig::automated(format!("P{}", i + 1), p))
            .collect(),
        ai: AiConfig {
            think_delay_ms: 0,
            seed: Some(seed),
        },
    };
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        process::exit(1);
    }

    println!(
        "Simulating {} games (seed {}, target {}, profiles {})...",
        games,
        seed,
        target,
        profiles
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(",")
    );

    let mut seats = vec![SeatTally::default(); profiles.len()];
    let mut ties = 0u32;
    let mut total_turns = 0u64;
    let mut winner_points = 0u64;

    for g in 0..games {
        let sink: Box<dyn EventSink> = match &log_path {
            Some(p) => match NdjsonEventSink::open_append(p, g) {
                Ok(s) => Box::new(s),
                Err(e) => {
                    eprintln!("Failed to open event log {p}: {e}");
                    process::exit(1);
                }
            },
            None => Box::new(NullSink),
        };
        let roller = Box::new(ChaChaRoller::new(seed.wrapping_add(g)));
        let mut session = Session::new(g, &config, roller, sink).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        });
        match session.run_to_completion() {
            Ok(StepStatus::Terminal) => {}
            Ok(other) => {
                eprintln!("Game {g} stopped early: {other:?}");
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Game {g} failed: {e}");
                process::exit(1);
            }
        }

        let rc = session.controller();
        for (seat, p) in seats.iter_mut().zip(rc.players()) {
            seat.points += u64::from(p.score);
        }
        if let Some(w) = rc.state().winner {
            seats[w].wins += 1;
        }
        let board = rc.leaderboard();
        if board.len() > 1 && board[0].score == board[1].score {
            ties += 1;
        }

        let Some(summary) = session.summary() else {
            continue;
        };
        total_turns += u64::from(summary.total_turns);
        winner_points += u64::from(summary.winner_score);
        if let Some(p) = &summaries_path {
            if let Err(e) = append_summary(p, &GameSummaryV1::new(g, summary)) {
                eprintln!("Failed to write summary to {p}: {e}");
                process::exit(1);
            }
        }
    }

    let n = games.max(1) as f64;
    println!();
    println!("Results:");
    println!("  - Games: {}", games);
    for (i, (seat, p)) in seats.iter().zip(&profiles).enumerate() {
        println!(
            "  - P{} ({}): wins={} ({:.1}%), mean score={:.1}",
            i + 1,
            p,
            seat.wins,
            100.0 * f64::from(seat.wins) / n,
            seat.points as f64 / n
        );
    }
    println!("  - Tied at the top: {}", ties);
    println!("  - Mean winning score: {:.1}", winner_points as f64 / n);
    println!("  - Mean turns per game: {:.1}", total_turns as f64 / n);
}

fn describe(kind: ComboKind) -> String {
    match kind {
        ComboKind::Straight => "straight".to_string(),
        ComboKind::ThreePairs => "three pairs".to_string(),
        ComboKind::NOfAKind { face, count } => format!("{count} x {face}"),
        ComboKind::SingleOne => "single 1".to_string(),
        ComboKind::SingleFive => "single 5".to_string(),
    }
}

fn cmd_score(args: &[String]) {
    let mut faces: Vec<u8> = Vec::new();
    let mut select: Option<Vec<usize>> = None;

    let mut i = 0usize;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!(
                    r#"fk score

USAGE:
    fk score <FACE>... [--select I,J,...]

Prints how a roll of 1-6 dice scores. With --select, also checks whether
banking those 0-based positions is a legal selection (default: every die).
"#
                );
                return;
            }
            "--select" => {
                let raw = value_of(args, i, "--select");
                select = Some(
                    raw.split(',')
                        .filter(|s| !s.trim().is_empty())
                        .map(|s| parse_num(s.trim(), "--select"))
                        .collect(),
                );
                i += 2;
            }
            other => {
                let f: u8 = parse_num(other, "face");
                if !is_face(f) {
                    eprintln!("Die face out of range: {f}");
                    process::exit(1);
                }
                faces.push(f);
                i += 1;
            }
        }
    }
    if faces.is_empty() || faces.len() > DICE_PER_TURN {
        eprintln!("Usage: fk score <FACE>... (1 to {DICE_PER_TURN} dice)");
        process::exit(1);
    }

    let roll = RollResult::new(faces);
    let combos = decompose(roll.values());
    println!("Roll: {:?}", roll.values());
    if combos.is_empty() {
        println!("Farkle: nothing scores");
    }
    for c in &combos {
        println!("  - {:<12} {:>5}  {:?}", describe(c.kind), c.score, c.consumed);
    }
    let total: u32 = combos.iter().map(|c| c.score).sum();
    println!("Total: {}", total);
    println!("Dead dice: {:?}", dead_dice(roll.values()));

    let selected = select.unwrap_or_else(|| (0..roll.len()).collect());
    match validate_selection(&roll, &selected, &[]) {
        Ok(score) => println!("Selection {:?}: valid, banks {}", selected, score),
        Err(e) => println!("Selection {:?}: invalid, {}", selected, e),
    }
}

fn cmd_config(args: &[String]) {
    let path = match args.first().map(String::as_str) {
        Some("--help" | "-h") => {
            println!(
                r#"fk config

USAGE:
    fk config [PATH]

Validates a YAML config and prints the effective configuration.
Without PATH, prints the defaults.
"#
            );
            return;
        }
        other => other,
    };

    let config = match path {
        Some(p) => Config::load(p).unwrap_or_else(|e| {
            eprintln!("{e}");
            process::exit(1);
        }),
        None => Config::default(),
    };
    if let Err(e) = config.validate() {
        eprintln!("{e}");
        process::exit(1);
    }
    if config.game.uses_legacy_entry_minimum() {
        eprintln!(
            "note: entry_minimum {} is the legacy rule; the standard minimum is {}",
            config.game.entry_minimum,
            ENTRY_MINIMUM
        );
    }
    match config.to_yaml() {
        Ok(y) => print!("{y}"),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}

fn print_help() {
    eprintln!(
        r#"fk - Farkle engine CLI

USAGE:
    fk <COMMAND> [OPTIONS]

COMMANDS:
    sim                 Simulate games between automated players
    score               Score a roll and check a selection
    config              Validate and print a configuration

OPTIONS:
    -h, --help          Print this help message
    -V, --version       Print version

Run `fk <COMMAND> --help` for details.
"#
    );
}

fn print_version() {
    println!("fk {}", env!("CARGO_PKG_VERSION"));
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_help();
        process::exit(0);
    }

    match args[1].as_str() {
        "-h" | "--help" | "help" => {
            print_help();
        }
        "-V" | "--version" => {
            print_version();
        }
        "sim" => {
            cmd_sim(&args[2..]);
        }
        "score" => {
            cmd_score(&args[2..]);
        }
        "config" => {
            cmd_config(&args[2..]);
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_help();
            process::exit(1);
        }
    }
}
