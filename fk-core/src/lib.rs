//! fk-core: Farkle rules, scoring, turn/round state machines, and configuration.

pub mod config;
pub mod dice;
pub mod events;
pub mod policy;
pub mod round;
pub mod rules;
pub mod scoring;
pub mod selection;
pub mod turn;

pub use config::{AiConfig, Config, ConfigError, GameConfig, PlayerConfig};
pub use dice::{ChaChaRoller, DiceRoller, RollResult, ScriptedRoller};
pub use events::{EndReason, EventLog, EventSink, FanOut, GameEvent, NullSink, Standing};
pub use policy::{decide, should_continue, Decision, RiskProfile, Thresholds};
pub use round::{
    BankResponse, GameState, GameSummary, Player, PlayerKind, RoundController, TurnSummary,
};
pub use scoring::{
    dead_dice, decompose, face_counts, has_any_score, score_subset, scoring_indices, ComboKind,
    ScoringCombination,
};
pub use selection::{is_valid_selection, validate_selection, SelectionError};
pub use turn::{BankOutcome, RollOutcome, Turn, TurnError, TurnOp, TurnPhase};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");


#[cfg(test)]
mod round_tests;
#[cfg(test)]
mod scoring_tests;
