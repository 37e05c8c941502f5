//! Events emitted by the round controller for presentation, chat and logging.

use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Why a turn's points did or did not reach the player's total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    /// Points were added to the player's total.
    Banked,
    /// First score was below the entry minimum and was discarded.
    BelowEntryMinimum,
    Farkle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub name: String,
    pub score: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    TurnStarted {
        player_index: usize,
        player: String,
        turn_number: u32,
    },
    DiceRolled {
        player_index: usize,
        values: Vec<u8>,
        possible_score: u32,
    },
    Farkle {
        player_index: usize,
        player: String,
        /// Turn points forfeited.
        lost: u32,
    },
    HotDice {
        player_index: usize,
        player: String,
        turn_score: u32,
    },
    DiceBanked {
        player_index: usize,
        player: String,
        score_gained: u32,
        turn_score_total: u32,
    },
    SelectionRejected {
        player_index: usize,
        reason: String,
    },
    TurnEnded {
        player_index: usize,
        player: String,
        turn_score: u32,
        reason: EndReason,
        total_score: u32,
    },
    FinalRoundTriggered {
        initiator_index: usize,
        initiator: String,
        target_score: u32,
    },
    GameEnded {
        winner_index: usize,
        winner: String,
        winner_score: u32,
        /// Another player shares the winning score; seating order decided it.
        tied: bool,
        leaderboard: Vec<Standing>,
    },
}

impl GameEvent {
    pub fn name(&self) -> &'static str {
        match self {
            GameEvent::TurnStarted { .. } => "turn_started",
            GameEvent::DiceRolled { .. } => "dice_rolled",
            GameEvent::Farkle { .. } => "farkle",
            GameEvent::HotDice { .. } => "hot_dice",
            GameEvent::DiceBanked { .. } => "dice_banked",
            GameEvent::SelectionRejected { .. } => "selection_rejected",
            GameEvent::TurnEnded { .. } => "turn_ended",
            GameEvent::FinalRoundTriggered { .. } => "final_round_triggered",
            GameEvent::GameEnded { .. } => "game_ended",
        }
    }
}

/// Consumer of game events. Must not fail the game.
pub trait EventSink: Send {
    fn emit(&mut self, event: &GameEvent);
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: &GameEvent) {}
}

/// In-memory event list. Clones share the same storage, so a handle kept by
/// the caller sees what the controller emitted.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    inner: Arc<Mutex<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<GameEvent>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn events(&self) -> Vec<GameEvent> {
        self.lock().clone()
    }

    pub fn drain(&self) -> Vec<GameEvent> {
        std::mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Count events whose [`GameEvent::name`] is `name`.
    pub fn count(&self, name: &str) -> usize {
        self.lock().iter().filter(|e| e.name() == name).count()
    }
}

impl EventSink for EventLog {
    fn emit(&mut self, event: &GameEvent) {
        self.lock().push(event.clone());
    }
}

/// Forwards every event to each inner sink in order.
#[derive(Default)]
pub struct FanOut {
    sinks: Vec<Box<dyn EventSink>>,
}

impl FanOut {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: impl EventSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }
}

impl EventSink for FanOut {
    fn emit(&mut self, event: &GameEvent) {
        for s in &mut self.sinks {
            s.emit(event);
        }
    }
}
