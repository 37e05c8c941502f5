//! Per-turn state machine.
//!
//! ```text
//! Start --roll--> Rolled --bank--> Banked --roll--> Rolled ...
//!                   |                 |
//!                   | (no score)      +--end--> Ended
//!                   v
//!                 Farkle --end--> Ended (score 0)
//! ```
//!
//! Every operation either succeeds or returns an error with the turn untouched.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dice::{DiceRoller, RollResult};
use crate::rules::DICE_PER_TURN;
use crate::scoring::score_subset;
use crate::selection::{validate_selection, SelectionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPhase {
    /// Nothing rolled yet.
    Start,
    /// A scoring roll is on the table and must be banked from.
    Rolled,
    /// The last roll was banked; the player may roll again or stop.
    Banked,
    /// The last roll scored nothing. Turn points are gone.
    Farkle,
    Ended,
}

impl TurnPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnPhase::Start => "start",
            TurnPhase::Rolled => "rolled",
            TurnPhase::Banked => "banked",
            TurnPhase::Farkle => "farkle",
            TurnPhase::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnOp {
    Roll,
    Select,
    Deselect,
    Bank,
    End,
}

impl TurnOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnOp::Roll => "roll",
            TurnOp::Select => "select",
            TurnOp::Deselect => "deselect",
            TurnOp::Bank => "bank",
            TurnOp::End => "end turn",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    #[error("cannot {} while turn is {}", .op.as_str(), .phase.as_str())]
    IllegalTransition { op: TurnOp, phase: TurnPhase },
    #[error("invalid selection: {0}")]
    InvalidSelection(#[from] SelectionError),
    #[error("invalid state: {msg}")]
    InvalidState { msg: &'static str },
}

impl TurnError {
    /// Caller bugs, as opposed to a player picking a bad selection.
    pub fn is_contract_violation(&self) -> bool {
        !matches!(self, TurnError::InvalidSelection(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub values: Vec<u8>,
    /// Score of the whole roll if every scoring die were banked.
    pub possible_score: u32,
    pub farkle: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BankOutcome {
    pub score_gained: u32,
    pub turn_score: u32,
    /// All remaining dice were banked; the pool is back to six.
    pub hot_dice: bool,
    /// Dice available for the next roll.
    pub dice_left: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    phase: TurnPhase,
    available_dice: usize,
    current_roll: RollResult,
    /// Indices into `current_roll`, in selection order.
    selected: Vec<usize>,
    banked: Vec<bool>,
    turn_score: u32,
    must_bank: bool,
    roll_count: u32,
    possible_score: u32,
}

impl Default for Turn {
    fn default() -> Self {
        Self::new()
    }
}

impl Turn {
    pub fn new() -> Self {
        Self {
            phase: TurnPhase::Start,
            available_dice: DICE_PER_TURN,
            current_roll: RollResult::default(),
            selected: Vec::new(),
            banked: Vec::new(),
            turn_score: 0,
            must_bank: false,
            roll_count: 0,
            possible_score: 0,
        }
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn available_dice(&self) -> usize {
        self.available_dice
    }

    pub fn current_roll(&self) -> &RollResult {
        &self.current_roll
    }

    pub fn selected(&self) -> &[usize] {
        &self.selected
    }

    pub fn selected_values(&self) -> Vec<u8> {
        self.selected
            .iter()
            .map(|&i| self.current_roll.values()[i])
            .collect()
    }

    pub fn turn_score(&self) -> u32 {
        self.turn_score
    }

    pub fn must_bank(&self) -> bool {
        self.must_bank
    }

    pub fn roll_count(&self) -> u32 {
        self.roll_count
    }

    pub fn possible_score(&self) -> u32 {
        self.possible_score
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, TurnPhase::Farkle | TurnPhase::Ended)
    }

    /// Voluntary end is allowed only after a bank.
    pub fn can_end(&self) -> bool {
        self.phase == TurnPhase::Banked
    }

    pub fn can_roll(&self) -> bool {
        matches!(self.phase, TurnPhase::Start | TurnPhase::Banked)
    }

    fn illegal(&self, op: TurnOp) -> TurnError {
        TurnError::IllegalTransition {
            op,
            phase: self.phase,
        }
    }

    /// Roll every available die.
    ///
    /// A roll with no scoring dice moves the turn to `Farkle` and zeroes the
    /// turn score.
    pub fn roll(&mut self, roller: &mut dyn DiceRoller) -> Result<RollOutcome, TurnError> {
        if !self.can_roll() {
            return Err(self.illegal(TurnOp::Roll));
        }
        debug_assert!((1..=DICE_PER_TURN).contains(&self.available_dice));
        if self.available_dice == 0 || self.available_dice > DICE_PER_TURN {
            return Err(TurnError::InvalidState {
                msg: "available dice out of range for roll",
            });
        }

        let roll = roller.roll(self.available_dice);
        if roll.len() != self.available_dice {
            return Err(TurnError::InvalidState {
                msg: "roller returned the wrong number of dice",
            });
        }

        let possible_score = score_subset(roll.values());
        let farkle = possible_score == 0;

        self.banked = vec![false; roll.len()];
        self.current_roll = roll;
        self.selected.clear();
        self.roll_count += 1;
        self.possible_score = possible_score;
        if farkle {
            self.turn_score = 0;
            self.must_bank = false;
            self.phase = TurnPhase::Farkle;
        } else {
            self.must_bank = true;
            self.phase = TurnPhase::Rolled;
        }

        Ok(RollOutcome {
            values: self.current_roll.values().to_vec(),
            possible_score,
            farkle,
        })
    }

    /// Add a die to the pending selection. Selecting twice is a no-op.
    pub fn select(&mut self, index: usize) -> Result<(), TurnError> {
        if self.phase != TurnPhase::Rolled || !self.must_bank {
            return Err(self.illegal(TurnOp::Select));
        }
        let len = self.current_roll.len();
        if index >= len {
            return Err(SelectionError::IndexOutOfRange { index, len }.into());
        }
        if self.banked[index] {
            return Err(SelectionError::AlreadyBanked { index }.into());
        }
        if !self.selected.contains(&index) {
            self.selected.push(index);
        }
        Ok(())
    }

    /// Remove a die from the pending selection. Deselecting an unselected die is a no-op.
    pub fn deselect(&mut self, index: usize) -> Result<(), TurnError> {
        if self.phase != TurnPhase::Rolled || !self.must_bank {
            return Err(self.illegal(TurnOp::Deselect));
        }
        let len = self.current_roll.len();
        if index >= len {
            return Err(SelectionError::IndexOutOfRange { index, len }.into());
        }
        self.selected.retain(|&i| i != index);
        Ok(())
    }

    /// Flip selection of `index`; returns whether it is selected afterwards.
    pub fn toggle(&mut self, index: usize) -> Result<bool, TurnError> {
        if self.selected.contains(&index) {
            self.deselect(index)?;
            Ok(false)
        } else {
            self.select(index)?;
            Ok(true)
        }
    }

    /// Bank the pending selection.
    ///
    /// On rejection the selection is kept so the player can adjust it.
    pub fn bank(&mut self) -> Result<BankOutcome, TurnError> {
        let selected = self.selected.clone();
        self.bank_indices(&selected)
    }

    /// Bank `indices` directly, bypassing the pending selection.
    pub fn bank_indices(&mut self, indices: &[usize]) -> Result<BankOutcome, TurnError> {
        if self.phase != TurnPhase::Rolled || !self.must_bank {
            return Err(self.illegal(TurnOp::Bank));
        }
        let score = validate_selection(&self.current_roll, indices, &self.banked)?;

        for &i in indices {
            self.banked[i] = true;
        }
        self.selected.clear();
        self.turn_score += score;
        self.available_dice -= indices.len();
        self.must_bank = false;
        self.phase = TurnPhase::Banked;

        let hot_dice = self.available_dice == 0;
        if hot_dice {
            self.available_dice = DICE_PER_TURN;
        }

        Ok(BankOutcome {
            score_gained: score,
            turn_score: self.turn_score,
            hot_dice,
            dice_left: self.available_dice,
        })
    }

    /// Close the turn and hand back the points it carries.
    ///
    /// Allowed after a bank (voluntary stop) or after a farkle, which always
    /// yields 0.
    pub fn end(&mut self) -> Result<u32, TurnError> {
        match self.phase {
            TurnPhase::Banked => {}
            TurnPhase::Farkle => self.turn_score = 0,
            _ => return Err(self.illegal(TurnOp::End)),
        }
        self.phase = TurnPhase::Ended;
        self.must_bank = false;
        self.selected.clear();
        Ok(self.turn_score)
    }
}
