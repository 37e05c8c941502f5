//! One game, driven either by human input or by paced automated actions.
//!
//! Automated turns are a chain of [`AiAction`]s. Each action is a suspension
//! point: it is scheduled `think_delay` after the previous one and executed by
//! [`Session::step`] once its due time has passed. `step` never sleeps, so a
//! caller can drive many sessions from one thread (see [`crate::Scheduler`]).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use fk_core::{
    decide, scoring_indices, BankResponse, Config, ConfigError, Decision, DiceRoller, EventSink,
    GameSummary, RiskProfile, RollOutcome, RoundController, TurnError, TurnSummary,
};
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("it is not a human player's turn (current player: {player})")]
    NotHumanTurn { player: String },
    #[error("session cancelled")]
    Cancelled,
    #[error("game is over")]
    GameOver,
    #[error("automated player chose a selection the rules rejected")]
    AutomatedSelectionRejected,
    #[error(transparent)]
    Turn(#[from] TurnError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Shared cancellation flag. Clones observe and set the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiAction {
    Roll,
    /// Bank every scoring die of the current roll.
    Bank,
    /// Ask the risk policy whether to roll again.
    Decide,
    End,
}

impl AiAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiAction::Roll => "roll",
            AiAction::Bank => "bank",
            AiAction::Decide => "decide",
            AiAction::End => "end",
        }
    }
}

/// The next automated action and when it may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pending {
    pub due: Instant,
    pub action: AiAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Progress,
    /// An automated action is scheduled but not yet due.
    WouldBlock,
    AwaitingHuman,
    Terminal,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutedAction {
    pub player_index: usize,
    pub action: AiAction,
    /// Turn score after the action. Zero after a farkle.
    pub turn_score: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepResult {
    pub status: StepStatus,
    /// Present only when an automated action ran.
    pub executed: Option<ExecutedAction>,
}

impl StepResult {
    fn idle(status: StepStatus) -> Self {
        Self {
            status,
            executed: None,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    game_id: u64,
    controller: RoundController,
    rng: ChaCha8Rng,
    think_delay: Duration,
    pending: Option<Pending>,
    /// Last automated bank used every die; the policy sees zero dice left.
    hot_dice: bool,
    cancel: CancelToken,
}

impl Session {
    /// Decisions are seeded from `config.ai.seed` mixed with `game_id`, or from
    /// entropy when no seed is configured.
    pub fn new(
        game_id: u64,
        config: &Config,
        roller: Box<dyn DiceRoller>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, SessionError> {
        let controller = RoundController::new(config, roller, sink)?;
        let rng = match config.ai.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed ^ game_id),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self {
            game_id,
            controller,
            rng,
            think_delay: Duration::from_millis(config.ai.think_delay_ms),
            pending: None,
            hot_dice: false,
            cancel: CancelToken::new(),
        })
    }

    pub fn game_id(&self) -> u64 {
        self.game_id
    }

    pub fn controller(&self) -> &RoundController {
        &self.controller
    }

    pub fn pending(&self) -> Option<Pending> {
        self.pending
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.map(|p| p.due)
    }

    pub fn think_delay(&self) -> Duration {
        self.think_delay
    }

    pub fn set_think_delay(&mut self, delay: Duration) {
        self.think_delay = delay;
    }

    pub fn set_strict_contracts(&mut self, strict: bool) {
        self.controller.set_strict_contracts(strict);
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Drop any pending continuation; later steps report `Cancelled`.
    pub fn cancel(&mut self) {
        self.cancel.cancel();
        self.pending = None;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn is_over(&self) -> bool {
        self.controller.is_game_over()
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.controller.summary()
    }

    fn schedule(&mut self, now: Instant, action: AiAction) {
        self.pending = Some(Pending {
            due: now + self.think_delay,
            action,
        });
    }

    /// Advance the session by at most one unit of work.
    pub fn step(&mut self, now: Instant) -> Result<StepResult, SessionError> {
        if self.cancel.is_cancelled() {
            self.pending = None;
            return Ok(StepResult::idle(StepStatus::Cancelled));
        }
        if self.controller.is_game_over() {
            self.pending = None;
            return Ok(StepResult::idle(StepStatus::Terminal));
        }

        let profile = self.controller.current_player().kind.profile();
        if self.controller.turn().is_none() {
            let idx = self.controller.current_player_index();
            self.controller.start_turn(idx)?;
            self.hot_dice = false;
            if profile.is_some() {
                self.schedule(now, AiAction::Roll);
            }
            return Ok(StepResult::idle(StepStatus::Progress));
        }
        let Some(profile) = profile else {
            return Ok(StepResult::idle(StepStatus::AwaitingHuman));
        };

        let pending = match self.pending {
            Some(p) => p,
            None => Pending {
                due: now,
                action: self.resume_action(),
            },
        };
        if now < pending.due {
            self.pending = Some(pending);
            return Ok(StepResult::idle(StepStatus::WouldBlock));
        }
        self.pending = None;

        let executed = self.execute(pending.action, profile, now)?;
        let status = if self.controller.is_game_over() {
            StepStatus::Terminal
        } else {
            StepStatus::Progress
        };
        Ok(StepResult {
            status,
            executed: Some(executed),
        })
    }

    /// Action implied by the turn phase when nothing is scheduled.
    fn resume_action(&self) -> AiAction {
        match self.controller.turn() {
            Some(t) if t.must_bank() => AiAction::Bank,
            Some(t) if t.can_end() => AiAction::Decide,
            _ => AiAction::Roll,
        }
    }

    fn execute(
        &mut self,
        action: AiAction,
        profile: RiskProfile,
        now: Instant,
    ) -> Result<ExecutedAction, SessionError> {
        let player_index = self.controller.current_player_index();
        let turn_score = match action {
            AiAction::Roll => {
                let outcome = self.controller.roll(player_index)?;
                self.hot_dice = false;
                if outcome.farkle {
                    0
                } else {
                    self.schedule(now, AiAction::Bank);
                    self.controller.turn().map_or(0, |t| t.turn_score())
                }
            }
            AiAction::Bank => {
                let indices = self
                    .controller
                    .turn()
                    .map(|t| scoring_indices(t.current_roll().values()))
                    .unwrap_or_default();
                let resp = self.controller.bank_indices(&indices)?;
                if !resp.accepted {
                    return Err(SessionError::AutomatedSelectionRejected);
                }
                self.hot_dice = resp.hot_dice;
                self.schedule(now, AiAction::Decide);
                resp.turn_score
            }
            AiAction::Decide => {
                let Some(turn) = self.controller.turn() else {
                    return Err(SessionError::Turn(TurnError::InvalidState {
                        msg: "no turn in progress",
                    }));
                };
                let turn_score = turn.turn_score();
                let dice = if self.hot_dice {
                    0
                } else {
                    turn.available_dice()
                };
                let next = match decide(turn_score, dice, profile, &mut self.rng) {
                    Decision::Continue => AiAction::Roll,
                    Decision::Stop => AiAction::End,
                };
                self.schedule(now, next);
                turn_score
            }
            AiAction::End => self.controller.end_turn()?.turn_score,
        };
        Ok(ExecutedAction {
            player_index,
            action,
            turn_score,
        })
    }

    /// Step at `now` until the session needs time, input, or is finished.
    pub fn run_until_blocked(&mut self, now: Instant) -> Result<StepStatus, SessionError> {
        loop {
            let r = self.step(now)?;
            if r.status != StepStatus::Progress {
                return Ok(r.status);
            }
        }
    }

    /// Drive the game on a virtual clock that jumps to each due time, so
    /// pacing delays cost nothing. Stops at the first human turn.
    pub fn run_to_completion(&mut self) -> Result<StepStatus, SessionError> {
        let mut clock = Instant::now();
        loop {
            match self.run_until_blocked(clock)? {
                StepStatus::WouldBlock => {
                    if let Some(due) = self.next_due() {
                        clock = clock.max(due);
                    }
                }
                other => return Ok(other),
            }
        }
    }

    // ---- human input ----

    fn human_turn(&self) -> Result<usize, SessionError> {
        if self.cancel.is_cancelled() {
            return Err(SessionError::Cancelled);
        }
        if self.controller.is_game_over() {
            return Err(SessionError::GameOver);
        }
        let p = self.controller.current_player();
        if p.kind.is_automated() {
            return Err(SessionError::NotHumanTurn {
                player: p.name.clone(),
            });
        }
        Ok(self.controller.current_player_index())
    }

    /// Roll for the human player, starting their turn if needed.
    pub fn roll(&mut self) -> Result<RollOutcome, SessionError> {
        let idx = self.human_turn()?;
        if self.controller.turn().is_none() {
            self.controller.start_turn(idx)?;
        }
        Ok(self.controller.roll(idx)?)
    }

    pub fn select_die(&mut self, index: usize) -> Result<(), SessionError> {
        self.human_turn()?;
        Ok(self.controller.select_die(index)?)
    }

    pub fn deselect_die(&mut self, index: usize) -> Result<(), SessionError> {
        self.human_turn()?;
        Ok(self.controller.deselect_die(index)?)
    }

    pub fn bank_selection(&mut self) -> Result<BankResponse, SessionError> {
        self.human_turn()?;
        Ok(self.controller.bank_selection()?)
    }

    pub fn end_turn(&mut self) -> Result<TurnSummary, SessionError> {
        self.human_turn()?;
        Ok(self.controller.end_turn()?)
    }
}
