//! Round controller: seating, turn rotation, entry minimum, final round and winner.
//!
//! This is the single owner of [`GameState`]. The active [`Turn`] lives inside
//! the controller and is only reachable through its operations, so two turns
//! can never interleave.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError, GameConfig, PlayerConfig};
use crate::dice::DiceRoller;
use crate::events::{EndReason, EventSink, GameEvent, Standing};
use crate::policy::RiskProfile;
use crate::selection::SelectionError;
use crate::turn::{BankOutcome, RollOutcome, Turn, TurnError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlayerKind {
    Human,
    Automated {
        #[serde(default)]
        profile: RiskProfile,
    },
}

impl PlayerKind {
    pub fn is_automated(&self) -> bool {
        matches!(self, PlayerKind::Automated { .. })
    }

    pub fn profile(&self) -> Option<RiskProfile> {
        match self {
            PlayerKind::Human => None,
            PlayerKind::Automated { profile } => Some(*profile),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub kind: PlayerKind,
    pub score: u32,
    /// Set once a single turn has met the entry minimum.
    pub has_entered: bool,
    pub turns_taken: u32,
}

impl Player {
    fn from_config(cfg: &PlayerConfig) -> Self {
        Self {
            name: cfg.name.trim().to_string(),
            kind: cfg.kind,
            score: 0,
            has_entered: false,
            turns_taken: 0,
        }
    }
}

/// Cross-turn game state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub players: Vec<Player>,
    pub current_player_index: usize,
    pub target_score: u32,
    pub entry_minimum: u32,
    /// Set at most once; never cleared.
    pub final_round: bool,
    pub final_round_initiator: Option<usize>,
    pub winner: Option<usize>,
    pub game_ended: bool,
    pub turns_played: u32,
}

/// What happened to a turn's points at turn end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TurnSummary {
    pub player_index: usize,
    pub turn_score: u32,
    pub reason: EndReason,
    /// Player total after the turn.
    pub total_score: u32,
    pub game_over: bool,
}

impl TurnSummary {
    pub fn credited(&self) -> bool {
        self.reason == EndReason::Banked
    }
}

/// Result of a bank attempt. A rejected bank changes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankResponse {
    pub accepted: bool,
    pub score_gained: u32,
    pub turn_score: u32,
    pub hot_dice: bool,
    pub rejection: Option<SelectionError>,
}

impl BankResponse {
    fn accepted(b: BankOutcome) -> Self {
        Self {
            accepted: true,
            score_gained: b.score_gained,
            turn_score: b.turn_score,
            hot_dice: b.hot_dice,
            rejection: None,
        }
    }

    fn rejected(turn_score: u32, err: SelectionError) -> Self {
        Self {
            accepted: false,
            score_gained: 0,
            turn_score,
            hot_dice: false,
            rejection: Some(err),
        }
    }
}

/// Fields a Hall-of-Fame store needs for a completed game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub winner_name: String,
    pub winner_score: u32,
    pub target_score: u32,
    pub duration_seconds: u64,
    pub total_turns: u32,
}

fn no_turn() -> TurnError {
    TurnError::InvalidState {
        msg: "no turn in progress",
    }
}

fn contract_violation(strict: bool, err: TurnError) -> TurnError {
    if strict && err.is_contract_violation() {
        panic!("contract violation: {err}");
    }
    err
}

pub struct RoundController {
    state: GameState,
    turn: Option<Turn>,
    roller: Box<dyn DiceRoller>,
    sink: Box<dyn EventSink>,
    strict_contracts: bool,
    started_at: Instant,
    ended_at: Option<Instant>,
}

impl std::fmt::Debug for RoundController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoundController")
            .field("state", &self.state)
            .field("turn", &self.turn)
            .finish_non_exhaustive()
    }
}

impl RoundController {
    /// Validate `config` and seat its players. Player 0 moves first.
    pub fn new(
        config: &Config,
        roller: Box<dyn DiceRoller>,
        sink: Box<dyn EventSink>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_parts(&config.game, &config.players, roller, sink))
    }

    fn from_parts(
        game: &GameConfig,
        players: &[PlayerConfig],
        roller: Box<dyn DiceRoller>,
        sink: Box<dyn EventSink>,
    ) -> Self {
        Self {
            state: GameState {
                players: players.iter().map(Player::from_config).collect(),
                current_player_index: 0,
                target_score: game.target_score,
                entry_minimum: game.entry_minimum,
                final_round: false,
                final_round_initiator: None,
                winner: None,
                game_ended: false,
                turns_played: 0,
            },
            turn: None,
            roller,
            sink,
            strict_contracts: cfg!(debug_assertions),
            started_at: Instant::now(),
            ended_at: None,
        }
    }

    /// When strict (the debug-build default), contract violations panic
    /// instead of being returned.
    pub fn set_strict_contracts(&mut self, strict: bool) {
        self.strict_contracts = strict;
    }

    fn emit(&mut self, event: GameEvent) {
        self.sink.emit(&event);
    }

    fn violation(&self, err: TurnError) -> TurnError {
        contract_violation(self.strict_contracts, err)
    }

    fn check_player(&self, player_index: usize) -> Result<(), TurnError> {
        if self.state.game_ended {
            return Err(self.violation(TurnError::InvalidState {
                msg: "game has ended",
            }));
        }
        if player_index != self.state.current_player_index {
            return Err(self.violation(TurnError::InvalidState {
                msg: "not this player's turn",
            }));
        }
        Ok(())
    }

    fn active_turn(&mut self) -> Result<&mut Turn, TurnError> {
        let strict = self.strict_contracts;
        self.turn
            .as_mut()
            .ok_or_else(|| contract_violation(strict, no_turn()))
    }

    // ---- operations ----

    /// Begin a turn for `player_index`, which must be the current player.
    pub fn start_turn(&mut self, player_index: usize) -> Result<(), TurnError> {
        self.check_player(player_index)?;
        if self.turn.is_some() {
            return Err(self.violation(TurnError::InvalidState {
                msg: "a turn is already in progress",
            }));
        }
        self.turn = Some(Turn::new());
        let p = &self.state.players[player_index];
        let event = GameEvent::TurnStarted {
            player_index,
            player: p.name.clone(),
            turn_number: p.turns_taken + 1,
        };
        self.emit(event);
        Ok(())
    }

    /// Roll for the current player. A farkle ends the turn immediately.
    pub fn roll(&mut self, player_index: usize) -> Result<RollOutcome, TurnError> {
        self.check_player(player_index)?;
        let strict = self.strict_contracts;
        let Some(turn) = self.turn.as_mut() else {
            return Err(contract_violation(strict, no_turn()));
        };
        let at_stake = turn.turn_score();
        let outcome = turn
            .roll(self.roller.as_mut())
            .map_err(|e| contract_violation(strict, e))?;

        self.emit(GameEvent::DiceRolled {
            player_index,
            values: outcome.values.clone(),
            possible_score: outcome.possible_score,
        });

        if outcome.farkle {
            let name = self.state.players[player_index].name.clone();
            self.emit(GameEvent::Farkle {
                player_index,
                player: name,
                lost: at_stake,
            });
            let banked = self.active_turn()?.end()?;
            self.close_turn(banked, true);
        }
        Ok(outcome)
    }

    pub fn select_die(&mut self, index: usize) -> Result<(), TurnError> {
        let r = self.active_turn()?.select(index);
        r.map_err(|e| self.violation(e))
    }

    pub fn deselect_die(&mut self, index: usize) -> Result<(), TurnError> {
        let r = self.active_turn()?.deselect(index);
        r.map_err(|e| self.violation(e))
    }

    /// Bank the current selection.
    pub fn bank_selection(&mut self) -> Result<BankResponse, TurnError> {
        let selected = self.active_turn()?.selected().to_vec();
        self.bank_indices(&selected)
    }

    /// Bank `indices` of the current roll (automated players choose directly).
    pub fn bank_indices(&mut self, indices: &[usize]) -> Result<BankResponse, TurnError> {
        let player_index = self.state.current_player_index;
        let turn = self.active_turn()?;
        let turn_score = turn.turn_score();
        match turn.bank_indices(indices) {
            Ok(b) => {
                let name = self.state.players[player_index].name.clone();
                self.emit(GameEvent::DiceBanked {
                    player_index,
                    player: name.clone(),
                    score_gained: b.score_gained,
                    turn_score_total: b.turn_score,
                });
                if b.hot_dice {
                    self.emit(GameEvent::HotDice {
                        player_index,
                        player: name,
                        turn_score: b.turn_score,
                    });
                }
                Ok(BankResponse::accepted(b))
            }
            Err(TurnError::InvalidSelection(e)) => {
                self.emit(GameEvent::SelectionRejected {
                    player_index,
                    reason: e.to_string(),
                });
                Ok(BankResponse::rejected(turn_score, e))
            }
            Err(e) => Err(self.violation(e)),
        }
    }

    /// Voluntarily stop and settle the turn's points.
    pub fn end_turn(&mut self) -> Result<TurnSummary, TurnError> {
        let r = self.active_turn()?.end();
        let banked = r.map_err(|e| self.violation(e))?;
        Ok(self.close_turn(banked, false))
    }

    /// Apply the entry minimum, credit the player, check the final round and rotate.
    fn close_turn(&mut self, turn_score: u32, farkle: bool) -> TurnSummary {
        self.turn = None;
        let idx = self.state.current_player_index;
        let entry_minimum = self.state.entry_minimum;

        let player = &mut self.state.players[idx];
        let reason = if farkle {
            EndReason::Farkle
        } else if !player.has_entered && turn_score < entry_minimum {
            EndReason::BelowEntryMinimum
        } else {
            player.score += turn_score;
            player.has_entered = true;
            EndReason::Banked
        };
        player.turns_taken += 1;
        let total_score = player.score;
        let name = player.name.clone();
        self.state.turns_played += 1;

        self.emit(GameEvent::TurnEnded {
            player_index: idx,
            player: name.clone(),
            turn_score,
            reason,
            total_score,
        });

        if reason == EndReason::Banked
            && total_score >= self.state.target_score
            && !self.state.final_round
        {
            self.state.final_round = true;
            self.state.final_round_initiator = Some(idx);
            let target_score = self.state.target_score;
            self.emit(GameEvent::FinalRoundTriggered {
                initiator_index: idx,
                initiator: name,
                target_score,
            });
        }

        self.state.current_player_index = (idx + 1) % self.state.players.len();
        if self.state.final_round
            && Some(self.state.current_player_index) == self.state.final_round_initiator
        {
            self.finish_game();
        }

        TurnSummary {
            player_index: idx,
            turn_score,
            reason,
            total_score,
            game_over: self.state.game_ended,
        }
    }

    fn finish_game(&mut self) {
        // Strict `>`: the first player in seating order with the top score wins.
        let mut best = 0usize;
        for (i, p) in self.state.players.iter().enumerate() {
            if p.score > self.state.players[best].score {
                best = i;
            }
        }
        let winner_score = self.state.players[best].score;
        let tied = self
            .state
            .players
            .iter()
            .filter(|p| p.score == winner_score)
            .count()
            > 1;

        self.state.winner = Some(best);
        self.state.game_ended = true;
        self.ended_at = Some(Instant::now());

        let event = GameEvent::GameEnded {
            winner_index: best,
            winner: self.state.players[best].name.clone(),
            winner_score,
            tied,
            leaderboard: self.leaderboard(),
        };
        self.emit(event);
    }

    // ---- queries ----

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn players(&self) -> &[Player] {
        &self.state.players
    }

    pub fn current_player_index(&self) -> usize {
        self.state.current_player_index
    }

    pub fn current_player(&self) -> &Player {
        &self.state.players[self.state.current_player_index]
    }

    /// The turn in progress, if any.
    pub fn turn(&self) -> Option<&Turn> {
        self.turn.as_ref()
    }

    /// Players by score, highest first; equal scores keep seating order.
    pub fn leaderboard(&self) -> Vec<Standing> {
        let mut out: Vec<Standing> = self
            .state
            .players
            .iter()
            .map(|p| Standing {
                name: p.name.clone(),
                score: p.score,
            })
            .collect();
        out.sort_by(|a, b| b.score.cmp(&a.score));
        out
    }

    pub fn is_game_over(&self) -> bool {
        self.state.game_ended
    }

    pub fn winner(&self) -> Option<&Player> {
        self.state.winner.map(|i| &self.state.players[i])
    }

    pub fn final_round(&self) -> bool {
        self.state.final_round
    }

    pub fn final_round_initiator(&self) -> Option<usize> {
        self.state.final_round_initiator
    }

    pub fn target_score(&self) -> u32 {
        self.state.target_score
    }

    pub fn turns_played(&self) -> u32 {
        self.state.turns_played
    }

    /// Hall-of-Fame fields, available once the game has ended.
    pub fn summary(&self) -> Option<GameSummary> {
        let winner = self.winner()?;
        let ended = self.ended_at?;
        Some(GameSummary {
            winner_name: winner.name.clone(),
            winner_score: winner.score,
            target_score: self.state.target_score,
            duration_seconds: ended.duration_since(self.started_at).as_secs(),
            total_turns: self.state.turns_played,
        })
    }
}
