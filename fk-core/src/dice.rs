//! Dice generation.
//!
//! All randomness that decides die faces flows through [`DiceRoller`], so a game
//! can be replayed by substituting a seeded or scripted roller.

use std::collections::VecDeque;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use rand_core::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::rules::{is_face, DICE_PER_TURN};

/// Faces produced by one roll. Replaced, never mutated, on the next roll.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RollResult {
    values: Vec<u8>,
}

impl RollResult {
    /// Wrap raw faces.
    ///
    /// # Panics
    /// Panics if there are more than six dice or any value is not a die face.
    pub fn new(values: Vec<u8>) -> Self {
        assert!(
            values.len() <= DICE_PER_TURN,
            "roll has {} dice (max {})",
            values.len(),
            DICE_PER_TURN
        );
        for &v in &values {
            assert!(is_face(v), "die out of range: {}", v);
        }
        Self { values }
    }

    pub fn values(&self) -> &[u8] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Faces at `indices`, or `None` if any index is out of range.
    pub fn values_at(&self, indices: &[usize]) -> Option<Vec<u8>> {
        indices.iter().map(|&i| self.values.get(i).copied()).collect()
    }
}

/// Source of die faces.
pub trait DiceRoller: Send {
    /// Roll `count` independent dice.
    ///
    /// # Panics
    /// Implementations panic if `count` is outside 1..=6.
    fn roll(&mut self, count: usize) -> RollResult;
}

fn assert_count(count: usize) {
    assert!(
        (1..=DICE_PER_TURN).contains(&count),
        "roll count out of range: {}",
        count
    );
}

/// Uniform dice backed by a seeded ChaCha8 stream.
#[derive(Debug, Clone)]
pub struct ChaChaRoller {
    rng: ChaCha8Rng,
}

impl ChaChaRoller {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Seed from OS entropy.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }
}

impl DiceRoller for ChaChaRoller {
    fn roll(&mut self, count: usize) -> RollResult {
        assert_count(count);
        let values = (0..count).map(|_| self.rng.gen_range(1..=6)).collect();
        RollResult { values }
    }
}

/// Replays a fixed sequence of rolls, in order.
///
/// Each scripted roll must have exactly the requested number of dice. Running
/// out of script is a test bug and panics.
#[derive(Debug, Clone, Default)]
pub struct ScriptedRoller {
    rolls: VecDeque<Vec<u8>>,
}

impl ScriptedRoller {
    pub fn new(rolls: impl IntoIterator<Item = Vec<u8>>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    /// Queue another roll at the end of the script.
    pub fn push(&mut self, roll: Vec<u8>) {
        self.rolls.push_back(roll);
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll(&mut self, count: usize) -> RollResult {
        assert_count(count);
        let next = self.rolls.pop_front().unwrap_or_else(|| {
            panic!("scripted roller exhausted (requested {} dice)", count)
        });
        assert_eq!(
            next.len(),
            count,
            "scripted roll {:?} does not match requested count {}",
            next,
            count
        );
        RollResult::new(next)
    }
}
