//! Canonical rule constants.
//!
//! Every scoring value and threshold used by the engine lives here; no other
//! module hard-codes a rule number.

/// Dice in a fresh pool (start of turn and after hot dice).
pub const DICE_PER_TURN: usize = 6;

pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;

/// 1-2-3-4-5-6 on six dice.
pub const STRAIGHT_SCORE: u32 = 1500;
/// Three distinct faces, each shown exactly twice.
pub const THREE_PAIRS_SCORE: u32 = 1500;

pub const SINGLE_ONE_SCORE: u32 = 100;
pub const SINGLE_FIVE_SCORE: u32 = 50;
pub const TRIPLE_ONES_SCORE: u32 = 1000;

/// Points a single turn must reach before a player's first score counts.
pub const ENTRY_MINIMUM: u32 = 300;

/// Older rule generation used 250. Only reachable through explicit configuration.
pub const LEGACY_ENTRY_MINIMUM: u32 = 250;

pub const DEFAULT_TARGET_SCORE: u32 = 10_000;
pub const MIN_TARGET_SCORE: u32 = 1_000;

/// Every score in the game is a multiple of this.
pub const SCORE_GRANULARITY: u32 = 50;

pub const MAX_PLAYERS: usize = 8;

/// Score for `count` (3..=6) dice of `face`.
///
/// The triple base is 1000 for ones and `face * 100` otherwise; each die
/// beyond the third doubles it.
///
/// # Panics
/// Panics if `face` is not a die face or `count` is outside 3..=6.
pub fn n_of_a_kind_score(face: u8, count: u8) -> u32 {
    assert!(is_face(face), "face out of range: {}", face);
    assert!((3..=6).contains(&count), "n-of-a-kind count out of range: {}", count);
    let base = if face == 1 {
        TRIPLE_ONES_SCORE
    } else {
        u32::from(face) * 100
    };
    base << (count - 3)
}

/// True if `v` is a legal die face.
#[inline]
pub fn is_face(v: u8) -> bool {
    (MIN_FACE..=MAX_FACE).contains(&v)
}
