//! Combination scoring.
//!
//! A multiset of faces is split into a maximal, non-overlapping set of scoring
//! combinations. Order of the input never matters.
//!
//! Rules:
//! - six dice 1..=6: straight, 1500
//! - six dice as exactly three pairs: 1500
//! - 3+ of a face: 1000 for ones, `face * 100` otherwise, doubled per extra die
//! - leftover ones 100 each, leftover fives 50 each
//! - anything else is dead

use serde::{Deserialize, Serialize};

use crate::rules::{
    is_face, n_of_a_kind_score, DICE_PER_TURN, SINGLE_FIVE_SCORE, SINGLE_ONE_SCORE,
    STRAIGHT_SCORE, THREE_PAIRS_SCORE,
};

/// Classification of one scoring combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ComboKind {
    Straight,
    ThreePairs,
    NOfAKind { face: u8, count: u8 },
    SingleOne,
    SingleFive,
}

impl ComboKind {
    /// Combinations that only exist on a full six-die roll.
    pub fn is_six_die_special(self) -> bool {
        matches!(self, ComboKind::Straight | ComboKind::ThreePairs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringCombination {
    pub score: u32,
    /// Faces this combination uses.
    pub consumed: Vec<u8>,
    pub kind: ComboKind,
}

/// Count of each face; slot `f - 1` holds the count of face `f`.
///
/// # Panics
/// Panics if any value is not a die face.
pub fn face_counts(values: &[u8]) -> [u8; 6] {
    let mut counts = [0u8; 6];
    for &v in values {
        assert!(is_face(v), "die out of range: {}", v);
        counts[(v - 1) as usize] += 1;
    }
    counts
}

fn six_die_special(values: &[u8], counts: &[u8; 6]) -> Option<ComboKind> {
    if values.len() != DICE_PER_TURN {
        return None;
    }
    if counts.iter().all(|&c| c == 1) {
        return Some(ComboKind::Straight);
    }
    if counts.iter().filter(|&&c| c == 2).count() == 3 {
        return Some(ComboKind::ThreePairs);
    }
    None
}

/// Split `values` into its maximal scoring partition.
///
/// Singles are reported one combination per die. An empty result means the
/// multiset scores nothing.
pub fn decompose(values: &[u8]) -> Vec<ScoringCombination> {
    let counts = face_counts(values);

    if let Some(kind) = six_die_special(values, &counts) {
        let mut consumed = values.to_vec();
        consumed.sort_unstable();
        let score = match kind {
            ComboKind::Straight => STRAIGHT_SCORE,
            _ => THREE_PAIRS_SCORE,
        };
        return vec![ScoringCombination {
            score,
            consumed,
            kind,
        }];
    }

    let mut out = Vec::new();
    for face in 1u8..=6 {
        let count = counts[(face - 1) as usize];
        if count >= 3 {
            out.push(ScoringCombination {
                score: n_of_a_kind_score(face, count),
                consumed: vec![face; count as usize],
                kind: ComboKind::NOfAKind { face, count },
            });
            continue;
        }
        let single = match face {
            1 => Some((SINGLE_ONE_SCORE, ComboKind::SingleOne)),
            5 => Some((SINGLE_FIVE_SCORE, ComboKind::SingleFive)),
            _ => None,
        };
        if let Some((score, kind)) = single {
            for _ in 0..count {
                out.push(ScoringCombination {
                    score,
                    consumed: vec![face],
                    kind,
                });
            }
        }
    }
    out
}

/// Total score of an arbitrary multiset.
pub fn score_subset(values: &[u8]) -> u32 {
    decompose(values).iter().map(|c| c.score).sum()
}

/// True if at least one die scores. A fresh roll without this is a farkle.
pub fn has_any_score(values: &[u8]) -> bool {
    score_subset(values) > 0
}

/// Faces that take part in no scoring combination, sorted ascending.
pub fn dead_dice(values: &[u8]) -> Vec<u8> {
    let counts = face_counts(values);
    if six_die_special(values, &counts).is_some() {
        return Vec::new();
    }
    let mut dead: Vec<u8> = values
        .iter()
        .copied()
        .filter(|&f| f != 1 && f != 5 && counts[(f - 1) as usize] < 3)
        .collect();
    dead.sort_unstable();
    dead
}

/// Indices of every die in `values` that belongs to the maximal partition.
///
/// Selecting exactly these banks the full possible score of the roll.
pub fn scoring_indices(values: &[u8]) -> Vec<usize> {
    let counts = face_counts(values);
    if six_die_special(values, &counts).is_some() {
        return (0..values.len()).collect();
    }
    values
        .iter()
        .enumerate()
        .filter(|(_, &f)| f == 1 || f == 5 || counts[(f - 1) as usize] >= 3)
        .map(|(i, _)| i)
        .collect()
}
