//! Bank-selection validation.
//!
//! A selection is a set of indices into the current roll. It is bankable only if
//! every selected die scores; rejection never changes any state.

use thiserror::Error;

use crate::dice::RollResult;
use crate::scoring::{dead_dice, decompose};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no dice selected")]
    Empty,
    #[error("die index {index} out of range for a roll of {len}")]
    IndexOutOfRange { index: usize, len: usize },
    #[error("die index {index} selected twice")]
    DuplicateIndex { index: usize },
    #[error("die index {index} was already banked")]
    AlreadyBanked { index: usize },
    #[error("selection includes non-scoring dice {faces:?}")]
    DeadDice { faces: Vec<u8> },
    #[error("a straight or three pairs must use the whole roll")]
    PartialSpecial,
    #[error("selection scores nothing")]
    NoScore,
}

/// Validate `selected` against `roll` and return the score it banks.
///
/// `banked[i]` marks dice of this roll that have already been set aside; an
/// empty slice means none have.
pub fn validate_selection(
    roll: &RollResult,
    selected: &[usize],
    banked: &[bool],
) -> Result<u32, SelectionError> {
    if selected.is_empty() {
        return Err(SelectionError::Empty);
    }

    let len = roll.len();
    let mut seen = vec![false; len];
    for &index in selected {
        if index >= len {
            return Err(SelectionError::IndexOutOfRange { index, len });
        }
        if seen[index] {
            return Err(SelectionError::DuplicateIndex { index });
        }
        if banked.get(index).copied().unwrap_or(false) {
            return Err(SelectionError::AlreadyBanked { index });
        }
        seen[index] = true;
    }

    let values: Vec<u8> = selected.iter().map(|&i| roll.values()[i]).collect();

    let combos = decompose(&values);
    if combos.iter().any(|c| c.kind.is_six_die_special()) && values.len() != len {
        return Err(SelectionError::PartialSpecial);
    }

    let score: u32 = combos.iter().map(|c| c.score).sum();
    if score == 0 {
        return Err(SelectionError::NoScore);
    }

    let faces = dead_dice(&values);
    if !faces.is_empty() {
        return Err(SelectionError::DeadDice { faces });
    }
    Ok(score)
}

/// Boolean form of [`validate_selection`] for a roll with nothing banked yet.
pub fn is_valid_selection(roll: &RollResult, selected: &[usize]) -> bool {
    validate_selection(roll, selected, &[]).is_ok()
}
