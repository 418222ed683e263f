//! Error types for table construction, checkpoints, and solution expansion.

use thiserror::Error;

use crate::PermIndex;

/// Failures while building the permutation, rotation, and coverage tables.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    #[error("Alphabet of {symbols} symbols is too small, at least {min} are required")]
    AlphabetTooSmall { symbols: usize, min: usize },
    #[error("Alphabet of {symbols} symbols is too large, at most {max} are supported")]
    AlphabetTooLarge { symbols: usize, max: usize },
    #[error("Rotation is not injective: indices {first} and {second} both map to {image}")]
    RotationCollision {
        image: PermIndex,
        first: PermIndex,
        second: PermIndex,
    },
    #[error("Rotation of index {index} produced a permutation outside the universe")]
    RotationMissing { index: PermIndex },
}

/// Failures while parsing or replaying a search checkpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckpointError {
    #[error("Could not parse checkpoint entry {0:?}")]
    Parse(String),
    #[error("Checkpoint position {position} is outside the scan window {start}..{end}")]
    OutOfWindow {
        position: usize,
        start: usize,
        end: usize,
    },
    #[error("Checkpoint position {position} (index {index}) overlaps groups already covered")]
    Conflict { position: usize, index: PermIndex },
    #[error("Checkpoint has {depth} entries, a resumable checkpoint has fewer than {max}")]
    TooDeep { depth: usize, max: usize },
}

/// Failures while turning a solution into a symbol string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpandError {
    #[error("Permutation index {index} is out of range, expected a value below {total}")]
    IndexOutOfRange { index: PermIndex, total: usize },
    #[error("Could not parse permutation index {0:?}")]
    Parse(String),
}
