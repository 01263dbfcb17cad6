// src/error.rs
//
// Error taxonomy for quad-block layout problems.

use thiserror::Error;

/// Structural errors found while building or parsing quad blocks.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("block buffer must be exactly 128 bytes, got {0}")]
    BlockSize(usize),

    #[error("input of {0} bytes is not a whole number of 128-byte blocks")]
    TruncatedInput(usize),

    #[error("message length {0} is outside 1..=31")]
    InvalidMessageLen(usize),

    #[error("block {block} slot {slot}: length byte {length} exceeds 31")]
    LengthOutOfRange { block: u64, slot: usize, length: u8 },

    #[error("block {block} slot {slot}: length byte {length}, expected {expected}")]
    UnexpectedLength {
        block: u64,
        slot: usize,
        length: u8,
        expected: u8,
    },

    #[error("block {block} slot {slot}: non-zero padding at slot byte {offset}")]
    NonZeroPadding { block: u64, slot: usize, offset: usize },
}

impl LayoutError {
    /// Re-tag a per-block error with its position in a larger stream.
    pub(crate) fn at_block(self, index: u64) -> Self {
        match self {
            LayoutError::LengthOutOfRange { slot, length, .. } => {
                LayoutError::LengthOutOfRange { block: index, slot, length }
            }
            LayoutError::UnexpectedLength { slot, length, expected, .. } => {
                LayoutError::UnexpectedLength { block: index, slot, length, expected }
            }
            LayoutError::NonZeroPadding { slot, offset, .. } => {
                LayoutError::NonZeroPadding { block: index, slot, offset }
            }
            other => other,
        }
    }
}
