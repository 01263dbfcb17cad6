// src/block.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Quad-block layout: four length-prefixed messages packed into 128 bytes.
//!
//! Logical slot `N` lives at physical offset `(3 - N) * 32`, so the first 32
//! bytes of a block on disk are logical slot 3 and the last 32 bytes are
//! logical slot 0. The consumer reads the block MSB first; keep the formula.
//!
//! ```text
//!  byte 0         32          64          96         128
//!       | slot 3   | slot 2    | slot 1    | slot 0    |
//!       |L|msg|0..0|L|msg|0..0 |L|msg|0..0 |L|msg|0..0 |
//! ```

use crate::constants::{BLOCK_SIZE, MAX_MESSAGE_LEN, SLOTS_PER_BLOCK, SLOT_SIZE};
use crate::error::LayoutError;

/// Physical byte offset of logical slot `slot` within a block.
///
/// # Panics
/// Panics if `slot >= SLOTS_PER_BLOCK`.
pub const fn slot_offset(slot: usize) -> usize {
    assert!(slot < SLOTS_PER_BLOCK, "slot index out of range");
    (SLOTS_PER_BLOCK - 1 - slot) * SLOT_SIZE
}

/// One fixed-size 128-byte block.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Block([u8; BLOCK_SIZE]);

impl Block {
    /// An all-zero block, the starting point for every generated block.
    pub const fn zeroed() -> Self {
        Block([0u8; BLOCK_SIZE])
    }

    /// Copy a block out of a slice that must be exactly `BLOCK_SIZE` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, LayoutError> {
        let raw: [u8; BLOCK_SIZE] = bytes
            .try_into()
            .map_err(|_| LayoutError::BlockSize(bytes.len()))?;
        Ok(Block(raw))
    }

    pub fn as_bytes(&self) -> &[u8; BLOCK_SIZE] {
        &self.0
    }

    pub fn into_bytes(self) -> [u8; BLOCK_SIZE] {
        self.0
    }

    pub(crate) fn as_mut_bytes(&mut self) -> &mut [u8; BLOCK_SIZE] {
        &mut self.0
    }

    /// Write a length byte and message into logical slot `slot`.
    ///
    /// Only `1 + message.len()` bytes are touched; the rest of the slot keeps
    /// whatever it held (zero for a fresh block).
    ///
    /// # Panics
    /// Panics if `slot >= SLOTS_PER_BLOCK`.
    pub fn write_slot(&mut self, slot: usize, message: &[u8]) -> Result<(), LayoutError> {
        if message.len() > MAX_MESSAGE_LEN {
            return Err(LayoutError::InvalidMessageLen(message.len()));
        }
        let offset = slot_offset(slot);
        self.0[offset] = message.len() as u8;
        self.0[offset + 1..offset + 1 + message.len()].copy_from_slice(message);
        Ok(())
    }

    /// Borrow logical slot `slot`.
    ///
    /// # Panics
    /// Panics if `slot >= SLOTS_PER_BLOCK`.
    pub fn slot(&self, slot: usize) -> Slot<'_> {
        let offset = slot_offset(slot);
        Slot {
            index: slot,
            bytes: &self.0[offset..offset + SLOT_SIZE],
        }
    }

    /// Slots in logical order (0, 1, 2, 3), i.e. from the end of the buffer backwards.
    pub fn slots(&self) -> impl Iterator<Item = Slot<'_>> {
        (0..SLOTS_PER_BLOCK).map(move |i| self.slot(i))
    }

    /// Check the structural invariants of every slot.
    ///
    /// The length byte must fit in a slot (and equal `expected_len` when one is
    /// given), and every byte after the message must be zero. Errors report
    /// block index 0; stream readers re-tag them with the real position.
    pub fn validate(&self, expected_len: Option<u8>) -> Result<(), LayoutError> {
        for slot in self.slots() {
            let length = slot.length();
            if length as usize > MAX_MESSAGE_LEN {
                return Err(LayoutError::LengthOutOfRange { block: 0, slot: slot.index, length });
            }
            if let Some(expected) = expected_len {
                if length != expected {
                    return Err(LayoutError::UnexpectedLength {
                        block: 0,
                        slot: slot.index,
                        length,
                        expected,
                    });
                }
            }
            if let Some(pos) = slot.padding().iter().position(|b| *b != 0) {
                return Err(LayoutError::NonZeroPadding {
                    block: 0,
                    slot: slot.index,
                    offset: 1 + length as usize + pos,
                });
            }
        }
        Ok(())
    }
}

impl Default for Block {
    fn default() -> Self {
        Block::zeroed()
    }
}

impl AsRef<[u8]> for Block {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl std::fmt::Debug for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.slots()).finish()
    }
}

/// Read-only view of one 32-byte slot.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Slot<'a> {
    index: usize,
    bytes: &'a [u8],
}

impl<'a> Slot<'a> {
    /// Logical slot index (0..4).
    pub fn index(&self) -> usize {
        self.index
    }

    /// Physical offset of this slot inside its block.
    pub fn offset(&self) -> usize {
        slot_offset(self.index)
    }

    /// The length byte as stored.
    pub fn length(&self) -> u8 {
        self.bytes[0]
    }

    /// Message bytes. A corrupt length byte is clamped to the slot size.
    pub fn message(&self) -> &'a [u8] {
        let len = (self.length() as usize).min(MAX_MESSAGE_LEN);
        &self.bytes[1..1 + len]
    }

    /// Bytes after the message, expected to be zero.
    pub fn padding(&self) -> &'a [u8] {
        let len = (self.length() as usize).min(MAX_MESSAGE_LEN);
        &self.bytes[1 + len..]
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }
}

impl std::fmt::Debug for Slot<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot")
            .field("index", &self.index)
            .field("length", &self.length())
            .field("message", &self.message())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_offsets_are_reversed() {
        assert_eq!(slot_offset(0), 96);
        assert_eq!(slot_offset(1), 64);
        assert_eq!(slot_offset(2), 32);
        assert_eq!(slot_offset(3), 0);
    }

    #[test]
    #[should_panic(expected = "slot index out of range")]
    fn test_slot_offset_out_of_range() {
        let _ = slot_offset(SLOTS_PER_BLOCK);
    }

    #[test]
    fn test_write_slot_places_bytes_at_reversed_offset() {
        let mut block = Block::zeroed();
        block.write_slot(0, &[1, 2, 3]).unwrap();
        block.write_slot(3, &[9]).unwrap();

        let bytes = block.as_bytes();
        assert_eq!(&bytes[96..100], &[3, 1, 2, 3]);
        assert!(bytes[100..128].iter().all(|b| *b == 0));
        assert_eq!(&bytes[0..2], &[1, 9]);
        assert!(bytes[32..96].iter().all(|b| *b == 0));

        assert_eq!(block.slot(0).message(), &[1, 2, 3]);
        assert_eq!(block.slot(3).message(), &[9]);
        assert_eq!(block.slot(3).offset(), 0);
    }

    #[test]
    fn test_write_slot_rejects_oversized_message() {
        let mut block = Block::zeroed();
        let err = block.write_slot(1, &[0u8; 32]).unwrap_err();
        assert_eq!(err, LayoutError::InvalidMessageLen(32));
        // a full 31-byte message still fits
        block.write_slot(1, &[0xAA; 31]).unwrap();
        assert!(block.slot(1).padding().is_empty());
    }

    #[test]
    fn test_from_slice_requires_exact_size() {
        assert_eq!(Block::from_slice(&[0u8; 127]), Err(LayoutError::BlockSize(127)));
        assert_eq!(Block::from_slice(&[0u8; 129]), Err(LayoutError::BlockSize(129)));
        assert_eq!(Block::from_slice(&[0u8; 128]), Ok(Block::zeroed()));
    }

    #[test]
    fn test_validate_detects_bad_padding() {
        let mut block = Block::zeroed();
        for slot in 0..SLOTS_PER_BLOCK {
            block.write_slot(slot, &[0xFF; 7]).unwrap();
        }
        assert!(block.validate(Some(7)).is_ok());

        let mut raw = block.into_bytes();
        // slot 2 lives at [32, 64); byte 40 is its 9th byte, past the message
        raw[40] = 1;
        let corrupt = Block::from_slice(&raw).unwrap();
        assert_eq!(
            corrupt.validate(Some(7)),
            Err(LayoutError::NonZeroPadding { block: 0, slot: 2, offset: 8 })
        );
    }

    #[test]
    fn test_validate_detects_length_mismatch() {
        let mut block = Block::zeroed();
        for slot in 0..SLOTS_PER_BLOCK {
            block.write_slot(slot, &[0x11; 7]).unwrap();
        }
        block.write_slot(1, &[0x22; 5]).unwrap();
        // the old 7-byte message tail is still there, but the length check fires first
        assert_eq!(
            block.validate(Some(7)),
            Err(LayoutError::UnexpectedLength { block: 0, slot: 1, length: 5, expected: 7 })
        );

        let mut raw = Block::zeroed().into_bytes();
        raw[96] = 40;
        assert_eq!(
            Block::from_slice(&raw).unwrap().validate(None),
            Err(LayoutError::LengthOutOfRange { block: 0, slot: 0, length: 40 })
        );
    }
}
