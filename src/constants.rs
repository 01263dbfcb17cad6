// src/constants.rs
//
// Centralized constants for quadgen to avoid hardcoded values throughout the codebase

/// Size of one quad block in bytes (1024 bits)
pub const BLOCK_SIZE: usize = 128;

/// Number of message slots carried by each block
pub const SLOTS_PER_BLOCK: usize = 4;

/// Size of one slot in bytes (BLOCK_SIZE / SLOTS_PER_BLOCK)
pub const SLOT_SIZE: usize = BLOCK_SIZE / SLOTS_PER_BLOCK;

/// Largest message a slot can hold: everything after the length byte (31 bytes)
pub const MAX_MESSAGE_LEN: usize = SLOT_SIZE - 1;

/// Message length written into every slot by default (7 bytes)
pub const DEFAULT_MESSAGE_LEN: u8 = 7;

/// Emit a progress line every this many blocks while writing a file
pub const DEFAULT_PROGRESS_INTERVAL: u64 = 100_000;

/// Buffered writer capacity for output files (1 MB, a multiple of BLOCK_SIZE)
pub const DEFAULT_WRITE_BUFFER_SIZE: usize = 1024 * 1024;

// ============================================================================
// Sweep Configuration Constants
// ============================================================================
//
// The default sweep writes one file per message count, doubling from 2^4 up
// to 2^24. Every count must be a multiple of SLOTS_PER_BLOCK so that it maps
// onto a whole number of blocks.

/// Smallest message count in the default sweep (2^4)
pub const SWEEP_MIN_EXPONENT: u32 = 4;

/// Largest message count in the default sweep (2^24 = 16,777,216)
pub const SWEEP_MAX_EXPONENT: u32 = 24;

/// Number of files written by the default sweep
pub const SWEEP_LEN: usize = (SWEEP_MAX_EXPONENT - SWEEP_MIN_EXPONENT + 1) as usize;

/// Message counts for the default sweep: 16, 32, 64, ..., 16,777,216
pub const DEFAULT_MESSAGE_COUNTS: [u64; SWEEP_LEN] = {
    let mut counts = [0u64; SWEEP_LEN];
    let mut i = 0;
    while i < SWEEP_LEN {
        counts[i] = 1u64 << (SWEEP_MIN_EXPONENT + i as u32);
        i += 1;
    }
    counts
};

/// Output file name prefix; files are named `input_<n_msg>.dat`
pub const OUTPUT_FILE_PREFIX: &str = "input_";

/// Output file extension
pub const OUTPUT_FILE_EXTENSION: &str = "dat";
