// src/lib.rs
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
//
// Crate root: quad-block input file generation for the message hashing pipeline.

pub mod constants;
pub mod error;
pub mod block;
pub mod data_gen;
pub mod progress;
pub mod writer;
pub mod reader;
pub mod config;
pub mod sweep;

// ===== Re-exports for the CLI and integration tests =====
pub use block::{slot_offset, Block, Slot};
pub use config::Config;
pub use data_gen::{generate_block, BlockGenerator};
pub use error::LayoutError;
pub use progress::{ProgressOptions, ProgressReporter};
pub use reader::{
    parse_blocks, read_blocks, read_head, read_messages, verify_file, InspectReport, VerifyReport,
};
pub use sweep::{blocks_for_messages, generate_for_messages, input_filename, run_sweep};
pub use writer::{write_blocks, write_input_file, WriteStats, WriteSummary};
