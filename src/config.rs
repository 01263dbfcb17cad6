// src/config.rs
//
// Runtime parameters for a generation run.

use anyhow::{bail, Result};
use std::path::PathBuf;

use crate::constants::{
    DEFAULT_MESSAGE_COUNTS, DEFAULT_MESSAGE_LEN, MAX_MESSAGE_LEN, SLOTS_PER_BLOCK,
};
use crate::progress::ProgressOptions;

/// Runtime parameters used by `sweep` and the CLI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub output_dir:     PathBuf,      // where input_<n>.dat files land
    pub seed:           Option<u64>,  // None => system entropy
    pub message_len:    usize,        // bytes of payload per slot
    pub message_counts: Vec<u64>,     // one output file per entry, in order

    // ---- progress knobs ----
    pub progress:       ProgressOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            seed: None,
            message_len: DEFAULT_MESSAGE_LEN as usize,
            message_counts: DEFAULT_MESSAGE_COUNTS.to_vec(),
            progress: ProgressOptions::default(),
        }
    }
}

impl Config {
    /// Drop sweep entries above `max_messages`.
    pub fn with_max_messages(mut self, max_messages: u64) -> Self {
        self.message_counts.retain(|n| *n <= max_messages);
        self
    }

    /// Reject settings that cannot produce a well-formed file.
    pub fn validate(&self) -> Result<()> {
        if self.message_len == 0 || self.message_len > MAX_MESSAGE_LEN {
            bail!(
                "message length {} is outside 1..={}",
                self.message_len,
                MAX_MESSAGE_LEN
            );
        }
        if self.progress.interval == 0 {
            bail!("progress interval must be greater than zero");
        }
        for n in &self.message_counts {
            if *n == 0 || *n % SLOTS_PER_BLOCK as u64 != 0 {
                bail!(
                    "message count {} must be a positive multiple of {}",
                    n,
                    SLOTS_PER_BLOCK
                );
            }
        }
        Ok(())
    }
}
