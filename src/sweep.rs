// src/sweep.rs
//
// Sweep driver: one input file per target message count.

use anyhow::{Context, Result};
use rand_chacha::rand_core::RngCore;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::constants::{OUTPUT_FILE_EXTENSION, OUTPUT_FILE_PREFIX, SLOTS_PER_BLOCK};
use crate::data_gen::BlockGenerator;
use crate::progress::ProgressOptions;
use crate::writer::{write_input_file, WriteSummary};

/// Number of blocks needed to carry `n_msg` messages (four per block).
pub fn blocks_for_messages(n_msg: u64) -> u64 {
    n_msg / SLOTS_PER_BLOCK as u64
}

/// File name for a given message count: `input_<n_msg>.dat`.
pub fn input_filename(n_msg: u64) -> String {
    format!("{OUTPUT_FILE_PREFIX}{n_msg}.{OUTPUT_FILE_EXTENSION}")
}

/// Write the file for a single message count into `output_dir`.
pub fn generate_for_messages<R: RngCore>(
    output_dir: &Path,
    n_msg: u64,
    generator: &mut BlockGenerator<R>,
    progress: ProgressOptions,
) -> Result<WriteSummary> {
    let num_blocks = blocks_for_messages(n_msg);
    let filename = input_filename(n_msg);
    let path = output_dir.join(&filename);

    info!(
        "Generating {} with {} blocks ({} messages)",
        filename, num_blocks, n_msg
    );
    let summary = write_input_file(&path, num_blocks, generator, progress)?;
    info!("Finished {}", filename);
    Ok(summary)
}

/// Run every entry of `config.message_counts` in order.
///
/// The first failure aborts the remaining entries; files already written stay.
pub fn run_sweep<R: RngCore>(
    config: &Config,
    generator: &mut BlockGenerator<R>,
) -> Result<Vec<WriteSummary>> {
    config.validate()?;
    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!(
            "failed to create output directory {}",
            config.output_dir.display()
        )
    })?;

    let mut summaries = Vec::with_capacity(config.message_counts.len());
    for &n_msg in &config.message_counts {
        let summary =
            generate_for_messages(&config.output_dir, n_msg, generator, config.progress)?;
        summaries.push(summary);
    }
    Ok(summaries)
}
