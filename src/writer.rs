// src/writer.rs
//
// File writer: streams generated blocks into an output file.

use anyhow::{Context, Result};
use rand_chacha::rand_core::RngCore;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::constants::{BLOCK_SIZE, DEFAULT_WRITE_BUFFER_SIZE};
use crate::data_gen::BlockGenerator;
use crate::progress::{ProgressOptions, ProgressReporter};

/// Outcome of writing one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteSummary {
    pub path: PathBuf,
    pub blocks: u64,
    pub bytes: u64,
    /// Progress lines emitted while writing
    pub progress_reports: usize,
    pub elapsed: Duration,
}

/// Byte count and progress points of one `write_blocks` call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteStats {
    pub bytes: u64,
    /// Block indices at which a progress line was emitted
    pub report_points: Vec<u64>,
}

/// Write `num_blocks` freshly generated blocks to `sink`, one after another.
///
/// Each block is generated, written and dropped before the next one is built.
/// The progress check for block `i` runs after that block is written.
pub fn write_blocks<W, R>(
    sink: &mut W,
    num_blocks: u64,
    generator: &mut BlockGenerator<R>,
    progress: &ProgressReporter,
) -> std::io::Result<WriteStats>
where
    W: Write + ?Sized,
    R: RngCore,
{
    let mut report_points = Vec::new();
    for i in 0..num_blocks {
        let block = generator.generate_block();
        sink.write_all(block.as_bytes())?;
        if progress.block_written(i) {
            report_points.push(i);
        }
    }
    Ok(WriteStats {
        bytes: num_blocks * BLOCK_SIZE as u64,
        report_points,
    })
}

/// Create (or truncate) `path` and fill it with `num_blocks` blocks.
///
/// On success the file is exactly `num_blocks * 128` bytes. Any open, write
/// or flush failure is returned with the path attached; a partially written
/// file is left in place.
pub fn write_input_file<R: RngCore>(
    path: impl AsRef<Path>,
    num_blocks: u64,
    generator: &mut BlockGenerator<R>,
    progress: ProgressOptions,
) -> Result<WriteSummary> {
    let path = path.as_ref();
    let label = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let start = Instant::now();
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut sink = BufWriter::with_capacity(DEFAULT_WRITE_BUFFER_SIZE, file);

    let reporter = ProgressReporter::new(&label, num_blocks, progress);
    let stats = write_blocks(&mut sink, num_blocks, generator, &reporter)
        .with_context(|| format!("failed writing blocks to {}", path.display()))?;
    let bytes = stats.bytes;
    sink.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;
    drop(sink);

    let elapsed = start.elapsed();
    reporter.finish(&label, bytes, elapsed);
    debug!("Wrote {} blocks ({} bytes) to {}", num_blocks, bytes, path.display());

    Ok(WriteSummary {
        path: path.to_path_buf(),
        blocks: num_blocks,
        bytes,
        progress_reports: stats.report_points.len(),
        elapsed,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Block;
    use std::io;

    #[test]
    fn test_write_blocks_in_memory() {
        let mut generator = BlockGenerator::new_with_seed(42);
        let mut buf = Vec::new();
        let stats = write_blocks(&mut buf, 8, &mut generator, &ProgressReporter::quiet(100_000)).unwrap();
        assert_eq!(stats.bytes, 8 * 128);
        assert!(stats.report_points.is_empty());
        assert_eq!(buf.len(), 1024);

        let mut replay = BlockGenerator::new_with_seed(42);
        for chunk in buf.chunks(BLOCK_SIZE) {
            assert_eq!(Block::from_slice(chunk).unwrap(), replay.generate_block());
        }
    }

    #[test]
    fn test_zero_blocks_writes_nothing() {
        let mut generator = BlockGenerator::new_with_seed(1);
        let mut buf = Vec::new();
        let stats = write_blocks(&mut buf, 0, &mut generator, &ProgressReporter::quiet(1)).unwrap();
        assert_eq!(stats, WriteStats::default());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_progress_fires_after_each_interval_block() {
        let mut generator = BlockGenerator::new_with_seed(6);
        let mut buf = Vec::new();
        let stats = write_blocks(&mut buf, 25, &mut generator, &ProgressReporter::quiet(5)).unwrap();
        // block 0 never reports, and the last block (24) is not on the interval
        assert_eq!(stats.report_points, vec![5, 10, 15, 20]);

        let mut buf = Vec::new();
        let stats = write_blocks(&mut buf, 21, &mut generator, &ProgressReporter::quiet(5)).unwrap();
        assert_eq!(stats.report_points, vec![5, 10, 15, 20]);
    }

    /// Sink that accepts a fixed number of bytes and then fails
    struct FailingSink {
        remaining: usize,
    }

    impl Write for FailingSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.remaining == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "disk full"));
            }
            let n = buf.len().min(self.remaining);
            self.remaining -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_error_propagates() {
        let mut generator = BlockGenerator::new_with_seed(1);
        let mut sink = FailingSink { remaining: 300 };
        let err = write_blocks(&mut sink, 4, &mut generator, &ProgressReporter::quiet(1)).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
        assert_eq!(sink.remaining, 0);
    }
}
