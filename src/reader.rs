// src/reader.rs
//
// Reading input files back and checking their block layout.

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::block::Block;
use crate::constants::{BLOCK_SIZE, DEFAULT_WRITE_BUFFER_SIZE, SLOTS_PER_BLOCK};
use crate::error::LayoutError;

/// Result of a successful layout check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyReport {
    pub path: PathBuf,
    pub blocks: u64,
    pub messages: u64,
    pub bytes: u64,
}

/// Split a byte stream into blocks. The length must be a multiple of 128.
pub fn parse_blocks(data: &[u8]) -> Result<Vec<Block>, LayoutError> {
    if data.len() % BLOCK_SIZE != 0 {
        return Err(LayoutError::TruncatedInput(data.len()));
    }
    data.chunks_exact(BLOCK_SIZE).map(Block::from_slice).collect()
}

/// Validate every block of an already-parsed stream.
pub fn validate_blocks(blocks: &[Block], expected_len: Option<u8>) -> Result<(), LayoutError> {
    for (i, block) in blocks.iter().enumerate() {
        block
            .validate(expected_len)
            .map_err(|e| e.at_block(i as u64))?;
    }
    Ok(())
}

/// Read a whole input file into blocks.
pub fn read_blocks(path: impl AsRef<Path>) -> Result<Vec<Block>> {
    let path = path.as_ref();
    let data = std::fs::read(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let blocks = parse_blocks(&data).with_context(|| format!("bad layout in {}", path.display()))?;
    Ok(blocks)
}

/// Every message in the file, in block order and logical slot order 0..4.
pub fn read_messages(path: impl AsRef<Path>) -> Result<Vec<Vec<u8>>> {
    let blocks = read_blocks(path)?;
    let mut messages = Vec::with_capacity(blocks.len() * SLOTS_PER_BLOCK);
    for block in &blocks {
        messages.extend(block.slots().map(|slot| slot.message().to_vec()));
    }
    Ok(messages)
}

/// Stream through `path` one block at a time and validate each one.
///
/// When `expected_len` is given every slot's length byte must equal it.
pub fn verify_file(path: impl AsRef<Path>, expected_len: Option<u8>) -> Result<VerifyReport> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let bytes = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    if bytes % BLOCK_SIZE as u64 != 0 {
        return Err(LayoutError::TruncatedInput(bytes as usize))
            .with_context(|| format!("bad layout in {}", path.display()));
    }

    let blocks = bytes / BLOCK_SIZE as u64;
    let mut reader = BufReader::with_capacity(DEFAULT_WRITE_BUFFER_SIZE, file);
    let mut buf = [0u8; BLOCK_SIZE];
    for i in 0..blocks {
        reader
            .read_exact(&mut buf)
            .with_context(|| format!("failed reading block {} of {}", i, path.display()))?;
        Block::from_slice(&buf)
            .and_then(|block| block.validate(expected_len))
            .map_err(|e| e.at_block(i))
            .with_context(|| format!("bad layout in {}", path.display()))?;
    }

    debug!("Verified {} blocks in {}", blocks, path.display());
    Ok(VerifyReport {
        path: path.to_path_buf(),
        blocks,
        messages: blocks * SLOTS_PER_BLOCK as u64,
        bytes,
    })
}

/// The first few blocks of a file, read without loading the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectReport {
    pub path: PathBuf,
    /// Whole blocks in the file, from its length
    pub total_blocks: u64,
    /// Bytes past the last whole block
    pub trailing_bytes: u64,
    pub blocks: Vec<Block>,
}

/// Read at most `count` blocks from the start of `path`, one block at a time.
///
/// Memory use is bounded by `count`, not by the file size.
pub fn read_head(path: impl AsRef<Path>, count: usize) -> Result<InspectReport> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let len = file
        .metadata()
        .with_context(|| format!("failed to stat {}", path.display()))?
        .len();
    let total_blocks = len / BLOCK_SIZE as u64;
    let wanted = total_blocks.min(count as u64);

    let mut reader = BufReader::new(file);
    let mut buf = [0u8; BLOCK_SIZE];
    let mut blocks = Vec::with_capacity(wanted as usize);
    for i in 0..wanted {
        reader
            .read_exact(&mut buf)
            .with_context(|| format!("failed reading block {} of {}", i, path.display()))?;
        blocks.push(Block::from_slice(&buf)?);
    }

    Ok(InspectReport {
        path: path.to_path_buf(),
        total_blocks,
        trailing_bytes: len % BLOCK_SIZE as u64,
        blocks,
    })
}

impl std::fmt::Display for InspectReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} blocks", self.path.display(), self.total_blocks)?;
        if self.trailing_bytes > 0 {
            write!(f, " (+{} trailing bytes)", self.trailing_bytes)?;
        }
        for (i, block) in self.blocks.iter().enumerate() {
            write!(f, "\nblock {}", i)?;
            for slot in block.slots() {
                let hex: String = slot.message().iter().map(|b| format!("{:02x}", b)).collect();
                write!(
                    f,
                    "\n  slot {} @ {:>3}  len {:>2}  msg {}",
                    slot.index(),
                    slot.offset(),
                    slot.length(),
                    hex
                )?;
            }
        }
        Ok(())
    }
}
