//! Index file format
//!
//! # File Structure
//!
//! ```text
//! Offset   Size      Type        Description
//! ─────────────────────────────────────────────
//! 0x00     8         [u8; 8]     Magic: "SCIDX001"
//! 0x08     4         u32 LE      D: Dimensions
//! 0x0C     8         u64 LE      N: Number of vectors
//! 0x14     N*(8+D*4) records     id (i64 LE) followed by D f32 LE
//! ```
//!
//! Files are written next to the target and renamed over it, so a reader
//! sees either the previous index or the new one.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use bytes::{Buf, BufMut, BytesMut};
use thiserror::Error;

use crate::domain::cache_entry::CacheEntryId;
use crate::domain::DomainError;

/// Magic bytes identifying an index file
pub const MAGIC: [u8; 8] = *b"SCIDX001";

/// Header size in bytes: 8 (magic) + 4 (dims) + 8 (count)
pub const HEADER_SIZE: usize = 20;

#[derive(Error, Debug)]
pub enum IndexFileError {
    #[error("Invalid magic bytes: expected SCIDX001")]
    InvalidMagic,

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Truncated index file: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl From<IndexFileError> for DomainError {
    fn from(err: IndexFileError) -> Self {
        DomainError::storage(format!("Index file: {}", err))
    }
}

fn record_size(dimensions: usize) -> usize {
    8 + dimensions * std::mem::size_of::<f32>()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Serialize `records` and atomically replace the file at `path`
pub fn write<'a, I>(path: &Path, dimensions: usize, records: I) -> Result<(), IndexFileError>
where
    I: ExactSizeIterator<Item = (CacheEntryId, &'a [f32])>,
{
    let count = records.len();
    let mut buf = BytesMut::with_capacity(HEADER_SIZE + count * record_size(dimensions));

    buf.put_slice(&MAGIC);
    buf.put_u32_le(dimensions as u32);
    buf.put_u64_le(count as u64);

    for (id, vector) in records {
        if vector.len() != dimensions {
            return Err(IndexFileError::DimensionMismatch {
                expected: dimensions,
                actual: vector.len(),
            });
        }

        buf.put_i64_le(id.value());

        for value in vector {
            buf.put_f32_le(*value);
        }
    }

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let tmp = temp_path(path);
    {
        let mut file = File::create(&tmp)?;
        file.write_all(&buf)?;
        file.sync_all()?;
    }
    fs::rename(&tmp, path)?;

    Ok(())
}

/// Parse the file at `path`, checking it holds `dimensions`-long vectors
pub fn read(
    path: &Path,
    dimensions: usize,
) -> Result<Vec<(CacheEntryId, Vec<f32>)>, IndexFileError> {
    let bytes = fs::read(path)?;

    if bytes.len() < HEADER_SIZE {
        return Err(IndexFileError::Truncated {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    let mut cursor = &bytes[..];

    if cursor[..MAGIC.len()] != MAGIC {
        return Err(IndexFileError::InvalidMagic);
    }
    cursor.advance(MAGIC.len());

    let stored_dimensions = cursor.get_u32_le() as usize;
    if stored_dimensions != dimensions {
        return Err(IndexFileError::DimensionMismatch {
            expected: dimensions,
            actual: stored_dimensions,
        });
    }

    let count = cursor.get_u64_le() as usize;
    let expected = count
        .checked_mul(record_size(dimensions))
        .and_then(|body| body.checked_add(HEADER_SIZE))
        .unwrap_or(usize::MAX);

    if bytes.len() != expected {
        return Err(IndexFileError::Truncated {
            expected,
            actual: bytes.len(),
        });
    }

    let mut records = Vec::with_capacity(count);

    for _ in 0..count {
        let id = CacheEntryId::new(cursor.get_i64_le());
        let vector = (0..dimensions).map(|_| cursor.get_f32_le()).collect();
        records.push((id, vector));
    }

    Ok(records)
}
