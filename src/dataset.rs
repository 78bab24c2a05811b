//! Readers for the benchmark input formats.
//!
//! All layouts are little-endian and fixed by the surrounding benchmark
//! tooling, so they must round-trip exactly:
//!
//! - `.bin`: i32 count, i32 dimension, then `count * dim` f32, row-major
//! - `.fvecs`: per record an i32 dimension prefix followed by that many f32
//! - `.ivecs`: per record an i32 count prefix followed by that many i32 ids
//! - attributes: one signed integer per line, plain text
//! - ranges: one `low-high` pair per line, single `-` delimiter

use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::Path;

use crate::error::{HarnessError, Result};

/// A loaded set of same-dimensional vectors.
#[derive(Debug, Clone)]
pub struct VectorSet {
    pub vectors: Vec<Vec<f32>>,
    pub dim: usize,
}

impl VectorSet {
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }
}

fn io_err(path: &Path, source: io::Error) -> HarnessError {
    HarnessError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn read_i32<R: Read>(reader: &mut R, path: &Path) -> Result<i32> {
    let mut buf = [0u8; 4];
    reader
        .read_exact(&mut buf)
        .map_err(|e| io_err(path, e))?;
    Ok(i32::from_le_bytes(buf))
}

/// Read a `.bin` dataset: header (count, dim), then flat row-major f32 data.
pub fn read_bin(path: &Path) -> Result<VectorSet> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut reader = BufReader::new(file);

    let count = read_i32(&mut reader, path)?;
    let dim = read_i32(&mut reader, path)?;
    if count < 0 || dim < 0 {
        return Err(HarnessError::Parse {
            what: "vector dataset header",
            path: path.to_path_buf(),
            detail: format!("negative count or dimension ({count}, {dim})"),
        });
    }
    let (count, dim) = (count as usize, dim as usize);

    let mut vectors = Vec::with_capacity(count);
    let mut row = vec![0u8; dim * 4];
    for _ in 0..count {
        reader.read_exact(&mut row).map_err(|e| io_err(path, e))?;
        let vector: Vec<f32> = row
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        vectors.push(vector);
    }

    Ok(VectorSet { vectors, dim })
}

/// Read an `.fvecs` file: dimension-prefixed float records until EOF.
pub fn read_fvecs(path: &Path) -> Result<VectorSet> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut reader = BufReader::new(file);

    let mut vectors: Vec<Vec<f32>> = Vec::new();
    let mut dimension = 0usize;

    loop {
        let mut dim_bytes = [0u8; 4];
        match reader.read_exact(&mut dim_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(io_err(path, e)),
        }
        let dim = i32::from_le_bytes(dim_bytes);
        if dim <= 0 {
            return Err(HarnessError::Parse {
                what: "fvecs record",
                path: path.to_path_buf(),
                detail: format!("record {} has dimension {dim}", vectors.len()),
            });
        }
        let dim = dim as usize;
        if dimension == 0 {
            dimension = dim;
        } else if dim != dimension {
            return Err(HarnessError::Parse {
                what: "fvecs record",
                path: path.to_path_buf(),
                detail: format!(
                    "record {} has dimension {dim}, expected {dimension}",
                    vectors.len()
                ),
            });
        }

        let mut data = vec![0u8; dim * 4];
        reader.read_exact(&mut data).map_err(|e| io_err(path, e))?;
        let vector: Vec<f32> = data
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        vectors.push(vector);
    }

    Ok(VectorSet {
        vectors,
        dim: dimension,
    })
}

/// Read an `.ivecs` groundtruth file: count-prefixed id records until EOF.
pub fn read_ivecs(path: &Path) -> Result<Vec<Vec<u32>>> {
    let file = File::open(path).map_err(|e| io_err(path, e))?;
    let mut reader = BufReader::new(file);

    let mut rows: Vec<Vec<u32>> = Vec::new();
    loop {
        let mut count_bytes = [0u8; 4];
        match reader.read_exact(&mut count_bytes) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => break,
            Err(e) => return Err(io_err(path, e)),
        }
        let count = i32::from_le_bytes(count_bytes);
        if count < 0 {
            return Err(HarnessError::Parse {
                what: "ivecs record",
                path: path.to_path_buf(),
                detail: format!("record {} has count {count}", rows.len()),
            });
        }

        let mut data = vec![0u8; count as usize * 4];
        reader.read_exact(&mut data).map_err(|e| io_err(path, e))?;
        let ids: Vec<u32> = data
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as u32)
            .collect();
        rows.push(ids);
    }

    Ok(rows)
}

/// Read attribute values, one signed integer per line.
pub fn read_attributes(path: &Path) -> Result<Vec<i64>> {
    let content = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut values = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let value = trimmed.parse::<i64>().map_err(|_| HarnessError::Parse {
            what: "attribute value",
            path: path.to_path_buf(),
            detail: format!("line {}: {trimmed:?} is not an integer", idx + 1),
        })?;
        values.push(value);
    }
    Ok(values)
}

/// Read query ranges, one `low-high` pair per line.
pub fn read_ranges(path: &Path) -> Result<Vec<(i64, i64)>> {
    let content = fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    let mut ranges = Vec::new();
    for (idx, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let parsed = trimmed.split_once('-').and_then(|(low, high)| {
            let low = low.trim().parse::<i64>().ok()?;
            let high = high.trim().parse::<i64>().ok()?;
            Some((low, high))
        });
        match parsed {
            Some(pair) => ranges.push(pair),
            None => {
                return Err(HarnessError::Parse {
                    what: "query range",
                    path: path.to_path_buf(),
                    detail: format!("line {}: expected low-high, got {trimmed:?}", idx + 1),
                })
            }
        }
    }
    Ok(ranges)
}
