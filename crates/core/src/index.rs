use crate::error::StoreError;
use std::io::{self, Read, Write};

const MAGIC: [u8; 4] = *b"PRIX";
const FORMAT_VERSION: u32 = 1;
const READ_CHUNK: usize = 1 << 20;

/// Exact flat index: squared Euclidean distance over raw vectors at both
/// build and query time. On-disk layout (little-endian): `PRIX` magic,
/// format version (u32), dimensions (u32), vector count (u64), then
/// row-major f32 data.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimensions: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions,
            data: Vec::new(),
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        if self.dimensions == 0 {
            0
        } else {
            self.data.len() / self.dimensions
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn add(&mut self, vectors: &[Vec<f32>]) -> Result<(), StoreError> {
        for vector in vectors {
            if vector.len() != self.dimensions {
                return Err(StoreError::DimensionMismatch {
                    expected: self.dimensions,
                    actual: vector.len(),
                });
            }
        }

        for vector in vectors {
            self.data.extend_from_slice(vector);
        }

        Ok(())
    }

    /// Up to `k` `(position, squared distance)` pairs, ascending distance.
    pub fn search(&self, query: &[f32], k: usize) -> Vec<(usize, f32)> {
        if k == 0 || self.is_empty() {
            return Vec::new();
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, row)| {
                let distance = row
                    .iter()
                    .zip(query.iter())
                    .map(|(stored, queried)| {
                        let delta = stored - queried;
                        delta * delta
                    })
                    .sum::<f32>();
                (position, distance)
            })
            .collect();

        scored.sort_by(|left, right| {
            left.1
                .total_cmp(&right.1)
                .then_with(|| left.0.cmp(&right.0))
        });
        scored.truncate(k);
        scored
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&MAGIC)?;
        writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
        writer.write_all(&(self.dimensions as u32).to_le_bytes())?;
        writer.write_all(&(self.len() as u64).to_le_bytes())?;

        for value in &self.data {
            writer.write_all(&value.to_le_bytes())?;
        }

        Ok(())
    }

    pub fn read_from<R: Read>(reader: &mut R) -> Result<Self, StoreError> {
        let magic: [u8; 4] = read_array(reader)?;
        if magic != MAGIC {
            return Err(StoreError::CorpusCorrupt(
                "index file has wrong magic bytes".to_string(),
            ));
        }

        let version = u32::from_le_bytes(read_array(reader)?);
        if version != FORMAT_VERSION {
            return Err(StoreError::CorpusCorrupt(format!(
                "unsupported index format version {version}"
            )));
        }

        let dimensions = u32::from_le_bytes(read_array(reader)?) as usize;
        let count = u64::from_le_bytes(read_array(reader)?) as usize;

        if dimensions == 0 && count > 0 {
            return Err(StoreError::CorpusCorrupt(
                "index claims vectors of zero dimensionality".to_string(),
            ));
        }

        let byte_count = count
            .checked_mul(dimensions)
            .and_then(|values| values.checked_mul(4))
            .ok_or_else(|| {
                StoreError::CorpusCorrupt("index header sizes overflow".to_string())
            })?;

        // Read the payload in capped slices so a header claiming a huge
        // vector count fails as corrupt input, not as a giant allocation.
        let mut raw = Vec::new();
        let mut buffer = vec![0u8; byte_count.min(READ_CHUNK)];
        let mut remaining = byte_count;
        while remaining > 0 {
            let take = remaining.min(buffer.len());
            read_into(reader, &mut buffer[..take])?;
            raw.extend_from_slice(&buffer[..take]);
            remaining -= take;
        }

        let data = raw
            .chunks_exact(4)
            .map(|bytes| f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
            .collect();

        Ok(Self { dimensions, data })
    }
}

fn read_array<const N: usize, R: Read>(reader: &mut R) -> Result<[u8; N], StoreError> {
    let mut buffer = [0u8; N];
    read_into(reader, &mut buffer)?;
    Ok(buffer)
}

fn read_into<R: Read>(reader: &mut R, buffer: &mut [u8]) -> Result<(), StoreError> {
    reader.read_exact(buffer).map_err(|error| {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            StoreError::CorpusCorrupt("index file is truncated".to_string())
        } else {
            StoreError::Io(error)
        }
    })
}
