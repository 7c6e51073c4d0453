//! RIFF chunk walking.
//!
//! A RIFF/WAVE file is a 12-byte preamble (`RIFF`, size, `WAVE`) followed by
//! a sequence of chunks, each a 4-byte ASCII id, a little-endian u32 body
//! length and the body itself, padded to an even length.

use byteorder::{ByteOrder, LittleEndian};

use crate::error::{WavError, WavResult};

/// RIFF container id.
pub const RIFF_ID: &[u8; 4] = b"RIFF";

/// WAVE form type.
pub const WAVE_ID: &[u8; 4] = b"WAVE";

/// Format chunk id.
pub const FMT_ID: &[u8; 4] = b"fmt ";

/// Fact chunk id.
pub const FACT_ID: &[u8; 4] = b"fact";

/// Data chunk id.
pub const DATA_ID: &[u8; 4] = b"data";

/// Size of the `RIFF` + size + `WAVE` preamble.
pub const RIFF_PREAMBLE_SIZE: usize = 12;

/// Size of a chunk header (id + length).
pub const CHUNK_HEADER_SIZE: usize = 8;

/// A chunk borrowed from the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Four-character chunk id.
    pub id: [u8; 4],
    /// Absolute offset of the chunk body within the file.
    pub offset: usize,
    /// Chunk body, exactly as long as the declared length.
    pub data: &'a [u8],
}

/// Validates the RIFF/WAVE preamble and returns the declared RIFF size.
pub fn read_preamble(bytes: &[u8]) -> WavResult<u32> {
    if bytes.len() < RIFF_PREAMBLE_SIZE {
        return Err(WavError::Truncated {
            expected: RIFF_PREAMBLE_SIZE,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != RIFF_ID || &bytes[8..12] != WAVE_ID {
        return Err(WavError::InvalidHeader {
            found: String::from_utf8_lossy(&bytes[0..RIFF_PREAMBLE_SIZE]).into_owned(),
        });
    }

    Ok(LittleEndian::read_u32(&bytes[4..8]))
}

/// Iterator over the chunks following the RIFF preamble.
///
/// Yields an error and then stops if a chunk header or body runs past the
/// end of the buffer.
#[derive(Debug, Clone)]
pub struct ChunkIter<'a> {
    bytes: &'a [u8],
    pos: usize,
    done: bool,
}

impl<'a> ChunkIter<'a> {
    /// Walks the chunks of a complete RIFF/WAVE buffer.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            bytes,
            pos: RIFF_PREAMBLE_SIZE,
            done: false,
        }
    }

    fn fail(&mut self, expected: usize) -> Option<WavResult<Chunk<'a>>> {
        self.done = true;
        Some(Err(WavError::Truncated {
            expected,
            actual: self.bytes.len(),
        }))
    }
}

impl<'a> Iterator for ChunkIter<'a> {
    type Item = WavResult<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.pos >= self.bytes.len() {
            return None;
        }

        let header_end = self.pos + CHUNK_HEADER_SIZE;
        if header_end > self.bytes.len() {
            return self.fail(header_end);
        }

        let mut id = [0u8; 4];
        id.copy_from_slice(&self.bytes[self.pos..self.pos + 4]);
        let size = LittleEndian::read_u32(&self.bytes[self.pos + 4..header_end]) as usize;

        let body_end = header_end.saturating_add(size);
        if body_end > self.bytes.len() {
            return self.fail(body_end);
        }

        let chunk = Chunk {
            id,
            offset: header_end,
            data: &self.bytes[header_end..body_end],
        };

        // Word alignment
        self.pos = body_end + (size % 2);

        Some(Ok(chunk))
    }
}
