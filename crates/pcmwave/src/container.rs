//! The in-memory WAV container and its payload stream.

use std::io;

use crate::format::{FormatTag, WaveFormat};
use crate::params::WaveParams;

/// Outcome of a single [`WaveContainer::read_payload`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadRead {
    /// Number of bytes copied into the caller's buffer.
    pub bytes: usize,
    /// True if the request reached past the end of the payload.
    pub end_of_data: bool,
}

/// WAV metadata plus the raw interleaved PCM payload.
///
/// The data size is always the payload length; appending is the only way
/// to grow the payload and nothing shrinks it. Reads walk an internal
/// cursor and never modify the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveContainer {
    format: WaveFormat,
    channels: u16,
    samples_per_sec: u32,
    avg_bytes_per_sec: u32,
    block_align: u16,
    bits_per_sample: u16,
    payload: Vec<u8>,
    cursor: usize,
}

impl WaveContainer {
    /// Creates an empty container.
    ///
    /// Block align and byte rate are derived from the arguments, and bit
    /// depths above 16 select the extensible layout.
    pub fn new(sample_rate: u32, bits_per_sample: u16, channels: u16) -> Self {
        Self::from_params(&WaveParams::new(sample_rate, bits_per_sample, channels))
    }

    /// Creates an empty container from a parameter block.
    pub fn from_params(params: &WaveParams) -> Self {
        Self {
            format: WaveFormat::for_params(params.bits_per_sample, params.channels),
            channels: params.channels,
            samples_per_sec: params.sample_rate,
            avg_bytes_per_sec: params.avg_bytes_per_sec(),
            block_align: params.block_align(),
            bits_per_sample: params.bits_per_sample,
            payload: Vec::new(),
            cursor: 0,
        }
    }

    /// Assembles a container from header fields that were read from a file.
    pub(crate) fn from_parts(
        format: WaveFormat,
        channels: u16,
        samples_per_sec: u32,
        avg_bytes_per_sec: u32,
        block_align: u16,
        bits_per_sample: u16,
        payload: Vec<u8>,
    ) -> Self {
        Self {
            format,
            channels,
            samples_per_sec,
            avg_bytes_per_sec,
            block_align,
            bits_per_sample,
            payload,
            cursor: 0,
        }
    }

    /// Header layout and its layout-specific fields.
    pub fn format(&self) -> &WaveFormat {
        &self.format
    }

    /// Format tag written to the `fmt ` chunk.
    pub fn format_tag(&self) -> FormatTag {
        self.format.tag()
    }

    /// Number of interleaved channels.
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.samples_per_sec
    }

    /// Byte rate as stored in the header.
    pub fn avg_bytes_per_sec(&self) -> u32 {
        self.avg_bytes_per_sec
    }

    /// Bytes per sample frame as stored in the header.
    pub fn block_align(&self) -> u16 {
        self.block_align
    }

    /// Bits per sample.
    pub fn bits_per_sample(&self) -> u16 {
        self.bits_per_sample
    }

    /// Payload length in bytes, as written to the `data` chunk header.
    ///
    /// Saturates at `u32::MAX`; RIFF cannot describe larger payloads.
    pub fn data_size(&self) -> u32 {
        u32::try_from(self.payload.len()).unwrap_or(u32::MAX)
    }

    /// Number of whole sample frames in the payload.
    pub fn sample_frames(&self) -> u32 {
        match self.block_align {
            0 => 0,
            align => self.data_size() / align as u32,
        }
    }

    /// Playback length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.samples_per_sec == 0 {
            return 0.0;
        }
        self.sample_frames() as f64 / self.samples_per_sec as f64
    }

    /// Raw payload bytes.
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Consumes the container, returning the payload.
    pub fn into_payload(self) -> Vec<u8> {
        self.payload
    }

    /// Current read position within the payload.
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }

    /// Moves the read cursor back to the start of the payload.
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }

    /// Copies payload bytes at the cursor into `buf` and advances the cursor.
    ///
    /// When fewer than `buf.len()` bytes remain, copies what is left and
    /// sets `end_of_data`. Once exhausted, every call copies nothing and
    /// reports `end_of_data`.
    pub fn read_payload(&mut self, buf: &mut [u8]) -> PayloadRead {
        let available = self.remaining();
        let n = buf.len().min(available);

        buf[..n].copy_from_slice(&self.payload[self.cursor..self.cursor + n]);
        self.cursor += n;

        PayloadRead {
            bytes: n,
            end_of_data: buf.len() > available,
        }
    }

    /// Appends bytes to the payload, returning how many were appended.
    ///
    /// Appending is never refused, but a WAV file cannot describe more than
    /// `u32::MAX` bytes of payload; past that [`data_size`](Self::data_size)
    /// saturates and serialized size fields stop matching the file.
    pub fn append(&mut self, bytes: &[u8]) -> usize {
        self.payload.extend_from_slice(bytes);
        bytes.len()
    }

    /// BLAKE3 hex digest of the payload, independent of the header layout.
    pub fn pcm_hash(&self) -> String {
        blake3::hash(&self.payload).to_hex().to_string()
    }
}

impl io::Read for WaveContainer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.read_payload(buf).bytes)
    }
}

impl io::Write for WaveContainer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(self.append(buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
