//! WAV parsing.
//!
//! Chunks are located by tag rather than by fixed offset, so files carrying
//! extra chunks (LIST, cue, ...) parse as long as `fmt ` and `data` exist.
//! For the layouts this crate writes, the fields land at the canonical
//! offsets: format tag at 20, PCM payload at 44, extensible payload at 80.
//!
//! The compact extensible layout declares a `fmt ` size that overruns the
//! chunks after it, so it is recognized up front and read at fixed offsets
//! instead: data size at 76, payload at 80.

use std::fs;
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian};

use crate::container::WaveContainer;
use crate::error::{WavError, WavResult};
use crate::format::{
    ExtensibleFormat, ExtensibleLayout, FormatTag, WaveFormat, COMPACT_FMT_CHUNK_SIZE,
    EXTENSIBLE_CB_SIZE, EXTENSIBLE_HEADER_SIZE, WAVE_FORMAT_EXTENSIBLE,
};
use crate::riff::{
    read_preamble, ChunkIter, CHUNK_HEADER_SIZE, DATA_ID, FACT_ID, FMT_ID, RIFF_PREAMBLE_SIZE,
};

/// Minimum `fmt ` body: tag, channels, rate, byte rate, block align, bits.
const FMT_BASE_SIZE: usize = 16;

/// Minimum extensible `fmt ` body: base fields, cbSize and a 22-byte extension.
const FMT_EXTENSIBLE_SIZE: usize = FMT_BASE_SIZE + 2 + EXTENSIBLE_CB_SIZE as usize;

/// Start of the `fmt ` body in a file whose first chunk is `fmt `.
const FMT_BODY_OFFSET: usize = RIFF_PREAMBLE_SIZE + CHUNK_HEADER_SIZE;

/// Position of the `data` chunk header in the compact extensible layout.
const COMPACT_DATA_OFFSET: usize = 72;

/// Header fields decoded from a `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FmtChunk {
    format: WaveFormat,
    channels: u16,
    samples_per_sec: u32,
    avg_bytes_per_sec: u32,
    block_align: u16,
    bits_per_sample: u16,
}

impl FmtChunk {
    /// Reads the fields shared by every layout from a `fmt ` body of at
    /// least [`FMT_BASE_SIZE`] bytes.
    fn with_base_fields(format: WaveFormat, data: &[u8]) -> Self {
        Self {
            format,
            channels: LittleEndian::read_u16(&data[2..4]),
            samples_per_sec: LittleEndian::read_u32(&data[4..8]),
            avg_bytes_per_sec: LittleEndian::read_u32(&data[8..12]),
            block_align: LittleEndian::read_u16(&data[12..14]),
            bits_per_sample: LittleEndian::read_u16(&data[14..16]),
        }
    }
}

fn parse_fmt(data: &[u8]) -> WavResult<FmtChunk> {
    if data.len() < 2 {
        return Err(WavError::malformed_chunk(
            FMT_ID,
            format!("{} bytes is too short for a format tag", data.len()),
        ));
    }

    let raw_tag = LittleEndian::read_u16(&data[0..2]);
    let tag = FormatTag::from_u16(raw_tag).ok_or(WavError::UnrecognizedFormat { tag: raw_tag })?;

    if data.len() < FMT_BASE_SIZE {
        return Err(WavError::malformed_chunk(
            FMT_ID,
            format!("expected at least {} bytes, found {}", FMT_BASE_SIZE, data.len()),
        ));
    }

    let format = match tag {
        FormatTag::Pcm => WaveFormat::Pcm,
        FormatTag::Extensible => WaveFormat::Extensible(parse_extension(data)?),
    };

    Ok(FmtChunk::with_base_fields(format, data))
}

fn parse_extension(data: &[u8]) -> WavResult<ExtensibleFormat> {
    if data.len() < FMT_EXTENSIBLE_SIZE {
        return Err(WavError::malformed_chunk(
            FMT_ID,
            format!(
                "extensible format needs {} bytes, found {}",
                FMT_EXTENSIBLE_SIZE,
                data.len()
            ),
        ));
    }

    let cb_size = LittleEndian::read_u16(&data[16..18]);
    if cb_size < EXTENSIBLE_CB_SIZE {
        return Err(WavError::malformed_chunk(
            FMT_ID,
            format!("extension size {} is below {}", cb_size, EXTENSIBLE_CB_SIZE),
        ));
    }

    let mut sub_format = [0u8; 16];
    sub_format.copy_from_slice(&data[24..40]);

    let ext = ExtensibleFormat {
        valid_bits_per_sample: LittleEndian::read_u16(&data[18..20]),
        channel_mask: LittleEndian::read_u32(&data[20..24]),
        sub_format,
        layout: ExtensibleLayout::Standard,
    };
    log_sub_format(&ext);
    Ok(ext)
}

fn log_sub_format(ext: &ExtensibleFormat) {
    if !ext.is_pcm() {
        tracing::debug!("Extensible sub-format {:02X?} is not integer PCM", ext.sub_format);
    }
}

/// True for extensible files whose `fmt ` chunk declares the compact size
/// while `data` sits where the compact layout puts it.
fn is_compact_extensible(bytes: &[u8]) -> bool {
    bytes.len() >= FMT_BODY_OFFSET + 2
        && &bytes[12..16] == FMT_ID
        && LittleEndian::read_u32(&bytes[16..20]) == COMPACT_FMT_CHUNK_SIZE
        && LittleEndian::read_u16(&bytes[20..22]) == WAVE_FORMAT_EXTENSIBLE
        && bytes.get(COMPACT_DATA_OFFSET..COMPACT_DATA_OFFSET + 4) == Some(&DATA_ID[..])
}

/// Reads a compact extensible file at fixed offsets.
fn read_compact_extensible(bytes: &[u8]) -> WavResult<(FmtChunk, &[u8])> {
    if bytes.len() < EXTENSIBLE_HEADER_SIZE {
        return Err(WavError::Truncated {
            expected: EXTENSIBLE_HEADER_SIZE,
            actual: bytes.len(),
        });
    }

    // Offsets below are relative to the fmt body at 20.
    let body = &bytes[FMT_BODY_OFFSET..COMPACT_DATA_OFFSET];
    let mut sub_format = [0u8; 16];
    sub_format.copy_from_slice(&body[28..44]);

    let ext = ExtensibleFormat {
        valid_bits_per_sample: LittleEndian::read_u16(&body[20..22]),
        channel_mask: u32::from(LittleEndian::read_u16(&body[26..28])),
        sub_format,
        layout: ExtensibleLayout::Compact,
    };
    log_sub_format(&ext);

    let data_size = LittleEndian::read_u32(&bytes[76..80]) as usize;
    let end = EXTENSIBLE_HEADER_SIZE.saturating_add(data_size);
    if end > bytes.len() {
        return Err(WavError::Truncated {
            expected: end,
            actual: bytes.len(),
        });
    }

    let fmt = FmtChunk::with_base_fields(WaveFormat::Extensible(ext), body);
    Ok((fmt, &bytes[EXTENSIBLE_HEADER_SIZE..end]))
}

/// Walks the chunk list for the first `fmt ` and `data` chunks.
fn walk_chunks(bytes: &[u8]) -> WavResult<(FmtChunk, &[u8])> {
    let mut fmt: Option<FmtChunk> = None;
    let mut payload: Option<&[u8]> = None;

    for chunk in ChunkIter::new(bytes) {
        let chunk = chunk?;
        match &chunk.id {
            FMT_ID if fmt.is_none() => fmt = Some(parse_fmt(chunk.data)?),
            DATA_ID if payload.is_none() => payload = Some(chunk.data),
            FACT_ID => {
                tracing::debug!("Ignoring fact chunk at offset {}", chunk.offset);
            }
            other => {
                tracing::debug!(
                    "Skipping '{}' chunk ({} bytes) at offset {}",
                    String::from_utf8_lossy(other),
                    chunk.data.len(),
                    chunk.offset
                );
            }
        }
        if fmt.is_some() && payload.is_some() {
            break;
        }
    }

    let fmt = fmt.ok_or_else(|| WavError::missing_chunk(FMT_ID))?;
    let payload = payload.ok_or_else(|| WavError::missing_chunk(DATA_ID))?;
    Ok((fmt, payload))
}

/// Parses a complete WAV file held in memory.
///
/// # Errors
/// * [`WavError::UnrecognizedFormat`] - format tag is neither PCM nor extensible
/// * [`WavError::Truncated`] - a chunk or the payload runs past the end of `bytes`
/// * [`WavError::InvalidHeader`] - missing `RIFF`/`WAVE` magic
/// * [`WavError::MissingChunk`] - no `fmt ` or `data` chunk
/// * [`WavError::MalformedChunk`] - `fmt ` chunk too short for its format
pub fn parse_wav(bytes: &[u8]) -> WavResult<WaveContainer> {
    let riff_size = read_preamble(bytes)?;
    if riff_size as usize != bytes.len() - 8 {
        tracing::warn!(
            "RIFF size field is {} but the buffer holds {} bytes after it",
            riff_size,
            bytes.len() - 8
        );
    }

    let (fmt, payload) = if is_compact_extensible(bytes) {
        tracing::debug!("Reading compact extensible header at fixed offsets");
        read_compact_extensible(bytes)?
    } else {
        walk_chunks(bytes)?
    };

    tracing::debug!(
        "Parsed {:?} WAV: {} Hz, {} bit, {} ch, {} bytes of PCM",
        fmt.format.tag(),
        fmt.samples_per_sec,
        fmt.bits_per_sample,
        fmt.channels,
        payload.len()
    );

    Ok(WaveContainer::from_parts(
        fmt.format,
        fmt.channels,
        fmt.samples_per_sec,
        fmt.avg_bytes_per_sec,
        fmt.block_align,
        fmt.bits_per_sample,
        payload.to_vec(),
    ))
}

impl WaveContainer {
    /// Parses a complete WAV file held in memory. See [`parse_wav`].
    pub fn parse(bytes: &[u8]) -> WavResult<Self> {
        parse_wav(bytes)
    }

    /// Reads a whole WAV file from disk and parses it.
    pub fn open<P: AsRef<Path>>(path: P) -> WavResult<Self> {
        let path = path.as_ref();
        tracing::debug!("Opening WAV file {:?}", path);
        let bytes = fs::read(path)?;
        parse_wav(&bytes)
    }
}
