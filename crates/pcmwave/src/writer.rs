//! WAV serialization.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::container::WaveContainer;
use crate::error::WavResult;
use crate::format::{
    ExtensibleFormat, ExtensibleLayout, FormatTag, WaveFormat, COMPACT_FMT_CHUNK_SIZE,
    EXTENSIBLE_CB_SIZE, EXTENSIBLE_FMT_CHUNK_SIZE, PCM_FMT_CHUNK_SIZE,
};
use crate::riff::{DATA_ID, FACT_ID, FMT_ID, RIFF_ID, WAVE_ID};

/// Body size of the `fact` chunk (one u32 sample-frame count).
const FACT_CHUNK_SIZE: u32 = 4;

/// Writes a complete WAV file for `wave` to a writer.
///
/// # Arguments
/// * `writer` - Output writer
/// * `wave` - Container to serialize
///
/// # Returns
/// Result indicating success or I/O error
pub fn write_wav<W: Write>(writer: &mut W, wave: &WaveContainer) -> io::Result<()> {
    let data_size = wave.data_size();

    // RIFF header
    writer.write_all(RIFF_ID)?;
    writer.write_u32::<LittleEndian>(riff_size(wave))?;
    writer.write_all(WAVE_ID)?;

    // fmt chunk
    writer.write_all(FMT_ID)?;
    let fmt_size = match wave.format() {
        WaveFormat::Pcm => PCM_FMT_CHUNK_SIZE,
        WaveFormat::Extensible(ext) => match ext.layout {
            ExtensibleLayout::Standard => EXTENSIBLE_FMT_CHUNK_SIZE,
            ExtensibleLayout::Compact => COMPACT_FMT_CHUNK_SIZE,
        },
    };
    writer.write_u32::<LittleEndian>(fmt_size)?;
    writer.write_u16::<LittleEndian>(wave.format_tag().as_u16())?;
    writer.write_u16::<LittleEndian>(wave.channels())?;
    writer.write_u32::<LittleEndian>(wave.sample_rate())?;
    writer.write_u32::<LittleEndian>(wave.avg_bytes_per_sec())?;
    writer.write_u16::<LittleEndian>(wave.block_align())?;
    writer.write_u16::<LittleEndian>(wave.bits_per_sample())?;

    if let WaveFormat::Extensible(ext) = wave.format() {
        write_extension(writer, ext)?;

        // fact chunk; the compact layout declares the value but omits it
        writer.write_all(FACT_ID)?;
        writer.write_u32::<LittleEndian>(FACT_CHUNK_SIZE)?;
        if ext.layout == ExtensibleLayout::Standard {
            writer.write_u32::<LittleEndian>(wave.sample_frames())?;
        }
    }

    // data chunk
    writer.write_all(DATA_ID)?;
    writer.write_u32::<LittleEndian>(data_size)?;
    writer.write_all(wave.payload())?;

    Ok(())
}

fn write_extension<W: Write>(writer: &mut W, ext: &ExtensibleFormat) -> io::Result<()> {
    match ext.layout {
        ExtensibleLayout::Standard => {
            writer.write_u16::<LittleEndian>(EXTENSIBLE_CB_SIZE)?;
            writer.write_u16::<LittleEndian>(ext.valid_bits_per_sample)?;
            writer.write_u32::<LittleEndian>(ext.channel_mask)?;
        }
        ExtensibleLayout::Compact => {
            writer.write_u16::<LittleEndian>(EXTENSIBLE_CB_SIZE)?;
            writer.write_u16::<LittleEndian>(EXTENSIBLE_CB_SIZE)?;
            writer.write_u16::<LittleEndian>(ext.valid_bits_per_sample)?;
            writer.write_u16::<LittleEndian>(0)?; // samples per block
            writer.write_u16::<LittleEndian>(0)?; // reserved
            // Only the low 16 bits fit.
            writer.write_u16::<LittleEndian>(ext.channel_mask as u16)?;
        }
    }
    writer.write_all(&ext.sub_format)?;
    Ok(())
}

/// Value of the RIFF size field: total file length minus 8.
///
/// RIFF sizes are 32-bit. Once the payload passes `u32::MAX` minus the header
/// the field saturates at `u32::MAX` and no longer matches the file length.
pub fn riff_size(wave: &WaveContainer) -> u32 {
    riff_size_for(wave.format_tag(), wave.data_size())
}

fn riff_size_for(tag: FormatTag, data_size: u32) -> u32 {
    let header = tag.header_size() as u32;
    data_size.saturating_add(header - 8)
}

impl WaveContainer {
    /// Serializes the container to a writer.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write_wav(writer, self)
    }

    /// Serializes the container to a complete WAV file in memory.
    ///
    /// The whole payload is always written. Payloads too large for the 32-bit
    /// RIFF and `data` size fields (about 4 GiB) produce a file whose size
    /// fields are clamped to `u32::MAX`, which other readers will reject or
    /// cut short.
    pub fn to_bytes(&self) -> Vec<u8> {
        let capacity = self.format_tag().header_size() + self.payload().len();
        let mut buffer = Vec::with_capacity(capacity);
        write_wav(&mut buffer, self).expect("writing to Vec should not fail");
        buffer
    }

    /// Writes the container to a file, replacing any existing one.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> WavResult<()> {
        let path = path.as_ref();
        tracing::debug!(
            "Saving {:?} WAV ({} bytes of PCM) to {:?}",
            self.format_tag(),
            self.data_size(),
            path
        );
        fs::write(path, self.to_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::KSDATAFORMAT_SUBTYPE_PCM;

    fn le_u16(bytes: &[u8], offset: usize) -> u16 {
        u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
    }

    fn le_u32(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes([
            bytes[offset],
            bytes[offset + 1],
            bytes[offset + 2],
            bytes[offset + 3],
        ])
    }

    #[test]
    fn test_pcm_layout() {
        let mut wave = WaveContainer::new(44100, 16, 2);
        wave.append(&[1, 2, 3, 4, 5, 6, 7, 8]);
        let bytes = wave.to_bytes();

        assert_eq!(bytes.len(), 44 + 8);
        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(le_u32(&bytes, 4), 8 + 36);
        assert_eq!(&bytes[8..16], b"WAVEfmt ");
        assert_eq!(le_u32(&bytes, 16), 16);
        assert_eq!(le_u16(&bytes, 20), 1);
        assert_eq!(le_u16(&bytes, 22), 2);
        assert_eq!(le_u32(&bytes, 24), 44100);
        assert_eq!(le_u32(&bytes, 28), 176400);
        assert_eq!(le_u16(&bytes, 32), 4);
        assert_eq!(le_u16(&bytes, 34), 16);
        assert_eq!(&bytes[36..40], b"data");
        assert_eq!(le_u32(&bytes, 40), 8);
        assert_eq!(&bytes[44..], &[1, 2, 3, 4, 5, 6, 7, 8]);
    }

    #[test]
    fn test_extensible_layout() {
        let mut wave = WaveContainer::new(96000, 32, 2);
        wave.append(&[0xAB; 24]);
        let bytes = wave.to_bytes();

        assert_eq!(bytes.len(), 80 + 24);
        assert_eq!(le_u32(&bytes, 4), 24 + 72);
        assert_eq!(le_u32(&bytes, 16), 40);
        assert_eq!(le_u16(&bytes, 20), 0xFFFE);
        assert_eq!(le_u16(&bytes, 22), 2);
        assert_eq!(le_u32(&bytes, 24), 96000);
        assert_eq!(le_u32(&bytes, 28), 768000);
        assert_eq!(le_u16(&bytes, 32), 8);
        assert_eq!(le_u16(&bytes, 34), 32);
        assert_eq!(le_u16(&bytes, 36), 22); // cbSize
        assert_eq!(le_u16(&bytes, 38), 32); // valid bits
        assert_eq!(le_u32(&bytes, 40), 0x3); // FL | FR
        assert_eq!(&bytes[44..60], &KSDATAFORMAT_SUBTYPE_PCM);
        assert_eq!(&bytes[60..64], b"fact");
        assert_eq!(le_u32(&bytes, 64), 4);
        assert_eq!(le_u32(&bytes, 68), 3); // 24 bytes / 8-byte frames
        assert_eq!(&bytes[72..76], b"data");
        assert_eq!(le_u32(&bytes, 76), 24);
        assert_eq!(&bytes[80..], &[0xAB; 24]);
    }

    #[test]
    fn test_riff_size_matches_length() {
        let layouts = [(44100u32, 16u16, 1u16), (48000, 24, 2), (192000, 32, 6)];
        for &(rate, bits, channels) in &layouts {
            for &len in &[0usize, 1, 6, 1023] {
                let mut wave = WaveContainer::new(rate, bits, channels);
                wave.append(&vec![0x55; len]);
                let bytes = wave.to_bytes();
                assert_eq!(le_u32(&bytes, 4) as usize, bytes.len() - 8);
                assert_eq!(riff_size(&wave) as usize, bytes.len() - 8);
            }
        }
    }

    #[test]
    fn test_compact_extensible_layout() {
        let ext = ExtensibleFormat {
            layout: ExtensibleLayout::Compact,
            ..ExtensibleFormat::pcm(24, 2)
        };
        let mut wave = WaveContainer::from_parts(
            WaveFormat::Extensible(ext),
            2,
            48000,
            288000,
            6,
            24,
            Vec::new(),
        );
        wave.append(&[0x11; 12]);
        let bytes = wave.to_bytes();

        assert_eq!(bytes.len(), 80 + 12);
        assert_eq!(le_u32(&bytes, 4), 12 + 72);
        assert_eq!(le_u32(&bytes, 16), 60);
        assert_eq!(le_u16(&bytes, 20), 0xFFFE);
        assert_eq!(le_u16(&bytes, 36), 22);
        assert_eq!(le_u16(&bytes, 38), 22);
        assert_eq!(le_u16(&bytes, 40), 24); // valid bits
        assert_eq!(le_u16(&bytes, 42), 0);
        assert_eq!(le_u16(&bytes, 44), 0);
        assert_eq!(le_u16(&bytes, 46), 0x3);
        assert_eq!(&bytes[48..64], &KSDATAFORMAT_SUBTYPE_PCM);
        assert_eq!(&bytes[64..68], b"fact");
        assert_eq!(le_u32(&bytes, 68), 4);
        assert_eq!(&bytes[72..76], b"data");
        assert_eq!(le_u32(&bytes, 76), 12);
        assert_eq!(&bytes[80..], &[0x11; 12]);
    }

    #[test]
    fn test_riff_size_saturates_for_oversized_payloads() {
        assert_eq!(riff_size_for(FormatTag::Pcm, 100), 136);
        assert_eq!(riff_size_for(FormatTag::Extensible, 100), 172);
        assert_eq!(riff_size_for(FormatTag::Pcm, u32::MAX - 36), u32::MAX);
        assert_eq!(riff_size_for(FormatTag::Pcm, u32::MAX - 10), u32::MAX);
        assert_eq!(riff_size_for(FormatTag::Extensible, u32::MAX - 50), u32::MAX);
        assert_eq!(riff_size_for(FormatTag::Extensible, u32::MAX), u32::MAX);
    }

    #[test]
    fn test_write_to_matches_to_bytes() {
        let mut wave = WaveContainer::new(22050, 24, 1);
        wave.append(&[1, 2, 3, 4, 5, 6]);
        let mut out = Vec::new();
        wave.write_to(&mut out).unwrap();
        assert_eq!(out, wave.to_bytes());
    }

    #[test]
    fn test_write_propagates_io_errors() {
        struct Failing;
        impl Write for Failing {
            fn write(&mut self, _: &[u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::Other, "disk full"))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let wave = WaveContainer::new(44100, 16, 2);
        let err = wave.write_to(&mut Failing).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
