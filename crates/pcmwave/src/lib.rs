//! pcmwave
//!
//! Reads and writes RIFF/WAVE files holding uncompressed PCM audio.
//!
//! # Overview
//!
//! A [`WaveContainer`] holds the `fmt ` header fields and the raw interleaved
//! PCM payload of one WAV file. Two header layouts are supported:
//!
//! - **PCM** (`0x0001`) - the canonical 44-byte header, used up to 16 bits per sample
//! - **Extensible** (`0xFFFE`) - a 40-byte `fmt ` chunk plus a `fact` chunk
//!   (80-byte header), used above 16 bits per sample
//!
//! Extensible files in the compact 80-byte arrangement (declared `fmt ` size
//! 60, 16-bit channel mask, empty `fact`) are also read, and written back in
//! the same arrangement; see [`ExtensibleLayout`].
//!
//! The payload is exposed as a byte stream: reads advance an internal cursor
//! and writes append. `WaveContainer` implements [`std::io::Read`] and
//! [`std::io::Write`], so payloads can be copied between containers with
//! [`std::io::copy`] in any chunk size.
//!
//! # Example
//!
//! ```ignore
//! use pcmwave::WaveContainer;
//!
//! let mut src = WaveContainer::open("input.wav")?;
//! let mut dst = WaveContainer::new(src.sample_rate(), src.bits_per_sample(), src.channels());
//! std::io::copy(&mut src, &mut dst)?;
//!
//! std::fs::write("output.wav", dst.to_bytes())?;
//! ```
//!
//! # Crate Structure
//!
//! - [`container`] - The container type and its payload stream
//! - [`error`] - Error taxonomy
//! - [`format`] - Format tags and header layout constants
//! - [`params`] - Construction parameters (serde-compatible)
//! - [`reader`] - Parsing from bytes or files
//! - [`riff`] - RIFF chunk iteration
//! - [`writer`] - Serialization to bytes, writers or files

pub mod container;
pub mod error;
pub mod format;
pub mod params;
pub mod reader;
pub mod riff;
pub mod writer;

// Re-export main types at crate root
pub use container::{PayloadRead, WaveContainer};
pub use error::{WavError, WavResult};
pub use format::{ExtensibleFormat, ExtensibleLayout, FormatTag, WaveFormat};
pub use params::WaveParams;
pub use reader::parse_wav;
pub use writer::write_wav;
