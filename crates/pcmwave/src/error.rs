//! Error types for WAV container parsing and serialization.

use thiserror::Error;

/// Result type for WAV container operations.
pub type WavResult<T> = Result<T, WavError>;

/// Errors that can occur while reading or writing a WAV container.
#[derive(Debug, Error)]
pub enum WavError {
    /// The `fmt ` chunk declares a format tag other than PCM or extensible.
    #[error("unrecognized WAV format tag: 0x{tag:04X}")]
    UnrecognizedFormat {
        /// The format tag found in the file.
        tag: u16,
    },

    /// The underlying byte source could not be read or written.
    #[error("file access error: {0}")]
    FileAccess(#[from] std::io::Error),

    /// The input ends before a declared header field or payload.
    #[error("truncated input: expected {expected} bytes, found {actual}")]
    Truncated {
        /// Number of bytes the layout requires.
        expected: usize,
        /// Number of bytes actually available.
        actual: usize,
    },

    /// The RIFF/WAVE magic is missing.
    #[error("not a RIFF/WAVE file (found {found:?})")]
    InvalidHeader {
        /// The twelve leading bytes, lossily decoded.
        found: String,
    },

    /// A required chunk does not appear in the file.
    #[error("missing '{id}' chunk")]
    MissingChunk {
        /// Chunk id that was expected.
        id: String,
    },

    /// A chunk is too short for the layout its header implies.
    #[error("malformed '{id}' chunk: {message}")]
    MalformedChunk {
        /// Chunk id.
        id: String,
        /// Description of the problem.
        message: String,
    },
}

impl WavError {
    /// Creates a missing-chunk error from a raw chunk id.
    pub fn missing_chunk(id: &[u8; 4]) -> Self {
        Self::MissingChunk {
            id: String::from_utf8_lossy(id).into_owned(),
        }
    }

    /// Creates a malformed-chunk error from a raw chunk id.
    pub fn malformed_chunk(id: &[u8; 4], message: impl Into<String>) -> Self {
        Self::MalformedChunk {
            id: String::from_utf8_lossy(id).into_owned(),
            message: message.into(),
        }
    }

    /// Returns a stable, machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            WavError::UnrecognizedFormat { .. } => "WAV_001",
            WavError::FileAccess(_) => "WAV_002",
            WavError::Truncated { .. } => "WAV_003",
            WavError::InvalidHeader { .. } => "WAV_004",
            WavError::MissingChunk { .. } => "WAV_005",
            WavError::MalformedChunk { .. } => "WAV_006",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrecognized_format_message() {
        let err = WavError::UnrecognizedFormat { tag: 3 };
        assert_eq!(err.to_string(), "unrecognized WAV format tag: 0x0003");
        assert_eq!(err.code(), "WAV_001");
    }

    #[test]
    fn test_missing_chunk_helper() {
        let err = WavError::missing_chunk(b"data");
        assert!(err.to_string().contains("'data'"));
        assert_eq!(err.code(), "WAV_005");
    }

    #[test]
    fn test_malformed_chunk_helper() {
        let err = WavError::malformed_chunk(b"fmt ", "too short");
        assert!(err.to_string().contains("fmt "));
        assert!(err.to_string().contains("too short"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err: WavError = io.into();
        assert_eq!(err.code(), "WAV_002");
        assert!(err.to_string().contains("no such file"));
    }
}
