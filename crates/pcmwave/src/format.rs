//! WAV format tags and header layout parameters.

/// Format tag for plain PCM (`WAVE_FORMAT_PCM`).
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// Format tag for the extensible layout (`WAVE_FORMAT_EXTENSIBLE`).
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xFFFE;

/// Sub-format GUID for integer PCM (`KSDATAFORMAT_SUBTYPE_PCM`), in file byte order.
pub const KSDATAFORMAT_SUBTYPE_PCM: [u8; 16] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xAA, 0x00, 0x38, 0x9B, 0x71,
];

/// `fmt ` chunk body size for plain PCM.
pub const PCM_FMT_CHUNK_SIZE: u32 = 16;

/// `fmt ` chunk body size for the extensible layout.
pub const EXTENSIBLE_FMT_CHUNK_SIZE: u32 = 40;

/// `fmt ` chunk size declared by the compact extensible layout.
///
/// That layout only has 44 bytes of `fmt ` body before its `fact` chunk, so
/// the declared size overruns into `fact` and `data`; see [`ExtensibleLayout`].
pub const COMPACT_FMT_CHUNK_SIZE: u32 = 60;

/// Size of the extension that follows the PCM fields (`cbSize`).
pub const EXTENSIBLE_CB_SIZE: u16 = 22;

/// Total header size before the payload, plain PCM.
pub const PCM_HEADER_SIZE: usize = 44;

/// Total header size before the payload, extensible (includes the `fact` chunk).
pub const EXTENSIBLE_HEADER_SIZE: usize = 80;

/// Bit depths above this threshold use the extensible layout.
pub const PCM_MAX_BITS_PER_SAMPLE: u16 = 16;

/// Which header layout a container uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum FormatTag {
    /// Canonical 16-byte `fmt ` chunk.
    Pcm = WAVE_FORMAT_PCM,
    /// 40-byte `fmt ` chunk followed by a `fact` chunk.
    Extensible = WAVE_FORMAT_EXTENSIBLE,
}

impl FormatTag {
    /// Decodes a raw format tag, returning `None` for unsupported values.
    pub fn from_u16(tag: u16) -> Option<Self> {
        match tag {
            WAVE_FORMAT_PCM => Some(FormatTag::Pcm),
            WAVE_FORMAT_EXTENSIBLE => Some(FormatTag::Extensible),
            _ => None,
        }
    }

    /// Picks the layout for a bit depth: PCM up to 16 bits, extensible above.
    pub fn for_bits_per_sample(bits_per_sample: u16) -> Self {
        if bits_per_sample <= PCM_MAX_BITS_PER_SAMPLE {
            FormatTag::Pcm
        } else {
            FormatTag::Extensible
        }
    }

    /// Raw on-disk value.
    pub fn as_u16(self) -> u16 {
        self as u16
    }

    /// Header bytes preceding the payload for this layout.
    pub fn header_size(self) -> usize {
        match self {
            FormatTag::Pcm => PCM_HEADER_SIZE,
            FormatTag::Extensible => EXTENSIBLE_HEADER_SIZE,
        }
    }
}

/// On-disk arrangement of an extensible header. Both end at byte 80.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ExtensibleLayout {
    /// `WAVEFORMATEXTENSIBLE`: 40-byte `fmt ` body (`cbSize`, valid bits,
    /// u32 channel mask, GUID), then `fact` holding the sample-frame count.
    #[default]
    Standard,
    /// Declared `fmt ` size of 60 with `cbSize` written twice, valid bits,
    /// two zero words, a u16 channel mask and the GUID, then a `fact` chunk
    /// that declares 4 bytes but carries none. Chunk sizes cannot be trusted,
    /// so these files are read at fixed offsets.
    Compact,
}

/// Fields carried only by the extensible `fmt ` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtensibleFormat {
    /// Bits of precision actually used within each container sample.
    pub valid_bits_per_sample: u16,
    /// Speaker position bitmask.
    pub channel_mask: u32,
    /// Sub-format GUID in file byte order.
    pub sub_format: [u8; 16],
    /// Which arrangement to write these fields in.
    pub layout: ExtensibleLayout,
}

impl ExtensibleFormat {
    /// Extension for integer PCM with every container bit valid.
    pub fn pcm(bits_per_sample: u16, channels: u16) -> Self {
        Self {
            valid_bits_per_sample: bits_per_sample,
            channel_mask: default_channel_mask(channels),
            sub_format: KSDATAFORMAT_SUBTYPE_PCM,
            layout: ExtensibleLayout::Standard,
        }
    }

    /// Returns true if the sub-format is integer PCM.
    pub fn is_pcm(&self) -> bool {
        self.sub_format == KSDATAFORMAT_SUBTYPE_PCM
    }
}

/// Header layout plus any layout-specific fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaveFormat {
    /// Plain PCM.
    Pcm,
    /// Extensible PCM.
    Extensible(ExtensibleFormat),
}

impl WaveFormat {
    /// Derives the layout for freshly constructed audio.
    pub fn for_params(bits_per_sample: u16, channels: u16) -> Self {
        match FormatTag::for_bits_per_sample(bits_per_sample) {
            FormatTag::Pcm => WaveFormat::Pcm,
            FormatTag::Extensible => {
                WaveFormat::Extensible(ExtensibleFormat::pcm(bits_per_sample, channels))
            }
        }
    }

    /// The format tag this layout is written with.
    pub fn tag(&self) -> FormatTag {
        match self {
            WaveFormat::Pcm => FormatTag::Pcm,
            WaveFormat::Extensible(_) => FormatTag::Extensible,
        }
    }

    /// Extension fields, if this is the extensible layout.
    pub fn extensible(&self) -> Option<&ExtensibleFormat> {
        match self {
            WaveFormat::Pcm => None,
            WaveFormat::Extensible(ext) => Some(ext),
        }
    }
}

/// Speaker mask for a channel count.
///
/// Mono maps to front center; otherwise the first `channels` speaker
/// positions in the standard order (FL, FR, FC, LFE, BL, BR, ...) are set.
pub fn default_channel_mask(channels: u16) -> u32 {
    match channels {
        0 => 0,
        1 => 0x4,
        n if n >= 32 => u32::MAX,
        n => (1u32 << n) - 1,
    }
}
