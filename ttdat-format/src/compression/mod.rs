use std::fmt;

#[cfg(feature = "lz2k")]
pub mod lz2k;

use crate::error::CodecError;

pub mod constants {
    pub const CODEC_STORED: u32 = 0;
    pub const CODEC_LZ2K: u32 = 2;
}

use self::constants::*;

/// The packed-type field of a file-info record.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Codec {
    Stored,
    Lz2k,
    Unknown(u32),
}

impl Default for Codec {
    fn default() -> Self {
        Self::Stored
    }
}

impl fmt::Display for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Codec::Stored => f.write_str("stored"),
            Codec::Lz2k => f.write_str("LZ2K"),
            Codec::Unknown(id) => write!(f, "Unknown(id: {})", id),
        }
    }
}

impl Codec {
    pub const fn from_tag(tag: u32) -> Codec {
        match tag {
            CODEC_STORED => Codec::Stored,
            CODEC_LZ2K => Codec::Lz2k,
            id => Codec::Unknown(id),
        }
    }

    pub const fn tag(self) -> u32 {
        match self {
            Codec::Stored => CODEC_STORED,
            Codec::Lz2k => CODEC_LZ2K,
            Codec::Unknown(id) => id,
        }
    }

    /// Four-character label used in listings.
    pub const fn label(self) -> &'static str {
        match self {
            Codec::Stored => "----",
            Codec::Lz2k => "LZ2K",
            Codec::Unknown(_) => "????",
        }
    }

    /// Guesses the codec of a stand-alone packed blob from its first bytes.
    pub fn detect(input: &[u8]) -> Codec {
        #[cfg(feature = "lz2k")]
        {
            if input.starts_with(lz2k::CHUNK_MAGIC) {
                return Codec::Lz2k;
            }
        }

        #[cfg(not(feature = "lz2k"))]
        let _ = input;

        Codec::Stored
    }

    /// Decodes `input` in full. With `unpacked_size` the output length is
    /// checked against it; without, the input is decoded until exhausted.
    pub fn decompress(
        self,
        input: &[u8],
        unpacked_size: Option<u32>,
    ) -> Result<Vec<u8>, CodecError> {
        match self {
            Codec::Stored => match unpacked_size {
                Some(size) if size as usize != input.len() => Err(CodecError::SizeMismatch {
                    produced: input.len(),
                    expected: size as usize,
                }),
                _ => Ok(input.to_vec()),
            },
            #[cfg(feature = "lz2k")]
            Codec::Lz2k => match unpacked_size {
                Some(size) => lz2k::decompress(input, size),
                None => lz2k::decompress_stream(input),
            },
            #[allow(unreachable_patterns)]
            missing => Err(CodecError::Unsupported(missing)),
        }
    }
}
