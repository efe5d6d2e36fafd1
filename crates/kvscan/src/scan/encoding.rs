//! Key/value encodings.
//!
//! The store layer deals in raw bytes; encodings decide how those bytes
//! are rendered as text (for output and for filter matching) and how
//! textual bound options are parsed back into store keys.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use clap::ValueEnum;
use std::fmt;
use std::string::FromUtf8Error;
use thiserror::Error;

/// Textual form of a raw key or value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Encoding {
    /// Bytes are UTF-8 text. Strict: invalid UTF-8 is a scan error.
    #[default]
    Utf8,
    /// Bytes are rendered as lowercase hex digits.
    Hex,
    /// Bytes are rendered as standard base64.
    Base64,
}

/// A field that failed to decode under an encoding.
#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("not valid UTF-8: {0}")]
    Utf8(#[from] FromUtf8Error),

    #[error("not valid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

impl Encoding {
    /// Render raw store bytes as text.
    pub fn render(&self, bytes: &[u8]) -> Result<String, EncodingError> {
        match self {
            Encoding::Utf8 => Ok(String::from_utf8(bytes.to_vec())?),
            Encoding::Hex => Ok(hex::encode(bytes)),
            Encoding::Base64 => Ok(BASE64.encode(bytes)),
        }
    }

    /// Parse a user-supplied bound value into store key bytes.
    pub fn parse(&self, text: &str) -> Result<Vec<u8>, EncodingError> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Hex => Ok(hex::decode(text)?),
            Encoding::Base64 => Ok(BASE64.decode(text)?),
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Encoding::Utf8 => "utf8",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        };
        write!(f, "{}", name)
    }
}
