//! Byte/text conversions used by the text leaf schemas.
//!
//! An [Encoding] turns the bytes of a region into a string when parsing
//! and turns a string back into the region's bytes when building.

use base64::{Engine, engine::general_purpose::STANDARD};

use crate::errors::Error;

/// How the bytes of a text region map to a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Encoding {
    /// The bytes are UTF-8 text.
    Utf8,
    /// The string is the lowercase hex rendering of the bytes.
    Hex,
    /// The string is the standard, padded base64 rendering of the bytes.
    Base64,
}

impl Encoding {
    pub fn name(&self) -> &'static str {
        match self {
            Encoding::Utf8 => "text",
            Encoding::Hex => "hex",
            Encoding::Base64 => "base64",
        }
    }

    /// Bytes -> string.
    pub fn decode(&self, bytes: &[u8]) -> Result<String, Error> {
        match self {
            Encoding::Utf8 => std::str::from_utf8(bytes)
                .map(str::to_string)
                .map_err(|err| self.error(err)),
            Encoding::Hex => Ok(to_hex(bytes)),
            Encoding::Base64 => Ok(STANDARD.encode(bytes)),
        }
    }

    /// String -> bytes.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>, Error> {
        match self {
            Encoding::Utf8 => Ok(text.as_bytes().to_vec()),
            Encoding::Hex => from_hex(text).ok_or_else(|| self.error("not an even-length hex string")),
            Encoding::Base64 => STANDARD.decode(text).map_err(|err| self.error(err)),
        }
    }

    fn error(&self, reason: impl ToString) -> Error {
        Error::InvalidEncoding {
            encoding: self.name(),
            reason: reason.to_string(),
        }
    }
}

/// Converts bytes to a lowercase hexadecimal string.
pub fn to_hex(bytes: &[u8]) -> String {
    let mut hex = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        hex.push_str(&format!("{byte:02x}"));
    }
    hex
}

/// Converts a hexadecimal string to bytes.
pub fn from_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return None;
    }

    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex() {
        assert_eq!(to_hex(&[0x74, 0x65, 0x73, 0x74]), "74657374");
        assert_eq!(from_hex("74657374"), Some(vec![0x74, 0x65, 0x73, 0x74]));
        assert_eq!(from_hex("CAFE"), Some(vec![0xca, 0xfe]));
        assert_eq!(from_hex("abc"), None);
        assert_eq!(from_hex("zz"), None);
    }

    #[test]
    fn test_base64() {
        assert_eq!(Encoding::Base64.decode(b"test").unwrap(), "dGVzdA==");
        assert_eq!(Encoding::Base64.encode("dGVzdA==").unwrap(), b"test".to_vec());
        assert!(matches!(
            Encoding::Base64.encode("not base64!"),
            Err(Error::InvalidEncoding {
                encoding: "base64",
                ..
            })
        ));
    }

    #[test]
    fn test_utf8() {
        assert_eq!(Encoding::Utf8.decode(b"test").unwrap(), "test");
        assert!(Encoding::Utf8.decode(&[0xff, 0xfe]).is_err());
        assert_eq!(Encoding::Utf8.encode("hé").unwrap(), vec![0x68, 0xc3, 0xa9]);
    }
}
