//! Text leaves: UTF-8, hex and base64 renderings of a byte region.

use std::borrow::Cow;

use crate::{
    context::{BuildingContext, ParsingContext},
    encoding::Encoding,
    errors::Error,
    length::Length,
    schema::Schema,
};

/// A byte region presented as a string.
///
/// The length counts bytes on the wire, not characters of the string. Without a
/// length, parsing takes every remaining byte of the current window and building
/// emits whatever the string encodes to.
#[derive(Debug, Clone)]
pub struct Text {
    encoding: Encoding,
    length: Option<Length>,
}

impl Text {
    pub fn new(encoding: Encoding) -> Self {
        Self {
            encoding,
            length: None,
        }
    }

    /// Fixes the region length.
    pub fn length(mut self, length: impl Into<Length>) -> Self {
        self.length = Some(length.into());
        self
    }

    /// Same region, rendered as hex.
    pub fn hex(self) -> Self {
        Self {
            encoding: Encoding::Hex,
            ..self
        }
    }

    /// Same region, rendered as base64.
    pub fn base64(self) -> Self {
        Self {
            encoding: Encoding::Base64,
            ..self
        }
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

/// UTF-8 text spanning the rest of the window.
pub fn text() -> Text {
    Text::new(Encoding::Utf8)
}

/// Lowercase hex of the bytes spanning the rest of the window.
pub fn hex() -> Text {
    Text::new(Encoding::Hex)
}

/// Base64 of the bytes spanning the rest of the window.
pub fn base64() -> Text {
    Text::new(Encoding::Base64)
}

impl Schema for Text {
    type Output = String;

    fn name(&self) -> Cow<'static, str> {
        match &self.length {
            Some(length) => Cow::Owned(format!("{}(len={length:?})", self.encoding.name())),
            None => Cow::Borrowed(self.encoding.name()),
        }
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<String, Error> {
        let len = match &self.length {
            Some(length) => length.resolve_clamped(&ctx.scope())?,
            None => ctx.remaining(),
        };
        let text = self.encoding.decode(ctx.peek(len)?)?;
        ctx.skip(len)?;
        Ok(text)
    }

    fn build_in(&self, value: &String, ctx: &mut BuildingContext) -> Result<(), Error> {
        let encoded = self.encoding.encode(value)?;
        if let Some(length) = &self.length {
            let expected = length.resolve_clamped(&ctx.scope())?;
            if encoded.len() != expected {
                return Err(Error::LengthMismatch {
                    schema: self.encoding.name(),
                    expected,
                    actual: encoded.len(),
                });
            }
        }
        ctx.push(encoded);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST: [u8; 4] = [116, 101, 115, 116];

    #[test]
    fn test_text() {
        assert_eq!(text().parse(&TEST), Ok("test".to_string()));
        assert_eq!(text().build(&"test".to_string()), Ok(TEST.to_vec()));
    }

    #[test]
    fn test_hex() {
        assert_eq!(hex().parse(&TEST), Ok("74657374".to_string()));
        assert_eq!(hex().build(&"74657374".to_string()), Ok(TEST.to_vec()));
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64().parse(&TEST), Ok("dGVzdA==".to_string()));
        assert_eq!(base64().build(&"dGVzdA==".to_string()), Ok(TEST.to_vec()));
    }

    #[test]
    fn test_encoding_follows_builder() {
        assert_eq!(text().encoding(), Encoding::Utf8);
        assert_eq!(text().length(2).hex().encoding(), Encoding::Hex);
        assert_eq!(hex().base64().encoding(), Encoding::Base64);
    }

    #[test]
    fn test_length_counts_bytes() {
        let schema = text().length(2).hex();
        assert_eq!(schema.parse(&[0xca, 0xfe, 0x00]), Ok("cafe".to_string()));
        assert_eq!(schema.build(&"cafe".to_string()), Ok(vec![0xca, 0xfe]));
        assert_eq!(
            schema.build(&"cafe00".to_string()),
            Err(Error::LengthMismatch {
                schema: "hex",
                expected: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_invalid_utf8() {
        assert!(matches!(
            text().parse(&[0xff]),
            Err(Error::InvalidEncoding { encoding: "text", .. })
        ));
    }

    #[test]
    fn test_invalid_hex_on_build() {
        assert!(matches!(
            hex().build(&"xyz".to_string()),
            Err(Error::InvalidEncoding { encoding: "hex", .. })
        ));
    }
}
