//! Raw byte blocks of a resolved length.

use std::borrow::Cow;

use bytes::Bytes;

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    length::Length,
    schema::Schema,
};

/// A block of bytes whose length is a [Length] expression.
///
/// Parsing returns an owned copy of the block. Negative lengths read nothing.
#[derive(Debug, Clone)]
pub struct RawBytes {
    length: Length,
}

/// Raw bytes of `length` bytes.
pub fn bytes(length: impl Into<Length>) -> RawBytes {
    RawBytes {
        length: length.into(),
    }
}

impl RawBytes {
    pub fn length(&self) -> &Length {
        &self.length
    }
}

impl Schema for RawBytes {
    type Output = Bytes;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("bytes(len={:?})", self.length))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Bytes, Error> {
        let len = self.length.resolve_clamped(&ctx.scope())?;
        let data = ctx.read(len)?;
        ctx.log_bytes("bytes", data);
        Ok(Bytes::copy_from_slice(data))
    }

    fn build_in(&self, value: &Bytes, ctx: &mut BuildingContext) -> Result<(), Error> {
        let len = self.length.resolve_clamped(&ctx.scope())?;
        if value.len() != len {
            return Err(Error::LengthMismatch {
                schema: "bytes",
                expected: len,
                actual: value.len(),
            });
        }
        ctx.push(value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::length::Length;

    #[test]
    fn test_fixed_length() {
        let schema = bytes(3);
        assert_eq!(
            schema.parse(&[1, 2, 3, 4]),
            Ok(Bytes::from_static(&[1, 2, 3]))
        );
        assert_eq!(schema.build(&Bytes::from_static(&[1, 2, 3])), Ok(vec![1, 2, 3]));
    }

    #[test]
    fn test_length_expression_is_kept() {
        assert!(matches!(bytes("len").length(), Length::Field(name) if name == "len"));
        assert!(matches!(bytes(4).length(), Length::Fixed(4)));
    }

    #[test]
    fn test_build_length_mismatch() {
        assert_eq!(
            bytes(3).build(&Bytes::from_static(&[1, 2])),
            Err(Error::LengthMismatch {
                schema: "bytes",
                expected: 3,
                actual: 2
            })
        );
    }

    #[test]
    fn test_negative_length_reads_nothing() {
        let schema = bytes(Length::with(|_| Some(-4)));
        assert_eq!(schema.parse(&[1, 2]), Ok(Bytes::new()));
    }

    #[test]
    fn test_not_enough_data() {
        assert_eq!(
            bytes(8).parse(&[1, 2]),
            Err(Error::InsufficientData {
                needed: 8,
                available: 2
            })
        );
    }

    #[test]
    fn test_missing_length_field() {
        assert!(matches!(
            bytes("len").parse(&[1, 2]),
            Err(Error::InvalidLength(_))
        ));
    }
}
