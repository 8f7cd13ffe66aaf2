//! Constant byte sequences such as magic numbers and signatures.

use std::borrow::Cow;

use bytes::Bytes;

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    schema::Schema,
};

/// A constant byte sequence.
///
/// Parsing returns the expected bytes; building accepts only the same bytes, or
/// nothing at all when the enclosing struct omits the field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    expected: Bytes,
}

pub fn literal(expected: impl AsRef<[u8]>) -> Literal {
    Literal {
        expected: Bytes::copy_from_slice(expected.as_ref()),
    }
}

/// A literal given as text, stored as its UTF-8 bytes.
pub fn literal_text(expected: &str) -> Literal {
    literal(expected.as_bytes())
}

impl Literal {
    pub fn expected(&self) -> &Bytes {
        &self.expected
    }
}

impl Schema for Literal {
    type Output = Bytes;

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed("literal")
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Bytes, Error> {
        let actual = ctx.peek(self.expected.len())?;
        if actual != self.expected.as_ref() {
            return Err(Error::LiteralMismatch {
                expected: self.expected.to_vec(),
                actual: actual.to_vec(),
            });
        }
        ctx.skip(self.expected.len())?;
        Ok(self.expected.clone())
    }

    fn build_in(&self, value: &Bytes, ctx: &mut BuildingContext) -> Result<(), Error> {
        if *value != self.expected {
            return Err(Error::LiteralMismatch {
                expected: self.expected.to_vec(),
                actual: value.to_vec(),
            });
        }
        ctx.push(self.expected.clone());
        Ok(())
    }

    fn build_absent(&self, ctx: &mut BuildingContext) -> Result<(), Error> {
        ctx.push(self.expected.clone());
        Ok(())
    }
}
