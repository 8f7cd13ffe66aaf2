//! Regions whose total size is declared by the data they contain.

use std::{borrow::Cow, fmt};

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    schema::{Schema, build_child, parse_child},
};

/// A sub-schema followed by padding up to a total size computed from the parsed value.
///
/// Parsing fails with [Error::OversizedSubSchema] if the sub-schema used more than
/// the declared total. Building zero-fills the padding.
pub struct SizedRegion<S, F> {
    inner: S,
    total: F,
}

/// Pads `inner` to the size `total` returns for its value.
///
/// ```
/// use bytecraft::prelude::*;
///
/// let record = sized(
///     Struct::new().field("len", uint8()).field("x", uint8()),
///     |value: &Record| value.get("len")?.as_i64(),
/// );
/// let parsed = record.parse(&[4, 7, 0xff, 0xff]).unwrap();
/// assert_eq!(record.build(&parsed).unwrap(), vec![4, 7, 0, 0]);
/// ```
pub fn sized<S, F>(inner: S, total: F) -> SizedRegion<S, F>
where
    S: Schema,
    F: Fn(&S::Output) -> Option<i64> + Send + Sync,
{
    SizedRegion { inner, total }
}

impl<S: fmt::Debug, F> fmt::Debug for SizedRegion<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SizedRegion")
            .field("inner", &self.inner)
            .finish_non_exhaustive()
    }
}

impl<S, F> SizedRegion<S, F>
where
    S: Schema,
    F: Fn(&S::Output) -> Option<i64> + Send + Sync,
{
    fn declared(&self, value: &S::Output) -> Result<usize, Error> {
        let total = (self.total)(value)
            .ok_or_else(|| Error::InvalidLength("sized total is not an integer".to_string()))?;
        usize::try_from(total)
            .map_err(|_| Error::InvalidLength(format!("sized total {total} is negative")))
    }
}

impl<S, F> Schema for SizedRegion<S, F>
where
    S: Schema,
    F: Fn(&S::Output) -> Option<i64> + Send + Sync,
{
    type Output = S::Output;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("sized<{}>", self.inner.name()))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<S::Output, Error> {
        let start = ctx.offset();
        let value = parse_child(&self.inner, ctx)?;
        let declared = self.declared(&value)?;
        let consumed = ctx.offset() - start;
        if declared < consumed {
            return Err(Error::OversizedSubSchema {
                declared,
                actual: consumed,
            });
        }
        let padding = declared - consumed;
        if padding > 0 {
            ctx.log(format_args!("skipping {padding} bytes of padding"));
            ctx.skip(padding)?;
        }
        Ok(value)
    }

    fn build_in(&self, value: &S::Output, ctx: &mut BuildingContext) -> Result<(), Error> {
        let built = ctx.isolated(|ctx| build_child(&self.inner, value, ctx))?;
        let declared = self.declared(value)?;
        if built.len() > declared {
            return Err(Error::OversizedSubSchema {
                declared,
                actual: built.len(),
            });
        }
        let padding = declared - built.len();
        ctx.push(built);
        if padding > 0 {
            ctx.log(format_args!("writing {padding} bytes of padding"));
            ctx.push(vec![0u8; padding]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::{
        schemas::{Struct, bytes, uint8, uint16},
        value::Record,
    };

    fn header() -> SizedRegion<Struct, impl Fn(&Record) -> Option<i64> + Send + Sync> {
        sized(
            Struct::new().field("size", uint8()).field("id", uint16()),
            |value: &Record| value.get("size")?.as_i64(),
        )
    }

    #[test]
    fn test_padding_is_skipped() {
        let schema = Struct::new().field("header", header()).field("next", uint8());
        let record = schema.parse(&[5, 0, 1, 0xff, 0xff, 0x42]).unwrap();
        assert_eq!(record.get("next").and_then(|v| v.as_u64()), Some(0x42));
    }

    #[test]
    fn test_build_zero_fills() {
        let record = header().parse(&[5, 0, 1, 0xff, 0xff]).unwrap();
        assert_eq!(header().build(&record), Ok(vec![5, 0, 1, 0, 0]));
    }

    #[test]
    fn test_exact_size_has_no_padding() {
        let record = header().parse(&[3, 0, 9]).unwrap();
        assert_eq!(header().build(&record), Ok(vec![3, 0, 9]));
    }

    #[test]
    fn test_overrun_on_parse() {
        assert_eq!(
            header().parse(&[2, 0, 1]),
            Err(Error::OversizedSubSchema {
                declared: 2,
                actual: 3
            })
        );
    }

    #[test]
    fn test_overflow_on_build() {
        let schema = sized(bytes(4), |_: &Bytes| Some(2));
        assert_eq!(
            schema.build(&Bytes::from_static(&[1, 2, 3, 4])),
            Err(Error::OversizedSubSchema {
                declared: 2,
                actual: 4
            })
        );
    }

    #[test]
    fn test_padding_out_of_bounds() {
        assert!(matches!(
            header().parse(&[9, 0, 1, 0]),
            Err(Error::InsufficientData { .. })
        ));
    }

    #[test]
    fn test_negative_total() {
        let schema = sized(uint8(), |_: &u8| Some(-1));
        assert!(matches!(schema.parse(&[1]), Err(Error::InvalidLength(_))));
    }
}
