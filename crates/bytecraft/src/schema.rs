//! Schema: the parse/build capability shared by every leaf and combinator.

use std::{borrow::Cow, fmt};

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    value::{FromValue, IntoValue, Value},
};

/// A schema parses bytes into a [Schema::Output] and builds the same value back into bytes.
///
/// Schemas hold only their configuration, so one instance can serve any number of
/// calls. Each call to [Schema::parse] or [Schema::build] creates its own context.
pub trait Schema: Send + Sync {
    type Output: fmt::Debug;

    /// Short name used in debug traces.
    fn name(&self) -> Cow<'static, str>;

    /// Parses one value at the context's cursor.
    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Self::Output, Error>;

    /// Appends the bytes of `value` to the context.
    fn build_in(&self, value: &Self::Output, ctx: &mut BuildingContext) -> Result<(), Error>;

    /// Builds when the enclosing struct has no value for this field.
    fn build_absent(&self, _ctx: &mut BuildingContext) -> Result<(), Error> {
        Err(Error::MissingValue)
    }

    /// Whether this schema reports its own enter/leave in debug traces.
    fn traced(&self) -> bool {
        true
    }

    /// Parses a whole input.
    fn parse(&self, data: &[u8]) -> Result<Self::Output, Error> {
        let mut ctx = ParsingContext::new(data);
        parse_child(self, &mut ctx)
    }

    /// Like [Schema::parse], tracing every schema's entry and exit at debug level.
    fn parse_debug(&self, data: &[u8]) -> Result<Self::Output, Error> {
        let mut ctx = ParsingContext::new(data).with_debug(true);
        parse_child(self, &mut ctx)
    }

    /// Builds a value into a fresh byte vector.
    fn build(&self, value: &Self::Output) -> Result<Vec<u8>, Error> {
        let mut ctx = BuildingContext::new();
        build_child(self, value, &mut ctx)?;
        Ok(ctx.finish())
    }

    /// Like [Schema::build], tracing every schema's entry and exit at debug level.
    fn build_debug(&self, value: &Self::Output) -> Result<Vec<u8>, Error> {
        let mut ctx = BuildingContext::new().with_debug(true);
        build_child(self, value, &mut ctx)?;
        Ok(ctx.finish())
    }

    /// Erases the output type so the schema can be a struct field or a switch case.
    fn boxed(self) -> AnySchema
    where
        Self: Sized + 'static,
        Self::Output: IntoValue + FromValue,
    {
        Box::new(self)
    }
}

/// Parses through `schema`, wrapping the call in the debug trace.
pub(crate) fn parse_child<S: Schema + ?Sized>(
    schema: &S,
    ctx: &mut ParsingContext<'_>,
) -> Result<S::Output, Error> {
    if !ctx.debugging() || !schema.traced() {
        return schema.parse_in(ctx);
    }
    let name = schema.name();
    ctx.enter(&name);
    let result = schema.parse_in(ctx);
    ctx.leave(&name, &result);
    result
}

/// Builds through `schema`, wrapping the call in the debug trace.
pub(crate) fn build_child<S: Schema + ?Sized>(
    schema: &S,
    value: &S::Output,
    ctx: &mut BuildingContext,
) -> Result<(), Error> {
    if !ctx.debugging() || !schema.traced() {
        return schema.build_in(value, ctx);
    }
    let name = schema.name();
    let before = ctx.written();
    ctx.enter(&name, value);
    let result = schema.build_in(value, ctx);
    let written = ctx.written().saturating_sub(before);
    ctx.leave(&name, &result, written);
    result
}

/// Object-safe view of a [Schema] whose output converts to and from [Value].
///
/// Implemented for every such schema; used wherever schemas of different output
/// types sit side by side.
pub trait DynSchema: Send + Sync {
    fn schema_name(&self) -> Cow<'static, str>;

    fn parse_value(&self, ctx: &mut ParsingContext<'_>) -> Result<Value, Error>;

    fn build_value(&self, value: &Value, ctx: &mut BuildingContext) -> Result<(), Error>;

    fn build_missing(&self, ctx: &mut BuildingContext) -> Result<(), Error>;
}

impl<S> DynSchema for S
where
    S: Schema,
    S::Output: IntoValue + FromValue,
{
    fn schema_name(&self) -> Cow<'static, str> {
        Schema::name(self)
    }

    fn parse_value(&self, ctx: &mut ParsingContext<'_>) -> Result<Value, Error> {
        parse_child(self, ctx).map(IntoValue::into_value)
    }

    fn build_value(&self, value: &Value, ctx: &mut BuildingContext) -> Result<(), Error> {
        let typed = S::Output::from_value(value)?;
        build_child(self, &typed, ctx)
    }

    fn build_missing(&self, ctx: &mut BuildingContext) -> Result<(), Error> {
        Schema::build_absent(self, ctx)
    }
}

/// A type-erased schema producing [Value]s.
pub type AnySchema = Box<dyn DynSchema>;

impl Schema for AnySchema {
    type Output = Value;

    fn name(&self) -> Cow<'static, str> {
        (**self).schema_name()
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Value, Error> {
        (**self).parse_value(ctx)
    }

    fn build_in(&self, value: &Value, ctx: &mut BuildingContext) -> Result<(), Error> {
        (**self).build_value(value, ctx)
    }

    fn build_absent(&self, ctx: &mut BuildingContext) -> Result<(), Error> {
        (**self).build_missing(ctx)
    }

    fn traced(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::{literal, uint8, uint16};

    #[test]
    fn test_boxed_schema_parses_values() {
        let schema = uint16().boxed();
        assert_eq!(schema.parse(&[0x12, 0x34]), Ok(Value::U64(0x1234)));
        assert_eq!(schema.build(&Value::U64(0x1234)), Ok(vec![0x12, 0x34]));
    }

    #[test]
    fn test_boxed_schema_rejects_wrong_value() {
        let schema = uint8().boxed();
        assert_eq!(
            schema.build(&Value::U64(300)),
            Err(Error::InvalidValue {
                expected: "u8",
                found: "unsigned integer"
            })
        );
    }

    #[test]
    fn test_build_absent_defaults_to_missing_value() {
        let mut ctx = BuildingContext::new();
        assert_eq!(
            Schema::build_absent(&uint8(), &mut ctx),
            Err(Error::MissingValue)
        );
        assert_eq!(literal([0xaau8]).boxed().build_missing(&mut ctx), Ok(()));
        assert_eq!(ctx.finish(), vec![0xaa]);
    }

    #[test]
    fn test_debug_entry_points_match_plain_ones() {
        let schema = uint16();
        assert_eq!(schema.parse_debug(&[0, 7]), schema.parse(&[0, 7]));
        assert_eq!(schema.build_debug(&7), schema.build(&7));
    }
}
