//! Ordered aggregate of named fields.

use std::borrow::Cow;

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    schema::{AnySchema, DynSchema, Schema},
    value::Record,
};

/// A named field of a [Struct].
pub struct Field {
    pub name: String,
    pub schema: AnySchema,
}

/// Fields parsed and built in declaration order.
///
/// While parsing, each field becomes visible to the expressions of the fields
/// after it as soon as it is parsed. While building, the whole value is visible
/// from the start, so an expression may read a field declared after it.
#[derive(Default)]
pub struct Struct {
    fields: Vec<Field>,
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field. A repeated name replaces the earlier value in the parsed record.
    pub fn field(mut self, name: impl Into<String>, schema: impl DynSchema + 'static) -> Self {
        self.fields.push(Field {
            name: name.into(),
            schema: Box::new(schema),
        });
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }
}

impl Schema for Struct {
    type Output = Record;

    fn name(&self) -> Cow<'static, str> {
        let names: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        Cow::Owned(format!("struct{{{}}}", names.join(", ")))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Record, Error> {
        let (result, record) = ctx.scoped(Record::new(), |ctx| {
            for field in &self.fields {
                let value = field.schema.parse_value(ctx)?;
                ctx.scope_mut().insert(field.name.clone(), value);
            }
            Ok(())
        });
        result.map(|()| record)
    }

    fn build_in(&self, value: &Record, ctx: &mut BuildingContext) -> Result<(), Error> {
        let (result, _) = ctx.scoped(value.clone(), |ctx| {
            for field in &self.fields {
                match value.get(&field.name) {
                    Some(item) => field.schema.build_value(item, ctx)?,
                    None => field.schema.build_missing(ctx).map_err(|err| match err {
                        Error::MissingValue => Error::MissingField(field.name.clone()),
                        other => other,
                    })?,
                }
            }
            Ok(())
        });
        result
    }
}
