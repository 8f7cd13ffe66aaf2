//! Homogeneous sequences with a literal or scope-derived count.

use std::borrow::Cow;

use crate::{
    context::{BuildingContext, INDEX_FIELD, ParsingContext},
    errors::Error,
    length::Length,
    schema::{Schema, build_child, parse_child},
    value::{Record, Value},
};

/// `count` items of the same schema.
///
/// The count is resolved once, against the enclosing scope, before the first
/// item. Each item runs in its own scope layer carrying its index.
#[derive(Debug, Clone)]
pub struct Array<S> {
    item: S,
    count: Length,
}

pub fn array<S: Schema>(item: S, count: impl Into<Length>) -> Array<S> {
    Array {
        item,
        count: count.into(),
    }
}

impl<S> Array<S> {
    /// Replaces the count expression.
    pub fn count(mut self, count: impl Into<Length>) -> Self {
        self.count = count.into();
        self
    }
}

fn index_layer(index: usize) -> Record {
    Record::from([(INDEX_FIELD.to_string(), Value::U64(index as u64))])
}

impl<S: Schema> Schema for Array<S> {
    type Output = Vec<S::Output>;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("array<{}>(count={:?})", self.item.name(), self.count))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Self::Output, Error> {
        let count = self.count.resolve_clamped(&ctx.scope())?;
        let mut items = Vec::with_capacity(count.min(ctx.remaining()));
        for index in 0..count {
            let (item, _) = ctx.scoped(index_layer(index), |ctx| parse_child(&self.item, ctx));
            items.push(item?);
        }
        Ok(items)
    }

    fn build_in(&self, value: &Self::Output, ctx: &mut BuildingContext) -> Result<(), Error> {
        let count = self.count.resolve_clamped(&ctx.scope())?;
        if value.len() != count {
            return Err(Error::LengthMismatch {
                schema: "array",
                expected: count,
                actual: value.len(),
            });
        }
        for (index, item) in value.iter().enumerate() {
            let (result, _) = ctx.scoped(index_layer(index), |ctx| build_child(&self.item, item, ctx));
            result?;
        }
        Ok(())
    }
}
