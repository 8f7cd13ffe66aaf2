//! Sub-regions whose length is known before they start.

use std::borrow::Cow;

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    length::Length,
    schema::{Schema, build_child, parse_child},
};

/// Parses `inner` inside a window of exactly `length` bytes.
///
/// The length is resolved against the enclosing scope. `inner` sees the
/// window with its own cursor starting at 0 and still reads ancestor fields.
/// The outer cursor moves past the whole window whatever `inner` consumed.
///
/// Building emits only the bytes of `inner`: the length itself is expected to
/// be a sibling field of the enclosing struct.
#[derive(Debug, Clone)]
pub struct Prefixed<S> {
    length: Length,
    inner: S,
}

pub fn prefixed<S: Schema>(length: impl Into<Length>, inner: S) -> Prefixed<S> {
    Prefixed {
        length: length.into(),
        inner,
    }
}

impl<S: Schema> Schema for Prefixed<S> {
    type Output = S::Output;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("prefixed<{}>(len={:?})", self.inner.name(), self.length))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<S::Output, Error> {
        let len = self.length.resolve_strict(&ctx.scope())?;
        ctx.window(len, |ctx| parse_child(&self.inner, ctx))
    }

    fn build_in(&self, value: &S::Output, ctx: &mut BuildingContext) -> Result<(), Error> {
        let built = ctx.isolated(|ctx| build_child(&self.inner, value, ctx))?;
        ctx.push(built);
        Ok(())
    }
}
