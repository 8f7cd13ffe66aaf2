//! Keyed dispatch over a discriminator.

use std::{borrow::Cow, collections::HashMap, fmt, sync::Arc};

use crate::{
    context::{BuildingContext, ParsingContext, Scope},
    errors::Error,
    schema::{AnySchema, DynSchema, Schema},
    value::{Record, Value},
};

/// Function of the visible scope that yields the switch key.
pub type DiscriminatorFn = dyn Fn(&Scope<'_>) -> Option<Value> + Send + Sync;

/// How a [Switch] computes its key.
#[derive(Clone)]
pub enum Discriminator {
    /// The value of a field visible in the scope.
    Field(String),
    /// Any function of the visible scope.
    Func(Arc<DiscriminatorFn>),
    /// A key fixed at construction.
    Constant(String),
}

impl Discriminator {
    fn key(&self, scope: &Scope<'_>) -> Option<String> {
        match self {
            Discriminator::Field(name) => scope.get(name)?.to_key(),
            Discriminator::Func(f) => f(scope)?.to_key(),
            Discriminator::Constant(key) => Some(key.clone()),
        }
    }
}

impl fmt::Debug for Discriminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discriminator::Field(name) => write!(f, "{name}"),
            Discriminator::Func(_) => write!(f, "fn"),
            Discriminator::Constant(key) => write!(f, "{key:?}"),
        }
    }
}

/// Chooses one of several schemas by key.
///
/// Keys are compared in their canonical string form (see [Value::to_key]), so
/// `case(1, ..)` matches a discriminator of `U64(1)`, `I64(1)` or `F64(1.0)`.
/// Parsing delegates to the chosen case in the caller's scope. Building first
/// overlays the fields of the value being built, so the key may come from the
/// value itself.
pub struct Switch {
    on: Discriminator,
    cases: HashMap<String, AnySchema>,
    default: Option<AnySchema>,
}

impl Switch {
    pub fn new(on: Discriminator) -> Self {
        Self {
            on,
            cases: HashMap::new(),
            default: None,
        }
    }

    /// Switches on a field visible in the scope.
    pub fn on_field(name: impl Into<String>) -> Self {
        Self::new(Discriminator::Field(name.into()))
    }

    /// Switches on a function of the scope.
    pub fn on(f: impl Fn(&Scope<'_>) -> Option<Value> + Send + Sync + 'static) -> Self {
        Self::new(Discriminator::Func(Arc::new(f)))
    }

    /// Always selects the case registered under `key`.
    pub fn fixed(key: impl fmt::Display) -> Self {
        Self::new(Discriminator::Constant(key.to_string()))
    }

    /// Registers the schema for `key`, replacing any earlier one.
    pub fn case(mut self, key: impl fmt::Display, schema: impl DynSchema + 'static) -> Self {
        self.cases.insert(key.to_string(), Box::new(schema));
        self
    }

    /// Schema used when the key has no case or cannot be computed.
    pub fn default_case(mut self, schema: impl DynSchema + 'static) -> Self {
        self.default = Some(Box::new(schema));
        self
    }

    fn select(&self, key: Option<&str>) -> Result<&AnySchema, Error> {
        key.and_then(|key| self.cases.get(key))
            .or(self.default.as_ref())
            .ok_or_else(|| Error::UnresolvedCase(key.unwrap_or("<missing>").to_string()))
    }
}

impl Schema for Switch {
    type Output = Value;

    fn name(&self) -> Cow<'static, str> {
        Cow::Owned(format!("switch(on={:?})", self.on))
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<Value, Error> {
        let key = self.on.key(&ctx.scope());
        ctx.log(format_args!("switch key: {}", key.as_deref().unwrap_or("<missing>")));
        self.select(key.as_deref())?.parse_value(ctx)
    }

    fn build_in(&self, value: &Value, ctx: &mut BuildingContext) -> Result<(), Error> {
        let overlay = value.as_struct().cloned().unwrap_or_else(Record::new);
        let (result, _) = ctx.scoped(overlay, |ctx| {
            let key = self.on.key(&ctx.scope());
            ctx.log(format_args!("switch key: {}", key.as_deref().unwrap_or("<missing>")));
            self.select(key.as_deref())?.build_value(value, ctx)
        });
        result
    }
}
