//! Length and count expressions.

use std::{fmt, sync::Arc};

use crate::{context::Scope, errors::Error};

/// Expression over the visible scope. `None` means the expression could not
/// produce an integer.
pub type LengthFn = dyn Fn(&Scope<'_>) -> Option<i64> + Send + Sync;

/// A byte length or item count, resolved lazily when a schema needs it.
#[derive(Clone)]
pub enum Length {
    /// A literal value.
    Fixed(usize),
    /// The value of a field visible in the scope.
    Field(String),
    /// Any function of the visible scope.
    Func(Arc<LengthFn>),
}

impl Length {
    /// Wraps a closure over the scope.
    ///
    /// ```
    /// use bytecraft::length::Length;
    ///
    /// let doubled = Length::with(|scope| Some(scope.int("count")? * 2));
    /// # let _ = doubled;
    /// ```
    pub fn with(f: impl Fn(&Scope<'_>) -> Option<i64> + Send + Sync + 'static) -> Self {
        Length::Func(Arc::new(f))
    }

    /// Evaluates the expression; the result may be negative.
    pub fn resolve(&self, scope: &Scope<'_>) -> Result<i64, Error> {
        match self {
            Length::Fixed(n) => i64::try_from(*n)
                .map_err(|_| Error::InvalidLength(format!("{n} does not fit in i64"))),
            Length::Field(name) => match scope.get(name) {
                Some(value) => value.as_i64().ok_or_else(|| {
                    Error::InvalidLength(format!(
                        "field {name:?} is {}, not an integer",
                        value.type_name()
                    ))
                }),
                None => Err(Error::InvalidLength(format!(
                    "field {name:?} is not in scope"
                ))),
            },
            Length::Func(f) => f(scope).ok_or_else(|| {
                Error::InvalidLength("length function returned no value".to_string())
            }),
        }
    }

    /// Evaluates the expression, treating negative results as zero.
    pub fn resolve_clamped(&self, scope: &Scope<'_>) -> Result<usize, Error> {
        let n = self.resolve(scope)?;
        Ok(usize::try_from(n.max(0)).unwrap_or(usize::MAX))
    }

    /// Evaluates the expression, rejecting negative results.
    pub fn resolve_strict(&self, scope: &Scope<'_>) -> Result<usize, Error> {
        let n = self.resolve(scope)?;
        usize::try_from(n).map_err(|_| Error::InvalidLength(format!("{n} is negative")))
    }
}

impl fmt::Debug for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Fixed(n) => write!(f, "{n}"),
            Length::Field(name) => write!(f, "{name}"),
            Length::Func(_) => write!(f, "fn"),
        }
    }
}

impl From<usize> for Length {
    fn from(value: usize) -> Self {
        Length::Fixed(value)
    }
}

impl From<&str> for Length {
    fn from(value: &str) -> Self {
        Length::Field(value.to_string())
    }
}

impl From<String> for Length {
    fn from(value: String) -> Self {
        Length::Field(value)
    }
}
