//! Error types for schema construction, parsing and building.

use thiserror::Error;

/// Errors produced while parsing bytes into values or building values into bytes.
///
/// Every variant aborts the current [crate::schema::Schema::parse] or
/// [crate::schema::Schema::build] call, except inside
/// [crate::schemas::GreedyRange] where an error ends the repetition.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The cursor would move past the end of the current window.
    #[error("not enough data: needed {needed} bytes, only {available} available")]
    InsufficientData { needed: usize, available: usize },
    /// A sequence or byte block does not have the length the schema resolved.
    #[error("{schema} length mismatch: expected {expected}, got {actual}")]
    LengthMismatch {
        schema: &'static str,
        expected: usize,
        actual: usize,
    },
    /// Bytes differ from a literal, either on the wire or in the value to build.
    #[error("literal mismatch: expected {expected:02x?} but got {actual:02x?}")]
    LiteralMismatch { expected: Vec<u8>, actual: Vec<u8> },
    /// A switch key has no case and the switch has no default.
    #[error("switch case not found for key: {0}")]
    UnresolvedCase(String),
    /// A length expression did not produce a usable integer.
    #[error("invalid length: {0}")]
    InvalidLength(String),
    /// A sized region's sub-schema used more bytes than the region declares.
    #[error("sub-schema used {actual} bytes, more than the declared total of {declared}")]
    OversizedSubSchema { declared: usize, actual: usize },
    /// A struct value to build lacks a field that cannot be built without a value.
    #[error("missing field: {0}")]
    MissingField(String),
    /// A schema was asked to build without a value.
    #[error("missing value")]
    MissingValue,
    /// A dynamic value does not fit the schema's value type.
    #[error("invalid value: expected {expected}, found {found}")]
    InvalidValue {
        expected: &'static str,
        found: &'static str,
    },
    /// Bytes or text are not valid for a text encoding.
    #[error("invalid {encoding} data: {reason}")]
    InvalidEncoding {
        encoding: &'static str,
        reason: String,
    },
}

/// Coarse classification of an [Error], for callers that only match on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InsufficientData,
    LengthMismatch,
    LiteralMismatch,
    UnresolvedCase,
    InvalidLength,
    OversizedSubSchema,
    InvalidValue,
    InvalidEncoding,
    /// A schema definition has the wrong shape. Reported by [ConfigError].
    InvalidConfiguration,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InsufficientData { .. } => ErrorKind::InsufficientData,
            Error::LengthMismatch { .. } => ErrorKind::LengthMismatch,
            Error::LiteralMismatch { .. } => ErrorKind::LiteralMismatch,
            Error::UnresolvedCase(_) => ErrorKind::UnresolvedCase,
            Error::InvalidLength(_) => ErrorKind::InvalidLength,
            Error::OversizedSubSchema { .. } => ErrorKind::OversizedSubSchema,
            Error::MissingField(_) | Error::MissingValue | Error::InvalidValue { .. } => {
                ErrorKind::InvalidValue
            }
            Error::InvalidEncoding { .. } => ErrorKind::InvalidEncoding,
        }
    }
}

/// Errors produced when a schema is constructed from arguments of the wrong shape,
/// for example when compiling a [crate::serde::SchemaDef].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Field name is empty or used twice in the same struct.
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
    /// A literal definition is not valid hex.
    #[error("invalid literal: {0}")]
    InvalidLiteral(String),
    /// A switch has neither cases nor a default.
    #[error("switch on {0:?} has no cases and no default")]
    EmptySwitch(String),
    /// A sized region must wrap a struct that contains its length field.
    #[error("sized length field {0:?} is not a field of the wrapped struct")]
    InvalidSizedField(String),
    /// The definition could not be deserialized.
    #[error("invalid definition: {0}")]
    InvalidDefinition(String),
}

impl ConfigError {
    pub fn kind(&self) -> ErrorKind {
        ErrorKind::InvalidConfiguration
    }
}
