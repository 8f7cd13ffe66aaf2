//! # bytecraft
//!
//! Declarative binary schemas that parse bytes into values and build the same
//! values back into bytes.
//!
//! Schemas are composed from leaves (numbers, raw bytes, literals, text) and
//! combinators (structs, arrays, switches, greedy ranges, sized and prefixed
//! regions). Lengths, counts and switch keys can depend on fields that were
//! parsed earlier, including fields of enclosing structs.
//!
//! ## Example
//!
//! ```
//! use bytecraft::prelude::*;
//!
//! let packet = Struct::new()
//!     .field("magic", literal_text("BC"))
//!     .field("len", uint16())
//!     .field("payload", bytes("len"))
//!     .field("crc", uint16().little_endian());
//!
//! let data = [b'B', b'C', 0x00, 0x02, 0xde, 0xad, 0x34, 0x12];
//! let record = packet.parse(&data).unwrap();
//! assert_eq!(record.get("crc"), Some(&Value::U64(0x1234)));
//! assert_eq!(packet.build(&record).unwrap(), data);
//! ```

pub mod context;
pub mod encoding;
pub mod errors;
pub mod length;
pub mod schema;
pub mod schemas;
#[cfg(feature = "serde")]
pub mod serde;
pub mod value;

/// Everything needed to declare, parse and build schemas.
pub mod prelude {
    pub use crate::{
        context::{BuildingContext, ParsingContext, Scope},
        errors::{ConfigError, Error, ErrorKind},
        length::Length,
        schema::{AnySchema, DynSchema, Schema},
        schemas::*,
        value::{FromValue, IntoValue, Record, Value},
    };
}
