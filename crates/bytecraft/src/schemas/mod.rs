//! Leaf schemas and combinators.

pub mod array;
pub mod greedy;
pub mod literal;
pub mod number;
pub mod prefixed;
pub mod raw;
pub mod sized;
pub mod structure;
pub mod switch;
pub mod text;

pub use array::{Array, array};
pub use greedy::{GreedyRange, greedy_range};
pub use literal::{Literal, literal, literal_text};
pub use number::{
    Endian, Number, Primitive, float32, float64, int8, int16, int32, int64, uint8, uint16,
    uint32, uint64,
};
pub use prefixed::{Prefixed, prefixed};
pub use raw::{RawBytes, bytes};
pub use sized::{SizedRegion, sized};
pub use structure::{Field, Struct};
pub use switch::{Discriminator, Switch};
pub use text::{Text, base64, hex, text};
