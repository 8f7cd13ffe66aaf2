//! Fixed-width integers and floats.

use std::{borrow::Cow, fmt, marker::PhantomData};

use bytes::{Buf, BufMut, BytesMut};

use crate::{
    context::{BuildingContext, ParsingContext},
    errors::Error,
    schema::Schema,
    value::{FromValue, IntoValue},
};

/// Byte order of a [Number].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Endian {
    #[default]
    Big,
    Little,
}

/// A numeric type with a fixed wire width.
pub trait Primitive:
    Copy + fmt::Debug + IntoValue + FromValue + Send + Sync + 'static
{
    const WIDTH: usize;
    const NAME: &'static str;

    /// Reads from exactly [Primitive::WIDTH] bytes.
    fn read(buf: &[u8], endian: Endian) -> Self;

    fn write(self, buf: &mut BytesMut, endian: Endian);
}

macro_rules! impl_primitive {
    ($type:ty, $name:literal, $get:ident, $get_le:ident, $put:ident, $put_le:ident) => {
        impl Primitive for $type {
            const WIDTH: usize = std::mem::size_of::<$type>();
            const NAME: &'static str = $name;

            #[inline]
            fn read(mut buf: &[u8], endian: Endian) -> Self {
                match endian {
                    Endian::Big => buf.$get(),
                    Endian::Little => buf.$get_le(),
                }
            }

            #[inline]
            fn write(self, buf: &mut BytesMut, endian: Endian) {
                match endian {
                    Endian::Big => buf.$put(self),
                    Endian::Little => buf.$put_le(self),
                }
            }
        }
    };
}

impl_primitive!(u8, "uint8", get_u8, get_u8, put_u8, put_u8);
impl_primitive!(u16, "uint16", get_u16, get_u16_le, put_u16, put_u16_le);
impl_primitive!(u32, "uint32", get_u32, get_u32_le, put_u32, put_u32_le);
impl_primitive!(u64, "uint64", get_u64, get_u64_le, put_u64, put_u64_le);
impl_primitive!(i8, "int8", get_i8, get_i8, put_i8, put_i8);
impl_primitive!(i16, "int16", get_i16, get_i16_le, put_i16, put_i16_le);
impl_primitive!(i32, "int32", get_i32, get_i32_le, put_i32, put_i32_le);
impl_primitive!(i64, "int64", get_i64, get_i64_le, put_i64, put_i64_le);
impl_primitive!(f32, "float32", get_f32, get_f32_le, put_f32, put_f32_le);
impl_primitive!(f64, "float64", get_f64, get_f64_le, put_f64, put_f64_le);

/// Fixed-width numeric schema. Big-endian unless changed with [Number::endian].
pub struct Number<T> {
    endian: Endian,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Number<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Number<T> {}

impl<T: Primitive> fmt::Debug for Number<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({:?})", T::NAME, self.endian)
    }
}

impl<T: Primitive> Default for Number<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Primitive> Number<T> {
    pub fn new() -> Self {
        Self {
            endian: Endian::Big,
            _marker: PhantomData,
        }
    }

    /// Selects the byte order.
    pub fn endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    pub fn little_endian(self) -> Self {
        self.endian(Endian::Little)
    }
}

impl<T: Primitive> Schema for Number<T> {
    type Output = T;

    fn name(&self) -> Cow<'static, str> {
        Cow::Borrowed(T::NAME)
    }

    fn parse_in(&self, ctx: &mut ParsingContext<'_>) -> Result<T, Error> {
        let bytes = ctx.read(T::WIDTH)?;
        Ok(T::read(bytes, self.endian))
    }

    fn build_in(&self, value: &T, ctx: &mut BuildingContext) -> Result<(), Error> {
        let mut buf = BytesMut::with_capacity(T::WIDTH);
        value.write(&mut buf, self.endian);
        ctx.push(buf.freeze());
        Ok(())
    }
}

pub fn uint8() -> Number<u8> {
    Number::new()
}

pub fn uint16() -> Number<u16> {
    Number::new()
}

pub fn uint32() -> Number<u32> {
    Number::new()
}

pub fn uint64() -> Number<u64> {
    Number::new()
}

pub fn int8() -> Number<i8> {
    Number::new()
}

pub fn int16() -> Number<i16> {
    Number::new()
}

pub fn int32() -> Number<i32> {
    Number::new()
}

pub fn int64() -> Number<i64> {
    Number::new()
}

pub fn float32() -> Number<f32> {
    Number::new()
}

pub fn float64() -> Number<f64> {
    Number::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uint16() {
        assert_eq!(uint16().parse(&[0x12, 0x34]), Ok(0x1234));
        assert_eq!(uint16().build(&0x1234), Ok(vec![0x12, 0x34]));
    }

    #[test]
    fn test_uint32_symmetry() {
        let bytes = uint32().build(&123456789).unwrap();
        assert_eq!(bytes, vec![0x07, 0x5b, 0xcd, 0x15]);
        assert_eq!(uint32().parse(&bytes), Ok(123456789));
    }

    #[test]
    fn test_little_endian() {
        let schema = uint32().endian(Endian::Little);
        assert_eq!(schema.parse(&[0x78, 0x56, 0x34, 0x12]), Ok(0x12345678));
        assert_eq!(schema.build(&0x12345678), Ok(vec![0x78, 0x56, 0x34, 0x12]));
    }

    #[test]
    fn test_signed_and_float() {
        assert_eq!(int16().parse(&[0xff, 0xfe]), Ok(-2));
        assert_eq!(int8().build(&-1), Ok(vec![0xff]));
        assert_eq!(float32().parse(&[0x3f, 0xc0, 0x00, 0x00]), Ok(1.5));
        assert_eq!(
            float64().little_endian().build(&1.0),
            Ok(1.0f64.to_le_bytes().to_vec())
        );
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            uint32().parse(&[0x00, 0x01]),
            Err(Error::InsufficientData {
                needed: 4,
                available: 2
            })
        );
    }

    #[test]
    fn test_uint64_extremes() {
        let bytes = uint64().build(&u64::MAX).unwrap();
        assert_eq!(bytes, vec![0xff; 8]);
        assert_eq!(int64().parse(&[0x80, 0, 0, 0, 0, 0, 0, 0]), Ok(i64::MIN));
    }
}
