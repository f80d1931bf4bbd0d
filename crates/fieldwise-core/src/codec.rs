//! Conversion between typed values and mutable trees

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::ser::{self, Serialize};
use serde_json::Value;
use std::any::type_name;

/// Converts values to and from the tree the engine walks
///
/// The engine owns one codec and uses it for every call, so implementations
/// must be stateless or internally synchronized.
pub trait TreeCodec: Send + Sync {
    fn to_tree<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value>;

    fn from_tree<T: DeserializeOwned>(&self, tree: Value) -> Result<T>;
}

/// Default codec backed by `serde_json`
///
/// JSON numbers cannot hold NaN or infinities, and `serde_json` would turn
/// them into `null`. Values containing a non-finite float are rejected with
/// [`Error::Serialization`] instead, so they never come back altered.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl TreeCodec for JsonCodec {
    fn to_tree<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value> {
        value
            .serialize(FiniteFloats)
            .and_then(|()| serde_json::to_value(value))
            .map_err(|source| Error::Serialization {
                type_name: type_name::<T>().to_string(),
                source,
            })
    }

    fn from_tree<T: DeserializeOwned>(&self, tree: Value) -> Result<T> {
        serde_json::from_value(tree).map_err(|source| Error::Deserialization {
            type_name: type_name::<T>().to_string(),
            source,
        })
    }
}

/// Serializer that produces nothing and fails on the first non-finite float
#[derive(Clone, Copy)]
struct FiniteFloats;

impl FiniteFloats {
    fn check(value: f64) -> std::result::Result<(), serde_json::Error> {
        if value.is_finite() {
            Ok(())
        } else {
            Err(ser::Error::custom(format_args!(
                "non-finite float {value} cannot be represented in a JSON tree"
            )))
        }
    }
}

macro_rules! accept {
    ($($method:ident: $ty:ty),* $(,)?) => {
        $(
            fn $method(self, _value: $ty) -> std::result::Result<(), serde_json::Error> {
                Ok(())
            }
        )*
    };
}

impl ser::Serializer for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    accept! {
        serialize_bool: bool,
        serialize_i8: i8,
        serialize_i16: i16,
        serialize_i32: i32,
        serialize_i64: i64,
        serialize_i128: i128,
        serialize_u8: u8,
        serialize_u16: u16,
        serialize_u32: u32,
        serialize_u64: u64,
        serialize_u128: u128,
        serialize_char: char,
        serialize_str: &str,
        serialize_bytes: &[u8],
        serialize_unit_struct: &'static str,
    }

    fn serialize_f32(self, value: f32) -> std::result::Result<(), serde_json::Error> {
        Self::check(f64::from(value))
    }

    fn serialize_f64(self, value: f64) -> std::result::Result<(), serde_json::Error> {
        Self::check(value)
    }

    fn serialize_none(self) -> std::result::Result<(), serde_json::Error> {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(
        self,
        value: &T,
    ) -> std::result::Result<(), serde_json::Error> {
        value.serialize(self)
    }

    fn serialize_unit(self) -> std::result::Result<(), serde_json::Error> {
        Ok(())
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
    ) -> std::result::Result<(), serde_json::Error> {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        value: &T,
    ) -> std::result::Result<(), serde_json::Error> {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        value: &T,
    ) -> std::result::Result<(), serde_json::Error> {
        value.serialize(self)
    }

    fn serialize_seq(self, _len: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple(self, _len: usize) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_map(self, _len: Option<usize>) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct(
        self,
        _name: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _name: &'static str,
        _index: u32,
        _variant: &'static str,
        _len: usize,
    ) -> std::result::Result<Self, serde_json::Error> {
        Ok(self)
    }
}

macro_rules! check_elements {
    ($($trait:ident::$method:ident),* $(,)?) => {
        $(
            impl ser::$trait for FiniteFloats {
                type Ok = ();
                type Error = serde_json::Error;

                fn $method<T: Serialize + ?Sized>(
                    &mut self,
                    value: &T,
                ) -> std::result::Result<(), serde_json::Error> {
                    value.serialize(*self)
                }

                fn end(self) -> std::result::Result<(), serde_json::Error> {
                    Ok(())
                }
            }
        )*
    };
}

check_elements! {
    SerializeSeq::serialize_element,
    SerializeTuple::serialize_element,
    SerializeTupleStruct::serialize_field,
    SerializeTupleVariant::serialize_field,
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = serde_json::Error;

    fn serialize_key<T: Serialize + ?Sized>(
        &mut self,
        key: &T,
    ) -> std::result::Result<(), serde_json::Error> {
        key.serialize(*self)
    }

    fn serialize_value<T: Serialize + ?Sized>(
        &mut self,
        value: &T,
    ) -> std::result::Result<(), serde_json::Error> {
        value.serialize(*self)
    }

    fn end(self) -> std::result::Result<(), serde_json::Error> {
        Ok(())
    }
}

macro_rules! check_fields {
    ($($trait:ident),* $(,)?) => {
        $(
            impl ser::$trait for FiniteFloats {
                type Ok = ();
                type Error = serde_json::Error;

                fn serialize_field<T: Serialize + ?Sized>(
                    &mut self,
                    _key: &'static str,
                    value: &T,
                ) -> std::result::Result<(), serde_json::Error> {
                    value.serialize(*self)
                }

                fn end(self) -> std::result::Result<(), serde_json::Error> {
                    Ok(())
                }
            }
        )*
    };
}

check_fields! {
    SerializeStruct,
    SerializeStructVariant,
}
