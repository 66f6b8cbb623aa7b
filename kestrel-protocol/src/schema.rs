//! Dynamic schema descriptions and values
//!
//! Statically typed messages go through [`Encodable`]/[`Decodable`]. This
//! module describes the same layouts as data: a [`Schema`] is a tree of
//! [`WireType`] tags and a [`WireValue`] is a value shaped like one. Every
//! tag has exactly one encode and one decode arm, and both reuse the static
//! primitive codecs so the two paths cannot disagree on bytes.

use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BufMut, Bytes};

use crate::codec::{decode_len, len_to_i32, Decodable, Encodable};
use crate::error::{DecodeError, EncodeError, UnsupportedType};
use crate::primitives::{
    get_nullable_bytes, get_string, put_nullable_bytes, put_str, KafkaArray, KafkaString,
    NullableBytes,
};

/// The closed set of kinds the wire format can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WireType {
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    Bytes,
    Struct,
    Sequence,
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Int8 => "int8",
            WireType::Int16 => "int16",
            WireType::Int32 => "int32",
            WireType::Int64 => "int64",
            WireType::String => "string",
            WireType::Bytes => "bytes",
            WireType::Struct => "struct",
            WireType::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// Primitive kinds a schema description may name, including the ones the
/// wire format has no encoding for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    Bytes,
    Bool,
    UInt8,
    UInt16,
    UInt32,
    UInt64,
    Float32,
    Float64,
}

impl PrimitiveKind {
    const ALL: [PrimitiveKind; 13] = [
        PrimitiveKind::Int8,
        PrimitiveKind::Int16,
        PrimitiveKind::Int32,
        PrimitiveKind::Int64,
        PrimitiveKind::String,
        PrimitiveKind::Bytes,
        PrimitiveKind::Bool,
        PrimitiveKind::UInt8,
        PrimitiveKind::UInt16,
        PrimitiveKind::UInt32,
        PrimitiveKind::UInt64,
        PrimitiveKind::Float32,
        PrimitiveKind::Float64,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Int8 => "int8",
            PrimitiveKind::Int16 => "int16",
            PrimitiveKind::Int32 => "int32",
            PrimitiveKind::Int64 => "int64",
            PrimitiveKind::String => "string",
            PrimitiveKind::Bytes => "bytes",
            PrimitiveKind::Bool => "boolean",
            PrimitiveKind::UInt8 => "uint8",
            PrimitiveKind::UInt16 => "uint16",
            PrimitiveKind::UInt32 => "uint32",
            PrimitiveKind::UInt64 => "uint64",
            PrimitiveKind::Float32 => "float32",
            PrimitiveKind::Float64 => "float64",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PrimitiveKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("Unknown primitive kind: {}", s))
    }
}

/// A named, positional struct field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub schema: Schema,
}

impl Field {
    pub fn new(name: impl Into<String>, schema: Schema) -> Self {
        Self {
            name: name.into(),
            schema,
        }
    }
}

/// Shape of a wire value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Int8,
    Int16,
    Int32,
    Int64,
    String,
    Bytes,
    /// Fields in wire order. Position is the encoding; names are only labels.
    Struct(Vec<Field>),
    /// Int32 count followed by that many elements.
    Sequence(Box<Schema>),
}

impl Schema {
    /// Schema for a primitive kind; kinds without a wire encoding are rejected.
    pub fn primitive(kind: PrimitiveKind) -> Result<Self, UnsupportedType> {
        match kind {
            PrimitiveKind::Int8 => Ok(Schema::Int8),
            PrimitiveKind::Int16 => Ok(Schema::Int16),
            PrimitiveKind::Int32 => Ok(Schema::Int32),
            PrimitiveKind::Int64 => Ok(Schema::Int64),
            PrimitiveKind::String => Ok(Schema::String),
            PrimitiveKind::Bytes => Ok(Schema::Bytes),
            unsupported => Err(UnsupportedType(unsupported)),
        }
    }

    pub fn structure<N: Into<String>>(fields: impl IntoIterator<Item = (N, Schema)>) -> Self {
        Schema::Struct(
            fields
                .into_iter()
                .map(|(name, schema)| Field::new(name, schema))
                .collect(),
        )
    }

    pub fn sequence(element: Schema) -> Self {
        Schema::Sequence(Box::new(element))
    }

    pub fn wire_type(&self) -> WireType {
        match self {
            Schema::Int8 => WireType::Int8,
            Schema::Int16 => WireType::Int16,
            Schema::Int32 => WireType::Int32,
            Schema::Int64 => WireType::Int64,
            Schema::String => WireType::String,
            Schema::Bytes => WireType::Bytes,
            Schema::Struct(_) => WireType::Struct,
            Schema::Sequence(_) => WireType::Sequence,
        }
    }

    /// Encode `value`, which must have this schema's shape.
    pub fn encode(&self, value: &WireValue, buf: &mut impl BufMut) -> Result<(), EncodeError> {
        match (self, value) {
            (Schema::Int8, WireValue::Int8(v)) => v.encode(buf),
            (Schema::Int16, WireValue::Int16(v)) => v.encode(buf),
            (Schema::Int32, WireValue::Int32(v)) => v.encode(buf),
            (Schema::Int64, WireValue::Int64(v)) => v.encode(buf),
            (Schema::String, WireValue::String(s)) => put_str(s, buf),
            (Schema::Bytes, WireValue::Bytes(b)) => put_nullable_bytes(b.as_deref(), buf),
            (Schema::Struct(fields), WireValue::Struct(values)) => {
                if fields.len() != values.len() {
                    return Err(EncodeError::FieldMismatch {
                        expected: field_names(fields.iter().map(|f| f.name.as_str())),
                        found: field_names(values.iter().map(|(name, _)| name.as_str())),
                    });
                }
                for (field, (name, value)) in fields.iter().zip(values) {
                    if field.name != *name {
                        return Err(EncodeError::FieldMismatch {
                            expected: field.name.clone(),
                            found: name.clone(),
                        });
                    }
                    field.schema.encode(value, buf)?;
                }
                Ok(())
            }
            (Schema::Sequence(element), WireValue::Sequence(items)) => {
                len_to_i32("sequence", items.len())?.encode(buf)?;
                for item in items {
                    element.encode(item, buf)?;
                }
                Ok(())
            }
            (schema, value) => Err(EncodeError::TypeMismatch {
                expected: schema.wire_type(),
                found: value.wire_type(),
            }),
        }
    }

    /// Decode one value of this shape from the front of `buf`.
    pub fn decode(&self, buf: &mut impl Buf) -> Result<WireValue, DecodeError> {
        Ok(match self {
            Schema::Int8 => WireValue::Int8(i8::decode(buf)?),
            Schema::Int16 => WireValue::Int16(i16::decode(buf)?),
            Schema::Int32 => WireValue::Int32(i32::decode(buf)?),
            Schema::Int64 => WireValue::Int64(i64::decode(buf)?),
            Schema::String => WireValue::String(get_string(buf)?),
            Schema::Bytes => WireValue::Bytes(get_nullable_bytes(buf)?),
            Schema::Struct(fields) => {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push((field.name.clone(), field.schema.decode(buf)?));
                }
                WireValue::Struct(values)
            }
            Schema::Sequence(element) => {
                let len = decode_len("sequence", buf)?;
                let mut items = Vec::with_capacity(len.min(buf.remaining()));
                for _ in 0..len {
                    items.push(element.decode(buf)?);
                }
                WireValue::Sequence(items)
            }
        })
    }
}

fn field_names<'a>(names: impl Iterator<Item = &'a str>) -> String {
    names.collect::<Vec<_>>().join(", ")
}

/// A value of any wire type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    Int8(i8),
    Int16(i16),
    Int32(i32),
    Int64(i64),
    String(String),
    Bytes(Option<Bytes>),
    Struct(Vec<(String, WireValue)>),
    Sequence(Vec<WireValue>),
}

impl WireValue {
    pub fn wire_type(&self) -> WireType {
        match self {
            WireValue::Int8(_) => WireType::Int8,
            WireValue::Int16(_) => WireType::Int16,
            WireValue::Int32(_) => WireType::Int32,
            WireValue::Int64(_) => WireType::Int64,
            WireValue::String(_) => WireType::String,
            WireValue::Bytes(_) => WireType::Bytes,
            WireValue::Struct(_) => WireType::Struct,
            WireValue::Sequence(_) => WireType::Sequence,
        }
    }

    /// Look up a struct field by name.
    pub fn field(&self, name: &str) -> Option<&WireValue> {
        match self {
            WireValue::Struct(fields) => fields
                .iter()
                .find(|(field, _)| field == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            WireValue::Int8(v) => Some(v.into()),
            WireValue::Int16(v) => Some(v.into()),
            WireValue::Int32(v) => Some(v.into()),
            WireValue::Int64(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[WireValue]> {
        match self {
            WireValue::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

/// Types whose wire layout can be described as a [`Schema`].
pub trait WireSchema {
    fn schema() -> Schema;
}

macro_rules! impl_wire_schema {
    ($($t:ty => $schema:expr),* $(,)?) => {
        $(
            impl WireSchema for $t {
                fn schema() -> Schema {
                    $schema
                }
            }
        )*
    };
}

impl_wire_schema! {
    i8 => Schema::Int8,
    i16 => Schema::Int16,
    i32 => Schema::Int32,
    i64 => Schema::Int64,
    KafkaString => Schema::String,
    NullableBytes => Schema::Bytes,
}

impl<T: WireSchema> WireSchema for KafkaArray<T> {
    fn schema() -> Schema {
        Schema::sequence(T::schema())
    }
}
