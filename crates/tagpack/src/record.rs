//! Projection between native Rust types and [`Value`] trees.
//!
//! [`ToValue`] and [`FromValue`] cover primitives and containers. Structs opt
//! in through [`Record`], normally generated by [`impl_record!`](crate::impl_record),
//! which supplies an explicit descriptor table instead of runtime reflection.

use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

use tracing::trace;

use crate::error::CodecError;
use crate::registry::SchemaRegistry;
use crate::schema::{FieldDescriptor, FieldKind};
use crate::value::{Extension, Value};

/// Wire shape of records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StructMode {
    /// Field values in declaration order, no names.
    AsArray,
    /// Field name to value, in declaration order.
    #[default]
    AsMap,
    /// Decode accepts either shape; encode behaves like [`StructMode::AsMap`].
    Auto,
}

/// Context threaded through a projection: the struct mode for every nesting
/// level and the registry that caches record schemas.
#[derive(Debug, Clone, Copy)]
pub struct Projection<'a> {
    pub mode: StructMode,
    pub registry: &'a SchemaRegistry,
}

impl<'a> Projection<'a> {
    pub fn new(mode: StructMode, registry: &'a SchemaRegistry) -> Self {
        Self { mode, registry }
    }
}

/// Native value to [`Value`].
pub trait ToValue {
    /// Kind recorded in field descriptors.
    fn kind() -> FieldKind;

    fn to_value(&self, cx: Projection<'_>) -> Result<Value, CodecError>;
}

/// [`Value`] to native value.
///
/// Integers are range checked against the target type and fail with
/// [`CodecError::Overflow`] rather than truncating.
pub trait FromValue: Sized {
    fn from_value(value: Value, cx: Projection<'_>) -> Result<Self, CodecError>;
}

/// A struct with a fixed, ordered field table.
///
/// `Default` supplies the value of fields a map-mode payload leaves out.
pub trait Record: Default + Send + Sync + 'static {
    const TYPE_NAME: &'static str;

    /// Descriptor table in declaration order; ordinals run `0..n`.
    fn describe() -> Vec<FieldDescriptor>;

    /// Field values in declaration order.
    fn field_values(&self, cx: Projection<'_>) -> Result<Vec<Value>, CodecError>;

    /// Stores `value` into the field at `ordinal`.
    fn set_field(
        &mut self,
        ordinal: usize,
        value: Value,
        cx: Projection<'_>,
    ) -> Result<(), CodecError>;
}

/// Projects a record into an array or a map according to `cx.mode`.
pub fn record_to_value<R: Record>(record: &R, cx: Projection<'_>) -> Result<Value, CodecError> {
    let schema = cx.registry.resolve::<R>()?;
    let values = record.field_values(cx)?;
    if values.len() != schema.len() {
        return Err(CodecError::SchemaMismatch(format!(
            "{} produced {} values for {} fields",
            R::TYPE_NAME,
            values.len(),
            schema.len()
        )));
    }
    match cx.mode {
        StructMode::AsArray => Ok(Value::Array(values)),
        StructMode::AsMap | StructMode::Auto => Ok(Value::Map(
            schema
                .names()
                .map(|name| Value::Str(name.to_owned()))
                .zip(values)
                .collect(),
        )),
    }
}

/// Builds a record from an array or a map according to `cx.mode`.
///
/// Array payloads must carry exactly one value per field. Map payloads are
/// matched by name: absent fields keep their default, unknown or non-string
/// keys are skipped and a repeated key overwrites the earlier one.
pub fn record_from_value<R: Record>(value: Value, cx: Projection<'_>) -> Result<R, CodecError> {
    let schema = cx.registry.resolve::<R>()?;
    let mut out = R::default();
    match (cx.mode, value) {
        (StructMode::AsArray | StructMode::Auto, Value::Array(items)) => {
            if items.len() != schema.len() {
                return Err(CodecError::SchemaMismatch(format!(
                    "{} expects {} fields, array has {}",
                    R::TYPE_NAME,
                    schema.len(),
                    items.len()
                )));
            }
            for (ordinal, item) in items.into_iter().enumerate() {
                out.set_field(ordinal, item, cx)?;
            }
        }
        (StructMode::AsMap | StructMode::Auto, Value::Map(pairs)) => {
            for (key, val) in pairs {
                let name = match key {
                    Value::Str(name) => name,
                    other => {
                        trace!(
                            record = R::TYPE_NAME,
                            key = other.kind_name(),
                            "skipping non-string key"
                        );
                        continue;
                    }
                };
                match schema.ordinal_of(&name) {
                    Some(ordinal) => out.set_field(ordinal, val, cx)?,
                    None => trace!(record = R::TYPE_NAME, key = %name, "skipping unknown field"),
                }
            }
        }
        (mode, other) => {
            let expected = match mode {
                StructMode::AsArray => "array",
                StructMode::AsMap => "map",
                StructMode::Auto => "array or map",
            };
            return Err(CodecError::mismatch(
                format_args!("{expected} for record {}", R::TYPE_NAME),
                other.kind_name(),
            ));
        }
    }
    Ok(out)
}

/// Kind of the field reached by `access`; used by [`impl_record!`](crate::impl_record).
#[doc(hidden)]
pub fn kind_of<S, T: ToValue, F: Fn(&S) -> &T>(_access: F) -> FieldKind {
    T::kind()
}

/// Implements [`Record`], [`ToValue`] and [`FromValue`] for a struct.
///
/// Each entry maps a Rust field to its wire name; declaration order is the
/// array-mode order. Every field type must implement both projection traits
/// and the struct must implement `Default`.
///
/// ```
/// use tagpack::{impl_record, Codec, StructMode};
///
/// #[derive(Debug, Default, PartialEq)]
/// struct Child {
///     int: i64,
///     string: String,
/// }
///
/// impl_record!(Child {
///     int => "Int",
///     string => "String",
/// });
///
/// let codec = Codec::new();
/// let child = Child { int: -123, string: "hi".into() };
/// let bytes = codec.encode_record(&child, StructMode::AsArray).unwrap();
/// let back: Child = codec.decode_record(&bytes, StructMode::AsArray).unwrap();
/// assert_eq!(back, child);
/// ```
#[macro_export]
macro_rules! impl_record {
    ($ty:ident { $($field:ident => $name:literal),* $(,)? }) => {
        impl $crate::Record for $ty {
            const TYPE_NAME: &'static str = stringify!($ty);

            fn describe() -> ::std::vec::Vec<$crate::FieldDescriptor> {
                let mut fields = ::std::vec::Vec::new();
                $(
                    let kind = $crate::record::kind_of(|r: &$ty| &r.$field);
                    fields.push($crate::FieldDescriptor::new($name, fields.len(), kind));
                )*
                fields
            }

            fn field_values(
                &self,
                cx: $crate::Projection<'_>,
            ) -> ::std::result::Result<::std::vec::Vec<$crate::Value>, $crate::CodecError> {
                ::std::result::Result::Ok(::std::vec![
                    $(
                        $crate::ToValue::to_value(&self.$field, cx)
                            .map_err(|e| e.at_field(stringify!($ty), $name))?
                    ),*
                ])
            }

            #[allow(unused_mut, unused_assignments, unused_variables)]
            fn set_field(
                &mut self,
                ordinal: usize,
                value: $crate::Value,
                cx: $crate::Projection<'_>,
            ) -> ::std::result::Result<(), $crate::CodecError> {
                let mut index = 0usize;
                $(
                    if ordinal == index {
                        self.$field = $crate::FromValue::from_value(value, cx)
                            .map_err(|e| e.at_field(stringify!($ty), $name))?;
                        return ::std::result::Result::Ok(());
                    }
                    index += 1;
                )*
                ::std::result::Result::Err($crate::CodecError::SchemaMismatch(::std::format!(
                    "{} has no field at ordinal {}",
                    stringify!($ty),
                    ordinal
                )))
            }
        }

        impl $crate::ToValue for $ty {
            fn kind() -> $crate::FieldKind {
                $crate::FieldKind::Record(stringify!($ty))
            }

            fn to_value(
                &self,
                cx: $crate::Projection<'_>,
            ) -> ::std::result::Result<$crate::Value, $crate::CodecError> {
                $crate::record::record_to_value(self, cx)
            }
        }

        impl $crate::FromValue for $ty {
            fn from_value(
                value: $crate::Value,
                cx: $crate::Projection<'_>,
            ) -> ::std::result::Result<Self, $crate::CodecError> {
                $crate::record::record_from_value(value, cx)
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Primitive projections

impl ToValue for bool {
    fn kind() -> FieldKind {
        FieldKind::Bool
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(Value::Bool(*self))
    }
}

impl FromValue for bool {
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Bool(b) => Ok(b),
            other => Err(CodecError::mismatch(FieldKind::Bool, other.kind_name())),
        }
    }
}

fn wire_integer(value: &Value, kind: FieldKind) -> Result<i128, CodecError> {
    value
        .as_i128()
        .ok_or_else(|| CodecError::mismatch(kind, value.kind_name()))
}

macro_rules! integer_projection {
    ($kind:ident: $($t:ty),*) => {$(
        impl ToValue for $t {
            fn kind() -> FieldKind {
                FieldKind::$kind
            }

            fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
                Ok(Value::from(*self))
            }
        }

        impl FromValue for $t {
            fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
                let n = wire_integer(&value, FieldKind::$kind)?;
                <$t>::try_from(n).map_err(|_| CodecError::overflow(n, stringify!($t)))
            }
        }
    )*};
}

integer_projection!(Int: i8, i16, i32, i64, isize);
integer_projection!(Uint: u8, u16, u32, u64, usize);

impl ToValue for f32 {
    fn kind() -> FieldKind {
        FieldKind::Float32
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(Value::Float32(*self))
    }
}

impl FromValue for f32 {
    /// Accepts `Float64` only when narrowing loses nothing.
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Float32(f) => Ok(f),
            Value::Float64(d) => {
                let narrowed = d as f32;
                if narrowed as f64 == d || d.is_nan() {
                    Ok(narrowed)
                } else {
                    Err(CodecError::overflow(d, "f32"))
                }
            }
            other => Err(CodecError::mismatch(FieldKind::Float32, other.kind_name())),
        }
    }
}

impl ToValue for f64 {
    fn kind() -> FieldKind {
        FieldKind::Float64
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(Value::Float64(*self))
    }
}

impl FromValue for f64 {
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Float64(d) => Ok(d),
            Value::Float32(f) => Ok(f as f64),
            other => Err(CodecError::mismatch(FieldKind::Float64, other.kind_name())),
        }
    }
}

impl ToValue for String {
    fn kind() -> FieldKind {
        FieldKind::Str
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(Value::Str(self.clone()))
    }
}

impl FromValue for String {
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Str(s) => Ok(s),
            other => Err(CodecError::mismatch(FieldKind::Str, other.kind_name())),
        }
    }
}

/// Byte string projected as [`Value::Binary`] rather than an array of integers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bytes(pub Vec<u8>);

impl From<Vec<u8>> for Bytes {
    fn from(bytes: Vec<u8>) -> Self {
        Bytes(bytes)
    }
}

impl ToValue for Bytes {
    fn kind() -> FieldKind {
        FieldKind::Binary
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(Value::Binary(self.0.clone()))
    }
}

impl FromValue for Bytes {
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Binary(b) => Ok(Bytes(b)),
            other => Err(CodecError::mismatch(FieldKind::Binary, other.kind_name())),
        }
    }
}

impl ToValue for Extension {
    fn kind() -> FieldKind {
        FieldKind::Extension
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(Value::Extension(self.clone()))
    }
}

impl FromValue for Extension {
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Extension(ext) => Ok(ext),
            other => Err(CodecError::mismatch(FieldKind::Extension, other.kind_name())),
        }
    }
}

impl ToValue for Value {
    fn kind() -> FieldKind {
        FieldKind::Any
    }

    fn to_value(&self, _: Projection<'_>) -> Result<Value, CodecError> {
        Ok(self.clone())
    }
}

impl FromValue for Value {
    fn from_value(value: Value, _: Projection<'_>) -> Result<Self, CodecError> {
        Ok(value)
    }
}

// ---------------------------------------------------------------------------
// Container projections

impl<T: ToValue> ToValue for Option<T> {
    fn kind() -> FieldKind {
        FieldKind::Optional(Box::new(T::kind()))
    }

    fn to_value(&self, cx: Projection<'_>) -> Result<Value, CodecError> {
        match self {
            Some(inner) => inner.to_value(cx),
            None => Ok(Value::Nil),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value, cx: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Nil => Ok(None),
            other => T::from_value(other, cx).map(Some),
        }
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn kind() -> FieldKind {
        FieldKind::Array
    }

    fn to_value(&self, cx: Projection<'_>) -> Result<Value, CodecError> {
        self.iter()
            .map(|item| item.to_value(cx))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array)
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(value: Value, cx: Projection<'_>) -> Result<Self, CodecError> {
        match value {
            Value::Array(items) => items.into_iter().map(|item| T::from_value(item, cx)).collect(),
            other => Err(CodecError::mismatch(FieldKind::Array, other.kind_name())),
        }
    }
}

fn map_pairs<'m, K, V, I>(entries: I, cx: Projection<'_>) -> Result<Value, CodecError>
where
    K: ToValue + 'm,
    V: ToValue + 'm,
    I: Iterator<Item = (&'m K, &'m V)>,
{
    entries
        .map(|(k, v)| Ok((k.to_value(cx)?, v.to_value(cx)?)))
        .collect::<Result<Vec<_>, CodecError>>()
        .map(Value::Map)
}

fn from_pairs<K, V, C>(value: Value, cx: Projection<'_>) -> Result<C, CodecError>
where
    K: FromValue,
    V: FromValue,
    C: Extend<(K, V)> + Default,
{
    match value {
        Value::Map(pairs) => {
            let mut out = C::default();
            for (k, v) in pairs {
                out.extend(Some((K::from_value(k, cx)?, V::from_value(v, cx)?)));
            }
            Ok(out)
        }
        other => Err(CodecError::mismatch(FieldKind::Map, other.kind_name())),
    }
}

/// Entries are emitted in `HashMap` iteration order, which varies between
/// runs. Use a `BTreeMap` field where byte-identical output matters.
impl<K, V, S> ToValue for HashMap<K, V, S>
where
    K: ToValue,
    V: ToValue,
{
    fn kind() -> FieldKind {
        FieldKind::Map
    }

    fn to_value(&self, cx: Projection<'_>) -> Result<Value, CodecError> {
        map_pairs(self.iter(), cx)
    }
}

impl<K, V, S> FromValue for HashMap<K, V, S>
where
    K: FromValue + Eq + Hash,
    V: FromValue,
    S: BuildHasher + Default,
{
    fn from_value(value: Value, cx: Projection<'_>) -> Result<Self, CodecError> {
        from_pairs(value, cx)
    }
}

impl<K: ToValue, V: ToValue> ToValue for BTreeMap<K, V> {
    fn kind() -> FieldKind {
        FieldKind::Map
    }

    fn to_value(&self, cx: Projection<'_>) -> Result<Value, CodecError> {
        map_pairs(self.iter(), cx)
    }
}

impl<K: FromValue + Ord, V: FromValue> FromValue for BTreeMap<K, V> {
    fn from_value(value: Value, cx: Projection<'_>) -> Result<Self, CodecError> {
        from_pairs(value, cx)
    }
}
