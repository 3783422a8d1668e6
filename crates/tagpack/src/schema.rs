//! Field descriptors and schemas for record types.
//!
//! A [`Schema`] is the ordered field list of one record type. It is never
//! written to the wire: array mode projects it by position, map mode by name.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::error::CodecError;

/// Declared semantic type of a field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Nil,
    Bool,
    Int,
    Uint,
    Float32,
    Float64,
    Str,
    Binary,
    Array,
    Map,
    Extension,
    /// Nil or the inner kind.
    Optional(Box<FieldKind>),
    /// Nested record, by type name.
    Record(&'static str),
    /// Any value; no projection is applied.
    Any,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Nil => f.write_str("nil"),
            FieldKind::Bool => f.write_str("bool"),
            FieldKind::Int => f.write_str("int"),
            FieldKind::Uint => f.write_str("uint"),
            FieldKind::Float32 => f.write_str("float32"),
            FieldKind::Float64 => f.write_str("float64"),
            FieldKind::Str => f.write_str("string"),
            FieldKind::Binary => f.write_str("binary"),
            FieldKind::Array => f.write_str("array"),
            FieldKind::Map => f.write_str("map"),
            FieldKind::Extension => f.write_str("extension"),
            FieldKind::Optional(inner) => write!(f, "optional {inner}"),
            FieldKind::Record(name) => write!(f, "record {name}"),
            FieldKind::Any => f.write_str("any"),
        }
    }
}

/// One `(name, ordinal, kind)` entry of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub ordinal: usize,
    pub kind: FieldKind,
}

impl FieldDescriptor {
    pub fn new(name: &'static str, ordinal: usize, kind: FieldKind) -> Self {
        Self {
            name,
            ordinal,
            kind,
        }
    }
}

/// Ordered field list of a record type, with a name index for map mode.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: &'static str,
    fields: Vec<FieldDescriptor>,
    index: FxHashMap<&'static str, usize>,
}

impl Schema {
    /// Builds a schema from descriptors in declaration order.
    ///
    /// Ordinals must run `0..n` in order and names must be unique.
    pub fn new(type_name: &'static str, fields: Vec<FieldDescriptor>) -> Result<Self, CodecError> {
        let mut index = FxHashMap::default();
        index.reserve(fields.len());
        for (position, field) in fields.iter().enumerate() {
            if field.ordinal != position {
                return Err(CodecError::SchemaMismatch(format!(
                    "{type_name}.{} declares ordinal {} at position {position}",
                    field.name, field.ordinal
                )));
            }
            if index.insert(field.name, position).is_some() {
                return Err(CodecError::SchemaMismatch(format!(
                    "{type_name} declares field {} twice",
                    field.name
                )));
            }
        }
        Ok(Self {
            type_name,
            fields,
            index,
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, ordinal: usize) -> Option<&FieldDescriptor> {
        self.fields.get(ordinal)
    }

    pub fn ordinal_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn field_by_name(&self, name: &str) -> Option<&FieldDescriptor> {
        self.ordinal_of(name).map(|ordinal| &self.fields[ordinal])
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(|f| f.name)
    }
}

impl PartialEq for Schema {
    fn eq(&self, other: &Self) -> bool {
        self.type_name == other.type_name && self.fields == other.fields
    }
}

impl Eq for Schema {}

#[cfg(test)]
mod tests {
    use super::*;

    fn child() -> Vec<FieldDescriptor> {
        vec![
            FieldDescriptor::new("Int", 0, FieldKind::Int),
            FieldDescriptor::new("String", 1, FieldKind::Str),
        ]
    }

    #[test]
    fn lookup_by_name_and_ordinal() {
        let schema = Schema::new("BenchChild", child()).unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema.ordinal_of("String"), Some(1));
        assert_eq!(schema.field(0).map(|f| f.name), Some("Int"));
        assert_eq!(schema.field_by_name("Int").map(|f| &f.kind), Some(&FieldKind::Int));
        assert_eq!(schema.ordinal_of("missing"), None);
        assert_eq!(schema.names().collect::<Vec<_>>(), ["Int", "String"]);
    }

    #[test]
    fn duplicate_names_are_rejected() {
        let fields = vec![
            FieldDescriptor::new("Int", 0, FieldKind::Int),
            FieldDescriptor::new("Int", 1, FieldKind::Uint),
        ];
        assert!(matches!(
            Schema::new("Dup", fields),
            Err(CodecError::SchemaMismatch(_))
        ));
    }

    #[test]
    fn ordinals_must_follow_declaration_order() {
        let fields = vec![FieldDescriptor::new("Int", 1, FieldKind::Int)];
        assert!(Schema::new("Gap", fields).is_err());
    }

    #[test]
    fn kind_display() {
        let kind = FieldKind::Optional(Box::new(FieldKind::Record("BenchChild")));
        assert_eq!(kind.to_string(), "optional record BenchChild");
    }
}
