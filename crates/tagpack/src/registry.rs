//! Process-scoped schema cache keyed by record type.
//!
//! A [`SchemaRegistry`] is an ordinary value: a [`crate::Codec`] owns or
//! shares one, and tests build their own. Lookups take a read lock; the first
//! resolution of a type computes its schema outside any lock and inserts it
//! under the write lock unless another thread got there first.

use std::any::TypeId;
use std::sync::Arc;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::CodecError;
use crate::record::Record;
use crate::schema::Schema;

#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: RwLock<FxHashMap<TypeId, Arc<Schema>>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schema of `R`, building and caching it on first use.
    ///
    /// Concurrent first calls may each build the schema; the first insert
    /// wins and every caller gets that instance.
    pub fn resolve<R: Record>(&self) -> Result<Arc<Schema>, CodecError> {
        let key = TypeId::of::<R>();

        if let Some(schema) = self.schemas.read().get(&key) {
            return Ok(Arc::clone(schema));
        }

        let built = Arc::new(Schema::new(R::TYPE_NAME, R::describe())?);

        let mut schemas = self.schemas.write();
        let schema = schemas.entry(key).or_insert_with(|| {
            debug!(
                type_name = R::TYPE_NAME,
                fields = built.len(),
                "registered record schema"
            );
            Arc::clone(&built)
        });
        Ok(Arc::clone(schema))
    }

    /// Resolves `R` ahead of first use.
    pub fn register<R: Record>(&self) -> Result<(), CodecError> {
        self.resolve::<R>().map(|_| ())
    }

    /// Schema previously registered for `type_id`.
    pub fn lookup(&self, type_id: TypeId) -> Result<Arc<Schema>, CodecError> {
        self.schemas
            .read()
            .get(&type_id)
            .cloned()
            .ok_or_else(|| {
                CodecError::UnsupportedType(format!("no schema registered for {type_id:?}"))
            })
    }

    pub fn contains<R: Record>(&self) -> bool {
        self.schemas.read().contains_key(&TypeId::of::<R>())
    }

    pub fn len(&self) -> usize {
        self.schemas.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.read().is_empty()
    }

    pub fn clear(&mut self) {
        self.schemas.get_mut().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impl_record;
    use crate::schema::FieldKind;
    use std::thread;

    #[derive(Debug, Default, Clone, PartialEq)]
    struct Point {
        x: i32,
        y: i32,
        label: Option<String>,
    }

    impl_record!(Point {
        x => "X",
        y => "Y",
        label => "Label",
    });

    #[derive(Debug, Default)]
    struct Dup {
        a: i32,
        b: i32,
    }

    impl_record!(Dup { a => "Same", b => "Same" });

    #[test]
    fn resolve_builds_once_and_caches() {
        let registry = SchemaRegistry::new();
        assert!(registry.is_empty());
        let first = registry.resolve::<Point>().unwrap();
        let second = registry.resolve::<Point>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.len(), 1);
        assert_eq!(first.type_name(), "Point");
        assert_eq!(
            first.field(2).map(|f| &f.kind),
            Some(&FieldKind::Optional(Box::new(FieldKind::Str)))
        );
    }

    #[test]
    fn registries_are_isolated() {
        let a = SchemaRegistry::new();
        let b = SchemaRegistry::new();
        a.register::<Point>().unwrap();
        assert!(a.contains::<Point>());
        assert!(!b.contains::<Point>());
    }

    #[test]
    fn lookup_of_unregistered_type_is_unsupported() {
        let mut registry = SchemaRegistry::new();
        let id = TypeId::of::<Point>();
        assert!(matches!(
            registry.lookup(id),
            Err(CodecError::UnsupportedType(_))
        ));
        registry.register::<Point>().unwrap();
        assert_eq!(registry.lookup(id).unwrap().len(), 3);
        registry.clear();
        assert!(registry.lookup(id).is_err());
    }

    #[test]
    fn invalid_descriptor_table_is_not_cached() {
        let registry = SchemaRegistry::new();
        assert!(matches!(
            registry.resolve::<Dup>(),
            Err(CodecError::SchemaMismatch(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn concurrent_first_use_yields_one_schema() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                thread::spawn(move || registry.resolve::<Point>().unwrap())
            })
            .collect();
        let schemas: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(registry.len(), 1);
        for schema in &schemas {
            assert!(Arc::ptr_eq(schema, &schemas[0]));
        }
    }
}
