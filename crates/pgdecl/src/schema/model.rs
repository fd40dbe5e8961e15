//! Model metadata: table name and declared schema objects.

use super::DatabaseObject;
use indexmap::IndexMap;
use std::sync::Arc;

/// Metadata of one model: its name, its table, and the schema objects it declares.
///
/// Objects are kept in declaration order, keyed by their attribute key.
#[derive(Debug, Clone)]
pub struct ModelMeta {
    name: String,
    table: String,
    objects: IndexMap<String, Arc<dyn DatabaseObject>>,
}

impl ModelMeta {
    /// Create metadata for `name`; the table defaults to the name with `.`
    /// replaced by `_` (`res.users` -> `res_users`).
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let table = name.replace('.', "_");
        Self {
            name,
            table,
            objects: IndexMap::new(),
        }
    }

    /// Override the table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Declare a schema object under the attribute name `attr`.
    ///
    /// The object's key is `attr` without its leading underscore. Declaring a
    /// key that already exists (e.g. inherited) replaces that object in place.
    ///
    /// # Panics
    ///
    /// Panics if `attr` does not start with `_`.
    pub fn declare(mut self, attr: &str, mut object: impl DatabaseObject + 'static) -> Self {
        assert!(
            attr.starts_with('_'),
            "schema object attribute {attr:?} on model {:?} must start with '_'",
            self.name
        );
        let key = &attr[1..];
        object.bind(key);
        self.objects.insert(key.to_string(), Arc::new(object));
        self
    }

    /// Merge the objects declared on `parent` into this model.
    ///
    /// Parent objects come first; objects already declared here win over
    /// the parent's objects with the same key.
    pub fn inherit(mut self, parent: &ModelMeta) -> Self {
        let mut merged = parent.objects.clone();
        for (key, object) in self.objects.drain(..) {
            merged.insert(key, object);
        }
        self.objects = merged;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    /// Look up a declared object by key.
    pub fn get(&self, key: &str) -> Option<&dyn DatabaseObject> {
        self.objects.get(key).map(|o| &**o as &dyn DatabaseObject)
    }

    /// Declared objects, in declaration order.
    pub fn database_objects(&self) -> impl Iterator<Item = &dyn DatabaseObject> {
        self.objects.values().map(|o| &**o as &dyn DatabaseObject)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
