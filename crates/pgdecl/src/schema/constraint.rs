//! Table constraints (`CHECK`, `UNIQUE`, `FOREIGN KEY`, `EXCLUDE`).

use super::{DatabaseObject, Diagnostics, Env, Message, ModelMeta, ObjectBase, SchemaSync};
use crate::error::OrmResult;
use std::sync::Arc;

/// A named table constraint with a literal SQL definition.
///
/// ```ignore
/// Constraint::new("CHECK (quantity >= 0)").message("The quantity must be positive.")
/// ```
#[derive(Debug, Clone)]
pub struct Constraint {
    base: ObjectBase,
    definition: String,
}

impl Constraint {
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            base: ObjectBase::default(),
            definition: definition.into(),
        }
    }

    /// Set a fixed error message.
    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.base.message = message.into();
        self
    }

    /// Set an error message computed when the violation happens.
    pub fn message_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&Env, Option<&Diagnostics>) -> String + Send + Sync + 'static,
    {
        self.base.message = Message::Dynamic(Arc::new(f));
        self
    }
}

#[async_trait::async_trait]
impl DatabaseObject for Constraint {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn definition(&self) -> String {
        self.definition.clone()
    }

    async fn sync_database_object(
        &self,
        model: &ModelMeta,
        sync: &mut SchemaSync<'_>,
    ) -> OrmResult<()> {
        let table = model.table();
        let conname = self.full_name(model);
        let catalog = sync.catalog();

        let current = catalog.constraint_definition(table, &conname).await?;
        if current.as_deref() == Some(self.definition.as_str()) {
            tracing::trace!(target: "pgdecl.schema", table, constraint = %conname, "constraint up to date");
            return Ok(());
        }

        if let Some(current) = current {
            tracing::info!(
                target: "pgdecl.schema",
                table,
                constraint = %conname,
                from = %current,
                to = %self.definition,
                "constraint definition changed"
            );
            catalog.drop_constraint(table, &conname).await?;
        }

        sync.post_constraint(table, &conname, &self.definition).await
    }
}
