//! Named indexes and unique indexes.

use super::{DatabaseObject, Diagnostics, Env, Message, ModelMeta, ObjectBase, SchemaSync};
use crate::error::OrmResult;
use std::sync::Arc;

/// A named index.
///
/// The definition is the SQL that follows `ON <table>`:
///
/// ```ignore
/// Index::new("(group_id, active) WHERE active IS TRUE")
/// Index::new("USING gin (name gin_trgm_ops)")
/// Index::unique("(lower(email))")
/// ```
#[derive(Debug, Clone)]
pub struct Index {
    base: ObjectBase,
    index_definition: String,
    unique: bool,
}

impl Index {
    pub fn new(definition: impl Into<String>) -> Self {
        Self {
            base: ObjectBase::default(),
            index_definition: definition.into(),
            unique: false,
        }
    }

    /// A unique index: `CREATE UNIQUE INDEX`, reported as `UNIQUE INDEX <definition>`.
    pub fn unique(definition: impl Into<String>) -> Self {
        Self {
            unique: true,
            ..Self::new(definition)
        }
    }

    /// Set a fixed error message (relevant for unique indexes).
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

    pub fn index_definition(&self) -> &str {
        &self.index_definition
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }
}

#[async_trait::async_trait]
impl DatabaseObject for Index {
    fn base(&self) -> &ObjectBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ObjectBase {
        &mut self.base
    }

    fn definition(&self) -> String {
        let prefix = if self.unique { "UNIQUE " } else { "" };
        format!("{prefix}INDEX {}", self.index_definition)
    }

    async fn sync_database_object(
        &self,
        model: &ModelMeta,
        sync: &mut SchemaSync<'_>,
    ) -> OrmResult<()> {
        let table = model.table();
        let name = self.full_name(model);
        let definition = self.definition();
        let catalog = sync.catalog();

        if let Some(live) = catalog.index_definition(&name).await? {
            match live.comment.as_deref() {
                Some(comment) if comment == definition => {
                    tracing::trace!(target: "pgdecl.schema", table, index = %name, "index up to date");
                    return Ok(());
                }
                None if sync.config().keep_unmanaged_indexes => {
                    tracing::info!(
                        target: "pgdecl.schema",
                        table,
                        index = %name,
                        indexdef = %live.indexdef,
                        "keeping index without comment"
                    );
                    return Ok(());
                }
                _ => {
                    tracing::info!(
                        target: "pgdecl.schema",
                        table,
                        index = %name,
                        from = live.comment.as_deref().unwrap_or(live.indexdef.as_str()),
                        to = %definition,
                        "index definition changed"
                    );
                    catalog.drop_index(&name, table).await?;
                }
            }
        }

        catalog
            .add_index(
                &name,
                table,
                &self.index_definition,
                self.unique,
                Some(&definition),
            )
            .await
    }
}
