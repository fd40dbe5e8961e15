//! One schema synchronization pass and its deferred constraint queue.

use super::{Catalog, ModelMeta};
use crate::config::SyncConfig;
use crate::error::OrmResult;
use indexmap::IndexMap;

/// A constraint addition waiting for [`SchemaSync::finalize_constraints`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingConstraint {
    pub table: String,
    pub name: String,
    pub definition: String,
}

/// State of one synchronization pass over the declared schema objects.
///
/// Owns the queue of constraint additions so they run after every object
/// has been compared, within the same transaction as the comparisons.
///
/// Not safe to run concurrently against the same database from several
/// processes: nothing locks the catalog between comparison and DDL.
pub struct SchemaSync<'a> {
    catalog: &'a dyn Catalog,
    config: SyncConfig,
    pending: IndexMap<String, PendingConstraint>,
}

impl<'a> SchemaSync<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        Self::with_config(catalog, SyncConfig::default())
    }

    pub fn with_config(catalog: &'a dyn Catalog, config: SyncConfig) -> Self {
        Self {
            catalog,
            config,
            pending: IndexMap::new(),
        }
    }

    pub fn catalog(&self) -> &'a dyn Catalog {
        self.catalog
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Schedule the addition of constraint `name` on `table`.
    ///
    /// The queue is keyed by constraint name: posting a name again replaces
    /// the queued definition. With `defer_constraints` disabled the
    /// constraint is added right away.
    pub async fn post_constraint(
        &mut self,
        table: &str,
        name: &str,
        definition: &str,
    ) -> OrmResult<()> {
        if !self.config.defer_constraints {
            return self.catalog.add_constraint(table, name, definition).await;
        }
        tracing::debug!(target: "pgdecl.schema", table, constraint = name, definition, "deferred constraint");
        self.pending.insert(
            name.to_string(),
            PendingConstraint {
                table: table.to_string(),
                name: name.to_string(),
                definition: definition.to_string(),
            },
        );
        Ok(())
    }

    /// Constraint additions still queued, in posting order.
    pub fn pending(&self) -> impl Iterator<Item = &PendingConstraint> {
        self.pending.values()
    }

    /// Compare every object declared on `model` with the database.
    pub async fn sync_model(&mut self, model: &ModelMeta) -> OrmResult<()> {
        for object in model.database_objects() {
            object.sync_database_object(model, self).await?;
        }
        Ok(())
    }

    /// Apply the queued constraint additions, in posting order.
    ///
    /// The queue is emptied even on failure; the first failing addition is
    /// returned and the ones after it are not attempted.
    pub async fn finalize_constraints(&mut self) -> OrmResult<()> {
        let pending = std::mem::take(&mut self.pending);
        if !pending.is_empty() {
            tracing::debug!(target: "pgdecl.schema", count = pending.len(), "applying deferred constraints");
        }
        for constraint in pending.into_values() {
            self.catalog
                .add_constraint(&constraint.table, &constraint.name, &constraint.definition)
                .await?;
        }
        Ok(())
    }
}
