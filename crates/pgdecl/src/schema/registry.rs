//! Registry of model metadata.

use super::{DatabaseObject, Diagnostics, Env, ModelMeta, SchemaSync};
use crate::error::{OrmError, OrmResult};
use crate::ident::check_pg_name;
use indexmap::IndexMap;

/// Registry of the installed models, in registration order.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    models: IndexMap<String, ModelMeta>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a model, replacing any model registered under the same name.
    ///
    /// Fails if the model's table is not a valid PostgreSQL name.
    pub fn register(&mut self, model: ModelMeta) -> OrmResult<()> {
        check_pg_name(model.table()).map_err(|e| {
            OrmError::validation(format!("model {}: invalid table name: {e}", model.name()))
        })?;
        self.models.insert(model.name().to_string(), model);
        Ok(())
    }

    pub fn model(&self, name: &str) -> Option<&ModelMeta> {
        self.models.get(name)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelMeta> {
        self.models.values()
    }

    /// Synchronize every declared object of every model, then apply the
    /// deferred constraints.
    pub async fn init_models(&self, sync: &mut SchemaSync<'_>) -> OrmResult<()> {
        for model in self.models.values() {
            tracing::debug!(target: "pgdecl.schema", model = model.name(), table = model.table(), "synchronizing schema objects");
            sync.sync_model(model).await?;
        }
        sync.finalize_constraints().await
    }

    /// Find the declared object whose database name is `name`.
    pub fn find_object(&self, name: &str) -> Option<(&ModelMeta, &dyn DatabaseObject)> {
        self.models.values().find_map(|model| {
            model
                .database_objects()
                .find(|object| object.full_name(model) == name)
                .map(|object| (model, object))
        })
    }

    /// User-facing message for a constraint violation, if a declared object
    /// matches the violated constraint and has a non-empty message.
    pub fn constraint_message(&self, env: &Env, diagnostics: &Diagnostics) -> Option<String> {
        let name = diagnostics.constraint.as_deref()?;
        let (_, object) = self.find_object(name)?;
        let message = object.get_error_message(env, Some(diagnostics));
        (!message.is_empty()).then_some(message)
    }

    /// Replace a constraint violation with the declared object's message.
    ///
    /// Errors that do not name a declared object with a non-empty message are
    /// returned unchanged.
    pub fn translate(&self, env: &Env, err: OrmError) -> OrmError {
        let Some(diagnostics) = err.db_error().map(Diagnostics::from_db_error) else {
            return err;
        };
        match self.constraint_message(env, &diagnostics) {
            Some(message) => OrmError::ConstraintViolation {
                constraint: diagnostics.constraint.unwrap_or_default(),
                message,
            },
            None => err,
        }
    }

    /// [`Registry::translate`] for an error straight from tokio-postgres.
    pub fn translate_error(&self, env: &Env, err: tokio_postgres::Error) -> OrmError {
        self.translate(env, OrmError::from_db_error(err))
    }
}
