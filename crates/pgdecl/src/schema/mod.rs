//! Declared schema objects synchronized against the live database.
//!
//! A model declares named table constraints and indexes through
//! [`ModelMeta::declare`]. At registry build time every declared object is
//! compared with what the catalog reports under its full name
//! (`{table}_{key}`) and the minimal DDL is applied:
//!
//! - identical definition: nothing happens;
//! - different definition: the old object is dropped and the new one created;
//! - missing: the object is created.
//!
//! Constraint additions are queued on [`SchemaSync`] and applied by
//! [`SchemaSync::finalize_constraints`] once every object has been compared,
//! so that e.g. a `FOREIGN KEY` is not added before the rows it references
//! exist. Indexes are created immediately.
//!
//! The declared definition is stored as the object's `COMMENT`, which is what
//! the next comparison reads back.
//!
//! # Example
//!
//! ```ignore
//! use pgdecl::schema::{Constraint, Index, ModelMeta, PgCatalog, Registry, SchemaSync};
//!
//! let users = ModelMeta::new("res.users")
//!     .declare(
//!         "_login_key",
//!         Constraint::new("UNIQUE (login)")
//!             .message("You can not have two users with the same login!"),
//!     )
//!     .declare("_active_idx", Index::new("(company_id) WHERE active IS TRUE"))
//!     .declare("_email_uniq", Index::unique("(lower(email))"));
//!
//! let mut registry = Registry::new();
//! registry.register(users)?;
//!
//! let tx = client.transaction().await?;
//! let catalog = PgCatalog::new(&tx);
//! let mut sync = SchemaSync::new(&catalog);
//! registry.init_models(&mut sync).await?;
//! tx.commit().await?;
//! ```

mod catalog;
mod constraint;
mod index;
mod model;
mod registry;
mod sync;

pub use catalog::{Catalog, IndexState, PgCatalog};
pub use constraint::Constraint;
pub use index::Index;
pub use model::ModelMeta;
pub use registry::Registry;
pub use sync::{PendingConstraint, SchemaSync};

use crate::error::OrmResult;
use crate::ident::make_identifier;
use std::fmt;
use std::sync::Arc;

/// The environment handed to dynamic error messages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Env {
    /// Language of the user the message is meant for.
    pub lang: Option<String>,
    /// Id of the user performing the write.
    pub uid: Option<i64>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = Some(lang.into());
        self
    }

    pub fn with_uid(mut self, uid: i64) -> Self {
        self.uid = Some(uid);
        self
    }
}

/// Structured detail of a database error, as reported by the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    /// SQLSTATE code, e.g. `23505`.
    pub code: String,
    pub message: String,
    pub detail: Option<String>,
    pub hint: Option<String>,
    pub schema: Option<String>,
    pub table: Option<String>,
    pub column: Option<String>,
    /// Name of the violated constraint or unique index.
    pub constraint: Option<String>,
}

impl Diagnostics {
    pub fn from_db_error(err: &tokio_postgres::error::DbError) -> Self {
        Self {
            code: err.code().code().to_string(),
            message: err.message().to_string(),
            detail: err.detail().map(str::to_string),
            hint: err.hint().map(str::to_string),
            schema: err.schema().map(str::to_string),
            table: err.table().map(str::to_string),
            column: err.column().map(str::to_string),
            constraint: err.constraint().map(str::to_string),
        }
    }
}

/// Signature of a message computed when the violation happens.
pub type MessageFn = Arc<dyn Fn(&Env, Option<&Diagnostics>) -> String + Send + Sync>;

/// User-facing message attached to a declared object.
#[derive(Clone)]
pub enum Message {
    /// A fixed message. Empty means "use the generic fallback".
    Static(String),
    /// A message computed from the environment and the error diagnostics.
    Dynamic(MessageFn),
}

impl Message {
    pub fn resolve(&self, env: &Env, diagnostics: Option<&Diagnostics>) -> String {
        match self {
            Message::Static(s) => s.clone(),
            Message::Dynamic(f) => f(env, diagnostics),
        }
    }
}

impl Default for Message {
    fn default() -> Self {
        Message::Static(String::new())
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Message::Static(s) => f.debug_tuple("Static").field(s).finish(),
            Message::Dynamic(_) => f.debug_tuple("Dynamic").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for Message {
    fn from(s: &str) -> Self {
        Message::Static(s.to_string())
    }
}

impl From<String> for Message {
    fn from(s: String) -> Self {
        Message::Static(s)
    }
}

/// State shared by every declared object.
#[derive(Debug, Clone, Default)]
pub struct ObjectBase {
    /// Attribute name without its leading `_`; empty until bound to a model.
    pub key: String,
    pub message: Message,
}

/// A named SQL object (constraint or index) declared on a model.
#[async_trait::async_trait]
pub trait DatabaseObject: Send + Sync + fmt::Debug {
    fn base(&self) -> &ObjectBase;

    fn base_mut(&mut self) -> &mut ObjectBase;

    /// Full declared definition, as compared against the live catalog.
    fn definition(&self) -> String;

    /// Compare the declared definition with the database and apply the difference.
    async fn sync_database_object(
        &self,
        model: &ModelMeta,
        sync: &mut SchemaSync<'_>,
    ) -> OrmResult<()>;

    fn key(&self) -> &str {
        &self.base().key
    }

    /// Bind this object to its model attribute key.
    fn bind(&mut self, key: &str) {
        self.base_mut().key = key.to_string();
    }

    /// Database name of this object on `model`: `{table}_{key}`, shortened
    /// to fit the identifier limit.
    ///
    /// # Panics
    ///
    /// Panics if the object was never bound through [`ModelMeta::declare`].
    fn full_name(&self, model: &ModelMeta) -> String {
        let key = self.key();
        assert!(!key.is_empty(), "{:?} is not bound to a model attribute", self);
        make_identifier(&format!("{}_{}", model.table(), key))
    }

    /// Message shown when a write violates this object.
    ///
    /// An empty string means the caller should use its generic message.
    fn get_error_message(&self, env: &Env, diagnostics: Option<&Diagnostics>) -> String {
        self.base().message.resolve(env, diagnostics)
    }
}
