//! # pgdecl
//!
//! Declarative PostgreSQL schema objects and a typed SQL expression builder.
//!
//! ## Schema objects
//!
//! Models declare named constraints and indexes; at registry build time each
//! one is compared with the live catalog and the difference is applied:
//!
//! ```ignore
//! use pgdecl::schema::{Constraint, ModelMeta, PgCatalog, Registry, SchemaSync};
//!
//! let mut registry = Registry::new();
//! registry.register(
//!     ModelMeta::new("stock.quant")
//!         .declare("_qty_positive", Constraint::new("CHECK (quantity >= 0)")
//!             .message("Quantity cannot be negative")),
//! )?;
//!
//! let tx = client.transaction().await?;
//! let catalog = PgCatalog::new(&tx);
//! let mut sync = SchemaSync::with_config(&catalog, SyncConfig::from_env()?);
//! registry.init_models(&mut sync).await?;
//! tx.commit().await?;
//! ```
//!
//! ## Query builder (qb)
//!
//! ```ignore
//! use pgdecl::qb::{Row, Select};
//!
//! let a = Row::new("a");
//! let b = Row::nullable("b");
//! let (sql, params) = Select::new(vec![a.col("x"), b.col("y")])
//!     .join(a.col("id").eq_col(&b.col("a_id")))
//!     .where_(a.col("x").eq(5i32))
//!     .build()?;
//! let rows = client.query(&sql, &params.as_refs()).await?;
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod ident;
pub mod qb;
pub mod row;
pub mod schema;

pub use client::GenericClient;
pub use config::SyncConfig;
pub use error::{OrmError, OrmResult};
pub use row::RowExt;

pub use qb::{Column, Expression, Join, JoinKind, Row, Select};
pub use schema::{
    Catalog, Constraint, DatabaseObject, Index, ModelMeta, PgCatalog, Registry, SchemaSync,
};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_manager_config};
