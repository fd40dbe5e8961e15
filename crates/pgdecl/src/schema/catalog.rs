//! Catalog introspection and DDL for declared schema objects.

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::ident::{quote_identifier, quote_literal};
use crate::row::RowExt;

/// Live state of an index as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexState {
    /// `pg_indexes.indexdef`, e.g. `CREATE INDEX ... ON public.t USING btree (a)`.
    pub indexdef: String,
    /// The index comment, which holds the declared definition for managed indexes.
    pub comment: Option<String>,
}

/// Catalog reads and DDL used by schema synchronization.
///
/// [`PgCatalog`] runs these against PostgreSQL; tests substitute an
/// in-memory implementation.
#[async_trait::async_trait]
pub trait Catalog: Send + Sync {
    /// Definition of the named constraint on `table`: its comment when set,
    /// otherwise `pg_get_constraintdef`. `None` when it does not exist.
    async fn constraint_definition(&self, table: &str, name: &str) -> OrmResult<Option<String>>;

    /// Add a constraint and record `definition` as its comment.
    async fn add_constraint(&self, table: &str, name: &str, definition: &str) -> OrmResult<()>;

    async fn drop_constraint(&self, table: &str, name: &str) -> OrmResult<()>;

    async fn index_definition(&self, name: &str) -> OrmResult<Option<IndexState>>;

    /// Create an index as `CREATE [UNIQUE ]INDEX name ON table <definition>`.
    async fn add_index(
        &self,
        name: &str,
        table: &str,
        definition: &str,
        unique: bool,
        comment: Option<&str>,
    ) -> OrmResult<()>;

    async fn drop_index(&self, name: &str, table: &str) -> OrmResult<()>;
}

const CONSTRAINT_DEFINITION_SQL: &str = r#"
SELECT COALESCE(d.description, pg_catalog.pg_get_constraintdef(c.oid)) AS definition
FROM pg_catalog.pg_constraint c
JOIN pg_catalog.pg_class t ON t.oid = c.conrelid
LEFT JOIN pg_catalog.pg_description d
  ON d.objoid = c.oid AND d.classoid = 'pg_catalog.pg_constraint'::regclass
WHERE t.relname = $1
  AND c.conname = $2
"#;

const INDEX_DEFINITION_SQL: &str = r#"
SELECT idx.indexdef AS indexdef, d.description AS comment
FROM pg_catalog.pg_class c
JOIN pg_catalog.pg_indexes idx ON c.relname = idx.indexname
LEFT JOIN pg_catalog.pg_description d
  ON d.objoid = c.oid AND d.classoid = 'pg_catalog.pg_class'::regclass
WHERE c.relname = $1
  AND c.relkind = 'i'
"#;

/// [`Catalog`] backed by a live PostgreSQL connection or transaction.
pub struct PgCatalog<'a, C: GenericClient> {
    client: &'a C,
}

impl<'a, C: GenericClient> PgCatalog<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &'a C {
        self.client
    }
}

#[async_trait::async_trait]
impl<C: GenericClient> Catalog for PgCatalog<'_, C> {
    async fn constraint_definition(&self, table: &str, name: &str) -> OrmResult<Option<String>> {
        let row = self
            .client
            .query_opt(CONSTRAINT_DEFINITION_SQL, &[&table, &name])
            .await?;
        match row {
            Some(row) => row.try_get_column::<Option<String>>("definition"),
            None => Ok(None),
        }
    }

    async fn add_constraint(&self, table: &str, name: &str, definition: &str) -> OrmResult<()> {
        let add = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {}",
            quote_identifier(table),
            quote_identifier(name),
            definition
        );
        let comment = format!(
            "COMMENT ON CONSTRAINT {} ON {} IS {}",
            quote_identifier(name),
            quote_identifier(table),
            quote_literal(definition)
        );
        for sql in [add, comment] {
            self.client.execute(&sql, &[]).await.map_err(|e| {
                OrmError::schema(
                    name,
                    format!("table {table}: unable to add constraint as {definition}: {e}"),
                )
            })?;
        }
        tracing::debug!(
            target: "pgdecl.schema",
            table,
            constraint = name,
            definition,
            "added constraint"
        );
        Ok(())
    }

    async fn drop_constraint(&self, table: &str, name: &str) -> OrmResult<()> {
        let sql = format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            quote_identifier(table),
            quote_identifier(name)
        );
        self.client.execute(&sql, &[]).await.map_err(|e| {
            OrmError::schema(name, format!("table {table}: unable to drop constraint: {e}"))
        })?;
        tracing::debug!(target: "pgdecl.schema", table, constraint = name, "dropped constraint");
        Ok(())
    }

    async fn index_definition(&self, name: &str) -> OrmResult<Option<IndexState>> {
        let Some(row) = self.client.query_opt(INDEX_DEFINITION_SQL, &[&name]).await? else {
            return Ok(None);
        };
        Ok(Some(IndexState {
            indexdef: row.try_get_column("indexdef")?,
            comment: row.try_get_column("comment")?,
        }))
    }

    async fn add_index(
        &self,
        name: &str,
        table: &str,
        definition: &str,
        unique: bool,
        comment: Option<&str>,
    ) -> OrmResult<()> {
        let create = format!(
            "CREATE {}INDEX {} ON {} {}",
            if unique { "UNIQUE " } else { "" },
            quote_identifier(name),
            quote_identifier(table),
            definition
        );
        self.client.execute(&create, &[]).await.map_err(|e| {
            OrmError::schema(
                name,
                format!("table {table}: unable to create index as {definition}: {e}"),
            )
        })?;
        if let Some(comment) = comment {
            let sql = format!(
                "COMMENT ON INDEX {} IS {}",
                quote_identifier(name),
                quote_literal(comment)
            );
            self.client.execute(&sql, &[]).await?;
        }
        tracing::debug!(
            target: "pgdecl.schema",
            table,
            index = name,
            definition,
            unique,
            "created index"
        );
        Ok(())
    }

    async fn drop_index(&self, name: &str, table: &str) -> OrmResult<()> {
        let sql = format!("DROP INDEX IF EXISTS {}", quote_identifier(name));
        self.client.execute(&sql, &[]).await?;
        tracing::debug!(target: "pgdecl.schema", table, index = name, "dropped index");
        Ok(())
    }
}
