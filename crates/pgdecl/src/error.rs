//! Error types for pgdecl

use thiserror::Error;
use tokio_postgres::error::DbError;

/// Result type alias for pgdecl operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for schema synchronization and query building
#[derive(Debug, Error)]
pub enum OrmError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {}", describe(.0))]
    Query(#[from] tokio_postgres::Error),

    /// Unique constraint violation
    #[error("Unique constraint violation: {message}")]
    UniqueViolation {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Foreign key constraint violation
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Check constraint violation
    #[error("Check constraint violation: {message}")]
    CheckViolation {
        message: String,
        #[source]
        source: tokio_postgres::Error,
    },

    /// Violation of a declared constraint or index, with its user-facing message
    #[error("{message}")]
    ConstraintViolation { constraint: String, message: String },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error (invalid identifiers, misuse of a query builder)
    #[error("Validation error: {0}")]
    Validation(String),

    /// DDL for a declared schema object could not be applied
    #[error("Schema error on '{object}': {message}")]
    Schema { object: String, message: String },

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),
}

impl OrmError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a schema error for the named database object
    pub fn schema(object: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Schema {
            object: object.into(),
            message: message.into(),
        }
    }

    /// Check if this error carries a translated constraint message
    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, Self::ConstraintViolation { .. })
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        let Some(db_err) = err.as_db_error() else {
            return Self::Query(err);
        };
        let message = format!(
            "{}: {}",
            db_err.constraint().unwrap_or("unknown"),
            db_err.message()
        );
        let code = db_err.code().clone();
        match code.code() {
            "23505" => Self::UniqueViolation { message, source: err },
            "23503" => Self::ForeignKeyViolation { message, source: err },
            "23514" => Self::CheckViolation { message, source: err },
            _ => Self::Query(err),
        }
    }

    /// The server-side error this error was built from, if any.
    pub fn db_error(&self) -> Option<&DbError> {
        match self {
            Self::Query(source)
            | Self::UniqueViolation { source, .. }
            | Self::ForeignKeyViolation { source, .. }
            | Self::CheckViolation { source, .. } => source.as_db_error(),
            _ => None,
        }
    }
}

// `tokio_postgres::Error` displays as just "db error" for server errors.
fn describe(err: &tokio_postgres::Error) -> String {
    match err.as_db_error() {
        Some(db_err) => db_err.to_string(),
        None => err.to_string(),
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_the_object() {
        let err = OrmError::schema("res_users_login_key", "relation does not exist");
        assert_eq!(
            err.to_string(),
            "Schema error on 'res_users_login_key': relation does not exist"
        );
    }

    #[test]
    fn client_side_errors_carry_no_db_error() {
        let err = OrmError::from_db_error(
            "host=localhost port=notaport"
                .parse::<tokio_postgres::Config>()
                .unwrap_err(),
        );
        assert!(matches!(err, OrmError::Query(_)));
        assert!(err.db_error().is_none());
        let shown = err.to_string();
        assert!(shown.starts_with("Query error: "));
        assert_ne!(shown, "Query error: db error");
    }

    #[test]
    fn constraint_violation_displays_message_only() {
        let err = OrmError::ConstraintViolation {
            constraint: "res_users_login_key".to_string(),
            message: "You can not have two users with the same login!".to_string(),
        };
        assert!(err.is_constraint_violation());
        assert_eq!(
            err.to_string(),
            "You can not have two users with the same login!"
        );
    }
}
