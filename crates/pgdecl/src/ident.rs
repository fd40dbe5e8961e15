//! SQL identifier and literal handling.
//!
//! - [`quote_identifier`] wraps a name in double quotes, escaping `"` as `""`.
//! - [`quote_literal`] wraps a value in single quotes, escaping `'` as `''`.
//!   It is used for `COMMENT ON ... IS '<definition>'`, which does not accept
//!   bind parameters.
//! - [`make_identifier`] fits a generated name into PostgreSQL's 63-byte
//!   identifier limit, truncating and appending a hash when needed.
//! - [`check_pg_name`] validates unquoted table names: `[A-Za-z_][A-Za-z0-9_$]*`.
//!
//! # Example
//! ```ignore
//! use pgdecl::ident::{make_identifier, quote_identifier};
//!
//! assert_eq!(quote_identifier("res_users"), r#""res_users""#);
//! assert_eq!(make_identifier("res_users_login_key"), "res_users_login_key");
//! ```

use crate::error::{OrmError, OrmResult};

/// Maximum length (in bytes) of a PostgreSQL identifier.
pub const MAX_IDENTIFIER_LENGTH: usize = 63;

/// Length of the readable prefix kept by [`make_identifier`] when truncating.
const TRUNCATED_PREFIX_LENGTH: usize = 54;

/// Quote an identifier (table, column, constraint or index name).
pub fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(&mut out, name, '"');
    out
}

/// Quote a string literal.
pub fn quote_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    write_quoted(&mut out, value, '\'');
    out
}

pub(crate) fn write_quoted(out: &mut String, s: &str, quote: char) {
    out.push(quote);
    for ch in s.chars() {
        if ch == quote {
            out.push(quote);
        }
        out.push(ch);
    }
    out.push(quote);
}

/// Return `identifier`, shortened to fit PostgreSQL's identifier limit.
///
/// Names up to 63 bytes are returned unchanged. Longer names keep a 54-byte
/// readable prefix followed by `_` and 8 hex digits of the md5 of the full
/// name, so distinct long names stay mostly distinct.
pub fn make_identifier(identifier: &str) -> String {
    if identifier.len() <= MAX_IDENTIFIER_LENGTH {
        return identifier.to_string();
    }
    let mut cut = TRUNCATED_PREFIX_LENGTH;
    while !identifier.is_char_boundary(cut) {
        cut -= 1;
    }
    let digest = md5::compute(identifier.as_bytes());
    let hash = format!("{digest:x}");
    format!("{}_{}", &identifier[..cut], &hash[..8])
}

/// Validate an unquoted PostgreSQL name (e.g. a model's table).
pub fn check_pg_name(name: &str) -> OrmResult<()> {
    if name.is_empty() {
        return Err(OrmError::validation("Identifier cannot be empty"));
    }
    if name.len() > MAX_IDENTIFIER_LENGTH {
        return Err(OrmError::validation(format!(
            "Identifier '{name}' is longer than {MAX_IDENTIFIER_LENGTH} bytes"
        )));
    }
    for (i, c) in name.chars().enumerate() {
        let ok = if i == 0 {
            // First char: letter or underscore.
            c == '_' || c.is_ascii_alphabetic()
        } else {
            // Subsequent chars: letter, digit, underscore, or $.
            c == '_' || c == '$' || c.is_ascii_alphanumeric()
        };
        if !ok {
            return Err(OrmError::validation(format!(
                "Invalid character '{c}' in identifier '{name}'"
            )));
        }
    }
    Ok(())
}
