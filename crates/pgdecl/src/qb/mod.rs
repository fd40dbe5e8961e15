//! Typed SQL expression builder.
//!
//! Build boolean predicates over table columns with ordinary method calls and
//! operators, then compile them together with joins into a parameterized
//! SELECT. The builder knows nothing about the schema: any column name is
//! accepted and the SQL is emitted in declaration order.
//!
//! # Usage
//!
//! ```ignore
//! use pgdecl::qb::{Row, Select};
//!
//! let partner = Row::new("res_partner");
//! let country = Row::nullable("res_country");
//!
//! let expr = (partner.col("active").eq(true) & !partner.col("email").is_null())
//!     | partner.col("id").in_list([1i32, 2, 3]);
//!
//! let rows = Select::new(vec![partner.col("name"), country.col("code")])
//!     .join(partner.col("country_id").eq_col(&country.col("id")))
//!     .where_(expr)
//!     .order_by(partner.col("name"))
//!     .query(&client)
//!     .await?;
//! ```

mod expr;
mod param;
mod select;

pub use expr::{Column, CompareOp, Expression, Operand, Row};
pub use param::{Param, ParamList};
pub use select::{Columns, Join, JoinKind, Select};

#[cfg(test)]
mod tests;
