//! Joins and SELECT statements.

use crate::client::GenericClient;
use crate::error::{OrmError, OrmResult};
use crate::ident::quote_identifier;
use crate::qb::expr::{Column, Expression, Operand, Row};
use crate::qb::param::ParamList;
use indexmap::IndexMap;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    /// Kind implied by which side of the join may be missing.
    pub fn infer(left_nullable: bool, right_nullable: bool) -> Self {
        match (left_nullable, right_nullable) {
            (false, false) => JoinKind::Inner,
            (false, true) => JoinKind::Left,
            (true, false) => JoinKind::Right,
            (true, true) => JoinKind::Full,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::Left => "LEFT JOIN",
            JoinKind::Right => "RIGHT JOIN",
            JoinKind::Full => "FULL JOIN",
        }
    }
}

/// A join of the right-hand table of a column comparison.
#[derive(Debug, Clone)]
pub struct Join {
    kind: JoinKind,
    left: Row,
    row: Row,
    on: Expression,
}

impl Join {
    /// Build a join from a comparison between columns of two tables, e.g.
    /// `a.col("id").eq_col(&b.col("a_id"))` joins `b`.
    ///
    /// The kind comes from the tables' `nullable` flags.
    pub fn new(on: Expression) -> OrmResult<Self> {
        let (left, right) = match &on {
            Expression::Compare {
                left,
                right: Operand::Column(right),
                ..
            } => (left.row().clone(), right.row().clone()),
            _ => {
                return Err(OrmError::validation(
                    "join condition must compare two columns",
                ));
            }
        };
        if left.table() == right.table() {
            return Err(OrmError::validation(format!(
                "join condition must compare columns of two tables, got {} twice",
                left.table()
            )));
        }
        Ok(Self {
            kind: JoinKind::infer(left.is_nullable(), right.is_nullable()),
            left,
            row: right,
            on,
        })
    }

    pub fn kind(&self) -> JoinKind {
        self.kind
    }

    /// The joined table.
    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn on(&self) -> &Expression {
        &self.on
    }

    pub fn to_sql(&self, params: &mut ParamList) -> String {
        format!(
            "{} {} ON {}",
            self.kind.as_sql(),
            self.row.to_sql(),
            self.on.to_sql(params)
        )
    }
}

/// Output columns of a [`Select`].
#[derive(Debug, Clone)]
pub enum Columns {
    Plain(Vec<Column>),
    /// Alias to column, rendered `column AS "alias"` in insertion order.
    Aliased(IndexMap<String, Column>),
}

/// A SELECT statement over the tables its columns belong to.
///
/// ```ignore
/// let a = Row::new("a");
/// let b = Row::nullable("b");
/// let (sql, params) = Select::new(vec![a.col("x"), b.col("y")])
///     .join(a.col("id").eq_col(&b.col("a_id")))
///     .where_(a.col("x").eq(5i32))
///     .build()?;
/// // SELECT "a"."x", "b"."y" FROM "a" LEFT JOIN "b" ON ("a"."id" = "b"."a_id") WHERE ("a"."x" = $1)
/// ```
#[derive(Debug, Clone)]
pub struct Select {
    columns: Columns,
    where_: Option<Expression>,
    order: Vec<(Column, bool)>,
    joins: Vec<Join>,
    build_error: Option<String>,
}

impl Select {
    pub fn new(columns: Vec<Column>) -> Self {
        Self::from_columns(Columns::Plain(columns))
    }

    pub fn aliased(columns: IndexMap<String, Column>) -> Self {
        Self::from_columns(Columns::Aliased(columns))
    }

    fn from_columns(columns: Columns) -> Self {
        Self {
            columns,
            where_: None,
            order: Vec::new(),
            joins: Vec::new(),
            build_error: None,
        }
    }

    /// Add a WHERE condition, AND-ed with any previous one.
    pub fn where_(mut self, expr: Expression) -> Self {
        self.where_ = Some(match self.where_.take() {
            Some(existing) => existing & expr,
            None => expr,
        });
        self
    }

    /// Join the right-hand table of `on`.
    ///
    /// The left-hand table must be one of the tables of the selected columns.
    /// An invalid join is reported by [`Select::build`].
    pub fn join(mut self, on: Expression) -> Self {
        if self.build_error.is_some() {
            return self;
        }
        match Join::new(on) {
            Ok(join) => {
                let known = self.column_rows().iter().any(|r| r.table() == join.left.table());
                if known {
                    self.joins.push(join);
                } else {
                    self.build_error = Some(format!(
                        "join on {}: table {} is not selected",
                        join.row.table(),
                        join.left.table()
                    ));
                }
            }
            Err(e) => self.build_error = Some(e.to_string()),
        }
        self
    }

    pub fn joins(self, on: impl IntoIterator<Item = Expression>) -> Self {
        on.into_iter().fold(self, Select::join)
    }

    pub fn order_by(mut self, column: Column) -> Self {
        self.order.push((column, false));
        self
    }

    pub fn order_by_desc(mut self, column: Column) -> Self {
        self.order.push((column, true));
        self
    }

    pub fn columns(&self) -> &Columns {
        &self.columns
    }

    pub fn where_clause(&self) -> Option<&Expression> {
        self.where_.as_ref()
    }

    pub fn join_list(&self) -> &[Join] {
        &self.joins
    }

    /// Tables of the selected columns, deduplicated and sorted by name.
    fn column_rows(&self) -> Vec<&Row> {
        match &self.columns {
            Columns::Plain(columns) => {
                let mut rows: Vec<&Row> = columns.iter().map(Column::row).collect();
                rows.sort_by(|a, b| a.table().cmp(b.table()));
                rows.dedup_by(|a, b| a.table() == b.table());
                rows
            }
            Columns::Aliased(columns) => {
                let by_table: BTreeMap<&str, &Row> = columns
                    .keys()
                    .map(|alias| columns[alias].row())
                    .map(|row| (row.table(), row))
                    .collect();
                by_table.into_values().collect()
            }
        }
    }

    /// Tables listed in FROM: the selected columns' tables, minus the
    /// tables brought in by a join. With joins present they are separated by
    /// `CROSS JOIN` rather than commas.
    pub fn tables(&self) -> Vec<&Row> {
        self.column_rows()
            .into_iter()
            .filter(|row| !self.joins.iter().any(|j| j.row.table() == row.table()))
            .collect()
    }

    fn columns_sql(&self) -> String {
        match &self.columns {
            Columns::Plain(columns) => columns
                .iter()
                .map(Column::to_sql)
                .collect::<Vec<_>>()
                .join(", "),
            Columns::Aliased(columns) => columns
                .iter()
                .map(|(alias, c)| format!("{} AS {}", c.to_sql(), quote_identifier(alias)))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    /// Render the statement and its parameters: join parameters first, then
    /// WHERE parameters.
    pub fn build(&self) -> OrmResult<(String, ParamList)> {
        if let Some(ref err) = self.build_error {
            return Err(OrmError::Validation(err.clone()));
        }
        let empty = match &self.columns {
            Columns::Plain(c) => c.is_empty(),
            Columns::Aliased(c) => c.is_empty(),
        };
        if empty {
            return Err(OrmError::validation("SELECT without columns"));
        }
        let tables: Vec<String> = self.tables().iter().map(|r| r.to_sql()).collect();
        if tables.is_empty() {
            return Err(OrmError::validation(
                "every selected table is a join target, nothing left for FROM",
            ));
        }

        // A JOIN binds tighter than a comma, so with joins present every FROM
        // table must stay in scope for the ON clauses.
        let separator = if self.joins.is_empty() { ", " } else { " CROSS JOIN " };
        let mut params = ParamList::new();
        let mut sql = format!(
            "SELECT {} FROM {}",
            self.columns_sql(),
            tables.join(separator)
        );
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.to_sql(&mut params));
        }
        if let Some(ref expr) = self.where_ {
            sql.push_str(" WHERE ");
            sql.push_str(&expr.to_sql(&mut params));
        }
        if !self.order.is_empty() {
            let order: Vec<String> = self
                .order
                .iter()
                .map(|(c, desc)| {
                    if *desc {
                        format!("{} DESC", c.to_sql())
                    } else {
                        c.to_sql()
                    }
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&order.join(", "));
        }
        Ok((sql, params))
    }

    /// The rendered SQL, or the build error message (for debugging).
    pub fn to_sql(&self) -> String {
        match self.build() {
            Ok((sql, _)) => sql,
            Err(e) => format!("/* {e} */"),
        }
    }

    /// Run the statement and return all rows.
    pub async fn query(&self, conn: &impl GenericClient) -> OrmResult<Vec<tokio_postgres::Row>> {
        let (sql, params) = self.build()?;
        tracing::debug!(target: "pgdecl.sql", sql = %sql, params = params.len(), "select");
        conn.query(&sql, &params.as_refs()).await
    }
}
