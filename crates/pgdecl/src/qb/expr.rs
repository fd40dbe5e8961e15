//! Table references, columns and boolean expressions.
//!
//! `Expression::to_sql()` renders the tree with `$n` placeholders numbered in
//! the order the parameters are met (left to right, depth first), so the
//! fragment can be appended after other fragments sharing the same
//! [`ParamList`].

use crate::ident::quote_identifier;
use crate::qb::param::{Param, ParamList};
use std::fmt;
use std::ops;
use tokio_postgres::types::ToSql;

/// A table taking part in a query.
///
/// `nullable` does not describe the data: it tells [`Join`](crate::qb::Join)
/// that rows of this table may be missing from the result, which decides the
/// join kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Row {
    table: String,
    nullable: bool,
}

impl Row {
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_nullable(table, false)
    }

    pub fn nullable(table: impl Into<String>) -> Self {
        Self::with_nullable(table, true)
    }

    pub fn with_nullable(table: impl Into<String>, nullable: bool) -> Self {
        Self {
            table: table.into(),
            nullable,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Reference column `name` of this table. Any name is accepted.
    pub fn column(&self, name: impl Into<String>) -> Column {
        Column {
            row: self.clone(),
            name: name.into(),
        }
    }

    /// Shorthand for [`Row::column`].
    pub fn col(&self, name: impl Into<String>) -> Column {
        self.column(name)
    }

    pub(crate) fn to_sql(&self) -> String {
        quote_identifier(&self.table)
    }
}

/// A column of a [`Row`], rendered `"table"."name"`.
///
/// `eq`, `ne` and the other comparison methods build [`Expression`]s, so
/// `Column` does not implement `PartialEq`.
#[derive(Debug, Clone)]
pub struct Column {
    row: Row,
    name: String,
}

macro_rules! compare_methods {
    ($($value:ident, $column:ident => $op:ident;)*) => {
        $(
            pub fn $value<T: ToSql + Send + Sync + 'static>(&self, value: T) -> Expression {
                self.compare(CompareOp::$op, Param::new(value))
            }

            pub fn $column(&self, other: &Column) -> Expression {
                self.compare(CompareOp::$op, other.clone())
            }
        )*
    };
}

impl Column {
    pub fn row(&self) -> &Row {
        &self.row
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn to_sql(&self) -> String {
        format!("{}.{}", self.row.to_sql(), quote_identifier(&self.name))
    }

    pub fn compare(&self, op: CompareOp, right: impl Into<Operand>) -> Expression {
        Expression::Compare {
            left: self.clone(),
            op,
            right: right.into(),
        }
    }

    compare_methods! {
        eq, eq_col => Eq;
        ne, ne_col => Ne;
        lt, lt_col => Lt;
        le, le_col => Le;
        gt, gt_col => Gt;
        ge, ge_col => Ge;
    }

    /// `= value`, or `IS NULL` for `None`.
    pub fn eq_opt<T: ToSql + Send + Sync + 'static>(&self, value: Option<T>) -> Expression {
        match value {
            Some(v) => self.eq(v),
            None => self.is_null(),
        }
    }

    /// `!= value`, or `IS NOT NULL` for `None`.
    pub fn ne_opt<T: ToSql + Send + Sync + 'static>(&self, value: Option<T>) -> Expression {
        match value {
            Some(v) => self.ne(v),
            None => self.is_not_null(),
        }
    }

    pub fn is_null(&self) -> Expression {
        Expression::IsNull {
            column: self.clone(),
            negated: false,
        }
    }

    pub fn is_not_null(&self) -> Expression {
        Expression::IsNull {
            column: self.clone(),
            negated: true,
        }
    }

    /// `IN (...)`. An empty list matches nothing.
    pub fn in_list<T, I>(&self, values: I) -> Expression
    where
        T: ToSql + Send + Sync + 'static,
        I: IntoIterator<Item = T>,
    {
        Expression::In {
            column: self.clone(),
            values: values.into_iter().map(Param::new).collect(),
        }
    }
}

/// `column ^ values` is `column IN (values)`.
impl<T: ToSql + Send + Sync + 'static> ops::BitXor<Vec<T>> for Column {
    type Output = Expression;

    fn bitxor(self, values: Vec<T>) -> Expression {
        self.in_list(values)
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone)]
pub enum Operand {
    Column(Column),
    Param(Param),
}

impl From<Column> for Operand {
    fn from(column: Column) -> Self {
        Operand::Column(column)
    }
}

impl From<Param> for Operand {
    fn from(param: Param) -> Self {
        Operand::Param(param)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "!=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Boolean expression tree. Nodes are immutable; combining two expressions
/// builds a new node.
#[derive(Debug, Clone)]
pub enum Expression {
    Compare {
        left: Column,
        op: CompareOp,
        right: Operand,
    },
    IsNull {
        column: Column,
        negated: bool,
    },
    In {
        column: Column,
        values: Vec<Param>,
    },
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Not(Box<Expression>),
}

impl Expression {
    pub fn and(self, other: Expression) -> Expression {
        Expression::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Expression) -> Expression {
        Expression::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Expression {
        Expression::Not(Box::new(self))
    }

    /// Render the expression, appending its parameters to `params`.
    pub fn to_sql(&self, params: &mut ParamList) -> String {
        match self {
            Expression::Compare { left, op, right } => {
                let right = match right {
                    Operand::Column(column) => column.to_sql(),
                    Operand::Param(param) => format!("${}", params.push_param(param.clone())),
                };
                format!("({} {} {})", left.to_sql(), op, right)
            }
            Expression::IsNull { column, negated } => {
                let not = if *negated { " NOT" } else { "" };
                format!("({} IS{} NULL)", column.to_sql(), not)
            }
            Expression::In { column, values } => {
                if values.is_empty() {
                    return "(1=0)".to_string();
                }
                let placeholders: Vec<String> = values
                    .iter()
                    .map(|v| format!("${}", params.push_param(v.clone())))
                    .collect();
                format!("({} IN ({}))", column.to_sql(), placeholders.join(", "))
            }
            Expression::And(a, b) => {
                let a = a.to_sql(params);
                let b = b.to_sql(params);
                format!("({a} AND {b})")
            }
            Expression::Or(a, b) => {
                let a = a.to_sql(params);
                let b = b.to_sql(params);
                format!("({a} OR {b})")
            }
            Expression::Not(e) => format!("(NOT {})", e.to_sql(params)),
        }
    }

    /// Render the expression on its own.
    pub fn build(&self) -> (String, ParamList) {
        let mut params = ParamList::new();
        let sql = self.to_sql(&mut params);
        (sql, params)
    }
}

impl ops::BitAnd for Expression {
    type Output = Expression;

    fn bitand(self, rhs: Expression) -> Expression {
        self.and(rhs)
    }
}

impl ops::BitOr for Expression {
    type Output = Expression;

    fn bitor(self, rhs: Expression) -> Expression {
        self.or(rhs)
    }
}

impl ops::Not for Expression {
    type Output = Expression;

    fn not(self) -> Expression {
        Expression::Not(Box::new(self))
    }
}
