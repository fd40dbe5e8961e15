use super::*;
use crate::error::OrmError;
use indexmap::IndexMap;

fn params_debug(params: &ParamList) -> String {
    format!("{params:?}")
}

// ── Expressions ──

#[test]
fn column_renders_qualified_and_quoted() {
    let r = Row::new("res_partner");
    assert_eq!(r.col("name").to_sql(), r#""res_partner"."name""#);
    assert_eq!(Row::new(r#"we"ird"#).column("x").to_sql(), r#""we""ird"."x""#);
}

#[test]
fn comparison_with_value_and_column() {
    let a = Row::new("a");
    let b = Row::new("b");

    let (sql, params) = a.col("x").eq(5i32).build();
    assert_eq!(sql, r#"("a"."x" = $1)"#);
    assert_eq!(params_debug(&params), "[5]");

    let (sql, params) = a.col("id").eq_col(&b.col("a_id")).build();
    assert_eq!(sql, r#"("a"."id" = "b"."a_id")"#);
    assert!(params.is_empty());

    let ops = [
        (a.col("x").ne(1i32), "!="),
        (a.col("x").lt(1i32), "<"),
        (a.col("x").le(1i32), "<="),
        (a.col("x").gt(1i32), ">"),
        (a.col("x").ge(1i32), ">="),
    ];
    for (expr, op) in ops {
        assert_eq!(expr.build().0, format!(r#"("a"."x" {op} $1)"#));
    }
}

#[test]
fn none_compares_with_is_null() {
    let a = Row::new("a");
    let (sql, params) = a.col("x").eq_opt(None::<i32>).build();
    assert_eq!(sql, r#"("a"."x" IS NULL)"#);
    assert!(params.is_empty());

    let (sql, params) = a.col("x").ne_opt(None::<i32>).build();
    assert_eq!(sql, r#"("a"."x" IS NOT NULL)"#);
    assert!(params.is_empty());

    let (sql, params) = a.col("x").eq_opt(Some("draft")).build();
    assert_eq!(sql, r#"("a"."x" = $1)"#);
    assert_eq!(params_debug(&params), r#"["draft"]"#);
}

#[test]
fn boolean_composition_numbers_params_left_to_right() {
    let a = Row::new("a");
    let expr = (a.col("x").eq(1i32) & a.col("y").eq(2i32)) | a.col("z").eq(3i32);
    let (sql, params) = expr.build();
    assert_eq!(
        sql,
        r#"((("a"."x" = $1) AND ("a"."y" = $2)) OR ("a"."z" = $3))"#
    );
    assert_eq!(params_debug(&params), "[1, 2, 3]");

    let expr = a.col("x").eq(1i32).or(a.col("y").eq(2i32).and(a.col("z").eq(3i32)));
    let (sql, params) = expr.build();
    assert_eq!(
        sql,
        r#"(("a"."x" = $1) OR (("a"."y" = $2) AND ("a"."z" = $3)))"#
    );
    assert_eq!(params_debug(&params), "[1, 2, 3]");
}

#[test]
fn negation() {
    let a = Row::new("a");
    let (sql, params) = (!a.col("x").eq(1i32)).build();
    assert_eq!(sql, r#"(NOT ("a"."x" = $1))"#);
    assert_eq!(params_debug(&params), "[1]");
    assert_eq!(a.col("x").is_null().not().build().0, r#"(NOT ("a"."x" IS NULL))"#);
}

#[test]
fn in_list() {
    let a = Row::new("a");
    let (sql, params) = (a.col("id") ^ vec![1i64, 2, 3]).build();
    assert_eq!(sql, r#"("a"."id" IN ($1, $2, $3))"#);
    assert_eq!(params_debug(&params), "[1, 2, 3]");

    let (sql, params) = a.col("id").in_list(Vec::<i64>::new()).build();
    assert_eq!(sql, "(1=0)");
    assert!(params.is_empty());
}

#[test]
fn to_sql_continues_numbering() {
    let a = Row::new("a");
    let mut params = ParamList::new();
    params.push(0i32);
    let sql = a.col("x").eq(7i32).to_sql(&mut params);
    assert_eq!(sql, r#"("a"."x" = $2)"#);
    assert_eq!(params.len(), 2);
}

// ── Joins ──

#[test]
fn join_kind_follows_nullable_flags() {
    let cases = [
        (false, false, JoinKind::Inner, "INNER JOIN"),
        (false, true, JoinKind::Left, "LEFT JOIN"),
        (true, false, JoinKind::Right, "RIGHT JOIN"),
        (true, true, JoinKind::Full, "FULL JOIN"),
    ];
    for (left_nullable, right_nullable, kind, keyword) in cases {
        let a = Row::with_nullable("a", left_nullable);
        let b = Row::with_nullable("b", right_nullable);
        let join = Join::new(a.col("id").eq_col(&b.col("a_id"))).unwrap();
        assert_eq!(join.kind(), kind);
        assert_eq!(join.row().table(), "b");
        let mut params = ParamList::new();
        assert_eq!(
            join.to_sql(&mut params),
            format!(r#"{keyword} "b" ON ("a"."id" = "b"."a_id")"#)
        );
    }
}

#[test]
fn join_requires_two_columns() {
    let a = Row::new("a");
    let b = Row::new("b");
    let err = Join::new(a.col("id").eq(1i32)).unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
    assert!(Join::new(a.col("id").is_null()).is_err());
    assert!(Join::new(a.col("id").eq_col(&b.col("a_id")) & a.col("x").eq(1i32)).is_err());
    assert!(Join::new(a.col("id").eq_col(&a.col("parent_id"))).is_err());
}

// ── Select ──

#[test]
fn select_with_left_join_and_where() {
    let r1 = Row::new("a");
    let r2 = Row::nullable("b");
    let (sql, params) = Select::new(vec![r1.col("x"), r2.col("y")])
        .join(r1.col("id").eq_col(&r2.col("a_id")))
        .where_(r1.col("x").eq(5i32))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT "a"."x", "b"."y" FROM "a" LEFT JOIN "b" ON ("a"."id" = "b"."a_id") WHERE ("a"."x" = $1)"#
    );
    assert_eq!(params_debug(&params), "[5]");
}

#[test]
fn tables_are_deduplicated_and_sorted() {
    let a = Row::new("a");
    let b = Row::new("b");
    let c = Row::new("c");
    let select = Select::new(vec![c.col("z"), a.col("x"), c.col("w"), b.col("y")]);
    let tables: Vec<&str> = select.tables().iter().map(|r| r.table()).collect();
    assert_eq!(tables, ["a", "b", "c"]);
    assert_eq!(
        select.to_sql(),
        r#"SELECT "c"."z", "a"."x", "c"."w", "b"."y" FROM "a", "b", "c""#
    );
}

#[test]
fn aliased_columns() {
    let partner = Row::new("res_partner");
    let user = Row::new("res_users");
    let mut columns = IndexMap::new();
    columns.insert("login".to_string(), user.col("login"));
    columns.insert("partner".to_string(), partner.col("name"));
    columns.insert("user_id".to_string(), user.col("id"));

    let select = Select::aliased(columns).where_(user.col("active").eq(true));
    let tables: Vec<&str> = select.tables().iter().map(|r| r.table()).collect();
    assert_eq!(tables, ["res_partner", "res_users"]);

    let (sql, params) = select.build().unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "res_users"."login" AS "login", "res_partner"."name" AS "partner", "res_users"."id" AS "user_id""#,
            r#" FROM "res_partner", "res_users" WHERE ("res_users"."active" = $1)"#
        )
    );
    assert_eq!(params_debug(&params), "[true]");
}

#[test]
fn where_conditions_are_and_ed() {
    let a = Row::new("a");
    let (sql, params) = Select::new(vec![a.col("x")])
        .where_(a.col("x").gt(1i32))
        .where_(a.col("y").lt(9i32))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        r#"SELECT "a"."x" FROM "a" WHERE (("a"."x" > $1) AND ("a"."y" < $2))"#
    );
    assert_eq!(params_debug(&params), "[1, 9]");
}

#[test]
fn join_params_come_before_where_params() {
    let a = Row::new("a");
    let b = Row::nullable("b");
    let c = Row::new("c");
    let on_c = a.col("c_id").eq_col(&c.col("id"));
    let (sql, params) = Select::new(vec![a.col("x"), b.col("y"), c.col("z")])
        .where_(a.col("x").eq("where"))
        .joins([a.col("id").eq_col(&b.col("a_id")), on_c])
        .order_by(c.col("z"))
        .order_by_desc(a.col("x"))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "a"."x", "b"."y", "c"."z" FROM "a""#,
            r#" LEFT JOIN "b" ON ("a"."id" = "b"."a_id")"#,
            r#" INNER JOIN "c" ON ("a"."c_id" = "c"."id")"#,
            r#" WHERE ("a"."x" = $1)"#,
            r#" ORDER BY "c"."z", "a"."x" DESC"#
        )
    );
    assert_eq!(params_debug(&params), r#"["where"]"#);
}

#[test]
fn join_from_first_of_several_from_tables() {
    let a = Row::new("a");
    let b = Row::nullable("b");
    let c = Row::new("c");
    let (sql, params) = Select::new(vec![a.col("x"), b.col("y"), c.col("z")])
        .join(a.col("id").eq_col(&b.col("a_id")))
        .where_(c.col("z").eq(2i32))
        .build()
        .unwrap();
    assert_eq!(
        sql,
        concat!(
            r#"SELECT "a"."x", "b"."y", "c"."z" FROM "a" CROSS JOIN "c""#,
            r#" LEFT JOIN "b" ON ("a"."id" = "b"."a_id") WHERE ("c"."z" = $1)"#
        )
    );
    assert_eq!(params_debug(&params), "[2]");
}

#[test]
fn join_from_unselected_table_fails_at_build() {
    let a = Row::new("a");
    let b = Row::new("b");
    let c = Row::new("c");
    let select = Select::new(vec![a.col("x"), c.col("z")]).join(b.col("id").eq_col(&c.col("b_id")));
    let err = select.build().unwrap_err();
    assert!(matches!(err, OrmError::Validation(ref msg) if msg.contains("b is not selected")));

    let select = Select::new(vec![a.col("x")]).join(a.col("x").eq(1i32));
    assert!(select.build().is_err());
    assert!(select.to_sql().starts_with("/*"));
}

#[test]
fn select_without_columns_fails() {
    assert!(Select::new(Vec::new()).build().is_err());
}
