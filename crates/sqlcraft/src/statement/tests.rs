use super::*;
use crate::dialect::Dialect;
use crate::error::QueryError;
use crate::predicate::{CompareOp, Predicate};
use crate::schema::{ColumnOptions, ForeignKey, ReferentialAction, TableSchema};
use crate::value::SqlValue;
use crate::values;

fn user_table() -> TableSchema {
    TableSchema::builder("user_table")
        .column_with(
            "user_id",
            "INT",
            ColumnOptions::new().primary_key().autoincrement(),
        )
        .column_with("username", "VARCHAR(50)", ColumnOptions::new().not_null())
        .column("email", "VARCHAR(100)")
        .column_with("active", "BOOLEAN", ColumnOptions::new().default_value(true))
        .build()
        .unwrap()
}

fn orders() -> TableSchema {
    TableSchema::builder("orders")
        .if_not_exists()
        .column_with("id", "INT", ColumnOptions::new().primary_key())
        .column_with("user_id", "INT", ColumnOptions::new().not_null())
        .column("amount", "DOUBLE")
        .column_with("status", "VARCHAR(20)", ColumnOptions::new().default_value("new"))
        .unique(&["user_id", "id"])
        .foreign_key(
            ForeignKey::new(&["user_id"], "user_table", &["user_id"])
                .named("fk_orders_user")
                .on_delete(ReferentialAction::Cascade),
        )
        .build()
        .unwrap()
}

fn generic() -> StatementBuilder {
    StatementBuilder::new(Dialect::Generic)
}

// ==================== CREATE / DROP ====================

#[test]
fn create_table_generic() {
    let stmt = generic().create_table(&user_table());
    assert_eq!(
        stmt.sql(),
        "CREATE TABLE user_table (user_id INT AUTOINCREMENT PRIMARY KEY, \
         username VARCHAR(50) NOT NULL, email VARCHAR(100), active BOOLEAN DEFAULT TRUE)"
    );
    assert!(stmt.params().is_empty());
    assert_eq!(stmt.kind(), StatementKind::CreateTable);
}

#[test]
fn create_table_autoincrement_keyword_per_dialect() {
    let schema = user_table();
    let mysql = StatementBuilder::new(Dialect::MySql).create_table(&schema);
    assert!(mysql.sql().contains("user_id INT AUTO_INCREMENT PRIMARY KEY"));

    let pg = StatementBuilder::new(Dialect::Postgres).create_table(&schema);
    assert!(
        pg.sql()
            .contains("user_id INT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY")
    );
}

#[test]
fn create_table_with_table_constraints() {
    let stmt = generic().create_table(&orders());
    assert_eq!(
        stmt.sql(),
        "CREATE TABLE IF NOT EXISTS orders (id INT PRIMARY KEY, user_id INT NOT NULL, \
         amount DOUBLE, status VARCHAR(20) DEFAULT 'new', UNIQUE (user_id, id), \
         CONSTRAINT fk_orders_user FOREIGN KEY (user_id) REFERENCES user_table (user_id) \
         ON DELETE CASCADE)"
    );
}

#[test]
fn create_table_lists_each_column_once_in_order() {
    let schema = user_table();
    let sql = generic().create_table(&schema).sql().to_string();
    let mut last = 0;
    for column in schema.columns() {
        let def = format!("{} {}", column.name(), column.sql_type());
        assert_eq!(sql.matches(&def).count(), 1, "{def}");
        let pos = sql.find(&def).unwrap();
        assert!(pos > last, "{def} out of order");
        last = pos;
    }
}

#[test]
fn default_literal_escapes_quotes() {
    let schema = TableSchema::builder("notes")
        .column_with(
            "body",
            "TEXT",
            ColumnOptions::new().default_value("it's"),
        )
        .build()
        .unwrap();
    assert_eq!(
        generic().create_table(&schema).sql(),
        "CREATE TABLE notes (body TEXT DEFAULT 'it''s')"
    );
}

#[test]
fn mysql_default_backslash_cannot_close_literal() {
    let schema = TableSchema::builder("notes")
        .column_with(
            "body",
            "TEXT",
            ColumnOptions::new().default_value(r"\'); DROP TABLE t; -- "),
        )
        .build()
        .unwrap();
    assert_eq!(
        StatementBuilder::new(Dialect::MySql).create_table(&schema).sql(),
        r"CREATE TABLE notes (body TEXT DEFAULT '\\''); DROP TABLE t; -- ')"
    );
    assert_eq!(
        StatementBuilder::new(Dialect::Postgres).create_table(&schema).sql(),
        r"CREATE TABLE notes (body TEXT DEFAULT '\''); DROP TABLE t; -- ')"
    );
}

#[test]
fn mysql_quotes_identifiers_with_backticks() {
    let schema = TableSchema::builder(r#"shop."Order Lines""#)
        .column_with(r#""Order Id""#, "INT", ColumnOptions::new().primary_key())
        .column("qty", "INT")
        .build()
        .unwrap();
    let mysql = StatementBuilder::new(Dialect::MySql);

    assert_eq!(
        mysql.create_table(&schema).sql(),
        "CREATE TABLE shop.`Order Lines` (`Order Id` INT PRIMARY KEY, qty INT)"
    );
    let stmt = mysql
        .update(&schema, [("qty", 2)], Some(&Predicate::eq(r#""Order Id""#, 7)))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE shop.`Order Lines` SET qty = ? WHERE `Order Id` = ?"
    );
    assert_eq!(
        generic().drop_table(&schema, false).sql(),
        r#"DROP TABLE shop."Order Lines""#
    );
}

#[test]
fn drop_table() {
    let schema = user_table();
    assert_eq!(generic().drop_table(&schema, false).sql(), "DROP TABLE user_table");
    let stmt = generic().drop_table(&schema, true);
    assert_eq!(stmt.sql(), "DROP TABLE IF EXISTS user_table");
    assert_eq!(stmt.kind(), StatementKind::DropTable);
}

// ==================== INSERT ====================

#[test]
fn insert_binds_values_in_order() {
    let stmt = generic()
        .insert(&user_table(), &["user_id", "username"], values![1, "alice"])
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO user_table (user_id, username) VALUES (?, ?)"
    );
    assert_eq!(stmt.params(), &[SqlValue::Int(1), SqlValue::from("alice")]);
    assert!(stmt.is_filtered());
}

#[test]
fn insert_length_mismatch() {
    let err = generic()
        .insert(&user_table(), &["user_id", "username"], values![1])
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::ColumnValueMismatch {
            columns: 2,
            values: 1
        }
    );
}

#[test]
fn insert_same_column_twice() {
    let err = generic()
        .insert(&user_table(), &["user_id", "USER_ID"], values![1, 2])
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::DuplicateColumn {
            table: "user_table".into(),
            column: "USER_ID".into(),
        }
    );

    let err = generic()
        .insert_many(&orders(), &["id", "amount", "ID"], vec![values![1, 2.0, 3]])
        .unwrap_err();
    assert!(matches!(err, QueryError::DuplicateColumn { .. }));
}

#[test]
fn insert_unknown_column() {
    let err = generic()
        .insert(&user_table(), &["user_id", "nickname"], values![1, "x"])
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::UnknownColumn {
            table: "user_table".into(),
            column: "nickname".into()
        }
    );
}

#[test]
fn insert_nothing() {
    let err = generic()
        .insert(&user_table(), &[] as &[&str], values![])
        .unwrap_err();
    assert!(matches!(err, QueryError::EmptyInsert { .. }));

    let err = generic()
        .insert_many(&user_table(), &["user_id"], Vec::new())
        .unwrap_err();
    assert!(matches!(err, QueryError::EmptyInsert { .. }));
}

#[test]
fn insert_row_uses_declared_columns() {
    let stmt = generic()
        .insert_row(&user_table(), values![7, "bob", None::<String>, false])
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO user_table (user_id, username, email, active) VALUES (?, ?, ?, ?)"
    );
    assert_eq!(stmt.params()[2], SqlValue::Null);

    let err = generic()
        .insert_row(&user_table(), values![7, "bob"])
        .unwrap_err();
    assert!(matches!(err, QueryError::ColumnValueMismatch { columns: 4, values: 2 }));
}

#[test]
fn insert_many_postgres_numbering() {
    let stmt = StatementBuilder::new(Dialect::Postgres)
        .insert_many(
            &user_table(),
            &["user_id", "username"],
            vec![values![1, "a"], values![2, "b"], values![3, "c"]],
        )
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "INSERT INTO user_table (user_id, username) VALUES ($1, $2), ($3, $4), ($5, $6)"
    );
    assert_eq!(stmt.params().len(), 6);
    assert_eq!(stmt.params()[4], SqlValue::Int(3));
}

#[test]
fn insert_many_rejects_ragged_rows() {
    let err = generic()
        .insert_many(
            &user_table(),
            &["user_id", "username"],
            vec![values![1, "a"], values![2]],
        )
        .unwrap_err();
    assert!(matches!(err, QueryError::ColumnValueMismatch { columns: 2, values: 1 }));
}

// ==================== SELECT ====================

#[test]
fn select_all_between() {
    let pred = Predicate::between("user_id", 1, 100);
    let stmt = generic().select(&user_table(), ["*"], Some(&pred)).unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT * FROM user_table WHERE user_id BETWEEN ? AND ?"
    );
    assert_eq!(stmt.params(), &[SqlValue::Int(1), SqlValue::Int(100)]);
    assert_eq!(stmt.kind(), StatementKind::Select);
}

#[test]
fn select_columns_without_filter() {
    let stmt = generic()
        .select(&user_table(), ["username", "EMAIL"], None)
        .unwrap();
    assert_eq!(stmt.sql(), "SELECT username, email FROM user_table");
    assert!(!stmt.is_filtered());
    assert!(!stmt.is_unguarded_write());
}

#[test]
fn select_empty_projection() {
    let err = generic()
        .select(&user_table(), Projection::Items(Vec::new()), None)
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::EmptyProjection {
            table: "user_table".into()
        }
    );
}

#[test]
fn select_unknown_projection_column() {
    let err = generic()
        .select(&user_table(), ["username", "password"], None)
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownColumn { .. }));
}

#[test]
fn select_query_clauses() {
    let query = SelectQuery::new(Projection::items([
        SelectItem::from("user_id"),
        Aggregate::CountAll.into(),
        Aggregate::Sum("amount".into()).into(),
    ]))
    .filter(Predicate::gt("amount", 10))
    .filter(Predicate::ne("status", "void"))
    .group_by("user_id")
    .order_by("user_id", Order::Desc)
    .limit(10)
    .offset(20);

    let stmt = generic().select_query(&orders(), &query).unwrap();
    assert_eq!(
        stmt.sql(),
        "SELECT user_id, COUNT(*), SUM(amount) FROM orders \
         WHERE amount > ? AND status != ? GROUP BY user_id ORDER BY user_id DESC \
         LIMIT 10 OFFSET 20"
    );
    assert_eq!(stmt.params(), &[SqlValue::Int(10), SqlValue::from("void")]);
}

#[test]
fn select_query_distinct_and_aggregate_columns_validated() {
    let stmt = generic()
        .select_query(&orders(), &SelectQuery::new(["status"]).distinct())
        .unwrap();
    assert_eq!(stmt.sql(), "SELECT DISTINCT status FROM orders");

    let bad = SelectQuery::new(Projection::items([Aggregate::Max("total".into())]));
    assert!(matches!(
        generic().select_query(&orders(), &bad),
        Err(QueryError::UnknownColumn { .. })
    ));

    let bad_order = SelectQuery::new(["*"]).order_by("created", Order::Asc);
    assert!(matches!(
        generic().select_query(&orders(), &bad_order),
        Err(QueryError::UnknownColumn { .. })
    ));
}

#[test]
fn select_query_having_and_aliases() {
    let query = SelectQuery::new(Projection::items([
        SelectItem::from("user_id").alias("customer"),
        Aggregate::CountAll.alias("order_count"),
        Aggregate::Sum("amount".into()).alias(r#""Total Spent""#),
    ]))
    .filter(Predicate::gt("amount", 5))
    .group_by("user_id")
    .having(Aggregate::CountAll, CompareOp::Gt, 2)
    .having(Aggregate::Sum("amount".into()), CompareOp::Gte, 100.0)
    .order_by("user_id", Order::Asc);

    let stmt = StatementBuilder::new(Dialect::Postgres)
        .select_query(&orders(), &query)
        .unwrap();
    assert_eq!(
        stmt.sql(),
        r#"SELECT user_id AS customer, COUNT(*) AS order_count, SUM(amount) AS "Total Spent" FROM orders WHERE amount > $1 GROUP BY user_id HAVING COUNT(*) > $2 AND SUM(amount) >= $3 ORDER BY user_id ASC"#
    );
    assert_eq!(
        stmt.params(),
        &[SqlValue::Int(5), SqlValue::Int(2), SqlValue::Float(100.0)]
    );

    let stmt = StatementBuilder::new(Dialect::MySql)
        .select_query(&orders(), &query)
        .unwrap();
    assert!(stmt.sql().contains("SUM(amount) AS `Total Spent`"));
    assert!(stmt.sql().contains("HAVING COUNT(*) > ? AND SUM(amount) >= ?"));
}

#[test]
fn having_validates_aggregate_column() {
    let query = SelectQuery::new(["user_id"])
        .group_by("user_id")
        .having(Aggregate::Max("total".into()), CompareOp::Lt, 1);
    assert!(matches!(
        generic().select_query(&orders(), &query),
        Err(QueryError::UnknownColumn { .. })
    ));
}

#[test]
fn alias_must_be_an_identifier() {
    let query = SelectQuery::new(Projection::items([
        Aggregate::CountAll.alias("n; DROP TABLE orders"),
    ]));
    let err = generic().select_query(&orders(), &query).unwrap_err();
    assert!(matches!(err, QueryError::InvalidAlias { ref alias, .. } if alias == "n; DROP TABLE orders"));

    let query = SelectQuery::new(Projection::items([SelectItem::from("id").alias("a").alias("b")]));
    assert_eq!(
        generic().select_query(&orders(), &query).unwrap().sql(),
        "SELECT id AS b FROM orders"
    );
}

// ==================== UPDATE ====================

#[test]
fn update_with_filter() {
    let pred = Predicate::eq("user_id", 5);
    let stmt = generic()
        .update(&user_table(), [("username", "carol")], Some(&pred))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE user_table SET username = ? WHERE user_id = ?"
    );
    assert_eq!(stmt.params(), &[SqlValue::from("carol"), SqlValue::Int(5)]);
    assert!(!stmt.is_unguarded_write());
}

#[test]
fn update_follows_declared_column_order() {
    let assignments: Vec<(&str, SqlValue)> = vec![
        ("active", false.into()),
        ("email", "a@example.com".into()),
        ("username", "dave".into()),
    ];
    let stmt = generic().update(&user_table(), assignments, None).unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE user_table SET username = ?, email = ?, active = ?"
    );
    assert_eq!(
        stmt.params(),
        &[
            SqlValue::from("dave"),
            SqlValue::from("a@example.com"),
            SqlValue::Bool(false)
        ]
    );
    assert!(stmt.is_unguarded_write());
}

#[test]
fn update_same_column_twice_keeps_last() {
    let stmt = generic()
        .update(&user_table(), [("username", "x"), ("USERNAME", "y")], None)
        .unwrap();
    assert_eq!(stmt.sql(), "UPDATE user_table SET username = ?");
    assert_eq!(stmt.params(), &[SqlValue::from("y")]);
}

#[test]
fn update_nothing() {
    let err = generic()
        .update(&user_table(), Vec::<(&str, SqlValue)>::new(), None)
        .unwrap_err();
    assert_eq!(
        err,
        QueryError::EmptyUpdate {
            table: "user_table".into()
        }
    );
}

#[test]
fn update_postgres_numbers_set_then_where() {
    let pred = Predicate::in_list("user_id", [1, 2]);
    let stmt = StatementBuilder::new(Dialect::Postgres)
        .update(&user_table(), [("email", "e"), ("username", "u")], Some(&pred))
        .unwrap();
    assert_eq!(
        stmt.sql(),
        "UPDATE user_table SET username = $1, email = $2 WHERE user_id IN ($3, $4)"
    );
}

// ==================== DELETE ====================

#[test]
fn delete_with_and_without_filter() {
    let pred = Predicate::is_null("email").or(Predicate::eq("active", false));
    let stmt = generic().delete(&user_table(), Some(&pred)).unwrap();
    assert_eq!(
        stmt.sql(),
        "DELETE FROM user_table WHERE email IS NULL OR active = ?"
    );
    assert_eq!(stmt.params(), &[SqlValue::Bool(false)]);

    let all = generic().delete(&user_table(), None).unwrap();
    assert_eq!(all.sql(), "DELETE FROM user_table");
    assert!(all.is_unguarded_write());
}

#[test]
fn predicate_errors_propagate() {
    let pred = Predicate::in_list("user_id", Vec::<i32>::new());
    assert!(matches!(
        generic().delete(&user_table(), Some(&pred)),
        Err(QueryError::EmptyInSet { .. })
    ));
}

// ==================== Properties ====================

#[test]
fn statements_are_deterministic() {
    let schema = user_table();
    let pred = Predicate::eq("username", "a").and(Predicate::lt("user_id", 9));
    for dialect in [Dialect::Generic, Dialect::MySql, Dialect::Postgres] {
        let sb = StatementBuilder::new(dialect);
        assert_eq!(sb.create_table(&schema), sb.create_table(&schema));
        assert_eq!(
            sb.select(&schema, ["*"], Some(&pred)).unwrap(),
            sb.select(&schema, ["*"], Some(&pred)).unwrap()
        );
        assert_eq!(sb.select(&schema, ["*"], None).unwrap().dialect(), dialect);
    }
}

#[test]
fn into_parts_and_display() {
    let stmt = generic().delete(&user_table(), None).unwrap();
    assert_eq!(stmt.to_string(), "DELETE FROM user_table");
    let (sql, params) = stmt.into_parts();
    assert_eq!(sql, "DELETE FROM user_table");
    assert!(params.is_empty());
}
