use serde_json::json;
use sql_dbutils::prelude::*;

fn seeded(policy: NullPolicy) -> Result<Database, DbError> {
    let cfg = DbConfig::builder(":memory:", "")
        .null_policy(policy)
        .finish();
    let mut db = Database::open(cfg)?;
    db.execute_batch(
        "CREATE TABLE item (id INTEGER, label TEXT, price REAL, note TEXT);
         INSERT INTO item VALUES (1, 'apple', 1.5, NULL);
         INSERT INTO item VALUES (2, 'pear', 2.0, 'ripe');
         INSERT INTO item VALUES (3, 'plum', NULL, NULL);",
    )?;
    Ok(db)
}

#[test]
fn test02_query_many_preserves_cursor_order() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::EmptyString)?;
    let rows = db.query_many("SELECT id, label FROM item ORDER BY id DESC", &[])?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows.column_names(), ["id", "label"]);
    let ids: Vec<i64> = rows
        .iter()
        .filter_map(|r| r.get("id").and_then(RowValues::as_int).copied())
        .collect();
    assert_eq!(ids, vec![3, 2, 1]);
    Ok(())
}

#[test]
fn test02_nulls_become_empty_string_by_default() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::EmptyString)?;
    let rows = db.query_many("SELECT id, price, note FROM item ORDER BY id", &[])?;
    for row in &rows {
        for (column, value) in row.iter() {
            assert!(!value.is_null(), "column {column} kept a NULL");
        }
    }
    assert_eq!(rows.results[0].get("note"), Some(&RowValues::Text(String::new())));
    assert_eq!(rows.results[2].get("price"), Some(&RowValues::Text(String::new())));
    assert_eq!(rows.results[1].get("note"), Some(&RowValues::Text("ripe".into())));
    Ok(())
}

#[test]
fn test02_preserve_policy_keeps_nulls() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::Preserve)?;
    let row = db
        .query_one("SELECT note FROM item WHERE id = ?1", &row_params![1])?
        .expect("row");
    assert_eq!(row.get("note"), Some(&RowValues::Null));
    Ok(())
}

#[test]
fn test02_query_one_returns_last_row_read() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::EmptyString)?;
    let row = db
        .query_one("SELECT id, label FROM item ORDER BY id", &[])?
        .expect("rows exist");
    assert_eq!(row.get("label").and_then(RowValues::as_text), Some("plum"));

    let none = db.query_one("SELECT id FROM item WHERE id > ?1", &row_params![100])?;
    assert!(none.is_none());
    Ok(())
}

#[test]
fn test02_column_names_use_aliases_on_every_path() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::EmptyString)?;
    let sql = "SELECT id AS item_id, label AS name FROM item WHERE id = ?1";
    let one = db.query_one(sql, &row_params![2])?.expect("row");
    let many = db.query_many(sql, &row_params![2])?;
    assert_eq!(one.column_names(), ["item_id", "name"]);
    assert_eq!(many.results[0].column_names(), one.column_names());
    assert_eq!(many.results[0], one);
    Ok(())
}

#[test]
fn test02_values_keep_their_storage_class() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = Database::open(DbConfig::in_memory())?;
    db.execute_batch("CREATE TABLE doc (body TEXT, raw BLOB, score REAL);")?;
    db.execute(
        "INSERT INTO doc VALUES (?1, ?2, ?3)",
        &row_params![json!({"k": [1, 2]}), vec![0u8, 1, 2], 0.25],
    )?;
    let row = db.query_one("SELECT body, raw, score FROM doc", &[])?.expect("row");
    assert_eq!(row.get("body").and_then(RowValues::as_text), Some(r#"{"k":[1,2]}"#));
    assert_eq!(row.get("raw").and_then(RowValues::as_blob), Some(&[0u8, 1, 2][..]));
    assert_eq!(row.get("score").and_then(RowValues::as_float), Some(0.25));
    Ok(())
}

#[test]
fn test02_into_map_exposes_plain_record() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::EmptyString)?;
    let map = db
        .query_one("SELECT id, label FROM item WHERE id = ?1", &row_params![1])?
        .expect("row")
        .into_map();
    assert_eq!(map.len(), 2);
    assert_eq!(map["label"], RowValues::Text("apple".into()));
    Ok(())
}

#[test]
fn test02_query_errors_surface() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded(NullPolicy::EmptyString)?;
    let missing_table = db.query_many("SELECT * FROM nope", &[]);
    assert!(matches!(missing_table, Err(DbError::StatementError(_))));
    let extra = db.query_many("SELECT * FROM item WHERE id = ?", &row_params![1, 2]);
    assert!(matches!(extra, Err(DbError::BindingError(_))));
    assert_eq!(db.query_many("SELECT * FROM item", &[])?.len(), 3);
    Ok(())
}
