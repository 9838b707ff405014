use fridge_server::prelude::*;
use serde_json::{Value, json};

fn open(dir: &tempfile::TempDir) -> Connection {
    Database::new(dir.path().join("fridge.db"))
        .try_open_connection()
        .expect("open connection")
}

fn ask(conn: &Connection, request: &Value) -> Value {
    serde_json::from_str(&conn.query(&request.to_string())).expect("reply is JSON")
}

fn add(conn: &Connection, items: Value) -> Value {
    ask(conn, &json!({"request": "AddItemsToFridge", "items": items}))
}

fn list(conn: &Connection) -> Vec<Value> {
    let reply = ask(conn, &json!({"request": "GetItemsInFridge"}));
    assert_eq!(reply["success"], json!(true));
    reply["values"].as_array().expect("values array").clone()
}

#[test]
fn empty_fridge_then_one_item() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = open(&dir);

    let reply = ask(&conn, &json!({"request": "GetItemsInFridge"}));
    assert_eq!(reply, json!({"success": true, "values": []}));

    let reply = add(
        &conn,
        json!([{"name": "Milk", "unit": "L", "expireTime": 7, "amount": 1, "date": 100}]),
    );
    assert_eq!(reply["success"], json!(true));

    let values = list(&conn);
    assert_eq!(values.len(), 1);
    let milk = &values[0];
    assert_eq!(milk["name"], json!("Milk"));
    assert_eq!(milk["amount"].as_f64(), Some(1.0));
    assert_eq!(milk["unit"], json!("L"));
    assert_eq!(milk["date"], json!(100));
    assert_eq!(milk["expireDate"], json!(107));
    Ok(())
}

#[test]
fn same_class_on_different_dates_orders_by_expiry() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = open(&dir);

    add(
        &conn,
        json!([{"name": "Milk", "unit": "L", "expireTime": 7, "amount": 2, "date": 120}]),
    );
    add(
        &conn,
        json!([{"name": "Milk", "unit": "L", "expireTime": 7, "amount": 1, "date": 100}]),
    );

    let values = list(&conn);
    let expiries: Vec<i64> = values
        .iter()
        .map(|v| v["expireDate"].as_i64().unwrap())
        .collect();
    assert_eq!(expiries, vec![107, 127]);
    Ok(())
}

#[test]
fn listing_breaks_expiry_ties_by_name() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = open(&dir);

    let reply = add(
        &conn,
        json!([
            {"name": "Yoghurt", "unit": "g", "expireTime": 10, "amount": 500, "date": 100},
            {"name": "Butter", "unit": "g", "expireTime": 30, "amount": 250, "date": 80},
            {"name": "Apples", "unit": "pcs", "expireTime": 5, "amount": 6, "date": 90},
            {"name": "Cheese", "unit": "g", "expireTime": 14, "amount": 200, "date": 60},
        ]),
    );
    assert_eq!(reply["success"], json!(true));

    let values = list(&conn);
    let order: Vec<(&str, i64)> = values
        .iter()
        .map(|v| (v["name"].as_str().unwrap(), v["expireDate"].as_i64().unwrap()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("Cheese", 74),
            ("Apples", 95),
            ("Butter", 110),
            ("Yoghurt", 110),
        ]
    );
    Ok(())
}

#[test]
fn malformed_requests_get_fixed_replies() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = open(&dir);

    let not_json = json!({"success": false, "message": "error: not JSON"});
    for text in ["", "{", "{\"request\": ", "nope", "{\"request\" \"GetItemsInFridge\"}"] {
        let reply: Value = serde_json::from_str(&conn.query(text))?;
        assert_eq!(reply, not_json, "input {text:?}");
    }

    let no_such = json!({"success": false, "message": "error: no such request"});
    for text in [
        "{}",
        "[]",
        "42",
        "{\"request\": 1}",
        "{\"request\": \"DropFridge\"}",
        "{\"request\": \"getitemsinfridge\"}",
    ] {
        let reply: Value = serde_json::from_str(&conn.query(text))?;
        assert_eq!(reply, no_such, "input {text:?}");
    }

    let reply = ask(&conn, &json!({"request": "AddItemsToFridge"}));
    assert_eq!(
        reply,
        json!({"success": false, "message": "error: items not defined"})
    );
    Ok(())
}

#[test]
fn comments_and_trailing_text_are_tolerated() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = open(&dir);

    let text = r#"
        // add one thing
        {
            "request": "AddItemsToFridge", /* the verb */
            "items": [{"name": "Eggs", "unit": "pcs", "expireTime": 21, "amount": 6, "date": 3}]
        }
        trailing garbage
    "#;
    let reply: Value = serde_json::from_str(&conn.query(text))?;
    assert_eq!(reply["success"], json!(true));
    assert_eq!(list(&conn).len(), 1);
    Ok(())
}

#[test]
fn connection_serves_many_requests() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let conn = open(&dir);

    for day in 0..25 {
        let reply = add(
            &conn,
            json!([{"name": "Bread", "unit": "loaf", "expireTime": 4, "amount": 1, "date": day}]),
        );
        assert_eq!(reply["success"], json!(true));
        assert_eq!(list(&conn).len(), usize::try_from(day + 1)?);
    }
    Ok(())
}
