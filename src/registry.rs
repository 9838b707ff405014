//! Closed set of schema statements and request operations.
//!
//! Every request verb the service understands is a variant of [`Operation`];
//! every SQL text a connection compiles is a variant of [`Statement`].

use rusqlite::Row;
use rusqlite::types::Value as SqlValue;
use serde_json::{Value, json};

use crate::error::RequestError;
use crate::request::{self, NewItem, RequestBody};

/// Schema statements, run in order on every new connection.
///
/// Tables come before the view that joins them.
pub const INITIALIZERS: [&str; 4] = [
    "CREATE TABLE IF NOT EXISTS ItemClasses(\
        id INTEGER PRIMARY KEY AUTOINCREMENT,\
        name TEXT UNIQUE,\
        unit TEXT,\
        expireTime INTEGER);",
    "CREATE TABLE IF NOT EXISTS ItemAmounts(\
        id INTEGER PRIMARY KEY AUTOINCREMENT,\
        itemClassId INTEGER,\
        amount REAL,\
        date INTEGER);",
    // Reserved: no operation reads or writes the shopping list yet.
    "CREATE TABLE IF NOT EXISTS ShoppingList(\
        id INTEGER PRIMARY KEY AUTOINCREMENT,\
        itemClassId INTEGER,\
        amount REAL,\
        date INTEGER);",
    "CREATE VIEW IF NOT EXISTS GetItemsInFridge(\
        id, name, amount, unit, date, expireDate) \
     AS SELECT object.id, class.name, object.amount, class.unit, object.date, \
        object.date + class.expireTime \
     FROM ItemClasses AS class \
        JOIN ItemAmounts AS object ON class.id = object.itemClassId \
        ORDER BY object.date + class.expireTime, class.name;",
];

/// A SQL text compiled once per connection and reused for its lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Statement {
    Begin,
    Commit,
    Rollback,
    SelectItemsInFridge,
    InsertClass,
    UpdateClass,
    InsertAmount,
}

impl Statement {
    pub const ALL: [Statement; 7] = [
        Statement::Begin,
        Statement::Commit,
        Statement::Rollback,
        Statement::SelectItemsInFridge,
        Statement::InsertClass,
        Statement::UpdateClass,
        Statement::InsertAmount,
    ];

    #[must_use]
    pub const fn sql(self) -> &'static str {
        match self {
            Statement::Begin => "BEGIN IMMEDIATE TRANSACTION;",
            Statement::Commit => "COMMIT TRANSACTION;",
            Statement::Rollback => "ROLLBACK TRANSACTION;",
            Statement::SelectItemsInFridge => {
                "SELECT name, amount, unit, date, expireDate FROM GetItemsInFridge \
                 ORDER BY expireDate, name;"
            }
            Statement::InsertClass => {
                "INSERT OR IGNORE INTO ItemClasses (name, unit, expireTime) VALUES (?1, ?2, ?3);"
            }
            Statement::UpdateClass => {
                "UPDATE ItemClasses SET unit = ?1, expireTime = ?2 WHERE name = ?3 RETURNING id;"
            }
            Statement::InsertAmount => {
                "INSERT INTO ItemAmounts (itemClassId, amount, date) VALUES (?1, ?2, ?3);"
            }
        }
    }
}

/// A request verb together with everything needed to run it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    GetItemsInFridge,
    AddItemsToFridge,
}

/// An operation whose payload has been decoded and validated.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundRequest {
    GetItemsInFridge,
    AddItemsToFridge(Vec<NewItem>),
}

impl Operation {
    pub const ALL: [Operation; 2] = [Operation::GetItemsInFridge, Operation::AddItemsToFridge];

    /// Public API verb, matched exactly against the `request` field.
    #[must_use]
    pub const fn command(self) -> &'static str {
        match self {
            Operation::GetItemsInFridge => "GetItemsInFridge",
            Operation::AddItemsToFridge => "AddItemsToFridge",
        }
    }

    #[must_use]
    pub fn from_command(command: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.command() == command)
    }

    /// Statements that must compile for this operation to be served.
    #[must_use]
    pub const fn statements(self) -> &'static [Statement] {
        match self {
            Operation::GetItemsInFridge => &[Statement::SelectItemsInFridge],
            Operation::AddItemsToFridge => &[
                Statement::Begin,
                Statement::Commit,
                Statement::Rollback,
                Statement::InsertClass,
                Statement::UpdateClass,
                Statement::InsertAmount,
            ],
        }
    }

    /// Whether replies always carry a `values` array, even an empty one.
    #[must_use]
    pub const fn returns_rows(self) -> bool {
        matches!(self, Operation::GetItemsInFridge)
    }

    /// Decode the command-specific fields of a request.
    ///
    /// # Errors
    /// Returns a `RequestError` naming the missing or malformed field.
    pub fn bind(self, body: &RequestBody) -> Result<BoundRequest, RequestError> {
        match self {
            Operation::GetItemsInFridge => Ok(BoundRequest::GetItemsInFridge),
            Operation::AddItemsToFridge => request::items(body).map(BoundRequest::AddItemsToFridge),
        }
    }
}

impl BoundRequest {
    #[must_use]
    pub fn operation(&self) -> Operation {
        match self {
            BoundRequest::GetItemsInFridge => Operation::GetItemsInFridge,
            BoundRequest::AddItemsToFridge(_) => Operation::AddItemsToFridge,
        }
    }
}

#[must_use]
pub fn bind_insert_class(item: &NewItem) -> Vec<SqlValue> {
    vec![
        SqlValue::Text(item.name.clone()),
        SqlValue::Text(item.unit.clone()),
        SqlValue::Integer(item.expire_time),
    ]
}

#[must_use]
pub fn bind_update_class(item: &NewItem) -> Vec<SqlValue> {
    vec![
        SqlValue::Text(item.unit.clone()),
        SqlValue::Integer(item.expire_time),
        SqlValue::Text(item.name.clone()),
    ]
}

#[must_use]
pub fn bind_insert_amount(class_id: i64, item: &NewItem) -> Vec<SqlValue> {
    vec![
        SqlValue::Integer(class_id),
        SqlValue::Real(item.amount),
        SqlValue::Integer(item.date),
    ]
}

/// Decode one row of [`Statement::SelectItemsInFridge`].
///
/// # Errors
/// Returns `rusqlite::Error` if a column has an unexpected type.
pub fn decode_fridge_row(row: &Row<'_>) -> rusqlite::Result<Value> {
    let name: String = row.get(0)?;
    let amount: f64 = row.get(1)?;
    let unit: Option<String> = row.get(2)?;
    let date: i64 = row.get(3)?;
    let expire_date: i64 = row.get(4)?;
    Ok(json!({
        "name": name,
        "amount": amount,
        "unit": unit,
        "date": date,
        "expireDate": expire_date,
    }))
}

/// Decode the `RETURNING id` row of [`Statement::UpdateClass`].
///
/// # Errors
/// Returns `rusqlite::Error` if the id column is not an integer.
pub fn decode_id(row: &Row<'_>) -> rusqlite::Result<i64> {
    row.get(0)
}
