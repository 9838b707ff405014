//! Decoding of inbound request text.
//!
//! Requests are JSON objects with a `request` verb and command-specific
//! fields. Comments outside string literals are tolerated, and anything after
//! the first complete JSON value is ignored.

mod scanner;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::RequestError;

pub(crate) use scanner::strip_comments;

pub type RequestBody = Map<String, Value>;

/// One element of an `AddItemsToFridge` batch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub unit: String,
    /// Shelf life relative to `date`.
    pub expire_time: i64,
    pub amount: f64,
    /// Acquisition date, e.g. epoch days.
    pub date: i64,
}

/// Bound on `date` and `expireTime`.
///
/// A class's `expireTime` is added to the `date` of every amount of that class,
/// including amounts stored by earlier batches, so both are bounded such that any
/// pairing stays within `i64`.
pub const DATE_LIMIT: i64 = i64::MAX / 2;

impl NewItem {
    fn dates_in_range(&self) -> bool {
        (-DATE_LIMIT..=DATE_LIMIT).contains(&self.date)
            && (-DATE_LIMIT..=DATE_LIMIT).contains(&self.expire_time)
    }
}

/// Parse request text into its top-level value.
///
/// # Errors
/// Returns `RequestError::NotJson` if no JSON value can be decoded from the
/// start of `text`.
pub fn parse(text: &str) -> Result<Value, RequestError> {
    let cleaned = strip_comments(text);
    let mut stream = serde_json::Deserializer::from_str(&cleaned).into_iter::<Value>();
    match stream.next() {
        Some(Ok(value)) => Ok(value),
        Some(Err(_)) | None => Err(RequestError::NotJson),
    }
}

/// Extract the `request` verb.
///
/// # Errors
/// Returns `RequestError::NoSuchRequest` if the value is not an object or has no
/// string `request` field.
pub fn command(value: &Value) -> Result<(&str, &RequestBody), RequestError> {
    let body = value.as_object().ok_or(RequestError::NoSuchRequest)?;
    let verb = body
        .get("request")
        .and_then(Value::as_str)
        .ok_or(RequestError::NoSuchRequest)?;
    Ok((verb, body))
}

/// Decode and validate the `items` array of an `AddItemsToFridge` request.
///
/// The whole batch is rejected if any element is malformed, including items
/// whose `date` or `expireTime` lies outside [`DATE_LIMIT`].
///
/// # Errors
/// Returns `RequestError::FieldNotDefined("items")` when the field is absent or
/// not an array, and `RequestError::MalformedField("items")` when an element
/// does not decode.
pub fn items(body: &RequestBody) -> Result<Vec<NewItem>, RequestError> {
    let items = body
        .get("items")
        .filter(|value| value.is_array())
        .ok_or(RequestError::FieldNotDefined("items"))?;
    let items =
        Vec::<NewItem>::deserialize(items).map_err(|_| RequestError::MalformedField("items"))?;
    if !items.iter().all(NewItem::dates_in_range) {
        return Err(RequestError::MalformedField("items"));
    }
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rejects_structurally_invalid_json() {
        assert_eq!(parse("{\"request\": "), Err(RequestError::NotJson));
        assert_eq!(parse(""), Err(RequestError::NotJson));
        assert_eq!(parse("not json at all"), Err(RequestError::NotJson));
    }

    #[test]
    fn tolerates_comments_and_trailing_garbage() {
        let value = parse("// hi\n{\"request\": \"GetItemsInFridge\"} trailing stuff").unwrap();
        assert_eq!(value, json!({"request": "GetItemsInFridge"}));
    }

    #[test]
    fn command_requires_string_verb() {
        assert_eq!(
            command(&json!({"items": []})).unwrap_err(),
            RequestError::NoSuchRequest
        );
        assert_eq!(
            command(&json!({"request": 5})).unwrap_err(),
            RequestError::NoSuchRequest
        );
        assert_eq!(command(&json!([1, 2])).unwrap_err(), RequestError::NoSuchRequest);
        assert_eq!(command(&json!({"request": "X"})).unwrap().0, "X");
    }

    #[test]
    fn items_missing_vs_malformed() {
        let missing = json!({"request": "AddItemsToFridge"});
        assert_eq!(
            items(missing.as_object().unwrap()),
            Err(RequestError::FieldNotDefined("items"))
        );

        let malformed = json!({"items": [
            {"name": "Milk", "unit": "L", "expireTime": 7, "amount": 1, "date": 100},
            {"name": "Eggs", "unit": "pcs"}
        ]});
        assert_eq!(
            items(malformed.as_object().unwrap()),
            Err(RequestError::MalformedField("items"))
        );

        let good = json!({"items": [
            {"name": "Milk", "unit": "L", "expireTime": 7, "amount": 1, "date": 100}
        ]});
        let decoded = items(good.as_object().unwrap()).unwrap();
        assert_eq!(decoded.len(), 1);
        assert_eq!(decoded[0].expire_time, 7);
        assert!((decoded[0].amount - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn items_with_overflowing_expiry_are_malformed() {
        let overflow = json!({"items": [
            {"name": "Salt", "unit": "kg", "expireTime": 10, "amount": 1, "date": i64::MAX - 1}
        ]});
        assert_eq!(
            items(overflow.as_object().unwrap()),
            Err(RequestError::MalformedField("items"))
        );

        let underflow = json!({"items": [
            {"name": "Salt", "unit": "kg", "expireTime": -10, "amount": 1, "date": i64::MIN + 1}
        ]});
        assert_eq!(
            items(underflow.as_object().unwrap()),
            Err(RequestError::MalformedField("items"))
        );

        let edge = json!({"items": [
            {"name": "Salt", "unit": "kg", "expireTime": DATE_LIMIT, "amount": 1, "date": DATE_LIMIT}
        ]});
        let decoded = items(edge.as_object().unwrap()).unwrap();
        assert!(decoded[0].date.checked_add(decoded[0].expire_time).is_some());
    }
}
