use std::borrow::Cow;

use serde::Serialize;
use serde_json::Value;

use crate::error::RequestError;

/// Reply sent back for every request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Reply {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Reply {
    #[must_use]
    pub fn failure() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            values: None,
            message: Some(message.into()),
        }
    }

    /// Serialize to the wire form.
    #[must_use]
    pub fn to_wire(&self) -> String {
        // A struct of bool, JSON values and a string always serializes.
        serde_json::to_string(self).unwrap_or_else(|_| String::from(r#"{"success":false}"#))
    }
}

/// Pre-rendered replies for the fixed error taxonomy.
///
/// Built once per dispatcher and shared by reference; nothing here changes after
/// construction.
#[derive(Debug, Clone)]
pub struct StaticReplies {
    not_json: String,
    no_such_request: String,
    items_not_defined: String,
    items_malformed: String,
    failure: String,
}

impl StaticReplies {
    #[must_use]
    pub fn new() -> Self {
        Self {
            not_json: render(RequestError::NotJson),
            no_such_request: render(RequestError::NoSuchRequest),
            items_not_defined: render(RequestError::FieldNotDefined("items")),
            items_malformed: render(RequestError::MalformedField("items")),
            failure: Reply::failure().to_wire(),
        }
    }

    #[must_use]
    pub fn not_json(&self) -> &str {
        &self.not_json
    }

    #[must_use]
    pub fn no_such_request(&self) -> &str {
        &self.no_such_request
    }

    /// Generic `{"success": false}` used for internal failures.
    #[must_use]
    pub fn failure(&self) -> &str {
        &self.failure
    }

    /// Reply text for a validation failure.
    #[must_use]
    pub fn for_error(&self, err: RequestError) -> Cow<'_, str> {
        match err {
            RequestError::NotJson => Cow::Borrowed(&self.not_json),
            RequestError::NoSuchRequest => Cow::Borrowed(&self.no_such_request),
            RequestError::FieldNotDefined("items") => Cow::Borrowed(&self.items_not_defined),
            RequestError::MalformedField("items") => Cow::Borrowed(&self.items_malformed),
            other => Cow::Owned(render(other)),
        }
    }
}

impl Default for StaticReplies {
    fn default() -> Self {
        Self::new()
    }
}

fn render(err: RequestError) -> String {
    Reply::error(format!("error: {err}")).to_wire()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parsed(text: &str) -> Value {
        serde_json::from_str(text).unwrap()
    }

    #[test]
    fn fixed_messages_are_stable() {
        let replies = StaticReplies::new();
        assert_eq!(
            parsed(replies.not_json()),
            json!({"success": false, "message": "error: not JSON"})
        );
        assert_eq!(
            parsed(replies.no_such_request()),
            json!({"success": false, "message": "error: no such request"})
        );
        assert_eq!(
            parsed(&replies.for_error(RequestError::FieldNotDefined("items"))),
            json!({"success": false, "message": "error: items not defined"})
        );
        assert_eq!(parsed(replies.failure()), json!({"success": false}));
    }

    #[test]
    fn missing_field_is_distinct_from_unknown_request() {
        let replies = StaticReplies::new();
        assert_ne!(
            replies.for_error(RequestError::FieldNotDefined("items")),
            replies.for_error(RequestError::NoSuchRequest)
        );
        assert_eq!(
            parsed(&replies.for_error(RequestError::FieldNotDefined("date"))),
            json!({"success": false, "message": "error: date not defined"})
        );
    }

    #[test]
    fn empty_values_are_kept() {
        let reply = Reply {
            success: true,
            values: Some(Vec::new()),
            message: None,
        };
        assert_eq!(parsed(&reply.to_wire()), json!({"success": true, "values": []}));
    }
}
