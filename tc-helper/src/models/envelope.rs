//! Response envelope shared by the user and message APIs.
//!
//! Both services answer `{ "result": { "success": bool, "content": ... } }`.
//! Failure bodies may carry `{ "result": { "content": { "message": "..." } } }`.

use serde_json::Value;

/// A parsed response body.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope(Value);

impl Envelope {
    /// Parse a response body. Returns `None` for anything that is not JSON.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok().map(Envelope)
    }

    /// Only a literal `true` at `result.success` counts.
    pub fn is_success(&self) -> bool {
        self.0.pointer("/result/success").and_then(Value::as_bool) == Some(true)
    }

    /// Diagnostic text at `result.content.message`.
    pub fn server_message(&self) -> Option<String> {
        match self.0.pointer("/result/content/message")? {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Take the payload at `result.content`, `Null` when absent.
    pub fn into_content(mut self) -> Value {
        self.0
            .pointer_mut("/result/content")
            .map(Value::take)
            .unwrap_or(Value::Null)
    }
}

impl From<Value> for Envelope {
    fn from(value: Value) -> Self {
        Envelope(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_success_flag() {
        assert!(Envelope::from(json!({"result": {"success": true}})).is_success());
        assert!(!Envelope::from(json!({"result": {"success": false}})).is_success());
        assert!(!Envelope::from(json!({"result": {}})).is_success());
        assert!(!Envelope::from(json!({"result": {"success": "true"}})).is_success());
        assert!(!Envelope::from(json!([])).is_success());
    }

    #[test]
    fn test_content_passthrough() {
        let env = Envelope::from(json!({
            "result": {"success": true, "content": [{"handle": "a"}, {"handle": "b"}]}
        }));
        assert_eq!(env.into_content(), json!([{"handle": "a"}, {"handle": "b"}]));
    }

    #[test]
    fn test_missing_content_is_null() {
        let env = Envelope::from(json!({"result": {"success": true}}));
        assert_eq!(env.into_content(), Value::Null);
    }

    #[test]
    fn test_server_message() {
        let env = Envelope::parse(r#"{"result":{"content":{"message":"Topic not found"}}}"#)
            .unwrap();
        assert_eq!(env.server_message().as_deref(), Some("Topic not found"));

        let env = Envelope::from(json!({"result": {"content": {"message": 42}}}));
        assert_eq!(env.server_message().as_deref(), Some("42"));

        assert!(Envelope::parse("<html>bad gateway</html>").is_none());
    }
}
