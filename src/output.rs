//! JSON envelope printed by the command-line tools

use crate::Result;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
    Info,
}

/// `{"status": ..., "message"?: ..., "data"?: ...}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,
    #[serde(skip_serializing_if = "is_blank")]
    pub message: Option<String>,
    /// Present whenever set, even if empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

fn is_blank(message: &Option<String>) -> bool {
    message.as_deref().map_or(true, str::is_empty)
}

impl Envelope {
    pub fn new(status: Status, message: Option<String>, data: Option<Value>) -> Self {
        Envelope {
            status,
            message,
            data,
        }
    }

    pub fn success(data: Value) -> Self {
        Envelope::new(Status::Success, None, Some(data))
    }

    pub fn info(message: impl Into<String>) -> Self {
        Envelope::new(Status::Info, Some(message.into()), None)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Envelope::new(Status::Error, Some(message.into()), None)
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    pub fn is_error(&self) -> bool {
        self.status == Status::Error
    }

    /// Two-space indented JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Insert a serialisable value under `key`
pub fn insert<T: Serialize>(data: &mut Map<String, Value>, key: &str, value: &T) -> Result<()> {
    data.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_keeps_empty_data() {
        let out = Envelope::success(json!({})).to_json().unwrap();
        assert_eq!(out, "{\n  \"status\": \"success\",\n  \"data\": {}\n}");
    }

    #[test]
    fn test_info_without_data() {
        let parsed: Value =
            serde_json::from_str(&Envelope::info("Nothing to do").to_json().unwrap()).unwrap();
        assert_eq!(parsed, json!({"status": "info", "message": "Nothing to do"}));
    }

    #[test]
    fn test_empty_message_omitted() {
        let envelope = Envelope::new(Status::Error, Some(String::new()), None);
        let parsed: Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
        assert_eq!(parsed, json!({"status": "error"}));
        assert!(envelope.is_error());
    }

    #[test]
    fn test_insert() {
        let mut data = Map::new();
        insert(&mut data, "count", &3usize).unwrap();
        insert(&mut data, "names", &vec!["a", "b"]).unwrap();
        assert_eq!(Value::Object(data), json!({"count": 3, "names": ["a", "b"]}));
    }
}
