//! Bodies of the mutation endpoints and the envelope they answer with.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::types::EntityId;

/// `{"ids": [...]}` accepted by delete, restore and forceDelete.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct IdsPayload {
    pub ids: Vec<EntityId>,
}

/// `{"active": bool}` accepted by `/back/<resource>/:id/active`.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivePayload {
    pub active: bool,
}

/// `{"status": "..."}` accepted by the order and delivery status endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusPayload {
    pub status: String,
}

/// Fields the backend puts on most JSON answers, successful or not.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct ServerMessage {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub result: Option<String>,
}

impl ServerMessage {
    /// Parses the envelope out of an arbitrary body, defaulting when absent.
    pub fn from_body(body: &Value) -> Self {
        serde_json::from_value(body.clone()).unwrap_or_default()
    }

    /// Message suitable for showing to the user, if the server sent one.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn ids_payload_serializes_raw_numbers() {
        let payload = IdsPayload {
            ids: vec![EntityId::new(1).unwrap(), EntityId::new(8).unwrap()],
        };
        assert_eq!(serde_json::to_value(payload).unwrap(), json!({"ids": [1, 8]}));
    }

    #[test]
    fn server_message_prefers_message_over_error() {
        let body = json!({"message": "Name is taken", "error": "422"});
        assert_eq!(ServerMessage::from_body(&body).text(), Some("Name is taken"));

        let body = json!({"error": "Forbidden"});
        assert_eq!(ServerMessage::from_body(&body).text(), Some("Forbidden"));

        assert_eq!(ServerMessage::from_body(&json!([1, 2])).text(), None);
    }
}
