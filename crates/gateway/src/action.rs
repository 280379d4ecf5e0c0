//! POST payloads: control actions and row appends.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A control action with a readable `{status: ...}` acknowledgement.
///
/// Serialized with the backend's dispatch tag, e.g.
/// `{"action": "login", "username": ..., "password": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Login {
        username: String,
        password: String,
    },
    RegisterUser {
        username: String,
        password: String,
        name: String,
        position: String,
        role: String,
    },
    UpdateUser {
        username: String,
        name: String,
        position: String,
        role: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        password: Option<String>,
    },
    DeleteUser {
        username: String,
    },
    GetUsers {},
    /// Flip the server-owned read flag of a `SystemNotification` row.
    MarkNotificationRead {
        id: String,
    },
    /// Record a global acknowledgement of a derived issue.
    AcknowledgeIssue {
        #[serde(rename = "issueId")]
        issue_id: String,
        user: String,
        role: String,
    },
}

/// Acknowledgement for a control action.
///
/// The backend answers `{status: "success"|"error", ...}` with
/// action-specific extras (`user` for login, `message`/`code` on errors).
#[derive(Debug, Clone, Deserialize)]
pub struct ActionAck {
    pub status: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

impl ActionAck {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    pub fn message(&self) -> Option<&str> {
        self.field("message").and_then(Value::as_str)
    }

    pub fn code(&self) -> Option<&str> {
        self.field("code").and_then(Value::as_str)
    }
}

/// A data-append payload: one row for one table.
///
/// The header list is authoritative and travels with every create so the
/// backend can self-provision a missing table. `row` must stay positionally
/// aligned with `headers`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppendRequest {
    pub sheet: String,
    pub action: String,
    pub headers: Vec<String>,
    pub row: Vec<Value>,
    pub id: String,
}

impl AppendRequest {
    /// Build a `create` append for the given table.
    pub fn create(
        sheet: impl Into<String>,
        headers: Vec<String>,
        row: Vec<Value>,
        id: impl Into<String>,
    ) -> Self {
        Self {
            sheet: sheet.into(),
            action: "create".to_string(),
            headers,
            row,
            id: id.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_tags_match_backend_dispatch() {
        let login = serde_json::to_value(Action::Login {
            username: "jsmith".into(),
            password: "pw".into(),
        })
        .unwrap();
        assert_eq!(login["action"], "login");

        let ack = serde_json::to_value(Action::AcknowledgeIssue {
            issue_id: "General_1_ABC".into(),
            user: "John Smith".into(),
            role: "Admin".into(),
        })
        .unwrap();
        assert_eq!(ack["action"], "acknowledge_issue");
        assert_eq!(ack["issueId"], "General_1_ABC");

        let read = serde_json::to_value(Action::MarkNotificationRead { id: "N-7".into() })
            .unwrap();
        assert_eq!(read["action"], "mark_notification_read");
    }

    #[test]
    fn ack_parses_login_extras() {
        let ack: ActionAck = serde_json::from_str(
            r#"{"status":"success","user":{"username":"jsmith","role":"admin"}}"#,
        )
        .unwrap();
        assert!(ack.is_success());
        assert_eq!(ack.field("user").unwrap()["role"], "admin");

        let err: ActionAck =
            serde_json::from_str(r#"{"status":"error","code":"NO_USERS","message":"empty"}"#)
                .unwrap();
        assert!(!err.is_success());
        assert_eq!(err.code(), Some("NO_USERS"));
        assert_eq!(err.message(), Some("empty"));
    }

    #[test]
    fn append_request_shape() {
        let req = AppendRequest::create(
            "General",
            vec!["id".into(), "timestamp".into()],
            vec!["r1".into(), "2024-05-10T08:30:00Z".into()],
            "r1",
        );
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["sheet"], "General");
        assert_eq!(value["action"], "create");
        assert_eq!(value["row"][0], "r1");
    }
}
