use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::PriorityLevel;

// -- Envelope --

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Every JSON response body is wrapped in this envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: message.into(),
            data: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            data: None,
        }
    }
}

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddUserRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddUserResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct UserQuery {
    #[serde(default)]
    pub uid: String,
}

// -- Todos --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AddTodoRequest {
    pub user_id: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub info: String,
    #[serde(default, alias = "priority_level")]
    pub priority: Option<PriorityLevel>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddTodoResponse {
    pub todo_id: String,
}

/// Body of `PATCH /update-todo`. Absent and `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateTodoRequest {
    #[serde(default, alias = "recordID")]
    pub todo_id: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub info: Option<String>,
    #[serde(default, alias = "priority")]
    pub priority_level: Option<PriorityLevel>,
}

#[derive(Debug, Deserialize)]
pub struct TodoQuery {
    #[serde(default)]
    pub tid: String,
}
