use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;
use tracing::{error, warn};

use tasklist_db::UpdateError;
use tasklist_types::api::ApiResponse;

/// Everything a handler can fail with. Rendered as the error envelope.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Update(#[from] UpdateError),

    #[error("Database Error")]
    Database(#[from] anyhow::Error),

    #[error("Internal Error")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Update(e) => match e {
                UpdateError::MissingIdentifier | UpdateError::NoFieldsProvided => {
                    StatusCode::BAD_REQUEST
                }
                UpdateError::NotFound(_) => StatusCode::NOT_FOUND,
                UpdateError::StatementPreparationFailed(_) | UpdateError::ExecutionFailed(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::Database(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Backend detail goes to the log only; the client gets the category.
        if status.is_server_error() {
            match &self {
                Self::Update(UpdateError::StatementPreparationFailed(source))
                | Self::Update(UpdateError::ExecutionFailed(source)) => {
                    error!("{}: {}", self, source)
                }
                Self::Database(source) => error!("Database error: {:#}", source),
                Self::Internal(detail) => error!("Internal error: {}", detail),
                _ => error!("{}", self),
            }
        } else {
            warn!(status = status.as_u16(), "Request rejected: {}", self);
        }

        (status, Json(ApiResponse::error(self.to_string()))).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}
