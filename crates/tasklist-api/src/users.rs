use argon2::{Argon2, PasswordHasher, password_hash::{SaltString, rand_core::OsRng}};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use tracing::info;
use uuid::Uuid;

use tasklist_types::api::{AddUserRequest, AddUserResponse, ApiResponse, UserQuery};

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// POST /add-user
pub async fn add_user(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AddUserRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.username.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest(
            "username and password are required".into(),
        ));
    }

    let user_id = Uuid::new_v4();

    let db = state.clone();
    let uid = user_id.to_string();
    blocking(move || {
        // Check if username is taken
        if db.db.get_user_by_username(&req.username)?.is_some() {
            return Err(ApiError::Conflict("Username already taken".into()));
        }

        // Hash password with Argon2id
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))?
            .to_string();

        db.db.create_user(&uid, &req.username, &password_hash)?;
        Ok(())
    })
    .await?;

    info!("Created user {}", user_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            "User Created",
            AddUserResponse { user_id },
        )),
    ))
}

/// DELETE /delete-user?uid=... removes the user and all of their todos.
pub async fn delete_user(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let uid = query.uid;
    if uid.is_empty() {
        return Err(ApiError::BadRequest("No uid provided".into()));
    }

    let db = state.clone();
    let id = uid.clone();
    let removed = blocking(move || Ok(db.db.delete_user(&id)?)).await?;

    if removed == 0 {
        return Err(ApiError::NotFound(format!("User {} not found", uid)));
    }

    info!("Deleted user {}", uid);
    Ok(Json(ApiResponse::ok(format!("{} Deleted", uid))))
}
