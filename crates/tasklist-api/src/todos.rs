use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use axum_extra::extract::WithRejection;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use tasklist_db::models::TodoRow;
use tasklist_db::{TodoPatch, update};
use tasklist_types::api::{
    AddTodoRequest, AddTodoResponse, ApiResponse, TodoQuery, UpdateTodoRequest, UserQuery,
};
use tasklist_types::models::Todo;

use crate::error::ApiError;
use crate::state::{AppState, blocking};

/// POST /add-todo
pub async fn add_todo(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<AddTodoRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if req.user_id.is_empty() {
        return Err(ApiError::BadRequest("No user_id provided".into()));
    }

    let todo_id = Uuid::new_v4().to_string();
    let created_at = Utc::now().to_rfc3339();
    let priority = req.priority.unwrap_or_default();

    let db = state.clone();
    let tid = todo_id.clone();
    blocking(move || {
        if db.db.get_user_by_id(&req.user_id)?.is_none() {
            return Err(ApiError::NotFound(format!("User {} not found", req.user_id)));
        }

        let due_date = req.due_date.map(|d| d.to_rfc3339());
        db.db.insert_todo(
            &tid,
            &req.user_id,
            &created_at,
            due_date.as_deref(),
            &req.info,
            priority.as_str(),
        )?;
        Ok(())
    })
    .await?;

    info!("Created todo {}", todo_id);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success("TODO created", AddTodoResponse { todo_id })),
    ))
}

/// GET /get-todos?uid=...
pub async fn get_todos(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<UserQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    if query.uid.is_empty() {
        return Err(ApiError::BadRequest("No uid provided".into()));
    }

    let db = state.clone();
    let uid = query.uid;
    let rows = blocking(move || Ok(db.db.get_todos_for_user(&uid)?)).await?;

    let todos: Vec<Todo> = rows.into_iter().map(row_to_todo).collect();
    let message = format!("{} todos", todos.len());
    Ok(Json(ApiResponse::success(message, todos)))
}

/// PATCH /update-todo sets only the fields present in the body.
pub async fn update_todo(
    State(state): State<AppState>,
    WithRejection(Json(req), _): WithRejection<Json<UpdateTodoRequest>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let todo_id = req.todo_id;
    let patch = TodoPatch {
        due_date: req.due_date,
        info: req.info,
        priority: req.priority_level,
    };

    let db = state.clone();
    let tid = todo_id.clone();
    blocking(move || Ok(update::update_todo(&db.db, &tid, &patch)?)).await?;

    info!("Updated todo {}", todo_id);
    Ok(Json(ApiResponse::ok(format!("{} updated", todo_id))))
}

/// DELETE /delete-todo?tid=...
pub async fn delete_todo(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<TodoQuery>, ApiError>,
) -> Result<impl IntoResponse, ApiError> {
    let tid = query.tid;
    if tid.is_empty() {
        return Err(ApiError::BadRequest("No tid provided".into()));
    }

    let db = state.clone();
    let id = tid.clone();
    let removed = blocking(move || Ok(db.db.delete_todo(&id)?)).await?;

    if removed == 0 {
        return Err(ApiError::NotFound(format!("Todo {} not found", tid)));
    }

    info!("Deleted todo {}", tid);
    Ok(Json(ApiResponse::ok(format!("{} Deleted", tid))))
}

fn row_to_todo(row: TodoRow) -> Todo {
    let created_at = parse_timestamp(&row.created_at).unwrap_or_else(|| {
        warn!("Corrupt created_at '{}' on todo '{}'", row.created_at, row.id);
        DateTime::default()
    });

    let due_date = row.due_date.as_deref().and_then(|raw| {
        let parsed = parse_timestamp(raw);
        if parsed.is_none() {
            warn!("Corrupt due_date '{}' on todo '{}'", raw, row.id);
        }
        parsed
    });

    let priority = row.priority.parse().unwrap_or_else(|e| {
        warn!("{} on todo '{}'", e, row.id);
        Default::default()
    });

    Todo {
        id: row.id,
        user_id: row.user_id,
        created_at,
        due_date,
        info: row.info,
        priority,
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // SQLite's datetime('now') format, no timezone. Treat as UTC.
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .ok()
}
