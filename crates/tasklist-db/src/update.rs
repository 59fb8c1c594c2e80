//! Partial updates of a todo row.
//!
//! An update request names a todo and any subset of its mutable fields.
//! [`build_update`] turns that into a single `UPDATE` with numbered
//! placeholders (`$1`, `$2`, ...) and an argument list in the same order.
//! Only the fixed column names below are ever written into the SQL text;
//! every value travels through the argument list.

use chrono::{DateTime, Utc};
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use thiserror::Error;
use tracing::debug;

use tasklist_types::models::PriorityLevel;

use crate::Database;

/// Capability to run a parameterized statement and report rows affected.
pub trait Execute {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<usize, ExecError>;
}

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("failed to prepare statement: {0}")]
    Prepare(#[source] rusqlite::Error),

    #[error("failed to execute statement: {0}")]
    Execute(#[source] rusqlite::Error),

    #[error("database unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("No todo_id provided")]
    MissingIdentifier,

    #[error("No fields provided for update")]
    NoFieldsProvided,

    #[error("Todo {0} not found")]
    NotFound(String),

    #[error("Error preparing statement")]
    StatementPreparationFailed(#[source] ExecError),

    #[error("Error executing statement")]
    ExecutionFailed(#[source] ExecError),
}

impl From<ExecError> for UpdateError {
    fn from(e: ExecError) -> Self {
        match e {
            ExecError::Prepare(_) => Self::StatementPreparationFailed(e),
            _ => Self::ExecutionFailed(e),
        }
    }
}

/// Fields of a todo that may be changed after creation. `None` leaves the
/// column untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TodoPatch {
    pub due_date: Option<DateTime<Utc>>,
    pub info: Option<String>,
    pub priority: Option<PriorityLevel>,
}

impl TodoPatch {
    pub fn is_empty(&self) -> bool {
        self.due_date.is_none() && self.info.is_none() && self.priority.is_none()
    }

    /// Supplied fields as (column, value), always in due_date, info, priority order.
    fn assignments(&self) -> Vec<(&'static str, Value)> {
        let mut out = Vec::with_capacity(3);
        if let Some(due) = &self.due_date {
            out.push(("due_date", Value::Text(due.to_rfc3339())));
        }
        if let Some(info) = &self.info {
            out.push(("info", Value::Text(info.clone())));
        }
        if let Some(priority) = self.priority {
            out.push(("priority", Value::Text(priority.as_str().to_string())));
        }
        out
    }
}

/// A statement template plus its positional arguments.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub sql: String,
    pub args: Vec<Value>,
}

impl UpdateStatement {
    pub fn placeholder_count(&self) -> usize {
        self.sql.matches('$').count()
    }
}

pub fn build_update(record_id: &str, patch: &TodoPatch) -> Result<UpdateStatement, UpdateError> {
    if record_id.is_empty() {
        return Err(UpdateError::MissingIdentifier);
    }
    if patch.is_empty() {
        return Err(UpdateError::NoFieldsProvided);
    }

    let assignments = patch.assignments();
    let mut clauses = Vec::with_capacity(assignments.len());
    let mut args = Vec::with_capacity(assignments.len() + 1);

    for (idx, (column, value)) in assignments.into_iter().enumerate() {
        clauses.push(format!("{} = ${}", column, idx + 1));
        args.push(value);
    }

    let id_idx = args.len() + 1;
    args.push(Value::Text(record_id.to_string()));

    let sql = format!(
        "UPDATE todos SET {} WHERE id = ${};",
        clauses.join(", "),
        id_idx
    );

    Ok(UpdateStatement { sql, args })
}

/// Builds and runs the update for `record_id`. Exactly one row must match.
pub fn update_todo<E>(exec: &E, record_id: &str, patch: &TodoPatch) -> Result<(), UpdateError>
where
    E: Execute + ?Sized,
{
    let stmt = build_update(record_id, patch)?;
    debug!(sql = %stmt.sql, args = stmt.args.len(), "Updating todo {}", record_id);

    let affected = exec.execute(&stmt.sql, &stmt.args)?;
    if affected == 0 {
        return Err(UpdateError::NotFound(record_id.to_string()));
    }

    Ok(())
}

impl Execute for Database {
    fn execute(&self, sql: &str, args: &[Value]) -> Result<usize, ExecError> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| ExecError::Unavailable(format!("DB lock poisoned: {}", e)))?;

        let mut stmt = conn.prepare(sql).map_err(ExecError::Prepare)?;
        stmt.execute(params_from_iter(args.iter()))
            .map_err(ExecError::Execute)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use chrono::TimeZone;

    use super::*;

    /// Records every statement and answers with a canned result.
    struct FakeBackend {
        calls: RefCell<Vec<(String, Vec<Value>)>>,
        respond: fn() -> Result<usize, ExecError>,
    }

    impl FakeBackend {
        fn new(respond: fn() -> Result<usize, ExecError>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                respond,
            }
        }
    }

    impl Execute for FakeBackend {
        fn execute(&self, sql: &str, args: &[Value]) -> Result<usize, ExecError> {
            self.calls.borrow_mut().push((sql.to_string(), args.to_vec()));
            (self.respond)()
        }
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    fn due() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
    }

    fn full_patch() -> TodoPatch {
        TodoPatch {
            due_date: Some(due()),
            info: Some("buy milk".into()),
            priority: Some(PriorityLevel::High),
        }
    }

    #[test]
    fn info_only() {
        let patch = TodoPatch {
            info: Some("buy milk".into()),
            ..Default::default()
        };
        let stmt = build_update("t1", &patch).unwrap();
        assert_eq!(stmt.sql, "UPDATE todos SET info = $1 WHERE id = $2;");
        assert_eq!(stmt.args, vec![text("buy milk"), text("t1")]);
    }

    #[test]
    fn due_date_and_priority() {
        let patch = TodoPatch {
            due_date: Some(due()),
            priority: Some(PriorityLevel::High),
            ..Default::default()
        };
        let stmt = build_update("t3", &patch).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE todos SET due_date = $1, priority = $2 WHERE id = $3;"
        );
        assert_eq!(stmt.placeholder_count(), 3);
        assert_eq!(
            stmt.args,
            vec![text("2024-05-01T09:30:00+00:00"), text("high"), text("t3")]
        );
    }

    #[test]
    fn all_fields_keep_fixed_order() {
        let stmt = build_update("t9", &full_patch()).unwrap();
        assert_eq!(
            stmt.sql,
            "UPDATE todos SET due_date = $1, info = $2, priority = $3 WHERE id = $4;"
        );
        assert_eq!(stmt.args.len(), 4);
    }

    #[test]
    fn placeholders_match_args_for_every_field_subset() {
        for mask in 1u8..8 {
            let patch = TodoPatch {
                due_date: (mask & 1 != 0).then(due),
                info: (mask & 2 != 0).then(|| "x".to_string()),
                priority: (mask & 4 != 0).then_some(PriorityLevel::Low),
            };
            let stmt = build_update("id-1", &patch).unwrap();
            let n = stmt.args.len();
            assert_eq!(stmt.placeholder_count(), n, "mask {}", mask);
            assert!(stmt.sql.ends_with(&format!("WHERE id = ${};", n)));
            assert_eq!(stmt.args.last(), Some(&text("id-1")));
            for i in 1..=n {
                assert!(stmt.sql.contains(&format!("${}", i)));
            }
        }
    }

    #[test]
    fn empty_id_is_rejected_before_fields_are_checked() {
        let patch = TodoPatch {
            priority: Some(PriorityLevel::High),
            ..Default::default()
        };
        assert!(matches!(
            build_update("", &patch),
            Err(UpdateError::MissingIdentifier)
        ));
        assert!(matches!(
            build_update("", &TodoPatch::default()),
            Err(UpdateError::MissingIdentifier)
        ));
    }

    #[test]
    fn no_fields_is_rejected() {
        assert!(matches!(
            build_update("t2", &TodoPatch::default()),
            Err(UpdateError::NoFieldsProvided)
        ));
    }

    #[test]
    fn values_never_reach_sql_text() {
        let patch = TodoPatch {
            info: Some("'; DROP TABLE todos; --".into()),
            ..Default::default()
        };
        let stmt = build_update("t1' OR '1'='1", &patch).unwrap();
        assert!(!stmt.sql.contains("DROP"));
        assert!(!stmt.sql.contains("OR"));
    }

    #[test]
    fn rejected_request_never_reaches_backend() {
        let backend = FakeBackend::new(|| Ok(1));
        let err = update_todo(&backend, "", &full_patch()).unwrap_err();
        assert!(matches!(err, UpdateError::MissingIdentifier));
        let err = update_todo(&backend, "t2", &TodoPatch::default()).unwrap_err();
        assert!(matches!(err, UpdateError::NoFieldsProvided));
        assert!(backend.calls.borrow().is_empty());
    }

    #[test]
    fn backend_receives_statement_and_args() {
        let backend = FakeBackend::new(|| Ok(1));
        let patch = TodoPatch {
            info: Some("buy milk".into()),
            ..Default::default()
        };
        update_todo(&backend, "t1", &patch).unwrap();

        let calls = backend.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "UPDATE todos SET info = $1 WHERE id = $2;");
        assert_eq!(calls[0].1, vec![text("buy milk"), text("t1")]);
    }

    #[test]
    fn backend_errors_are_classified() {
        let backend = FakeBackend::new(|| Err(ExecError::Prepare(rusqlite::Error::InvalidQuery)));
        let err = update_todo(&backend, "t1", &full_patch()).unwrap_err();
        assert!(matches!(err, UpdateError::StatementPreparationFailed(_)));

        let backend = FakeBackend::new(|| Err(ExecError::Execute(rusqlite::Error::InvalidQuery)));
        let err = update_todo(&backend, "t1", &full_patch()).unwrap_err();
        assert!(matches!(err, UpdateError::ExecutionFailed(_)));
        assert_eq!(err.to_string(), "Error executing statement");
    }

    #[test]
    fn zero_rows_is_not_found() {
        let backend = FakeBackend::new(|| Ok(0));
        let err = update_todo(&backend, "missing", &full_patch()).unwrap_err();
        assert!(matches!(err, UpdateError::NotFound(id) if id == "missing"));
    }

    // -- Against SQLite --

    fn seeded() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.create_user("u1", "alice", "hash").unwrap();
        db.insert_todo(
            "t1",
            "u1",
            "2024-01-01T00:00:00+00:00",
            Some("2024-02-01T00:00:00+00:00"),
            "old",
            "low",
        )
        .unwrap();
        db
    }

    #[test]
    fn omitted_fields_keep_their_values() {
        let db = seeded();
        let patch = TodoPatch {
            info: Some("buy milk".into()),
            ..Default::default()
        };
        update_todo(&db, "t1", &patch).unwrap();

        let row = db.get_todo("t1").unwrap().unwrap();
        assert_eq!(row.info, "buy milk");
        assert_eq!(row.due_date.as_deref(), Some("2024-02-01T00:00:00+00:00"));
        assert_eq!(row.priority, "low");
        assert_eq!(row.created_at, "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn repeating_an_update_is_idempotent() {
        let db = seeded();
        let patch = full_patch();
        update_todo(&db, "t1", &patch).unwrap();
        let first = db.get_todo("t1").unwrap().unwrap();
        update_todo(&db, "t1", &patch).unwrap();
        let second = db.get_todo("t1").unwrap().unwrap();

        assert_eq!(first.info, second.info);
        assert_eq!(first.due_date, second.due_date);
        assert_eq!(first.priority, second.priority);
        assert_eq!(second.priority, "high");
        assert_eq!(second.due_date.as_deref(), Some("2024-05-01T09:30:00+00:00"));
    }

    #[test]
    fn unknown_id_updates_nothing() {
        let db = seeded();
        let err = update_todo(&db, "nope", &full_patch()).unwrap_err();
        assert!(matches!(err, UpdateError::NotFound(_)));
        assert_eq!(db.get_todo("t1").unwrap().unwrap().info, "old");
    }

    #[test]
    fn malformed_statement_is_a_preparation_failure() {
        let db = seeded();
        let err = db
            .execute("UPDATE nowhere SET x = $1 WHERE id = $2;", &[text("a"), text("b")])
            .unwrap_err();
        assert!(matches!(err, ExecError::Prepare(_)));
    }
}
