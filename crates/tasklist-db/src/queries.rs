use crate::Database;
use crate::models::{TodoRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    /// Deletes the user and, through the foreign key cascade, their todos.
    /// Returns the number of user rows removed.
    pub fn delete_user(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM users WHERE id = ?1", [id])?))
    }

    // -- Todos --

    pub fn insert_todo(
        &self,
        id: &str,
        user_id: &str,
        created_at: &str,
        due_date: Option<&str>,
        info: &str,
        priority: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO todos (id, user_id, created_at, due_date, info, priority) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, user_id, created_at, due_date, info, priority],
            )?;
            Ok(())
        })
    }

    pub fn get_todo(&self, id: &str) -> Result<Option<TodoRow>> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT id, user_id, created_at, due_date, info, priority FROM todos WHERE id = ?1",
                    [id],
                    map_todo,
                )
                .optional()?;
            Ok(row)
        })
    }

    pub fn get_todos_for_user(&self, user_id: &str) -> Result<Vec<TodoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, created_at, due_date, info, priority
                 FROM todos
                 WHERE user_id = ?1
                 ORDER BY created_at, id",
            )?;

            let rows = stmt
                .query_map([user_id], map_todo)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Returns the number of rows removed (0 or 1).
    pub fn delete_todo(&self, id: &str) -> Result<usize> {
        self.with_conn(|conn| Ok(conn.execute("DELETE FROM todos WHERE id = ?1", [id])?))
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always one of the fixed names passed above
    let sql = format!(
        "SELECT id, username, password, created_at FROM users WHERE {} = ?1",
        column
    );
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn map_todo(row: &rusqlite::Row<'_>) -> rusqlite::Result<TodoRow> {
    Ok(TodoRow {
        id: row.get(0)?,
        user_id: row.get(1)?,
        created_at: row.get(2)?,
        due_date: row.get(3)?,
        info: row.get(4)?,
        priority: row.get(5)?,
    })
}
