/// Database row types. These map directly to SQLite rows and are kept
/// separate from the tasklist-types API models.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

pub struct TodoRow {
    pub id: String,
    pub user_id: String,
    pub created_at: String,
    pub due_date: Option<String>,
    pub info: String,
    pub priority: String,
}
