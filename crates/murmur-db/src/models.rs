/// Database row types — these map directly to SQLite rows.
/// Distinct from the murmur-types API models so the DB layer stays
/// independent of the wire shapes.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub verify_code: String,
    pub verify_code_expiry: String,
    pub is_verified: bool,
    pub is_accepting_message: bool,
    pub created_at: String,
}

pub struct MessageRow {
    pub id: String,
    pub user_id: String,
    pub content: String,
    pub created_at: String,
}
