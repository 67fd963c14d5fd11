use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id                   TEXT PRIMARY KEY,
            username             TEXT NOT NULL,
            email                TEXT NOT NULL UNIQUE,
            password             TEXT NOT NULL,
            verify_code          TEXT NOT NULL,
            verify_code_expiry   TEXT NOT NULL,
            is_verified          INTEGER NOT NULL DEFAULT 0,
            is_accepting_message INTEGER NOT NULL DEFAULT 1,
            created_at           TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- A username is only reserved once its owner is verified; two
        -- unverified registrations may hold the same name transiently.
        CREATE UNIQUE INDEX IF NOT EXISTS idx_users_verified_username
            ON users(username) WHERE is_verified = 1;

        CREATE INDEX IF NOT EXISTS idx_users_username
            ON users(username);

        CREATE TABLE IF NOT EXISTS messages (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            content     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_messages_user
            ON messages(user_id, created_at);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
