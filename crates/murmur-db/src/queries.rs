use crate::Database;
use crate::models::{MessageRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension, Row, params};

const USER_COLUMNS: &str = "id, username, email, password, verify_code, verify_code_expiry, \
                            is_verified, is_accepting_message, created_at";

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        username: &str,
        email: &str,
        password_hash: &str,
        verify_code: &str,
        verify_code_expiry: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, email, password, verify_code, verify_code_expiry)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![id, username, email, password_hash, verify_code, verify_code_expiry],
            )?;
            Ok(())
        })
    }

    /// Re-registration before verification: the unverified row is taken over
    /// in place instead of creating a duplicate.
    pub fn update_registration(
        &self,
        id: &str,
        username: &str,
        password_hash: &str,
        verify_code: &str,
        verify_code_expiry: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE users
                 SET username = ?2, password = ?3, verify_code = ?4, verify_code_expiry = ?5
                 WHERE id = ?1",
                params![id, username, password_hash, verify_code, verify_code_expiry],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "id", id))
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "email", email))
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by(conn, "username", username))
    }

    pub fn verified_username_exists(&self, username: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let found = conn
                .query_row(
                    "SELECT 1 FROM users WHERE username = ?1 AND is_verified = 1",
                    [username],
                    |_| Ok(()),
                )
                .optional()?;
            Ok(found.is_some())
        })
    }

    /// Flip `is_verified` on. The partial unique index rejects the update if
    /// another verified user already holds the username.
    pub fn mark_verified(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute("UPDATE users SET is_verified = 1 WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    /// Update the accepting flag and return the fresh row, or None if the
    /// user vanished in the meantime.
    pub fn set_accepting_message(&self, id: &str, accepting: bool) -> Result<Option<UserRow>> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "UPDATE users SET is_accepting_message = ?2 WHERE id = ?1",
                params![id, accepting],
            )?;
            if n == 0 {
                return Ok(None);
            }
            query_user_by(conn, "id", id)
        })
    }

    // -- Messages --

    pub fn insert_message(&self, id: &str, user_id: &str, content: &str, created_at: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO messages (id, user_id, content, created_at) VALUES (?1, ?2, ?3, ?4)",
                params![id, user_id, content, created_at],
            )?;
            Ok(())
        })
    }

    /// All of a user's messages, newest first. Ties on the timestamp fall
    /// back to insertion order (rowid), so repeated calls agree.
    pub fn list_messages(&self, user_id: &str) -> Result<Vec<MessageRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, content, created_at
                 FROM messages
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, rowid DESC",
            )?;

            let rows = stmt
                .query_map([user_id], |row| {
                    Ok(MessageRow {
                        id: row.get(0)?,
                        user_id: row.get(1)?,
                        content: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Delete a message scoped to its owner. Returns false when nothing
    /// matched — including when the id belongs to a different user.
    pub fn delete_message(&self, user_id: &str, message_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n = conn.execute(
                "DELETE FROM messages WHERE id = ?1 AND user_id = ?2",
                params![message_id, user_id],
            )?;
            Ok(n > 0)
        })
    }
}

fn query_user_by(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // `column` is always a compile-time constant from the callers above.
    let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt.query_row([value], user_from_row).optional()?;
    Ok(row)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok(UserRow {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password: row.get(3)?,
        verify_code: row.get(4)?,
        verify_code_expiry: row.get(5)?,
        is_verified: row.get(6)?,
        is_accepting_message: row.get(7)?,
        created_at: row.get(8)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn add_user(db: &Database, id: &str, username: &str, email: &str) {
        db.create_user(id, username, email, "hash", "123456", "2099-01-01T00:00:00+00:00")
            .unwrap();
    }

    #[test]
    fn create_and_fetch_user() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");

        let by_email = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(by_email.id, "u1");
        assert_eq!(by_email.username, "alice");
        assert!(!by_email.is_verified);
        assert!(by_email.is_accepting_message);

        assert!(db.get_user_by_username("alice").unwrap().is_some());
        assert!(db.get_user_by_id("u1").unwrap().is_some());
        assert!(db.get_user_by_email("b@x.com").unwrap().is_none());
    }

    #[test]
    fn email_is_unique_regardless_of_verification() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");

        let dup = db.create_user("u2", "bob", "a@x.com", "hash", "123456", "2099-01-01T00:00:00+00:00");
        assert!(dup.is_err());
    }

    #[test]
    fn username_is_unique_only_among_verified_users() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");
        add_user(&db, "u2", "alice", "b@x.com");

        // Two unverified rows share the name; the first verification wins.
        assert!(db.mark_verified("u1").unwrap());
        assert!(db.verified_username_exists("alice").unwrap());

        // A second verified claim of the same name is rejected by the index.
        assert!(db.mark_verified("u2").is_err());
    }

    #[test]
    fn update_registration_overwrites_in_place() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");

        db.update_registration("u1", "alice2", "hash2", "654321", "2099-06-01T00:00:00+00:00")
            .unwrap();

        let user = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.username, "alice2");
        assert_eq!(user.password, "hash2");
        assert_eq!(user.verify_code, "654321");
        assert!(!user.is_verified);
    }

    #[test]
    fn set_accepting_message_returns_fresh_row() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");

        let updated = db.set_accepting_message("u1", false).unwrap().unwrap();
        assert!(!updated.is_accepting_message);

        assert!(db.set_accepting_message("missing", true).unwrap().is_none());
    }

    #[test]
    fn messages_sorted_newest_first_with_stable_tie_break() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");

        db.insert_message("m1", "u1", "first", "2026-01-01T10:00:00+00:00").unwrap();
        db.insert_message("m2", "u1", "tied-a", "2026-01-01T12:00:00+00:00").unwrap();
        db.insert_message("m3", "u1", "tied-b", "2026-01-01T12:00:00+00:00").unwrap();

        let ids = |rows: Vec<MessageRow>| rows.into_iter().map(|r| r.id).collect::<Vec<_>>();

        let first = ids(db.list_messages("u1").unwrap());
        // Newest timestamp first; within the tie, later insertion first.
        assert_eq!(first, vec!["m3", "m2", "m1"]);

        let second = ids(db.list_messages("u1").unwrap());
        assert_eq!(first, second);
    }

    #[test]
    fn list_messages_is_scoped_to_the_owner() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");
        add_user(&db, "u2", "bob", "b@x.com");

        db.insert_message("m1", "u1", "for alice", "2026-01-01T10:00:00+00:00").unwrap();

        assert_eq!(db.list_messages("u1").unwrap().len(), 1);
        assert!(db.list_messages("u2").unwrap().is_empty());
    }

    #[test]
    fn delete_message_reports_absence_and_never_crosses_owners() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");
        add_user(&db, "u2", "bob", "b@x.com");

        db.insert_message("m1", "u1", "hello", "2026-01-01T10:00:00+00:00").unwrap();

        // Bob cannot delete Alice's message, and her copy stays put.
        assert!(!db.delete_message("u2", "m1").unwrap());
        assert_eq!(db.list_messages("u1").unwrap().len(), 1);

        assert!(db.delete_message("u1", "m1").unwrap());
        assert!(db.list_messages("u1").unwrap().is_empty());

        // Deleting again reports not-found instead of erroring.
        assert!(!db.delete_message("u1", "m1").unwrap());
    }

    #[test]
    fn deleting_a_user_cascades_to_messages() {
        let db = test_db();
        add_user(&db, "u1", "alice", "a@x.com");
        db.insert_message("m1", "u1", "hello", "2026-01-01T10:00:00+00:00").unwrap();

        db.with_conn(|conn| {
            conn.execute("DELETE FROM users WHERE id = 'u1'", [])?;
            Ok(())
        })
        .unwrap();

        db.with_conn(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM messages", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
    }
}
