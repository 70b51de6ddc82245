use crate::models::UserRow;
use crate::{Database, DbError, Result, now};

impl Database {
    // -- Users --
    //
    // Accounts are managed by the user service; this is only the read model
    // that voter listings join against.

    pub fn create_user(&self, id: &str, username: &str, role: &str) -> Result<UserRow> {
        if username.trim().is_empty() {
            return Err(DbError::required("username"));
        }

        let created_at = now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, role, created_at) VALUES (?1, ?2, ?3, ?4)",
                (id, username, role, &created_at),
            )?;
            Ok(())
        })?;

        Ok(UserRow {
            id: id.to_string(),
            username: username.to_string(),
            role: role.to_string(),
            created_at,
        })
    }
}
