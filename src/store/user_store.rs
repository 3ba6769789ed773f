//! Credential Store.
//!
//! Persists user accounts keyed by unique username. Username uniqueness is
//! enforced by a UNIQUE index, so a concurrent duplicate registration loses
//! at the INSERT instead of racing a check-then-create.

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::info;
use uuid::Uuid;

use super::{is_unique_violation, StoreError, StoreResult};
use crate::models::User;

/// Fields required to create an account. The password arrives here already
/// hashed; the store never sees plaintext.
#[derive(Debug)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub email: String,
    pub birthday: Option<NaiveDate>,
}

/// Partial update. `None` means "leave unchanged".
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    pub password_hash: Option<String>,
    pub email: Option<String>,
    pub birthday: Option<NaiveDate>,
}

pub struct UserStore {
    db_path: String,
}

impl UserStore {
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> StoreResult<()> {
        let conn = self.conn()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                username TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                email TEXT NOT NULL,
                birthday TEXT
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS favorites (
                user_id TEXT NOT NULL,
                movie_id TEXT NOT NULL,
                PRIMARY KEY (user_id, movie_id),
                FOREIGN KEY (user_id) REFERENCES users(id)
            )",
            [],
        )?;

        Ok(())
    }

    fn conn(&self) -> StoreResult<Connection> {
        Ok(Connection::open(&self.db_path)?)
    }

    /// Exact, case-sensitive lookup.
    pub fn find_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        self.find_where(&conn, "username = ?1", params![username])
    }

    pub fn find_by_id(&self, id: &Uuid) -> StoreResult<Option<User>> {
        let conn = self.conn()?;
        self.find_where(&conn, "id = ?1", params![id.to_string()])
    }

    fn find_where(
        &self,
        conn: &Connection,
        predicate: &str,
        args: impl rusqlite::Params,
    ) -> StoreResult<Option<User>> {
        let sql = format!(
            "SELECT id, username, password_hash, email, birthday FROM users WHERE {predicate}"
        );
        let user = conn
            .query_row(&sql, args, row_to_user)
            .optional()?;

        match user {
            Some(mut user) => {
                user.favorite_movies = self.load_favorites(conn, &user.id)?;
                Ok(Some(user))
            }
            None => Ok(None),
        }
    }

    fn load_favorites(&self, conn: &Connection, user_id: &Uuid) -> StoreResult<Vec<Uuid>> {
        let mut stmt = conn
            .prepare("SELECT movie_id FROM favorites WHERE user_id = ?1 ORDER BY rowid")?;
        let ids = stmt
            .query_map(params![user_id.to_string()], |row| {
                let raw: String = row.get(0)?;
                parse_uuid(0, &raw)
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ids)
    }

    pub fn create(&self, new_user: NewUser) -> StoreResult<User> {
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            password_hash: new_user.password_hash,
            email: new_user.email,
            birthday: new_user.birthday,
            favorite_movies: Vec::new(),
        };

        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (id, username, password_hash, email, birthday)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                user.id.to_string(),
                user.username,
                user.password_hash,
                user.email,
                user.birthday.map(|d| d.to_string()),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(format!("Username '{}' already exists", user.username))
            } else {
                e.into()
            }
        })?;

        info!("Created user: {}", user.username);
        Ok(user)
    }

    /// Apply a partial update to the addressed account. Last write wins.
    pub fn update(&self, username: &str, update: UserUpdate) -> StoreResult<User> {
        let conn = self.conn()?;
        let current = self
            .find_where(&conn, "username = ?1", params![username])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{username}' not found")))?;

        let new_username = update.username.unwrap_or(current.username);
        let new_hash = update.password_hash.unwrap_or(current.password_hash);
        let new_email = update.email.unwrap_or(current.email);
        let new_birthday = update.birthday.or(current.birthday);

        conn.execute(
            "UPDATE users SET username = ?1, password_hash = ?2, email = ?3, birthday = ?4
             WHERE id = ?5",
            params![
                new_username,
                new_hash,
                new_email,
                new_birthday.map(|d| d.to_string()),
                current.id.to_string(),
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::Duplicate(format!("Username '{new_username}' already exists"))
            } else {
                e.into()
            }
        })?;

        self.find_where(&conn, "id = ?1", params![current.id.to_string()])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{new_username}' not found")))
    }

    pub fn delete(&self, username: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        let user = self
            .find_where(&conn, "username = ?1", params![username])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{username}' not found")))?;

        conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1",
            params![user.id.to_string()],
        )?;
        conn.execute("DELETE FROM users WHERE id = ?1", params![user.id.to_string()])?;

        info!("Deleted user: {}", username);
        Ok(())
    }

    /// Add a movie to the user's favorites. Adding an existing favorite is
    /// a no-op; the favorites set never holds duplicates.
    pub fn add_favorite(&self, username: &str, movie_id: &Uuid) -> StoreResult<User> {
        let conn = self.conn()?;
        let user = self
            .find_where(&conn, "username = ?1", params![username])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{username}' not found")))?;

        conn.execute(
            "INSERT OR IGNORE INTO favorites (user_id, movie_id) VALUES (?1, ?2)",
            params![user.id.to_string(), movie_id.to_string()],
        )?;

        self.find_where(&conn, "id = ?1", params![user.id.to_string()])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{username}' not found")))
    }

    /// Remove a movie from the user's favorites. Removing a movie that is
    /// not a favorite succeeds without changing anything.
    pub fn remove_favorite(&self, username: &str, movie_id: &Uuid) -> StoreResult<User> {
        let conn = self.conn()?;
        let user = self
            .find_where(&conn, "username = ?1", params![username])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{username}' not found")))?;

        conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND movie_id = ?2",
            params![user.id.to_string(), movie_id.to_string()],
        )?;

        self.find_where(&conn, "id = ?1", params![user.id.to_string()])?
            .ok_or_else(|| StoreError::NotFound(format!("User '{username}' not found")))
    }
}

fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    let id: String = row.get(0)?;
    let birthday: Option<String> = row.get(4)?;

    Ok(User {
        id: parse_uuid(0, &id)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        email: row.get(3)?,
        birthday: birthday.map(|raw| parse_date(4, &raw)).transpose()?,
        favorite_movies: Vec::new(),
    })
}

fn parse_uuid(idx: usize, raw: &str) -> rusqlite::Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    raw.parse::<NaiveDate>().map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    fn alice() -> NewUser {
        NewUser {
            username: "alice".to_string(),
            password_hash: "$2b$12$fakehashfakehashfakehash".to_string(),
            email: "a@x.com".to_string(),
            birthday: NaiveDate::from_ymd_opt(1990, 4, 1),
        }
    }

    #[test]
    fn test_create_and_find_roundtrip() {
        let (store, _temp) = create_test_store();

        let created = store.create(alice()).unwrap();
        let found = store.find_by_username("alice").unwrap().unwrap();

        assert_eq!(found.id, created.id);
        assert_eq!(found.email, "a@x.com");
        assert_eq!(found.birthday, NaiveDate::from_ymd_opt(1990, 4, 1));
        assert!(found.favorite_movies.is_empty());

        let by_id = store.find_by_id(&created.id).unwrap().unwrap();
        assert_eq!(by_id.username, "alice");
    }

    #[test]
    fn test_duplicate_username_rejected_and_original_untouched() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();

        let result = store.create(NewUser {
            email: "impostor@x.com".to_string(),
            ..alice()
        });
        assert!(matches!(result, Err(StoreError::Duplicate(_))));

        // existing record unchanged
        let original = store.find_by_username("alice").unwrap().unwrap();
        assert_eq!(original.email, "a@x.com");
    }

    #[test]
    fn test_username_lookup_is_case_sensitive() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();

        assert!(store.find_by_username("Alice").unwrap().is_none());
        assert!(store.find_by_username("alice").unwrap().is_some());
    }

    #[test]
    fn test_partial_update_leaves_other_fields() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();

        let updated = store
            .update(
                "alice",
                UserUpdate {
                    email: Some("new@x.com".to_string()),
                    ..Default::default()
                },
            )
            .unwrap();

        assert_eq!(updated.email, "new@x.com");
        assert_eq!(updated.username, "alice");
        assert_eq!(updated.birthday, NaiveDate::from_ymd_opt(1990, 4, 1));
    }

    #[test]
    fn test_rename_to_taken_username_rejected() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();
        store
            .create(NewUser {
                username: "bob".to_string(),
                email: "b@x.com".to_string(),
                ..alice()
            })
            .unwrap();

        let result = store.update(
            "bob",
            UserUpdate {
                username: Some("alice".to_string()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(StoreError::Duplicate(_))));
    }

    #[test]
    fn test_update_unknown_user_is_not_found() {
        let (store, _temp) = create_test_store();
        let result = store.update("ghost", UserUpdate::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete_removes_user_and_favorites() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();
        let movie_id = Uuid::new_v4();
        store.add_favorite("alice", &movie_id).unwrap();

        store.delete("alice").unwrap();
        assert!(store.find_by_username("alice").unwrap().is_none());

        // second delete is NotFound
        assert!(matches!(
            store.delete("alice"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_add_favorite_is_idempotent() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();
        let movie_id = Uuid::new_v4();

        store.add_favorite("alice", &movie_id).unwrap();
        let user = store.add_favorite("alice", &movie_id).unwrap();

        assert_eq!(user.favorite_movies, vec![movie_id]);
    }

    #[test]
    fn test_remove_nonmember_favorite_is_noop() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();
        let kept = Uuid::new_v4();
        store.add_favorite("alice", &kept).unwrap();

        let user = store.remove_favorite("alice", &Uuid::new_v4()).unwrap();
        assert_eq!(user.favorite_movies, vec![kept]);
    }

    #[test]
    fn test_favorites_preserve_insertion_order() {
        let (store, _temp) = create_test_store();
        store.create(alice()).unwrap();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        store.add_favorite("alice", &first).unwrap();
        let user = store.add_favorite("alice", &second).unwrap();

        assert_eq!(user.favorite_movies, vec![first, second]);
    }
}
