//! SQLite adapter: Implementation of `ProfileStore`.
//!
//! Provides local persistence for user profiles.
//!
//! # Mutex Behavior
//!
//! The connection is protected by a `Mutex`. Updates run their read, modify
//! and write steps under a single lock acquisition inside a transaction, so
//! concurrent updates to one profile serialize. A poisoned mutex is reported
//! as `StorageError::LockPoisoned`.
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Location, ProfileChanges, SkinCondition, SkinType, UserProfile};
use crate::ports::ProfileStore;

/// Error type for storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Duplicate profile id: {0}")]
    Duplicate(String),

    #[error("Storage lock poisoned")]
    LockPoisoned,
}

/// SQLite storage adapter.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
}

const PROFILE_COLUMNS: &str = "id, name, email, age, skin_type, skin_condition, \
     has_skin_cancer_history, location_name, latitude, longitude, \
     onboarding_completed, created_at, updated_at";

impl SqliteProfileStore {
    /// Open (or create) the database at the given path.
    ///
    /// # Errors
    /// Returns error if database cannot be opened or initialized.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory SQLite database (for testing).
    ///
    /// # Errors
    /// Returns error if database cannot be created.
    pub fn in_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StorageError> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Initialize the database schema.
    fn init_schema(&self) -> Result<(), StorageError> {
        let conn = self.lock()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT,
                age INTEGER CHECK (age IS NULL OR (age BETWEEN 1 AND 120)),
                skin_type TEXT,
                skin_condition TEXT,
                has_skin_cancer_history INTEGER NOT NULL DEFAULT 0,
                location_name TEXT,
                latitude REAL,
                longitude REAL,
                onboarding_completed INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_users_created
                ON users(created_at ASC);
            ",
        )?;

        Ok(())
    }

    fn parse_timestamp(raw: &str) -> Result<chrono::DateTime<chrono::Utc>, StorageError> {
        chrono::DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| StorageError::Corrupt(format!("timestamp '{raw}': {e}")))
    }

    fn parse_enum<T: FromStr<Err = String>>(raw: Option<String>) -> Result<Option<T>, StorageError> {
        raw.map(|s| s.parse::<T>().map_err(StorageError::Corrupt))
            .transpose()
    }

    /// Raw column values, converted outside the rusqlite closure so that
    /// domain parse failures surface as `StorageError::Corrupt`.
    fn read_row(row: &Row<'_>) -> rusqlite::Result<ProfileRow> {
        Ok(ProfileRow {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            age: row.get(3)?,
            skin_type: row.get(4)?,
            skin_condition: row.get(5)?,
            has_skin_cancer_history: row.get(6)?,
            location_name: row.get(7)?,
            latitude: row.get(8)?,
            longitude: row.get(9)?,
            onboarding_completed: row.get(10)?,
            created_at: row.get(11)?,
            updated_at: row.get(12)?,
        })
    }

    fn select_one(conn: &Connection, id: &str) -> Result<Option<UserProfile>, StorageError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = ?1");
        conn.query_row(&sql, params![id], Self::read_row)
            .optional()?
            .map(ProfileRow::into_profile)
            .transpose()
    }

    fn write(conn: &Connection, profile: &UserProfile) -> Result<usize, StorageError> {
        let (location_name, latitude, longitude) = match &profile.preferred_location {
            Some(l) => (Some(l.name.as_str()), Some(l.latitude), Some(l.longitude)),
            None => (None, None, None),
        };
        let changed = conn.execute(
            r"
            UPDATE users SET
                name = ?2, email = ?3, age = ?4, skin_type = ?5, skin_condition = ?6,
                has_skin_cancer_history = ?7, location_name = ?8, latitude = ?9,
                longitude = ?10, onboarding_completed = ?11, updated_at = ?12
            WHERE id = ?1
            ",
            params![
                profile.id,
                profile.name,
                profile.email,
                profile.age,
                profile.skin_type.map(|t| t.as_str()),
                profile.skin_condition.map(|c| c.as_str()),
                profile.has_skin_cancer_history,
                location_name,
                latitude,
                longitude,
                profile.onboarding_completed,
                profile.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(changed)
    }
}

struct ProfileRow {
    id: String,
    name: String,
    email: Option<String>,
    age: Option<u8>,
    skin_type: Option<String>,
    skin_condition: Option<String>,
    has_skin_cancer_history: bool,
    location_name: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    onboarding_completed: bool,
    created_at: String,
    updated_at: String,
}

impl ProfileRow {
    fn into_profile(self) -> Result<UserProfile, StorageError> {
        let preferred_location = match (self.location_name, self.latitude, self.longitude) {
            (Some(name), Some(lat), Some(lon)) => Some(Location::new(name, lat, lon)),
            _ => None,
        };
        Ok(UserProfile {
            id: self.id,
            name: self.name,
            email: self.email,
            age: self.age,
            skin_type: SqliteProfileStore::parse_enum::<SkinType>(self.skin_type)?,
            skin_condition: SqliteProfileStore::parse_enum::<SkinCondition>(self.skin_condition)?,
            has_skin_cancer_history: self.has_skin_cancer_history,
            preferred_location,
            onboarding_completed: self.onboarding_completed,
            created_at: SqliteProfileStore::parse_timestamp(&self.created_at)?,
            updated_at: SqliteProfileStore::parse_timestamp(&self.updated_at)?,
        })
    }
}

impl ProfileStore for SqliteProfileStore {
    type Error = StorageError;

    fn create(&self, profile: &UserProfile) -> Result<(), Self::Error> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let inserted = tx.execute(
            "INSERT OR IGNORE INTO users (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                profile.id,
                profile.name,
                profile.created_at.to_rfc3339(),
                profile.updated_at.to_rfc3339(),
            ],
        )?;
        if inserted == 0 {
            return Err(StorageError::Duplicate(profile.id.clone()));
        }
        Self::write(&tx, profile)?;
        tx.commit()?;

        tracing::info!("Created profile {}", profile.id);
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Option<UserProfile>, Self::Error> {
        let conn = self.lock()?;
        Self::select_one(&conn, id)
    }

    fn update(&self, id: &str, changes: &ProfileChanges) -> Result<Option<UserProfile>, Self::Error> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let Some(mut profile) = Self::select_one(&tx, id)? else {
            return Ok(None);
        };
        profile.apply(changes);
        Self::write(&tx, &profile)?;
        tx.commit()?;

        tracing::debug!("Updated profile {}", id);
        Ok(Some(profile))
    }

    fn list(&self) -> Result<Vec<UserProfile>, Self::Error> {
        let conn = self.lock()?;

        let sql = format!("SELECT {PROFILE_COLUMNS} FROM users ORDER BY created_at ASC");
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], Self::read_row)?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter().map(ProfileRow::into_profile).collect()
    }

    fn count(&self) -> Result<usize, Self::Error> {
        let conn = self.lock()?;

        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LocationChange, OnboardingRequest, ProfileUpdate};

    #[test]
    fn test_failed_create_leaves_no_row() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");

        let mut profile = UserProfile::new("Ada");
        profile.age = Some(200);
        assert!(store.create(&profile).is_err());

        assert!(store.get(&profile.id).expect("Should query").is_none());
        assert_eq!(store.count().expect("Should count"), 0);
    }

    #[test]
    fn test_profile_create_and_get() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");
        assert_eq!(store.count().expect("Should count"), 0);

        let mut profile = UserProfile::new("Ada");
        profile.email = Some("ada@example.com".to_string());
        profile.skin_type = Some(SkinType::II);
        profile.preferred_location = Some(Location::new("Lisbon", 38.72, -9.14));
        store.create(&profile).expect("Should create");

        let loaded = store
            .get(&profile.id)
            .expect("Should load")
            .expect("Should exist");
        assert_eq!(loaded.name, "Ada");
        assert_eq!(loaded.skin_type, Some(SkinType::II));
        assert_eq!(loaded.preferred_location, profile.preferred_location);
        assert_eq!(store.count().expect("Should count"), 1);

        assert!(matches!(
            store.create(&profile),
            Err(StorageError::Duplicate(_))
        ));
        assert!(store.get("missing").expect("Should query").is_none());
    }

    #[test]
    fn test_profile_update() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");
        let profile = UserProfile::new("Ada");
        store.create(&profile).expect("Should create");

        let changes = OnboardingRequest {
            skin_type: Some("I".to_string()),
            skin_condition: Some("lupus".to_string()),
            age: Some(70),
            has_skin_cancer_history: true,
            location: Some(Location::new("Oslo", 59.91, 10.75)),
        }
        .validate()
        .expect("Should validate");

        let updated = store
            .update(&profile.id, &changes)
            .expect("Should update")
            .expect("Should exist");
        assert!(updated.onboarding_completed);
        assert_eq!(updated.skin_condition, Some(SkinCondition::Lupus));

        let cleared = ProfileUpdate {
            location: Some(LocationChange::Clear),
            ..Default::default()
        }
        .validate()
        .expect("Should validate");
        store.update(&profile.id, &cleared).expect("Should update");

        let loaded = store
            .get(&profile.id)
            .expect("Should load")
            .expect("Should exist");
        assert!(loaded.preferred_location.is_none());
        assert_eq!(loaded.age, Some(70));
        assert!(loaded.has_skin_cancer_history);

        assert!(store
            .update("missing", &cleared)
            .expect("Should query")
            .is_none());
    }

    #[test]
    fn test_list_oldest_first() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");
        let mut first = UserProfile::new("First");
        first.created_at -= chrono::Duration::hours(1);
        let second = UserProfile::new("Second");
        store.create(&second).expect("Should create");
        store.create(&first).expect("Should create");

        let names: Vec<String> = store
            .list()
            .expect("Should list")
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_corrupt_enum_is_reported() {
        let store = SqliteProfileStore::in_memory().expect("Should create db");
        let profile = UserProfile::new("Ada");
        store.create(&profile).expect("Should create");
        store
            .lock()
            .expect("Should lock")
            .execute("UPDATE users SET skin_type = 'IX'", [])
            .expect("Should write");

        assert!(matches!(store.get(&profile.id), Err(StorageError::Corrupt(_))));
    }
}
