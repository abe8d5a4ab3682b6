//! SQLite-backed key-value store.

use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::{debug, info, instrument};

use crate::store::models::{KvEntry, NewKvEntry};
use crate::store::{KvStore, StoreError, schema};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// How long a connection waits on another connection's lock before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Durable store keeping each key in one row of `kv_entries`.
///
/// Every call opens its own connection, so the database path must name a
/// file; `":memory:"` would hand each call a fresh, empty database.
/// The file is switched to WAL journaling so readers never block the writer,
/// and each connection waits up to `BUSY_TIMEOUT_MS` for a lock held by a
/// concurrent request instead of failing at once.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db_path: String,
}

impl SqliteStore {
    /// Opens the database at `db_path`, creating it and applying pending
    /// migrations if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the database cannot be opened or migrated.
    #[instrument(skip(db_path), fields(db_path = %db_path))]
    pub fn open(db_path: String) -> Result<Self, StoreError> {
        let store = Self { db_path };
        let mut conn = store.connection()?;
        conn.batch_execute("PRAGMA journal_mode = WAL;")
            .map_err(|e| StoreError::new(format!("Failed to enable WAL: {}", e)))?;
        let applied = conn
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| StoreError::new(format!("Migrations failed: {}", e)))?;
        info!(path = %store.db_path, migrations = applied.len(), "SQLite store ready");
        Ok(store)
    }

    /// Path of the underlying database file.
    pub fn db_path(&self) -> &str {
        &self.db_path
    }

    /// Establishes a database connection.
    #[instrument(skip(self))]
    fn connection(&self) -> Result<SqliteConnection, StoreError> {
        debug!(path = %self.db_path, "Establishing connection");
        let mut conn = SqliteConnection::establish(&self.db_path).map_err(|e| {
            StoreError::new(format!("Failed to connect to '{}': {}", self.db_path, e))
        })?;
        conn.batch_execute(&format!("PRAGMA busy_timeout = {};", BUSY_TIMEOUT_MS))?;
        Ok(conn)
    }

    /// Lists every stored row ordered by key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if a database error occurs.
    #[instrument(skip(self))]
    pub fn entries(&self) -> Result<Vec<KvEntry>, StoreError> {
        let mut conn = self.connection()?;
        let entries = schema::kv_entries::table
            .order(schema::kv_entries::key.asc())
            .select(KvEntry::as_select())
            .load(&mut conn)?;
        debug!(count = entries.len(), "Entries loaded");
        Ok(entries)
    }
}

impl KvStore for SqliteStore {
    #[instrument(skip(self))]
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self.connection()?;
        let value = schema::kv_entries::table
            .find(key)
            .select(schema::kv_entries::value)
            .first::<String>(&mut conn)
            .optional()?;
        debug!(found = value.is_some(), "SQLite read");
        Ok(value)
    }

    #[instrument(skip(self, value))]
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        use schema::kv_entries::dsl;

        let mut conn = self.connection()?;
        let now = chrono::Utc::now().naive_utc();
        let entry = NewKvEntry::new(key, value, now);

        diesel::insert_into(dsl::kv_entries)
            .values(&entry)
            .on_conflict(dsl::key)
            .do_update()
            .set((dsl::value.eq(value), dsl::updated_at.eq(now)))
            .execute(&mut conn)?;

        debug!("SQLite write");
        Ok(())
    }
}
