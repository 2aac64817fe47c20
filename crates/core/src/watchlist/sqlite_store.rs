//! SQLite-backed watchlist store.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::media::MediaKind;

use super::{WatchlistEntry, WatchlistError, WatchlistStatus, WatchlistStore, WatchlistUpdate};

pub struct SqliteWatchlistStore {
    conn: Mutex<Connection>,
}

impl SqliteWatchlistStore {
    /// Open (or create) the store at `path`.
    pub fn new(path: &Path) -> Result<Self, WatchlistError> {
        let conn = Connection::open(path).map_err(|e| WatchlistError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, WatchlistError> {
        let conn =
            Connection::open_in_memory().map_err(|e| WatchlistError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), WatchlistError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS watchlist (
                user_id TEXT NOT NULL,
                media_id INTEGER NOT NULL,
                media_kind TEXT NOT NULL,
                status TEXT NOT NULL,
                title TEXT NOT NULL,
                poster_path TEXT,
                release_date TEXT,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (user_id, media_id, media_kind)
            );

            CREATE INDEX IF NOT EXISTS idx_watchlist_user_updated
                ON watchlist(user_id, updated_at DESC);
            "#,
        )
        .map_err(|e| WatchlistError::Database(e.to_string()))
    }

    fn row_to_entry(row: &rusqlite::Row) -> rusqlite::Result<WatchlistEntry> {
        let user_id: String = row.get(0)?;
        let media_id: u64 = row.get(1)?;
        let kind_str: String = row.get(2)?;
        let status_str: String = row.get(3)?;
        let title: String = row.get(4)?;
        let poster_path: Option<String> = row.get(5)?;
        let release_date: Option<String> = row.get(6)?;
        let updated_at_str: String = row.get(7)?;

        let kind = kind_str.parse::<MediaKind>().unwrap_or(MediaKind::Movie);
        let status = status_str
            .parse::<WatchlistStatus>()
            .unwrap_or(WatchlistStatus::Watching);
        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(WatchlistEntry {
            user_id,
            media_id,
            kind,
            status,
            title,
            poster_path,
            release_date,
            updated_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "user_id, media_id, media_kind, status, title, poster_path, release_date, updated_at";

impl WatchlistStore for SqliteWatchlistStore {
    fn get(
        &self,
        user_id: &str,
        media_id: u64,
        kind: MediaKind,
    ) -> Result<Option<WatchlistEntry>, WatchlistError> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!(
                "SELECT {SELECT_COLUMNS} FROM watchlist
                 WHERE user_id = ?1 AND media_id = ?2 AND media_kind = ?3"
            ),
            params![user_id, media_id, kind.as_str()],
            Self::row_to_entry,
        )
        .optional()
        .map_err(|e| WatchlistError::Database(e.to_string()))
    }

    fn upsert(
        &self,
        user_id: &str,
        media_id: u64,
        kind: MediaKind,
        update: WatchlistUpdate,
    ) -> Result<WatchlistEntry, WatchlistError> {
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO watchlist
                 (user_id, media_id, media_kind, status, title, poster_path, release_date, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             ON CONFLICT (user_id, media_id, media_kind) DO UPDATE SET
                 status = excluded.status,
                 title = excluded.title,
                 poster_path = excluded.poster_path,
                 release_date = excluded.release_date,
                 updated_at = excluded.updated_at",
            params![
                user_id,
                media_id,
                kind.as_str(),
                update.status.as_str(),
                update.title,
                update.poster_path,
                update.release_date,
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| WatchlistError::Database(e.to_string()))?;

        Ok(WatchlistEntry {
            user_id: user_id.to_string(),
            media_id,
            kind,
            status: update.status,
            title: update.title,
            poster_path: update.poster_path,
            release_date: update.release_date,
            updated_at: now,
        })
    }

    fn delete(
        &self,
        user_id: &str,
        media_id: u64,
        kind: MediaKind,
    ) -> Result<bool, WatchlistError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                "DELETE FROM watchlist
                 WHERE user_id = ?1 AND media_id = ?2 AND media_kind = ?3",
                params![user_id, media_id, kind.as_str()],
            )
            .map_err(|e| WatchlistError::Database(e.to_string()))?;
        Ok(affected > 0)
    }

    fn list(&self, user_id: &str) -> Result<Vec<WatchlistEntry>, WatchlistError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM watchlist
                 WHERE user_id = ?1 ORDER BY updated_at DESC"
            ))
            .map_err(|e| WatchlistError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], Self::row_to_entry)
            .map_err(|e| WatchlistError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| WatchlistError::Database(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(status: WatchlistStatus, title: &str) -> WatchlistUpdate {
        WatchlistUpdate {
            status,
            title: title.to_string(),
            poster_path: Some("/poster.jpg".to_string()),
            release_date: Some("1999-03-30".to_string()),
        }
    }

    #[test]
    fn test_get_absent_row_is_none() {
        let store = SqliteWatchlistStore::in_memory().unwrap();
        assert!(store.get("u1", 603, MediaKind::Movie).unwrap().is_none());
    }

    #[test]
    fn test_upsert_then_get() {
        let store = SqliteWatchlistStore::in_memory().unwrap();
        store
            .upsert("u1", 603, MediaKind::Movie, update(WatchlistStatus::Watching, "The Matrix"))
            .unwrap();

        let entry = store.get("u1", 603, MediaKind::Movie).unwrap().unwrap();
        assert_eq!(entry.status, WatchlistStatus::Watching);
        assert_eq!(entry.title, "The Matrix");
        assert_eq!(entry.poster_path.as_deref(), Some("/poster.jpg"));
    }

    #[test]
    fn test_upsert_last_write_wins_single_row() {
        let store = SqliteWatchlistStore::in_memory().unwrap();
        store
            .upsert("u1", 603, MediaKind::Movie, update(WatchlistStatus::Watching, "The Matrix"))
            .unwrap();
        store
            .upsert("u1", 603, MediaKind::Movie, update(WatchlistStatus::Dropped, "The Matrix"))
            .unwrap();

        let entries = store.list("u1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, WatchlistStatus::Dropped);
    }

    #[test]
    fn test_same_id_different_kind_are_distinct_rows() {
        let store = SqliteWatchlistStore::in_memory().unwrap();
        store
            .upsert("u1", 100, MediaKind::Movie, update(WatchlistStatus::Watching, "A"))
            .unwrap();
        store
            .upsert("u1", 100, MediaKind::Tv, update(WatchlistStatus::ShouldWatch, "B"))
            .unwrap();

        assert_eq!(store.list("u1").unwrap().len(), 2);
    }

    #[test]
    fn test_delete_removes_row() {
        let store = SqliteWatchlistStore::in_memory().unwrap();
        store
            .upsert("u1", 603, MediaKind::Movie, update(WatchlistStatus::Watching, "The Matrix"))
            .unwrap();

        assert!(store.delete("u1", 603, MediaKind::Movie).unwrap());
        assert!(store.get("u1", 603, MediaKind::Movie).unwrap().is_none());
        // Deleting again reports no row
        assert!(!store.delete("u1", 603, MediaKind::Movie).unwrap());
    }

    #[test]
    fn test_list_scoped_to_user() {
        let store = SqliteWatchlistStore::in_memory().unwrap();
        store
            .upsert("u1", 1, MediaKind::Movie, update(WatchlistStatus::Watching, "A"))
            .unwrap();
        store
            .upsert("u2", 2, MediaKind::Movie, update(WatchlistStatus::Watching, "B"))
            .unwrap();

        let entries = store.list("u1").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].media_id, 1);
    }
}
