//! SQLite-backed progress store.
//!
//! The per-episode progress map is stored as a JSON column, mirroring the
//! remote table's JSON per-episode field.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use rusqlite::{params, Connection};

use crate::media::MediaKind;

use super::store::{ProgressStore, ProgressStoreError};
use super::types::ProgressRow;

pub struct SqliteProgressStore {
    conn: Mutex<Connection>,
}

impl SqliteProgressStore {
    pub fn new(path: &Path) -> Result<Self, ProgressStoreError> {
        let conn =
            Connection::open(path).map_err(|e| ProgressStoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, ProgressStoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| ProgressStoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), ProgressStoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS watch_progress (
                user_id TEXT NOT NULL,
                media_id TEXT NOT NULL,
                media_kind TEXT NOT NULL,
                title TEXT NOT NULL,
                poster_path TEXT,
                backdrop_path TEXT,
                watched REAL NOT NULL DEFAULT 0,
                duration REAL NOT NULL DEFAULT 0,
                last_season_watched TEXT,
                last_episode_watched TEXT,
                episodes TEXT NOT NULL DEFAULT '{}',
                updated_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, media_id, media_kind)
            );

            CREATE INDEX IF NOT EXISTS idx_progress_user_updated
                ON watch_progress(user_id, updated_at DESC);
            "#,
        )
        .map_err(|e| ProgressStoreError::Database(e.to_string()))
    }

    fn upsert_row(conn: &Connection, row: &ProgressRow) -> Result<(), ProgressStoreError> {
        let episodes_json = serde_json::to_string(&row.episodes)
            .map_err(|e| ProgressStoreError::Database(format!("unserializable episodes: {e}")))?;
        conn.execute(
            "INSERT INTO watch_progress
                 (user_id, media_id, media_kind, title, poster_path, backdrop_path,
                  watched, duration, last_season_watched, last_episode_watched,
                  episodes, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT (user_id, media_id, media_kind) DO UPDATE SET
                 title = excluded.title,
                 poster_path = excluded.poster_path,
                 backdrop_path = excluded.backdrop_path,
                 watched = excluded.watched,
                 duration = excluded.duration,
                 last_season_watched = excluded.last_season_watched,
                 last_episode_watched = excluded.last_episode_watched,
                 episodes = excluded.episodes,
                 updated_at = excluded.updated_at",
            params![
                row.user_id,
                row.media_id,
                row.kind.as_str(),
                row.title,
                row.poster_path,
                row.backdrop_path,
                row.watched,
                row.duration,
                row.last_season_watched,
                row.last_episode_watched,
                episodes_json,
                row.updated_at,
            ],
        )
        .map_err(|e| ProgressStoreError::Database(e.to_string()))?;
        Ok(())
    }

    fn row_to_progress(row: &rusqlite::Row) -> rusqlite::Result<ProgressRow> {
        let user_id: String = row.get(0)?;
        let media_id: String = row.get(1)?;
        let kind_str: String = row.get(2)?;
        let title: String = row.get(3)?;
        let poster_path: Option<String> = row.get(4)?;
        let backdrop_path: Option<String> = row.get(5)?;
        let watched: f64 = row.get(6)?;
        let duration: f64 = row.get(7)?;
        let last_season_watched: Option<String> = row.get(8)?;
        let last_episode_watched: Option<String> = row.get(9)?;
        let episodes_json: String = row.get(10)?;
        let updated_at: i64 = row.get(11)?;

        let kind = kind_str.parse::<MediaKind>().unwrap_or(MediaKind::Movie);
        let episodes = serde_json::from_str(&episodes_json).unwrap_or_default();

        Ok(ProgressRow {
            user_id,
            media_id,
            kind,
            title,
            poster_path,
            backdrop_path,
            watched,
            duration,
            last_season_watched,
            last_episode_watched,
            episodes,
            updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "user_id, media_id, media_kind, title, poster_path, backdrop_path, \
     watched, duration, last_season_watched, last_episode_watched, episodes, updated_at";

#[async_trait]
impl ProgressStore for SqliteProgressStore {
    async fn upsert(&self, row: &ProgressRow) -> Result<(), ProgressStoreError> {
        let conn = self.conn.lock().unwrap();
        Self::upsert_row(&conn, row)
    }

    async fn upsert_many(&self, rows: &[ProgressRow]) -> Result<(), ProgressStoreError> {
        let mut conn = self.conn.lock().unwrap();
        let tx = conn
            .transaction()
            .map_err(|e| ProgressStoreError::Database(e.to_string()))?;
        for row in rows {
            Self::upsert_row(&tx, row)?;
        }
        tx.commit()
            .map_err(|e| ProgressStoreError::Database(e.to_string()))
    }

    async fn fetch_all(&self, user_id: &str) -> Result<Vec<ProgressRow>, ProgressStoreError> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SELECT_COLUMNS} FROM watch_progress
                 WHERE user_id = ?1 ORDER BY updated_at DESC"
            ))
            .map_err(|e| ProgressStoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![user_id], Self::row_to_progress)
            .map_err(|e| ProgressStoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| ProgressStoreError::Database(e.to_string()))
    }

    async fn delete(
        &self,
        user_id: &str,
        media_id: &str,
        kind: MediaKind,
    ) -> Result<bool, ProgressStoreError> {
        let conn = self.conn.lock().unwrap();
        let affected = conn
            .execute(
                "DELETE FROM watch_progress
                 WHERE user_id = ?1 AND media_id = ?2 AND media_kind = ?3",
                params![user_id, media_id, kind.as_str()],
            )
            .map_err(|e| ProgressStoreError::Database(e.to_string()))?;
        Ok(affected > 0)
    }
}
