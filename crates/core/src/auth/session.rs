//! Session-cookie authentication backed by a sqlite session table.
//!
//! Tokens are random v4 UUIDs handed out at sign-in by the upstream auth
//! provider integration; only a SHA-256 digest is stored at rest.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::debug;

use super::{AuthError, AuthRequest, Authenticator, Identity};

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "reelgate_session";

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub user_id: String,
    pub expires_at: DateTime<Utc>,
}

/// Server-side session lookup.
pub trait SessionStore: Send + Sync {
    /// Issue a session for a user, returning the raw token.
    fn create_session(&self, user_id: &str, ttl: Duration) -> Result<String, AuthError>;

    /// Resolve a raw token. Returns None for unknown tokens; expired
    /// sessions are deleted and also reported as None.
    fn lookup(&self, token: &str) -> Result<Option<SessionRecord>, AuthError>;

    /// Delete a session (sign-out).
    fn revoke(&self, token: &str) -> Result<(), AuthError>;
}

/// SQLite-backed session store.
pub struct SqliteSessionStore {
    conn: Mutex<Connection>,
}

impl SqliteSessionStore {
    pub fn new(path: &Path) -> Result<Self, AuthError> {
        let conn = Connection::open(path)
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// In-memory store, useful for testing.
    pub fn in_memory() -> Result<Self, AuthError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), AuthError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token_hash TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                expires_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
            "#,
        )
        .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))
    }

    fn hash_token(token: &str) -> String {
        format!("{:x}", Sha256::digest(token.as_bytes()))
    }
}

impl SessionStore for SqliteSessionStore {
    fn create_session(&self, user_id: &str, ttl: Duration) -> Result<String, AuthError> {
        let token = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "INSERT INTO sessions (token_hash, user_id, created_at, expires_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                Self::hash_token(&token),
                user_id,
                now.to_rfc3339(),
                (now + ttl).to_rfc3339(),
            ],
        )
        .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;
        Ok(token)
    }

    fn lookup(&self, token: &str) -> Result<Option<SessionRecord>, AuthError> {
        let hash = Self::hash_token(token);
        let conn = self.conn.lock().unwrap();

        let row: Option<(String, String)> = conn
            .query_row(
                "SELECT user_id, expires_at FROM sessions WHERE token_hash = ?1",
                params![hash],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()
            .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;

        let Some((user_id, expires_at_str)) = row else {
            return Ok(None);
        };

        let expires_at = DateTime::parse_from_rfc3339(&expires_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| AuthError::ServiceUnavailable(format!("bad expiry in store: {e}")))?;

        if expires_at <= Utc::now() {
            debug!(user_id, "expired session purged on lookup");
            conn.execute("DELETE FROM sessions WHERE token_hash = ?1", params![hash])
                .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;
            return Ok(None);
        }

        Ok(Some(SessionRecord {
            user_id,
            expires_at,
        }))
    }

    fn revoke(&self, token: &str) -> Result<(), AuthError> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM sessions WHERE token_hash = ?1",
            params![Self::hash_token(token)],
        )
        .map_err(|e| AuthError::ServiceUnavailable(e.to_string()))?;
        Ok(())
    }
}

/// Authenticator that resolves the session cookie against a [`SessionStore`].
pub struct SessionAuthenticator {
    sessions: Arc<dyn SessionStore>,
}

impl SessionAuthenticator {
    pub fn new(sessions: Arc<dyn SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl Authenticator for SessionAuthenticator {
    async fn authenticate(&self, request: &AuthRequest) -> Result<Identity, AuthError> {
        let token = request
            .cookie(SESSION_COOKIE)
            .ok_or(AuthError::NotAuthenticated)?;

        match self.sessions.lookup(token)? {
            Some(record) => Ok(Identity {
                user_id: record.user_id,
                method: "session".to_string(),
            }),
            None => Err(AuthError::InvalidCredentials(
                "unknown or expired session".to_string(),
            )),
        }
    }

    fn method_name(&self) -> &'static str {
        "session"
    }
}
