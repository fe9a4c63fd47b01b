//! SQLite peer advocate directory.
//!
//! Stores advocate profiles in `peer_advocates` and derives each advocate's
//! load from the open peer sessions assigned to them, so the count can never
//! drift from the session table.

use peerline_core::advocate::directory::AdvocateDirectory;
use peerline_types::advocate::PeerAdvocate;
use peerline_types::error::RepositoryError;
use sqlx::Row;

use super::chat::format_datetime;
use super::pool::DatabasePool;

const SNAPSHOT_QUERY: &str = r#"
    SELECT a.id, a.display_name, a.available,
           (SELECT COUNT(*) FROM chat_sessions s
             WHERE s.peer_advocate_id = a.id AND s.status = 'open') AS open_sessions
      FROM peer_advocates a
     ORDER BY a.id ASC"#;

/// SQLite-backed advocate directory with admin operations for the CLI.
#[derive(Clone)]
pub struct SqliteAdvocateDirectory {
    pool: DatabasePool,
}

impl SqliteAdvocateDirectory {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }

    /// Register an advocate, or update the display name of an existing one.
    ///
    /// New advocates start out available. Availability of an existing
    /// advocate is left untouched.
    pub async fn upsert(
        &self,
        id: &str,
        display_name: Option<&str>,
    ) -> Result<PeerAdvocate, RepositoryError> {
        let id = id.trim();
        if id.is_empty() {
            return Err(RepositoryError::Query("advocate id must not be blank".to_string()));
        }

        sqlx::query(
            r#"INSERT INTO peer_advocates (id, display_name, available, created_at)
               VALUES (?, ?, 1, ?)
               ON CONFLICT (id) DO UPDATE SET display_name = excluded.display_name"#,
        )
        .bind(id)
        .bind(display_name)
        .bind(format_datetime(&chrono::Utc::now()))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        tracing::debug!(advocate_id = %id, "advocate registered");
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Flip an advocate's availability flag.
    pub async fn set_available(
        &self,
        id: &str,
        available: bool,
    ) -> Result<PeerAdvocate, RepositoryError> {
        let result = sqlx::query("UPDATE peer_advocates SET available = ? WHERE id = ?")
            .bind(available)
            .bind(id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tracing::info!(advocate_id = %id, available, "advocate availability changed");
        self.get(id).await?.ok_or(RepositoryError::NotFound)
    }

    /// Look up a single advocate with its current load.
    pub async fn get(&self, id: &str) -> Result<Option<PeerAdvocate>, RepositoryError> {
        Ok(self.list().await?.into_iter().find(|a| a.id == id))
    }

    /// All advocates ordered by id.
    pub async fn list(&self) -> Result<Vec<PeerAdvocate>, RepositoryError> {
        let rows = sqlx::query(SNAPSHOT_QUERY)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        rows.iter().map(advocate_from_row).collect()
    }
}

fn advocate_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<PeerAdvocate, RepositoryError> {
    let map = |e: sqlx::Error| RepositoryError::Query(e.to_string());
    let open_sessions: i64 = row.try_get("open_sessions").map_err(map)?;

    Ok(PeerAdvocate {
        id: row.try_get("id").map_err(map)?,
        display_name: row.try_get("display_name").map_err(map)?,
        available: row.try_get("available").map_err(map)?,
        current_open_session_count: u32::try_from(open_sessions).unwrap_or(u32::MAX),
    })
}

impl AdvocateDirectory for SqliteAdvocateDirectory {
    async fn snapshot(&self) -> Result<Vec<PeerAdvocate>, RepositoryError> {
        self.list().await
    }
}
