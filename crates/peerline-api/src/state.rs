//! Application state wiring the chat core to its SQLite implementations.
//!
//! AppState holds the concrete instances used by both CLI and REST API.
//! `SessionManager` is generic over its storage ports; AppState pins it to
//! the infra implementations.

use std::path::PathBuf;
use std::sync::Arc;

use peerline_core::chat::manager::SessionManager;
use peerline_infra::sqlite::advocate::SqliteAdvocateDirectory;
use peerline_infra::sqlite::chat::SqliteChatRepository;
use peerline_infra::sqlite::pool::DatabasePool;
use peerline_types::config::GlobalConfig;

/// Concrete type alias for the session manager pinned to infra implementations.
pub type ConcreteSessionManager =
    SessionManager<SqliteChatRepository, SqliteChatRepository, SqliteAdvocateDirectory>;

/// Shared application state.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<ConcreteSessionManager>,
    pub config: Arc<GlobalConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Open the database under `data_dir` and wire the chat core.
    pub async fn init(data_dir: PathBuf, config: GlobalConfig) -> anyhow::Result<Self> {
        tokio::fs::create_dir_all(&data_dir).await?;

        let db_pool = DatabasePool::open(&data_dir).await?;

        // The log and the store share one repository over the same pool.
        let chat_repo = SqliteChatRepository::new(db_pool.clone());
        let directory = SqliteAdvocateDirectory::new(db_pool.clone());
        let chat = SessionManager::with_config(
            chat_repo.clone(),
            chat_repo,
            directory,
            config.chat.clone(),
        );

        tracing::debug!(data_dir = %data_dir.display(), "Application state initialized");

        Ok(Self {
            chat: Arc::new(chat),
            config: Arc::new(config),
            data_dir,
        })
    }

    /// Advocate directory with its admin operations.
    pub fn advocates(&self) -> &SqliteAdvocateDirectory {
        self.chat.directory()
    }
}
