use std::sync::Arc;

use anyhow::Context;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::mailer::{LogMailer, Mailer};

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub mailer: Arc<dyn Mailer>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        tokio::fs::create_dir_all(&config.data_dir)
            .await
            .context("create data directory")?;
        tokio::fs::create_dir_all(&config.uploads_dir)
            .await
            .context("create uploads directory")?;
        let db = Self::connect(&config).await?;
        Ok(Self {
            db,
            config,
            mailer: Arc::new(LogMailer),
        })
    }

    pub async fn connect(config: &AppConfig) -> anyhow::Result<SqlitePool> {
        let options = SqliteConnectOptions::new()
            .filename(config.store_path())
            .create_if_missing(true)
            // Cascading deletes are declared in the schema; SQLite only
            // honors them with foreign keys switched on per connection.
            .foreign_keys(true)
            // Keep the store a single file so backup can snapshot it.
            .journal_mode(SqliteJournalMode::Delete);
        let db = SqlitePoolOptions::new()
            .max_connections(10)
            .connect_with(options)
            .await
            .context("connect to database")?;
        Ok(db)
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, mailer: Arc<dyn Mailer>) -> Self {
        Self { db, config, mailer }
    }
}
