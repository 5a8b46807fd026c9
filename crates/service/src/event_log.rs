//! Append-only event trail.
//!
//! Each event goes to `tracing` and to `<dir>/log-YYYY-MM-DD.txt` as
//! `YYYY-MM-DD HH:MM:SS - message` in local time. File errors are reported
//! through `tracing` only.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

#[derive(Debug, Clone)]
pub struct EventLog {
    dir: PathBuf,
}

impl EventLog {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub async fn info(&self, message: &str) {
        tracing::info!("{message}");
        self.append(message).await;
    }

    pub async fn error(&self, message: &str) {
        tracing::error!("{message}");
        self.append(message).await;
    }

    /// Path of today's file.
    #[must_use]
    pub fn current_file(&self) -> PathBuf {
        self.dir.join(format!("log-{}.txt", Local::now().format("%Y-%m-%d")))
    }

    async fn append(&self, message: &str) {
        if let Err(e) = self.try_append(message).await {
            tracing::error!(dir = %self.dir.display(), error = %e, "Failed to write to log file");
        }
    }

    async fn try_append(&self, message: &str) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir).await?;
        let now = Local::now();
        let path = self.dir.join(format!("log-{}.txt", now.format("%Y-%m-%d")));
        let line = format!("{} - {message}\n", now.format("%Y-%m-%d %H:%M:%S"));
        let mut file = OpenOptions::new().create(true).append(true).open(&path).await?;
        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
