use crate::config::AppConfig;
use crate::services::storage::{StorageResult, StorageService};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Outcome of a single sweep over the upload directory.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries inspected, excluding the sentinel
    pub scanned: usize,
    /// Names removed because they outlived the retention window
    pub deleted: Vec<String>,
    /// Entries that could not be inspected or removed
    pub failed: usize,
}

/// Removes stored files older than the retention window.
///
/// Sweeps may overlap. The one that loses a delete race records a per-entry
/// failure and moves on.
pub struct RetentionSweeper {
    storage: Arc<dyn StorageService>,
    retention: Duration,
    sentinel: String,
}

impl RetentionSweeper {
    pub fn new(
        storage: Arc<dyn StorageService>,
        retention: Duration,
        sentinel: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            retention,
            sentinel: sentinel.into(),
        }
    }

    pub fn from_config(storage: Arc<dyn StorageService>, config: &AppConfig) -> Self {
        Self::new(storage, config.retention, config.sentinel_file.clone())
    }

    /// Starts a sweep in the background. Callers are free to drop the handle.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<SweepReport> {
        let sweeper = Arc::clone(self);
        tokio::spawn(async move { sweeper.sweep().await })
    }

    pub async fn sweep(&self) -> SweepReport {
        self.sweep_at(Utc::now()).await
    }

    pub async fn sweep_at(&self, now: DateTime<Utc>) -> SweepReport {
        let mut report = SweepReport::default();

        let names = match self.storage.list().await {
            Ok(names) => names,
            Err(e) => {
                tracing::error!("Failed to list upload directory for sweep: {}", e);
                return report;
            }
        };

        for name in names {
            if name == self.sentinel {
                continue;
            }
            report.scanned += 1;

            match self.sweep_entry(&name, now).await {
                Ok(true) => report.deleted.push(name),
                Ok(false) => {}
                Err(e) => {
                    tracing::warn!("Error sweeping file {}: {}", name, e);
                    report.failed += 1;
                }
            }
        }

        if !report.deleted.is_empty() || report.failed > 0 {
            tracing::info!(
                "🧹 Sweep finished: scanned={}, deleted={}, failed={}",
                report.scanned,
                report.deleted.len(),
                report.failed
            );
        }

        report
    }

    /// Returns whether the entry was deleted.
    async fn sweep_entry(&self, name: &str, now: DateTime<Utc>) -> StorageResult<bool> {
        let meta = self.storage.metadata(name).await?;
        if !meta.is_file {
            tracing::debug!("Skipping non-file entry: {}", name);
            return Ok(false);
        }

        // A timestamp in the future yields a negative age, which never expires.
        let expired = (now - meta.last_modified)
            .to_std()
            .is_ok_and(|age| age > self.retention);
        if !expired {
            return Ok(false);
        }

        tracing::info!(
            "Deleting file older than {} seconds: {} ({} bytes)",
            self.retention.as_secs(),
            name,
            meta.size
        );
        self.storage.delete(name).await?;
        Ok(true)
    }
}
