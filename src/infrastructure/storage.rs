use crate::config::AppConfig;
use crate::services::storage::LocalStorageService;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

/// Prepares the upload directory and its sentinel file.
pub async fn setup_storage(config: &AppConfig) -> std::io::Result<Arc<LocalStorageService>> {
    fs::create_dir_all(&config.upload_dir).await?;

    let sentinel = config.upload_dir.join(&config.sentinel_file);
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&sentinel)
        .await?;

    info!(
        "📁 Local Storage: {} (sentinel: {})",
        config.upload_dir.display(),
        config.sentinel_file
    );

    Ok(Arc::new(LocalStorageService::new(&config.upload_dir)))
}
