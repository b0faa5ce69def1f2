use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Hard ceiling on the declared request size for an upload (20 MiB).
pub const MAX_UPLOAD_SIZE: usize = 20 * 1024 * 1024;

/// How long a stored file survives before the sweeper may remove it.
pub const RETENTION_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Placeholder kept in the upload directory so it never ends up empty.
pub const SENTINEL_FILE: &str = ".keep";

/// Service configuration, built once at startup and shared through `AppState`.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Shared secret expected as `Authorization: Bearer <api_key>` (default: "your-api-key")
    pub api_key: String,

    /// Public base URL prefixed to returned file URLs (default: "http://localhost:3000")
    pub hostname: String,

    /// Listen port (default: 3000)
    pub port: u16,

    /// Directory holding uploaded files and the sentinel (default: "./uploads")
    pub upload_dir: PathBuf,

    /// Emit permissive cross-origin headers (default: true)
    pub enable_cors: bool,

    /// Maximum declared Content-Length accepted on upload
    pub max_upload_size: usize,

    /// Age after which uploads are swept
    pub retention: Duration,

    /// File name the sweeper never deletes
    pub sentinel_file: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: "your-api-key".to_string(),
            hostname: "http://localhost:3000".to_string(),
            port: 3000,
            upload_dir: PathBuf::from("./uploads"),
            enable_cors: true,
            max_upload_size: MAX_UPLOAD_SIZE,
            retention: RETENTION_WINDOW,
            sentinel_file: SENTINEL_FILE.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            api_key: env::var("API_KEY").unwrap_or(default.api_key),

            hostname: env::var("API_HOSTNAME")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(default.hostname),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            upload_dir: env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(default.upload_dir),

            enable_cors: env::var("ENABLE_CORS")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(default.enable_cors),

            ..default
        }
    }

    /// Public URL for a stored file name.
    pub fn public_url(&self, stored_name: &str) -> String {
        format!("{}/uploads/{}", self.hostname, stored_name)
    }

    /// Value the `Authorization` header must carry.
    pub fn expected_authorization(&self) -> String {
        format!("Bearer {}", self.api_key)
    }
}
