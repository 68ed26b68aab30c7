use anyhow::Result;
use std::path::PathBuf;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Runtime configuration: where the API lives and where client-owned state
/// (tokens, notification log) is kept.
pub struct Config {
    pub api_url: String,
    /// Durable tier, survives restarts.
    pub data_dir: PathBuf,
    /// Session tier, cleared by the OS between sessions.
    pub session_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let api_url = std::env::var("REDFLAG_API_URL")
            .ok()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        // Trailing slash would double up with the path prefixes.
        let api_url = api_url.trim_end_matches('/').to_string();

        let data_dir = if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "redflag") {
            proj_dirs.data_dir().to_path_buf()
        } else {
            PathBuf::from(".redflag")
        };

        let session_dir = std::env::var("REDFLAG_SESSION_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                directories::BaseDirs::new()
                    .and_then(|dirs| dirs.runtime_dir().map(|d| d.join("redflag")))
            })
            .unwrap_or_else(|| std::env::temp_dir().join("redflag"));

        Ok(Self {
            api_url,
            data_dir,
            session_dir,
        })
    }

    pub fn notifications_db_path(&self) -> PathBuf {
        self.data_dir.join("notifications.db")
    }
}
