use directories::ProjectDirs;
use std::path::PathBuf;

const LOG_FILE: &str = "riffle.log";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Where settings files live
    pub fn config_dir() -> Option<PathBuf> {
        ProjectDirs::from("", "", "riffle").map(|proj_dirs| proj_dirs.config_dir().to_path_buf())
    }

    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("riffle");
            Some(state_dir.join(LOG_FILE))
        } else {
            ProjectDirs::from("", "", "riffle")
                .map(|proj_dirs| proj_dirs.data_local_dir().join(LOG_FILE))
        }
    }
}
