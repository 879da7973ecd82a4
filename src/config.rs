use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::{
    app_dirs::AppDirs,
    settings::{GameMode, SessionSettings},
};

const AVATAR_FILE: &str = "avatar.json";

/// Key-value persistence for per-mode settings and the avatar. Missing or corrupt
/// entries load as `None`.
pub trait SettingsStore {
    fn load(&self, mode: GameMode) -> Option<SessionSettings>;
    fn save(&self, settings: &SessionSettings) -> std::io::Result<()>;
    fn load_avatar(&self) -> Option<String>;
    fn save_avatar(&self, avatar: &str) -> std::io::Result<()>;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
struct AvatarRecord {
    avatar: String,
}

#[derive(Debug, Clone)]
pub struct FileSettingsStore {
    dir: PathBuf,
}

impl FileSettingsStore {
    pub fn new() -> Self {
        let dir = AppDirs::config_dir().unwrap_or_else(|| PathBuf::from(".riffle"));
        Self { dir }
    }

    pub fn with_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn settings_path(&self, mode: GameMode) -> PathBuf {
        self.dir.join(format!("settings_{mode}.json"))
    }

    fn read<T: for<'de> Deserialize<'de>>(&self, path: &Path) -> Option<T> {
        let bytes = fs::read(path).ok()?;
        match serde_json::from_slice::<T>(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable settings file");
                None
            }
        }
    }

    fn write<T: Serialize>(&self, path: &Path, value: &T) -> std::io::Result<()> {
        fs::create_dir_all(&self.dir)?;
        let data = serde_json::to_vec_pretty(value).map_err(std::io::Error::other)?;
        fs::write(path, data)
    }
}

impl Default for FileSettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self, mode: GameMode) -> Option<SessionSettings> {
        let settings: SessionSettings = self.read(&self.settings_path(mode))?;
        // the file name decides the mode
        Some(SessionSettings { mode, ..settings })
    }

    fn save(&self, settings: &SessionSettings) -> std::io::Result<()> {
        self.write(&self.settings_path(settings.mode), settings)
    }

    fn load_avatar(&self) -> Option<String> {
        self.read::<AvatarRecord>(&self.dir.join(AVATAR_FILE))
            .map(|r| r.avatar)
            .filter(|a| !a.trim().is_empty())
    }

    fn save_avatar(&self, avatar: &str) -> std::io::Result<()> {
        self.write(
            &self.dir.join(AVATAR_FILE),
            &AvatarRecord {
                avatar: avatar.to_string(),
            },
        )
    }
}
