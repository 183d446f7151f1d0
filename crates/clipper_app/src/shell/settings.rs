use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clipper_engine::{CaptureMode, CaptureSettings};
use clipper_logging::{clip_error, clip_info, clip_warn};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;

const SETTINGS_FILENAME: &str = "clipper_settings.ron";
const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:18000";

/// Persisted user settings. Unknown or missing fields fall back to defaults
/// so old settings files keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipSettings {
    pub mode: CaptureMode,
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub save_path: String,
    pub backend_url: String,
}

impl Default for ClipSettings {
    fn default() -> Self {
        Self {
            mode: CaptureMode::Raw,
            model: "gpt-3.5-turbo".to_string(),
            api_key: String::new(),
            base_url: String::new(),
            save_path: String::new(),
            backend_url: DEFAULT_BACKEND_URL.to_string(),
        }
    }
}

impl ClipSettings {
    /// Backend URL with whitespace and trailing slashes stripped; an empty
    /// value falls back to the default.
    pub fn normalized_backend_url(&self) -> String {
        let trimmed = self.backend_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            DEFAULT_BACKEND_URL.to_string()
        } else {
            trimmed.to_string()
        }
    }

    pub fn capture(&self) -> CaptureSettings {
        CaptureSettings {
            mode: self.mode,
            model: self.model.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            save_path: self.save_path.clone(),
        }
    }
}

fn settings_path(dir: &Path) -> PathBuf {
    dir.join(SETTINGS_FILENAME)
}

/// Load settings from `dir`. A missing file is materialized with defaults;
/// an unreadable or corrupt file falls back to defaults without touching
/// what is on disk.
pub fn load(dir: &Path) -> ClipSettings {
    let path = settings_path(dir);
    let content = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            clip_info!("No settings at {:?}, writing defaults", path);
            let defaults = ClipSettings::default();
            save(dir, &defaults);
            return defaults;
        }
        Err(err) => {
            clip_warn!("Failed to read settings from {:?}: {}", path, err);
            return ClipSettings::default();
        }
    };

    match ron::from_str(&content) {
        Ok(settings) => settings,
        Err(err) => {
            clip_warn!("Failed to parse settings from {:?}: {}", path, err);
            ClipSettings::default()
        }
    }
}

/// Write settings atomically; failures are logged and swallowed.
pub fn save(dir: &Path, settings: &ClipSettings) {
    let pretty = ron::ser::PrettyConfig::new();
    let content = match ron::ser::to_string_pretty(settings, pretty) {
        Ok(text) => text,
        Err(err) => {
            clip_error!("Failed to serialize settings: {}", err);
            return;
        }
    };

    if let Err(err) = write_atomically(dir, &settings_path(dir), &content) {
        clip_error!("Failed to write settings to {:?}: {}", settings_path(dir), err);
    }
}

fn write_atomically(dir: &Path, target: &Path, content: &str) -> io::Result<()> {
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content.as_bytes())?;
    tmp.flush()?;
    tmp.as_file_mut().sync_all()?;

    if target.exists() {
        fs::remove_file(target)?;
    }
    tmp.persist(target).map_err(|err| err.error)?;
    Ok(())
}
