//! Settings Store - Load, Merge, Persist
//!
//! Stored values overlay defaults at load. Every mutation writes the whole
//! blob back.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_ICON_PREFIX: &str = "my-";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings {0}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse settings {0}: {1}")]
    Parse(PathBuf, #[source] serde_json::Error),

    #[error("Failed to write settings {0}: {1}")]
    Write(PathBuf, #[source] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub icon_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icons_root_override: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            icon_prefix: DEFAULT_ICON_PREFIX.to_string(),
            icons_root_override: None,
        }
    }
}

impl Settings {
    /// The override when it is set and not blank, else `default_root`.
    pub fn icons_root(&self, default_root: &Path) -> PathBuf {
        self.icons_root_override
            .as_ref()
            .and_then(|p| {
                let trimmed = p.to_string_lossy().trim().to_string();
                (!trimmed.is_empty()).then(|| PathBuf::from(trimmed))
            })
            .unwrap_or_else(|| default_root.to_path_buf())
    }
}

/// Settings bound to a file on disk
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: Settings,
}

impl SettingsStore {
    /// Load from `path`; a missing file yields defaults.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        let path = path.into();
        let settings = if path.exists() {
            let content = fs::read_to_string(&path)
                .map_err(|e| SettingsError::Read(path.clone(), e))?;
            if content.trim().is_empty() {
                Settings::default()
            } else {
                serde_json::from_str(&content)
                    .map_err(|e| SettingsError::Parse(path.clone(), e))?
            }
        } else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            Settings::default()
        };
        Ok(Self { path, settings })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn set_icon_prefix(&mut self, prefix: impl Into<String>) -> Result<(), SettingsError> {
        self.settings.icon_prefix = prefix.into();
        self.save()
    }

    pub fn set_icons_root_override(&mut self, root: Option<PathBuf>) -> Result<(), SettingsError> {
        self.settings.icons_root_override = root;
        self.save()
    }

    pub fn save(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.settings)?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| SettingsError::Write(self.path.clone(), e))?;
        }
        fs::write(&self.path, json).map_err(|e| SettingsError::Write(self.path.clone(), e))?;
        tracing::debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }
}
