//! Icon Loader - Reload Batch
//!
//! Discovery order, one file at a time. A failing file is logged and
//! skipped; only a root that cannot be listed aborts the reload.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use thiserror::Error;

use crate::catalog::IconPreview;
use crate::discovery::{discover_svg_files, IconSource};
use crate::manifest::sha256_hex;
use crate::naming::{relative_icon_path, resolve_identifier};
use crate::normalize::{Mode, Normalizer};
use crate::registry::IconRegistry;
use crate::settings::Settings;

pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Icons directory does not exist: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to list icons directory {0}: {1}")]
    Enumeration(PathBuf, #[source] io::Error),

    #[error("Failed to read icon {0}: {1}")]
    UnreadableFile(PathBuf, #[source] io::Error),

    #[error("Timed out reading icon {0} after {1:?}")]
    ReadTimeout(PathBuf, Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadedIcon {
    pub identifier: String,
    /// Path relative to the icons root
    pub source: String,
    pub hash: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailedIcon {
    pub source: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReloadSummary {
    pub icons_root: PathBuf,
    pub root_missing: bool,
    pub loaded: Vec<LoadedIcon>,
    pub failures: Vec<FailedIcon>,
}

impl ReloadSummary {
    fn new(icons_root: &Path) -> Self {
        Self {
            icons_root: icons_root.to_path_buf(),
            root_missing: false,
            loaded: vec![],
            failures: vec![],
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// The single user-visible message for a completed reload.
    pub fn notice(&self) -> String {
        if self.root_missing {
            format!("Icons directory does not exist: {}", self.icons_root.display())
        } else if self.loaded.is_empty() && self.failures.is_empty() {
            format!("No SVG icons found in {}", self.icons_root.display())
        } else {
            format!(
                "Icons reloaded: {} loaded, {} failed.",
                self.loaded.len(),
                self.failures.len()
            )
        }
    }
}

/// User-visible message for a reload attempt, successful or not.
pub fn reload_notice(result: &Result<ReloadSummary, LoadError>) -> String {
    match result {
        Ok(summary) => summary.notice(),
        Err(_) => "Failed to reload icons. Check the log for details.".to_string(),
    }
}

/// Reads, names and normalizes the icons under one root
pub struct IconLoader {
    source: Arc<dyn IconSource>,
    icons_root: PathBuf,
    prefix: String,
    normalizer: Normalizer,
    read_timeout: Duration,
}

impl IconLoader {
    pub fn new(source: Arc<dyn IconSource>, icons_root: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            source,
            icons_root: icons_root.into(),
            prefix: prefix.into(),
            normalizer: Normalizer::new(),
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }

    /// Root and prefix taken from `settings`; `default_root` applies when
    /// no override is set.
    pub fn from_settings(source: Arc<dyn IconSource>, settings: &Settings, default_root: &Path) -> Self {
        Self::new(source, settings.icons_root(default_root), settings.icon_prefix.clone())
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Discover, normalize in registration mode, and register every icon.
    pub fn reload(&self, registry: &dyn IconRegistry) -> Result<ReloadSummary, LoadError> {
        let mut summary = ReloadSummary::new(&self.icons_root);

        if !self.source.exists(&self.icons_root) {
            let missing = LoadError::MissingDirectory(self.icons_root.clone());
            tracing::warn!("{}", missing);
            summary.root_missing = true;
            return Ok(summary);
        }

        let files = discover_svg_files(self.source.as_ref(), &self.icons_root)?;
        if files.is_empty() {
            tracing::warn!(root = %self.icons_root.display(), "no SVG files found");
        }

        for file in files {
            let source = self.relative_source(&file);
            match self.read_with_timeout(&file) {
                Ok(content) => {
                    let identifier = resolve_identifier(&source, &self.prefix);
                    let svg = self.normalizer.normalize(&content, Mode::Registration);
                    registry.register(&identifier, &svg);
                    tracing::debug!(%identifier, %source, "registered icon");
                    summary.loaded.push(LoadedIcon {
                        identifier,
                        source,
                        hash: sha256_hex(svg.as_bytes()),
                    });
                }
                Err(e) => {
                    tracing::error!(%source, error = %e, "failed to load icon");
                    summary.failures.push(FailedIcon {
                        source,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            loaded = summary.loaded.len(),
            failed = summary.failures.len(),
            root = %self.icons_root.display(),
            "icons reloaded"
        );
        Ok(summary)
    }

    /// Identifier and preview-mode SVG for every discovered icon.
    ///
    /// Unreadable files are returned with `error` set so the grid can still
    /// show a card for them.
    pub fn previews(&self) -> Result<Vec<IconPreview>, LoadError> {
        if !self.source.exists(&self.icons_root) {
            return Err(LoadError::MissingDirectory(self.icons_root.clone()));
        }

        let files = discover_svg_files(self.source.as_ref(), &self.icons_root)?;
        let previews = files
            .iter()
            .map(|file| {
                let source = self.relative_source(file);
                let identifier = resolve_identifier(&source, &self.prefix);
                match self.read_with_timeout(file) {
                    Ok(content) => IconPreview::rendered(
                        identifier,
                        source,
                        self.normalizer.normalize(&content, Mode::Preview),
                    ),
                    Err(e) => {
                        tracing::error!(%source, error = %e, "failed to read icon for preview");
                        IconPreview::failed(identifier, source, e.to_string())
                    }
                }
            })
            .collect();
        Ok(previews)
    }

    fn relative_source(&self, file: &Path) -> String {
        relative_icon_path(&self.icons_root, file).unwrap_or_else(|| {
            file.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default()
        })
    }

    fn read_with_timeout(&self, file: &Path) -> Result<String, LoadError> {
        let (tx, rx) = mpsc::channel();
        let source = Arc::clone(&self.source);
        let path = file.to_path_buf();
        thread::spawn(move || {
            // The receiver is gone if the read already timed out
            let _ = tx.send(source.read(&path));
        });

        match rx.recv_timeout(self.read_timeout) {
            Ok(Ok(content)) => Ok(content),
            Ok(Err(e)) => Err(LoadError::UnreadableFile(file.to_path_buf(), e)),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                Err(LoadError::ReadTimeout(file.to_path_buf(), self.read_timeout))
            }
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(LoadError::UnreadableFile(
                file.to_path_buf(),
                io::Error::new(io::ErrorKind::Other, "reader thread exited"),
            )),
        }
    }
}
