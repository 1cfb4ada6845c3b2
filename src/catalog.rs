//! Preview Catalog - read-only view for a settings grid

use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IconPreview {
    pub identifier: String,
    /// Path relative to the icons root
    pub source: String,
    /// Preview-mode canonical SVG, absent when the file could not be read
    pub svg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IconPreview {
    pub fn rendered(identifier: String, source: String, svg: String) -> Self {
        Self { identifier, source, svg: Some(svg), error: None }
    }

    pub fn failed(identifier: String, source: String, error: String) -> Self {
        Self { identifier, source, svg: None, error: Some(error) }
    }

    /// `data:` URI for embedding the thumbnail as an image source.
    pub fn data_uri(&self) -> Option<String> {
        self.svg.as_ref().map(|svg| {
            format!(
                "data:image/svg+xml;base64,{}",
                base64::engine::general_purpose::STANDARD.encode(svg)
            )
        })
    }
}

/// Previews whose identifier contains `term`, case-insensitively. A blank
/// term matches everything.
pub fn filter_previews<'a>(previews: &'a [IconPreview], term: &str) -> Vec<&'a IconPreview> {
    let term = term.trim().to_lowercase();
    previews
        .iter()
        .filter(|p| p.identifier.to_lowercase().contains(&term))
        .collect()
}

/// Badge text for the grid header.
pub fn count_label(visible: usize, total: usize, term: &str) -> String {
    if term.trim().is_empty() {
        format!("{} icons", total)
    } else {
        format!("{} of {} icons", visible, total)
    }
}
