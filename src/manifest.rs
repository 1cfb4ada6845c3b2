//! Icon Manifest - SHA-256 over canonical forms
//!
//! The manifest hash covers the icon entries only, so reloading an
//! unchanged icon set reproduces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::loader::{FailedIcon, LoadedIcon, ReloadSummary};
use crate::ENGINE_VERSION;

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    to_string(&sort_value(&v))
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            Value::Object(
                sorted
                    .into_iter()
                    .map(|(k, v)| (k.clone(), sort_value(v)))
                    .collect(),
            )
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IconManifest {
    pub engine_version: String,
    pub generated_at: DateTime<Utc>,
    pub icons_root: PathBuf,
    pub icons: Vec<LoadedIcon>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FailedIcon>,
    pub manifest_hash: String,
}

impl IconManifest {
    pub fn from_summary(summary: &ReloadSummary) -> Result<Self, serde_json::Error> {
        Ok(Self {
            engine_version: ENGINE_VERSION.to_string(),
            generated_at: Utc::now(),
            icons_root: summary.icons_root.clone(),
            icons: summary.loaded.clone(),
            failures: summary.failures.clone(),
            manifest_hash: compute_manifest_hash(&summary.loaded)?,
        })
    }
}

/// Hash of the icon entries, independent of their order
pub fn compute_manifest_hash(icons: &[LoadedIcon]) -> Result<String, serde_json::Error> {
    let mut entries: Vec<_> = icons.iter().collect();
    entries.sort_by(|a, b| a.identifier.cmp(&b.identifier).then(a.source.cmp(&b.source)));
    let canonical = canonical_json(&entries)?;
    Ok(sha256_hex(canonical.as_bytes()))
}
