//! SvgIcons Core - Theme-Compatible Icon Normalization
//!
//! # Guarantees
//! 1. Normalization never fails
//! 2. Normalization is idempotent per mode
//! 3. One unreadable icon never aborts a reload
//! 4. Identifiers are a pure function of path and prefix

pub mod markup;
pub mod normalize;
pub mod naming;
pub mod discovery;
pub mod registry;
pub mod settings;
pub mod catalog;
pub mod loader;
pub mod manifest;
pub mod logging;

pub use normalize::{normalize, Mode, Normalizer, Normalized, NormalizeStep, TagContext, THEME_COLOR_TOKEN, SVG_NAMESPACE};
pub use naming::{resolve_identifier, relative_icon_path};
pub use discovery::{discover_svg_files, FsSource, IconSource, Listing};
pub use registry::{IconRegistry, MemoryRegistry};
pub use settings::{Settings, SettingsError, SettingsStore};
pub use catalog::{count_label, filter_previews, IconPreview};
pub use loader::{reload_notice, IconLoader, LoadError, ReloadSummary};
pub use manifest::{canonical_json, compute_manifest_hash, sha256_hex, IconManifest};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
