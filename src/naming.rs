//! Icon Naming
//!
//! Directory segments and the base name are joined with `-` and prefixed.
//! `a/b-c.svg` and `a-b/c.svg` both resolve to `<prefix>a-b-c`; the later
//! registration wins.

use std::path::{Component, Path};

/// Map a slash-separated path under the icons root to an icon identifier.
pub fn resolve_identifier(relative_path: &str, prefix: &str) -> String {
    let mut segments: Vec<&str> = relative_path
        .split('/')
        .filter(|s| !s.trim().is_empty())
        .collect();

    let Some(file_name) = segments.pop() else {
        return prefix.to_string();
    };
    segments.push(strip_extension(file_name));

    format!("{}{}", prefix, segments.join("-"))
}

/// Slash-joined path of `file` relative to `root`, or `None` if `file` is
/// not under `root`.
pub fn relative_icon_path(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(dot) if dot > 0 => &file_name[..dot],
        _ => file_name,
    }
}
