//! File Discovery - Recursive SVG Listing

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::loader::LoadError;

/// One directory level
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub files: Vec<PathBuf>,
    pub subdirectories: Vec<PathBuf>,
}

/// Where icon files come from. Implementations must be safe to call from a
/// reader thread.
pub trait IconSource: Send + Sync {
    fn exists(&self, path: &Path) -> bool;
    fn list(&self, path: &Path) -> io::Result<Listing>;
    fn read(&self, path: &Path) -> io::Result<String>;
}

/// Local filesystem source. Listings are sorted by path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsSource;

impl IconSource for FsSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list(&self, path: &Path) -> io::Result<Listing> {
        let mut listing = Listing::default();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            let entry_path = entry.path();
            if entry.file_type()?.is_dir() {
                listing.subdirectories.push(entry_path);
            } else {
                listing.files.push(entry_path);
            }
        }
        listing.files.sort();
        listing.subdirectories.sort();
        Ok(listing)
    }

    /// Invalid UTF-8 is replaced rather than rejected.
    fn read(&self, path: &Path) -> io::Result<String> {
        let bytes = fs::read(path)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Every `.svg` file under `root`, files of a directory before its
/// subdirectories.
///
/// Failing to list `root` is an error. A subdirectory that cannot be listed
/// is logged and skipped.
pub fn discover_svg_files(source: &dyn IconSource, root: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let listing = source.list(root).map_err(|e| LoadError::Enumeration(root.to_path_buf(), e))?;
    let mut found = vec![];
    collect(source, listing, &mut found);
    Ok(found)
}

fn collect(source: &dyn IconSource, listing: Listing, found: &mut Vec<PathBuf>) {
    found.extend(listing.files.into_iter().filter(|f| is_svg(f)));

    for dir in listing.subdirectories {
        match source.list(&dir) {
            Ok(nested) => collect(source, nested, found),
            Err(e) => tracing::warn!(dir = %dir.display(), error = %e, "failed to list directory"),
        }
    }
}

fn is_svg(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"))
}
