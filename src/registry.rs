//! Icon Registry - identifier to canonical SVG

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock};

/// Host-side icon registry. Registering an existing identifier replaces the
/// previous definition as a whole.
pub trait IconRegistry: Send + Sync {
    fn register(&self, identifier: &str, canonical_svg: &str);
}

/// In-process registry, ordered by identifier
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    icons: RwLock<BTreeMap<String, String>>,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, identifier: &str) -> Option<String> {
        self.icons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identifier)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.icons.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.icons
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

impl IconRegistry for MemoryRegistry {
    fn register(&self, identifier: &str, canonical_svg: &str) {
        self.icons
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(identifier.to_string(), canonical_svg.to_string());
    }
}
