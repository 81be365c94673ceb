//=========================================================================
// Locator Table
//=========================================================================
//
// In-memory mapping from logical keys to provider locators.
//
// Keys are typically game-specific enums (scenes, rooms, soundbanks).
// The core never interprets the locator strings.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use log::warn;

//=== NameResolver ========================================================

/// Resolves a logical key to a provider-specific locator.
pub trait NameResolver<K> {
    fn resolve(&self, key: &K) -> Option<&str>;
}

//=== LocatorTable ========================================================

/// Key → locator table, usually filled once at startup.
#[derive(Debug, Clone)]
pub struct LocatorTable<K: Eq + Hash> {
    entries: HashMap<K, String>,
}

impl<K: Eq + Hash + Debug> LocatorTable<K> {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: K, locator: impl Into<String>) -> Self {
        self.insert(key, locator);
        self
    }

    /// Inserts a locator, returning the one it replaced.
    pub fn insert(&mut self, key: K, locator: impl Into<String>) -> Option<String> {
        let locator = locator.into();
        let previous = self.entries.insert(key, locator);
        if let Some(old) = &previous {
            warn!("Locator '{}' was already configured and has been replaced", old);
        }
        previous
    }

    pub fn remove(&mut self, key: &K) -> Option<String> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Eq + Hash + Debug> Default for LocatorTable<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash> NameResolver<K> for LocatorTable<K> {
    fn resolve(&self, key: &K) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

//=========================================================================
// Tests
//=========================================================================
