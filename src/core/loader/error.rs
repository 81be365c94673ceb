//=========================================================================
// Loader Errors
//=========================================================================
//
// Failures reported by asset providers and misuse of load groups.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::error::Error;
use std::fmt;

//=== LoadError ===========================================================

/// Failure of a single named load, produced by the asset provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
    /// The provider has no asset under this name.
    NotFound(String),

    /// The provider found the asset but could not load it.
    Failed { name: String, reason: String },

    /// The provider dropped the reply without resolving it.
    Dropped(String),
}

impl LoadError {
    /// Name of the asset that failed.
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound(name) => name,
            Self::Failed { name, .. } => name,
            Self::Dropped(name) => name,
        }
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound(name) => write!(f, "Asset '{}' not found", name),
            Self::Failed { name, reason } => write!(f, "Asset '{}' failed to load: {}", name, reason),
            Self::Dropped(name) => write!(f, "Load of asset '{}' was abandoned by its provider", name),
        }
    }
}

impl Error for LoadError {}

//=== LoadGroupError ======================================================

/// Errors raised while building or starting a load group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadGroupError {
    /// `start` was called with no registered requests; the barrier could never fire.
    Empty,

    /// A logical key had no locator in the resolver.
    UnresolvedName(String),
}

impl fmt::Display for LoadGroupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "Load group started with no requests"),
            Self::UnresolvedName(key) => write!(f, "No locator configured for '{}'", key),
        }
    }
}

impl Error for LoadGroupError {}

//=========================================================================
// Tests
//=========================================================================
