//=========================================================================
// Configuration
//=========================================================================
//
// Resolution of logical names (scenes, rooms, resources) to the opaque
// locator strings an asset provider understands.
//
//=========================================================================

//=== Module Declarations =================================================

mod locator;

//=== Public API ==========================================================

pub use locator::{LocatorTable, NameResolver};
