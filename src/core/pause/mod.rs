//=========================================================================
// Pause
//=========================================================================
//
// Global pause state, passed explicitly to every scheduler and task.
//
//=========================================================================

//=== Module Declarations =================================================

mod pause_switch;

//=== Public API ==========================================================

pub use pause_switch::{PauseSwitch, SubscriptionId};
