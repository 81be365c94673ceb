//=========================================================================
// Core Systems
//
// Building blocks of the frame harness. Each subsystem is usable on its
// own; the top-level `Runtime` wires them into one update loop.
//
// Subsystems:
// - `pause`:  shared pause flag with change notifications
// - `clock`:  per-frame timing snapshot
// - `task`:   pausable cooperative task scheduler with nested tasks
// - `mode`:   stack-based hierarchical state machine with features
// - `loader`: barrier coordination of named asynchronous loads
// - `config`: logical-key to locator resolution for loads
//
// Notes:
// Everything here runs on a single thread. Only asset providers may
// resolve loads elsewhere; their replies are channelled back and applied
// during `LoadGroupHandle::poll`.
//
//=========================================================================

//=== Module Declarations =================================================

pub mod clock;
pub mod config;
pub mod loader;
pub mod mode;
pub mod pause;
pub mod task;
