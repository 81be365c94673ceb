//=========================================================================
// Frame Harness — Library Root
//
// This crate provides the control-flow core of a frame-driven game:
// pausable cooperative tasks, a hierarchical mode stack and load-group
// barriers.
//
// Responsibilities:
// - Expose the core subsystems (`core::task`, `core::mode`, ...)
// - Provide a ready-made frame driver (`Runtime`) for owners that do not
//   need to wire the subsystems themselves
//
// Typical usage:
// ```
// use frame_harness::prelude::*;
//
// let mut runtime = Runtime::new();
// let handle = runtime.start_task(task_fn("hello", |_| Ok(Step::Complete)));
// runtime.step();
// assert_eq!(runtime.task_state(handle), None);
// ```
//
//=========================================================================

//--- Public Modules ------------------------------------------------------
//
// `core` holds every subsystem. They are usable independently of the
// runtime, e.g. a mode that owns its own nested `ModeStack`.
//
pub mod core;
pub mod prelude;

//--- Internal Modules ----------------------------------------------------
//
// `runtime` glues the subsystems into a single update loop.
//
mod runtime;

//--- Public Exports ------------------------------------------------------

pub use runtime::{FrameReport, LoadBarrierTask, Runtime, RuntimeBuilder, RuntimeEnv};
