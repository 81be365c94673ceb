//=========================================================================
// Prelude
//=========================================================================
//
// Convenience module that re-exports commonly used types and traits.
//
// Usage:
//   use frame_harness::prelude::*;
//
//=========================================================================

//=== Public API ==========================================================

// Runtime
pub use crate::runtime::{FrameReport, LoadBarrierTask, Runtime, RuntimeBuilder, RuntimeEnv};

// Pause and timing
pub use crate::core::clock::FrameTime;
pub use crate::core::pause::PauseSwitch;

// Task system
pub use crate::core::task::{
    task_fn, Delay, Sequence, Step, Task, TaskContext, TaskFault, TaskHandle, TaskScheduler, TaskState, Wait,
};

// Mode system
pub use crate::core::mode::{Feature, FeatureContext, Mode, ModeContext, ModeSignal, ModeStack, SignalSender};

// Loading
pub use crate::core::config::{LocatorTable, NameResolver};
pub use crate::core::loader::{AssetProvider, LoadError, LoadGroup, LoadGroupHandle, LoadReply};
