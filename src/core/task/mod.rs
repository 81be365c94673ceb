//=========================================================================
// Task System
//=========================================================================
//
// Cooperative, pausable units of work advanced once per frame.
//
// Architecture:
//   TaskScheduler
//     ├─ pause: PauseSwitch (shared)
//     └─ slots: HashMap<TaskHandle, TaskTree>
//                                   └─ chain: Vec<Box<dyn Task>>  (root .. leaf)
//
// Flow:
//   advance(handle) → pause check → leaf.step() → Step
//     Nest(child)  → push child, step it now
//     Yield(wait)  → hand wait back to the driver
//     Complete     → pop leaf, parent resumes next advance
//
//=========================================================================

//=== External Dependencies ===============================================

use std::fmt;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::clock::FrameTime;
use crate::core::pause::PauseSwitch;

//=== Module Declarations =================================================

mod fault;
mod helpers;
mod scheduler;
mod tree;

//=== Public API ==========================================================

pub use fault::{SchedulingFault, TaskFault};
pub use helpers::{task_fn, Delay, Sequence, TaskFn};
pub use scheduler::TaskScheduler;

//=== Task Handle =========================================================

/// Identifies a task started on a [`TaskScheduler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw id, unique per scheduler.
    pub fn id(&self) -> u64 {
        self.0
    }
}

//=== Task State ==========================================================

/// Lifecycle state of a task handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskState {
    /// Ready to be stepped on the next advance.
    Running,

    /// Waiting on a suspension signal held by the driver.
    Suspended,

    /// The root task finished.
    Completed,

    /// Stopped explicitly.
    Cancelled,

    /// A step failed or nesting exceeded the depth limit.
    Faulted,
}

impl TaskState {
    /// Returns true for Completed, Cancelled and Faulted.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Faulted)
    }
}

//=== Wait ================================================================

/// Primitive suspension signal yielded by a task.
///
/// The scheduler passes waits to the frame driver untouched; deciding when
/// a wait is satisfied is the driver's job.
pub enum Wait {
    /// Resume on the next frame.
    NextFrame,

    /// Resume after the given number of frames.
    Frames(u32),

    /// Resume after the given amount of unpaused time.
    Seconds(Duration),

    /// Resume once the predicate returns true.
    Until(Box<dyn FnMut() -> bool>),
}

impl Wait {
    /// Wait for a predicate.
    pub fn until<F>(predicate: F) -> Self
    where
        F: FnMut() -> bool + 'static,
    {
        Self::Until(Box::new(predicate))
    }

    /// Wait for a number of seconds.
    ///
    /// Negative and NaN values wait for nothing; values too large for a
    /// `Duration` (including infinity) wait forever.
    pub fn seconds(secs: f32) -> Self {
        Self::Seconds(secs_to_duration(secs))
    }
}

/// Lossy float seconds to `Duration`, clamped to `[0, Duration::MAX]`.
pub(crate) fn secs_to_duration(secs: f32) -> Duration {
    if secs.is_nan() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}

impl fmt::Debug for Wait {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NextFrame => f.write_str("NextFrame"),
            Self::Frames(n) => write!(f, "Frames({})", n),
            Self::Seconds(d) => write!(f, "Seconds({:?})", d),
            Self::Until(_) => f.write_str("Until(..)"),
        }
    }
}

//=== Step ================================================================

/// Outcome of a single task step.
pub enum Step {
    /// Suspend until the wait is satisfied.
    Yield(Wait),

    /// Run a child task to completion before resuming this one.
    Nest(Box<dyn Task>),

    /// The task is finished.
    Complete,
}

impl Step {
    /// Shorthand for `Step::Yield(Wait::NextFrame)`.
    pub fn next_frame() -> Self {
        Self::Yield(Wait::NextFrame)
    }

    /// Shorthand for nesting a concrete task.
    pub fn nest<T: Task>(task: T) -> Self {
        Self::Nest(Box::new(task))
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Yield(wait) => write!(f, "Yield({:?})", wait),
            Self::Nest(task) => write!(f, "Nest({})", task.name()),
            Self::Complete => f.write_str("Complete"),
        }
    }
}

//=== Progress ============================================================

/// Result of advancing a handle by one frame.
#[derive(Debug)]
pub enum Progress {
    /// The pause switch was set; nothing ran.
    Paused,

    /// The tree is waiting; the driver must honor the wait before the next advance.
    Suspended(Wait),

    /// The root task has completed.
    Completed,

    /// The task was stopped.
    Cancelled,

    /// The task faulted on an earlier advance.
    Faulted,
}

//=== Task Context ========================================================

/// Context passed to every task step.
pub struct TaskContext<'a> {
    pause: &'a PauseSwitch,
    time: FrameTime,
    handle: TaskHandle,
    depth: usize,
}

impl<'a> TaskContext<'a> {
    pub(crate) fn new(pause: &'a PauseSwitch, time: FrameTime, handle: TaskHandle, depth: usize) -> Self {
        Self { pause, time, handle, depth }
    }

    /// The pause switch the scheduler runs under.
    ///
    /// Tasks may set it; the remainder of the tree then freezes at once.
    pub fn pause_switch(&self) -> &PauseSwitch {
        self.pause
    }

    /// Time of the frame being advanced.
    pub fn time(&self) -> FrameTime {
        self.time
    }

    /// Handle of the root task this step belongs to.
    pub fn handle(&self) -> TaskHandle {
        self.handle
    }

    /// Nesting depth of the task being stepped (root is 1).
    pub fn depth(&self) -> usize {
        self.depth
    }
}

//=== Task Trait ==========================================================

/// A resumable, cooperatively scheduled unit of work.
///
/// Each call to [`Task::step`] runs the task up to its next suspension
/// point. Tasks keep their own cursor between steps.
///
/// ```rust
/// # use frame_harness::prelude::*;
/// struct Countdown(u32);
///
/// impl Task for Countdown {
///     fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
///         if self.0 == 0 {
///             return Ok(Step::Complete);
///         }
///         self.0 -= 1;
///         Ok(Step::next_frame())
///     }
/// }
/// ```
pub trait Task: 'static {
    /// Runs until the next suspension point.
    fn step(&mut self, ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault>;

    /// Called once when the task is cancelled before completing.
    fn on_cancel(&mut self) {}

    /// Name used in logs and faults.
    fn name(&self) -> &str {
        "task"
    }
}
