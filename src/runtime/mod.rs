//=========================================================================
// Runtime
//
// Frame driver tying the pause switch, task scheduler and mode stack
// together for a single-threaded update loop.
//
// Architecture:
// ```text
//     RuntimeBuilder  ──build()──>  Runtime  ──tick(delta)──>  FrameReport
//         │                           │
//         ├─ with_max_nesting_depth() ├─ modes: ModeStack<RuntimeEnv>
//         ├─ with_fixed_delta()       ├─ env:   RuntimeEnv (scheduler, time)
//         ├─ start_paused()           └─ waits: WaitTracker
//         └─ with_pause_switch()
// ```
//
// Frame order:
//   1. advance the clock (paused frames add no elapsed time)
//   2. tick the mode stack (signals, top mode, its features, signals)
//   3. advance every live task whose wait is satisfied
//   4. reap finished tasks into the report
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

use log::{debug, info};

//=== Internal Dependencies ===============================================

use crate::core::clock::FrameTime;
use crate::core::mode::{Mode, ModeStack, SignalSender};
use crate::core::pause::PauseSwitch;
use crate::core::task::{Progress, SchedulingFault, Task, TaskHandle, TaskScheduler, TaskState};

//=== Module Declarations =================================================

mod env;
mod load_task;
mod waits;

//=== Public API ==========================================================

pub use env::{FrameReport, RuntimeEnv};
pub use load_task::LoadBarrierTask;

use waits::WaitTracker;

//=== RuntimeBuilder ======================================================

/// Builder for configuring and constructing a [`Runtime`].
///
/// # Default Values
///
/// - **Max nesting depth**: 64 tasks per chain
/// - **Fixed delta**: 1/60 s (used by [`Runtime::step`])
/// - **Paused**: false
///
/// # Examples
///
/// ```
/// use frame_harness::RuntimeBuilder;
/// use std::time::Duration;
///
/// let mut runtime = RuntimeBuilder::new()
///     .with_fixed_delta(Duration::from_millis(10))
///     .build();
///
/// let report = runtime.step();
/// assert_eq!(report.frame, 1);
/// ```
pub struct RuntimeBuilder {
    max_depth: usize,
    fixed_delta: Duration,
    start_paused: bool,
    pause: Option<PauseSwitch>,
}

impl RuntimeBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            max_depth: 64,
            fixed_delta: Duration::from_secs_f64(1.0 / 60.0),
            start_paused: false,
            pause: None,
        }
    }

    /// Sets how deep a chain of nested tasks may grow before faulting.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero.
    pub fn with_max_nesting_depth(mut self, depth: usize) -> Self {
        assert!(depth > 0, "Max nesting depth must be positive");
        self.max_depth = depth;
        self
    }

    /// Sets the delta used by [`Runtime::step`].
    ///
    /// # Panics
    ///
    /// Panics if `delta` is zero.
    pub fn with_fixed_delta(mut self, delta: Duration) -> Self {
        assert!(!delta.is_zero(), "Fixed delta must be positive");
        self.fixed_delta = delta;
        self
    }

    /// Starts the runtime with the pause switch set.
    pub fn start_paused(mut self, paused: bool) -> Self {
        self.start_paused = paused;
        self
    }

    /// Shares an existing pause switch instead of creating one.
    pub fn with_pause_switch(mut self, pause: PauseSwitch) -> Self {
        self.pause = Some(pause);
        self
    }

    /// Builds the runtime.
    pub fn build(self) -> Runtime {
        let pause = self.pause.unwrap_or_default();
        if self.start_paused {
            pause.set(true);
        }

        info!(
            "Runtime built (max depth: {}, fixed delta: {:?}, paused: {})",
            self.max_depth,
            self.fixed_delta,
            pause.is_paused()
        );

        Runtime {
            env: RuntimeEnv::new(TaskScheduler::with_max_depth(pause, self.max_depth)),
            modes: ModeStack::new(),
            waits: WaitTracker::new(),
            fixed_delta: self.fixed_delta,
        }
    }
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

//=== Runtime =============================================================

/// Single-threaded frame driver.
pub struct Runtime {
    env: RuntimeEnv,
    modes: ModeStack<RuntimeEnv>,
    waits: WaitTracker,
    fixed_delta: Duration,
}

impl Runtime {
    //--- Construction -----------------------------------------------------

    /// Runtime with default settings.
    pub fn new() -> Self {
        RuntimeBuilder::new().build()
    }

    //--- Pause ------------------------------------------------------------

    pub fn pause_switch(&self) -> &PauseSwitch {
        self.env.pause_switch()
    }

    /// Sets the pause flag. Returns true if it changed.
    pub fn set_paused(&self, paused: bool) -> bool {
        self.env.pause_switch().set(paused)
    }

    pub fn is_paused(&self) -> bool {
        self.env.pause_switch().is_paused()
    }

    //--- Modes ------------------------------------------------------------

    /// Pushes a mode on top of the runtime's stack.
    pub fn push_mode<M: Mode<RuntimeEnv>>(&mut self, mode: M, args: M::Args) -> SignalSender {
        self.modes.push(mode, args, &mut self.env)
    }

    /// Invokes `run` on the top mode.
    pub fn run_top_mode(&mut self) -> bool {
        self.modes.run_top(&mut self.env)
    }

    pub fn modes(&self) -> &ModeStack<RuntimeEnv> {
        &self.modes
    }

    //--- Tasks ------------------------------------------------------------

    /// Starts a task; it is first stepped on the next tick.
    pub fn start_task<T: Task>(&mut self, task: T) -> TaskHandle {
        self.env.start_task(task)
    }

    /// Cancels a task. Unknown handles are an error, finished ones a no-op.
    pub fn stop_task(&mut self, handle: TaskHandle) -> Result<(), SchedulingFault> {
        self.env.stop_task(handle)?;
        self.waits.remove(handle);
        Ok(())
    }

    pub fn task_state(&self, handle: TaskHandle) -> Option<TaskState> {
        self.env.task_state(handle)
    }

    pub fn env(&self) -> &RuntimeEnv {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut RuntimeEnv {
        &mut self.env
    }

    /// Timing of the most recent frame.
    pub fn time(&self) -> FrameTime {
        self.env.time
    }

    //--- Update Loop ------------------------------------------------------

    /// Runs one frame with the configured fixed delta.
    pub fn step(&mut self) -> FrameReport {
        self.tick(self.fixed_delta)
    }

    /// Runs one frame.
    pub fn tick(&mut self, delta: Duration) -> FrameReport {
        let paused = self.is_paused();
        self.env.time = self.env.time.next(delta, paused);

        self.modes.tick(&mut self.env);

        let mut report = FrameReport {
            frame: self.env.time.frame,
            paused,
            ..FrameReport::default()
        };

        self.advance_tasks(&mut report);

        for (handle, state) in self.env.scheduler.reap() {
            self.waits.remove(handle);
            report.finished.push((handle, state));
        }

        report
    }

    fn advance_tasks(&mut self, report: &mut FrameReport) {
        // Modes may have toggled the switch during their tick.
        let paused = self.is_paused();
        let time = self.env.time;

        for handle in self.env.scheduler.live_handles() {
            if !self.waits.ready(handle, time, paused) {
                continue;
            }

            match self.env.scheduler.advance(handle, time) {
                Ok(Progress::Suspended(wait)) => self.waits.insert(handle, wait),
                Ok(Progress::Paused) => {}
                Ok(Progress::Completed | Progress::Cancelled | Progress::Faulted) => {
                    self.waits.remove(handle);
                }
                Err(fault) => {
                    self.waits.remove(handle);
                    report.faults.push(fault);
                }
            }
        }
    }

    //--- Shutdown ---------------------------------------------------------

    /// Terminates every mode, then cancels every task.
    pub fn terminate(&mut self) {
        info!("Runtime terminating");

        self.modes.terminate(&mut self.env);
        self.env.scheduler.stop_all();

        let reaped = self.env.scheduler.reap();
        debug!("Reaped {} tasks on shutdown", reaped.len());
        self.waits.clear();
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
