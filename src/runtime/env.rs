//=========================================================================
// Runtime Environment
//=========================================================================
//
// The environment the runtime's mode stack is ticked with, and the
// per-frame report returned to the owner.
//
//=========================================================================

//=== Internal Dependencies ===============================================

use crate::core::clock::FrameTime;
use crate::core::pause::PauseSwitch;
use crate::core::task::{SchedulingFault, Task, TaskHandle, TaskScheduler, TaskState};

//=== RuntimeEnv ==========================================================

/// Shared state every mode and feature sees.
pub struct RuntimeEnv {
    pub(crate) scheduler: TaskScheduler,
    pub(crate) time: FrameTime,
}

impl RuntimeEnv {
    pub(crate) fn new(scheduler: TaskScheduler) -> Self {
        Self {
            scheduler,
            time: FrameTime::default(),
        }
    }

    /// Starts a task; it is first stepped on the next task pass.
    pub fn start_task<T: Task>(&mut self, task: T) -> TaskHandle {
        self.scheduler.start(task)
    }

    pub fn stop_task(&mut self, handle: TaskHandle) -> Result<(), SchedulingFault> {
        self.scheduler.stop(handle)
    }

    pub fn task_state(&self, handle: TaskHandle) -> Option<TaskState> {
        self.scheduler.state(handle)
    }

    pub fn scheduler(&self) -> &TaskScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut TaskScheduler {
        &mut self.scheduler
    }

    pub fn pause_switch(&self) -> &PauseSwitch {
        self.scheduler.pause_switch()
    }

    /// Timing of the frame being processed.
    pub fn time(&self) -> FrameTime {
        self.time
    }
}

//=== FrameReport =========================================================

/// What happened during one runtime tick.
#[derive(Debug, Default)]
pub struct FrameReport {
    pub frame: u64,
    pub paused: bool,
    /// Tasks that faulted this frame.
    pub faults: Vec<SchedulingFault>,
    /// Tasks reaped this frame with their final state.
    pub finished: Vec<(TaskHandle, TaskState)>,
}

impl FrameReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn finished_state(&self, handle: TaskHandle) -> Option<TaskState> {
        self.finished
            .iter()
            .find(|(finished, _)| *finished == handle)
            .map(|(_, state)| *state)
    }
}
