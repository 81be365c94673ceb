//=========================================================================
// Task Helpers
//=========================================================================
//
// Small building blocks for composing tasks without a dedicated type.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::VecDeque;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use super::{secs_to_duration, Step, Task, TaskContext, TaskFault, Wait};

//=== TaskFn ==============================================================

/// Task driven by a closure, called once per step.
pub struct TaskFn<F> {
    name: &'static str,
    body: F,
}

/// Wraps a closure as a task.
///
/// ```rust
/// # use frame_harness::prelude::*;
/// let mut frames = 0;
/// let task = task_fn("count", move |_ctx| {
///     frames += 1;
///     Ok(if frames < 3 { Step::next_frame() } else { Step::Complete })
/// });
/// ```
pub fn task_fn<F>(name: &'static str, body: F) -> TaskFn<F>
where
    F: FnMut(&mut TaskContext<'_>) -> Result<Step, TaskFault> + 'static,
{
    TaskFn { name, body }
}

impl<F> Task for TaskFn<F>
where
    F: FnMut(&mut TaskContext<'_>) -> Result<Step, TaskFault> + 'static,
{
    fn step(&mut self, ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
        (self.body)(ctx)
    }

    fn name(&self) -> &str {
        self.name
    }
}

//=== Sequence ============================================================

/// Runs child tasks one after another, each as a nested task.
pub struct Sequence {
    remaining: VecDeque<Box<dyn Task>>,
}

impl Sequence {
    pub fn new() -> Self {
        Self { remaining: VecDeque::new() }
    }

    /// Appends a task to the sequence.
    pub fn then<T: Task>(mut self, task: T) -> Self {
        self.remaining.push_back(Box::new(task));
        self
    }

    /// Number of tasks not yet started.
    pub fn len(&self) -> usize {
        self.remaining.len()
    }

    pub fn is_empty(&self) -> bool {
        self.remaining.is_empty()
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new()
    }
}

impl Task for Sequence {
    fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
        match self.remaining.pop_front() {
            Some(next) => Ok(Step::Nest(next)),
            None => Ok(Step::Complete),
        }
    }

    fn on_cancel(&mut self) {
        self.remaining.clear();
    }

    fn name(&self) -> &str {
        "sequence"
    }
}

//=== Delay ===============================================================

/// Waits for a fixed amount of unpaused time, then completes.
pub struct Delay {
    duration: Duration,
    started: bool,
}

impl Delay {
    pub fn new(duration: Duration) -> Self {
        Self { duration, started: false }
    }

    pub fn secs(secs: f32) -> Self {
        Self::new(secs_to_duration(secs))
    }
}

impl Task for Delay {
    fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
        if self.started {
            return Ok(Step::Complete);
        }
        self.started = true;
        Ok(Step::Yield(Wait::Seconds(self.duration)))
    }

    fn name(&self) -> &str {
        "delay"
    }
}

//=========================================================================
// Tests
//=========================================================================
