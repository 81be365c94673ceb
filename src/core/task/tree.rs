//=========================================================================
// Task Tree
//=========================================================================
//
// Explicit chain of nested tasks driven by an iterative trampoline.
//
// Each task owns at most one active child, so the tree of a handle is a
// chain from root to leaf. Only the leaf is ever stepped.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::{Progress, SchedulingFault, Step, Task, TaskContext, TaskHandle, TaskState, Wait};
use crate::core::clock::FrameTime;
use crate::core::pause::PauseSwitch;

//=== TaskTree ============================================================

pub(super) struct TaskTree {
    chain: Vec<Box<dyn Task>>,
    state: TaskState,
}

impl TaskTree {
    pub(super) fn new(root: Box<dyn Task>) -> Self {
        Self {
            chain: vec![root],
            state: TaskState::Running,
        }
    }

    pub(super) fn state(&self) -> TaskState {
        self.state
    }

    pub(super) fn depth(&self) -> usize {
        self.chain.len()
    }

    pub(super) fn root_name(&self) -> Option<&str> {
        self.chain.first().map(|task| task.name())
    }

    //--- Advance ----------------------------------------------------------

    /// Steps the leaf until it yields, completes, or the switch is paused.
    ///
    /// Nesting loops here instead of recursing, so depth only costs a Vec slot.
    pub(super) fn advance(
        &mut self,
        handle: TaskHandle,
        pause: &PauseSwitch,
        time: FrameTime,
        max_depth: usize,
    ) -> Result<Progress, SchedulingFault> {
        match self.state {
            TaskState::Completed => return Ok(Progress::Completed),
            TaskState::Cancelled => return Ok(Progress::Cancelled),
            TaskState::Faulted => return Ok(Progress::Faulted),
            TaskState::Running | TaskState::Suspended => {}
        }

        loop {
            if pause.is_paused() {
                return Ok(Progress::Paused);
            }

            let depth = self.chain.len();
            let Some(leaf) = self.chain.last_mut() else {
                self.state = TaskState::Completed;
                return Ok(Progress::Completed);
            };

            let mut ctx = TaskContext::new(pause, time, handle, depth);
            let step = match leaf.step(&mut ctx) {
                Ok(step) => step,
                Err(fault) => {
                    let task = leaf.name().to_owned();
                    error!("Task '{}' ({:?}) faulted at depth {}: {}", task, handle, depth, fault);
                    self.chain.pop();
                    self.abort(TaskState::Faulted);
                    return Err(SchedulingFault::Step { handle, task, fault });
                }
            };

            match step {
                Step::Nest(child) => {
                    if depth >= max_depth {
                        error!("Task {:?} exceeded nesting depth {}", handle, max_depth);
                        drop(child);
                        self.abort(TaskState::Faulted);
                        return Err(SchedulingFault::DepthExceeded { handle, limit: max_depth });
                    }

                    debug!("Task {:?} nested '{}' at depth {}", handle, child.name(), depth + 1);
                    self.chain.push(child);
                    self.state = TaskState::Running;
                }
                Step::Yield(wait) => {
                    self.state = TaskState::Suspended;
                    return Ok(Progress::Suspended(wait));
                }
                Step::Complete => {
                    self.chain.pop();
                    if self.chain.is_empty() {
                        self.state = TaskState::Completed;
                        return Ok(Progress::Completed);
                    }

                    // Parent picks up on the next advance.
                    self.state = TaskState::Running;
                    return Ok(Progress::Suspended(Wait::NextFrame));
                }
            }
        }
    }

    //--- Cancellation -----------------------------------------------------

    /// Cancels every task in the chain, leaf first.
    ///
    /// Returns the number of tasks that received `on_cancel`.
    pub(super) fn cancel(&mut self) -> usize {
        if self.state.is_terminal() {
            return 0;
        }

        self.abort(TaskState::Cancelled)
    }

    fn abort(&mut self, state: TaskState) -> usize {
        let mut cancelled = 0;
        while let Some(mut task) = self.chain.pop() {
            task.on_cancel();
            cancelled += 1;
        }
        self.state = state;
        cancelled
    }
}
