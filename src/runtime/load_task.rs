//=========================================================================
// Load Barrier Task
//=========================================================================
//
// Drives a load group handle from the task scheduler: polls it once per
// frame and completes when the barrier fires.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::warn;

//=== Internal Dependencies ===============================================

use crate::core::loader::LoadGroupHandle;
use crate::core::task::{Step, Task, TaskContext, TaskFault};

//=== LoadBarrierTask =====================================================

/// Task that waits on a started load group.
///
/// By default a failed request leaves the task waiting forever, exactly
/// like the barrier itself. `fault_on_failure` turns the first failure
/// into a task fault so the driver can surface it.
pub struct LoadBarrierTask<A> {
    handle: LoadGroupHandle<A>,
    fault_on_failure: bool,
    warned: bool,
}

impl<A: 'static> LoadBarrierTask<A> {
    pub fn new(handle: LoadGroupHandle<A>) -> Self {
        Self {
            handle,
            fault_on_failure: false,
            warned: false,
        }
    }

    /// Raise a task fault as soon as any request fails.
    pub fn fault_on_failure(mut self) -> Self {
        self.fault_on_failure = true;
        self
    }
}

impl<A: 'static> Task for LoadBarrierTask<A> {
    fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
        if self.handle.poll() {
            return Ok(Step::Complete);
        }

        if let Some(failure) = self.handle.failures().first() {
            if self.fault_on_failure {
                return Err(TaskFault::with_source("Load group cannot complete", failure.clone()));
            }
            if !self.warned {
                self.warned = true;
                warn!(
                    "Load group stalled at {}/{}: a request failed",
                    self.handle.completed(),
                    self.handle.count()
                );
            }
        }

        Ok(Step::next_frame())
    }

    fn name(&self) -> &str {
        "load-barrier"
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::loader::{AssetProvider, LoadError, LoadGroup, LoadReply};
    use crate::core::task::TaskState;
    use crate::runtime::Runtime;

    /// Holds replies until the test resolves them.
    #[derive(Default)]
    struct Deferred {
        replies: Vec<LoadReply<u32>>,
    }

    impl AssetProvider<u32> for Deferred {
        fn load_async(&mut self, _name: &str, reply: LoadReply<u32>) {
            self.replies.push(reply);
        }
    }

    fn started(provider: &mut Deferred, names: &[&str]) -> LoadGroupHandle<u32> {
        let mut group = LoadGroup::new();
        for name in names {
            group.add(name);
        }
        group.start(provider).unwrap()
    }

    #[test]
    fn completes_once_every_reply_arrives() {
        let mut provider = Deferred::default();
        let handle = started(&mut provider, &["a", "b"]);
        let mut runtime = Runtime::new();
        let task = runtime.start_task(LoadBarrierTask::new(handle));

        runtime.step();
        assert_eq!(runtime.task_state(task), Some(TaskState::Suspended));

        for reply in provider.replies.drain(..) {
            reply.succeed(1);
        }

        let report = runtime.step();
        assert_eq!(report.finished_state(task), Some(TaskState::Completed));
    }

    #[test]
    fn failure_stalls_by_default() {
        let mut provider = Deferred::default();
        let handle = started(&mut provider, &["missing"]);
        let mut runtime = Runtime::new();
        let task = runtime.start_task(LoadBarrierTask::new(handle));

        for reply in provider.replies.drain(..) {
            reply.fail(LoadError::NotFound("missing".into()));
        }

        for _ in 0..3 {
            assert!(runtime.step().is_clean());
        }
        assert_eq!(runtime.task_state(task), Some(TaskState::Suspended));
    }

    #[test]
    fn failure_faults_when_requested() {
        let mut provider = Deferred::default();
        let handle = started(&mut provider, &["missing"]);
        let mut runtime = Runtime::new();
        let task = runtime.start_task(LoadBarrierTask::new(handle).fault_on_failure());

        for reply in provider.replies.drain(..) {
            reply.fail(LoadError::NotFound("missing".into()));
        }

        let report = runtime.step();
        assert_eq!(report.faults.len(), 1);
        assert_eq!(report.finished_state(task), Some(TaskState::Faulted));
    }
}
