//=========================================================================
// Task Scheduler
//=========================================================================
//
// Owns task trees and advances them under a shared pause switch.
//
// Handles are issued in start order. Terminal trees stay queryable until
// the driver calls `reap()`.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;

use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::tree::TaskTree;
use super::{Progress, SchedulingFault, Task, TaskHandle, TaskState};
use crate::core::clock::FrameTime;
use crate::core::pause::PauseSwitch;

//=== Constants ===========================================================

const DEFAULT_MAX_DEPTH: usize = 64;

//=== TaskScheduler =======================================================

/// Runs cooperative tasks and their nested children.
///
/// The scheduler never decides when a handle is advanced: the frame driver
/// calls [`TaskScheduler::advance`] once per frame for every live handle
/// whose last wait is satisfied.
pub struct TaskScheduler {
    pause: PauseSwitch,
    slots: HashMap<TaskHandle, TaskTree>,
    order: Vec<TaskHandle>,
    next_id: u64,
    max_depth: usize,
}

impl TaskScheduler {
    //--- Construction -----------------------------------------------------

    /// Creates a scheduler bound to the given pause switch.
    pub fn new(pause: PauseSwitch) -> Self {
        Self::with_max_depth(pause, DEFAULT_MAX_DEPTH)
    }

    /// Creates a scheduler with a custom nesting limit.
    ///
    /// # Panics
    ///
    /// Panics if `max_depth == 0`.
    pub fn with_max_depth(pause: PauseSwitch, max_depth: usize) -> Self {
        assert!(max_depth > 0, "Max nesting depth must be positive");
        Self {
            pause,
            slots: HashMap::new(),
            order: Vec::new(),
            next_id: 0,
            max_depth,
        }
    }

    //--- Accessors --------------------------------------------------------

    /// The pause switch every task of this scheduler honors.
    pub fn pause_switch(&self) -> &PauseSwitch {
        &self.pause
    }

    /// Maximum nesting depth of a single handle.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    //--- Lifecycle --------------------------------------------------------

    /// Registers a task. It is first stepped on the next `advance`.
    pub fn start<T: Task>(&mut self, task: T) -> TaskHandle {
        self.start_boxed(Box::new(task))
    }

    /// Registers an already boxed task.
    pub fn start_boxed(&mut self, task: Box<dyn Task>) -> TaskHandle {
        let handle = TaskHandle::from_raw(self.next_id);
        self.next_id += 1;

        debug!("Starting task '{}' as {:?}", task.name(), handle);
        self.slots.insert(handle, TaskTree::new(task));
        self.order.push(handle);
        handle
    }

    /// Cancels a task and every nested child immediately.
    ///
    /// Stopping a task that already finished is a no-op.
    pub fn stop(&mut self, handle: TaskHandle) -> Result<(), SchedulingFault> {
        let Some(tree) = self.slots.get_mut(&handle) else {
            warn!("Attempted to stop unknown task {:?}", handle);
            return Err(SchedulingFault::UnknownHandle(handle));
        };

        let cancelled = tree.cancel();
        if cancelled > 0 {
            debug!("Stopped task {:?} ({} levels cancelled)", handle, cancelled);
        }
        Ok(())
    }

    /// Cancels every live task.
    pub fn stop_all(&mut self) {
        for handle in self.live_handles() {
            if let Some(tree) = self.slots.get_mut(&handle) {
                tree.cancel();
            }
        }
    }

    //--- Advance ----------------------------------------------------------

    /// Advances a handle by one frame.
    ///
    /// Faults are returned to the caller and leave the handle `Faulted`;
    /// other handles are not affected.
    pub fn advance(&mut self, handle: TaskHandle, time: FrameTime) -> Result<Progress, SchedulingFault> {
        let Some(tree) = self.slots.get_mut(&handle) else {
            return Err(SchedulingFault::UnknownHandle(handle));
        };

        let progress = tree.advance(handle, &self.pause, time, self.max_depth)?;
        if let Progress::Completed = progress {
            debug!("Task {:?} completed", handle);
        }
        Ok(progress)
    }

    //--- Queries ----------------------------------------------------------

    /// Current state, or None if the handle is unknown or reaped.
    pub fn state(&self, handle: TaskHandle) -> Option<TaskState> {
        self.slots.get(&handle).map(|tree| tree.state())
    }

    /// Number of tasks currently in the handle's chain (root + nested).
    pub fn depth(&self, handle: TaskHandle) -> Option<usize> {
        self.slots.get(&handle).map(|tree| tree.depth())
    }

    /// Name of the handle's root task while it is alive.
    pub fn name(&self, handle: TaskHandle) -> Option<&str> {
        self.slots.get(&handle).and_then(|tree| tree.root_name())
    }

    /// Returns true if the handle exists and is not terminal.
    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.state(handle).is_some_and(|state| !state.is_terminal())
    }

    /// Non-terminal handles in start order.
    pub fn live_handles(&self) -> Vec<TaskHandle> {
        self.order
            .iter()
            .copied()
            .filter(|handle| self.is_active(*handle))
            .collect()
    }

    /// Number of handles, terminal ones included until reaped.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Returns true if no handles are held.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    //--- Cleanup ----------------------------------------------------------

    /// Drops terminal handles and returns their final states in start order.
    pub fn reap(&mut self) -> Vec<(TaskHandle, TaskState)> {
        let mut reaped = Vec::new();
        let slots = &mut self.slots;

        self.order.retain(|handle| {
            let terminal = slots.get(handle).map(|tree| tree.state()).filter(|s| s.is_terminal());
            match terminal {
                Some(state) => {
                    slots.remove(handle);
                    reaped.push((*handle, state));
                    false
                }
                None => slots.contains_key(handle),
            }
        });

        reaped
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::{Step, TaskContext, TaskFault, Wait};
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    /// Records every step and cancellation, nesting `child` on its first step.
    struct Probe {
        label: &'static str,
        steps: u32,
        taken: u32,
        child: Option<Box<dyn Task>>,
        log: Log,
    }

    impl Probe {
        fn new(label: &'static str, steps: u32, log: &Log) -> Self {
            Self { label, steps, taken: 0, child: None, log: Rc::clone(log) }
        }

        fn nesting(mut self, child: Probe) -> Self {
            self.child = Some(Box::new(child));
            self
        }
    }

    impl Task for Probe {
        fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
            if let Some(child) = self.child.take() {
                self.log.borrow_mut().push(format!("{}:nest", self.label));
                return Ok(Step::Nest(child));
            }
            if self.taken == self.steps {
                self.log.borrow_mut().push(format!("{}:done", self.label));
                return Ok(Step::Complete);
            }
            self.taken += 1;
            self.log.borrow_mut().push(format!("{}:{}", self.label, self.taken));
            Ok(Step::next_frame())
        }

        fn on_cancel(&mut self) {
            self.log.borrow_mut().push(format!("{}:cancel", self.label));
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    struct Failing;

    impl Task for Failing {
        fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
            Err(TaskFault::new("boom"))
        }
    }

    struct Recursive;

    impl Task for Recursive {
        fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
            Ok(Step::nest(Recursive))
        }
    }

    fn frame(n: u64) -> FrameTime {
        FrameTime { frame: n, ..FrameTime::default() }
    }

    fn entries(log: &Log) -> Vec<String> {
        log.borrow().clone()
    }

    #[test]
    fn start_does_not_step() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());

        let handle = scheduler.start(Probe::new("a", 1, &log));

        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.state(handle), Some(TaskState::Running));
        assert_eq!(scheduler.name(handle), Some("a"));
    }

    #[test]
    fn advance_runs_one_step_per_call() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let handle = scheduler.start(Probe::new("a", 2, &log));

        assert!(matches!(scheduler.advance(handle, frame(0)), Ok(Progress::Suspended(Wait::NextFrame))));
        assert_eq!(scheduler.state(handle), Some(TaskState::Suspended));
        assert!(matches!(scheduler.advance(handle, frame(1)), Ok(Progress::Suspended(_))));
        assert!(matches!(scheduler.advance(handle, frame(2)), Ok(Progress::Completed)));

        assert_eq!(entries(&log), vec!["a:1", "a:2", "a:done"]);
        assert_eq!(scheduler.state(handle), Some(TaskState::Completed));
    }

    #[test]
    fn nested_child_steps_in_same_advance() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let handle = scheduler.start(Probe::new("outer", 1, &log).nesting(Probe::new("inner", 1, &log)));

        scheduler.advance(handle, frame(0)).unwrap();
        assert_eq!(entries(&log), vec!["outer:nest", "inner:1"]);
        assert_eq!(scheduler.depth(handle), Some(2));
    }

    #[test]
    fn parent_waits_for_child_then_resumes_next_advance() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let handle = scheduler.start(Probe::new("outer", 1, &log).nesting(Probe::new("inner", 1, &log)));

        for n in 0..4 {
            scheduler.advance(handle, frame(n)).unwrap();
        }

        assert_eq!(
            entries(&log),
            vec!["outer:nest", "inner:1", "inner:done", "outer:1", "outer:done"]
        );
        assert_eq!(scheduler.state(handle), Some(TaskState::Completed));
    }

    #[test]
    fn paused_advance_does_nothing_and_loses_nothing() {
        let log = Log::default();
        let pause = PauseSwitch::new();
        let mut scheduler = TaskScheduler::new(pause.clone());
        let handle = scheduler.start(Probe::new("a", 3, &log));

        scheduler.advance(handle, frame(0)).unwrap();
        pause.set(true);
        for n in 1..5 {
            assert!(matches!(scheduler.advance(handle, frame(n)), Ok(Progress::Paused)));
        }
        assert_eq!(entries(&log), vec!["a:1"]);

        pause.set(false);
        scheduler.advance(handle, frame(5)).unwrap();
        scheduler.advance(handle, frame(6)).unwrap();
        assert_eq!(entries(&log), vec!["a:1", "a:2", "a:3"]);
    }

    #[test]
    fn task_pausing_mid_tree_freezes_nested_child() {
        struct PauseThenNest {
            done: bool,
            log: Log,
        }

        impl Task for PauseThenNest {
            fn step(&mut self, ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
                if self.done {
                    return Ok(Step::Complete);
                }
                self.done = true;
                ctx.pause_switch().set(true);
                Ok(Step::nest(Probe::new("child", 1, &self.log)))
            }
        }

        let log = Log::default();
        let pause = PauseSwitch::new();
        let mut scheduler = TaskScheduler::new(pause.clone());
        let handle = scheduler.start(PauseThenNest { done: false, log: Rc::clone(&log) });

        assert!(matches!(scheduler.advance(handle, frame(0)), Ok(Progress::Paused)));
        assert!(log.borrow().is_empty());
        assert_eq!(scheduler.depth(handle), Some(2));

        pause.set(false);
        scheduler.advance(handle, frame(1)).unwrap();
        assert_eq!(entries(&log), vec!["child:1"]);
    }

    #[test]
    fn stop_cancels_parent_and_child_immediately() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let handle = scheduler.start(Probe::new("outer", 1, &log).nesting(Probe::new("inner", 5, &log)));

        scheduler.advance(handle, frame(0)).unwrap();
        scheduler.stop(handle).unwrap();

        assert_eq!(entries(&log), vec!["outer:nest", "inner:1", "inner:cancel", "outer:cancel"]);
        assert_eq!(scheduler.state(handle), Some(TaskState::Cancelled));
        assert_eq!(scheduler.depth(handle), Some(0));

        assert!(matches!(scheduler.advance(handle, frame(1)), Ok(Progress::Cancelled)));
        assert_eq!(log.borrow().len(), 4);

        // Second stop is a no-op.
        scheduler.stop(handle).unwrap();
        assert_eq!(log.borrow().len(), 4);
    }

    #[test]
    fn stop_unknown_handle_is_an_error() {
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let err = scheduler.stop(TaskHandle::from_raw(42)).unwrap_err();
        assert!(matches!(err, SchedulingFault::UnknownHandle(_)));
    }

    #[test]
    fn fault_is_propagated_and_isolated() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let failing = scheduler.start(Failing);
        let good = scheduler.start(Probe::new("good", 2, &log));

        let err = scheduler.advance(failing, frame(0)).unwrap_err();
        assert!(matches!(err, SchedulingFault::Step { .. }));
        assert_eq!(scheduler.state(failing), Some(TaskState::Faulted));
        assert!(matches!(scheduler.advance(failing, frame(1)), Ok(Progress::Faulted)));

        scheduler.advance(good, frame(0)).unwrap();
        assert_eq!(scheduler.state(good), Some(TaskState::Suspended));
        assert_eq!(entries(&log), vec!["good:1"]);
    }

    #[test]
    fn nested_fault_cancels_ancestors() {
        struct NestFailing {
            log: Log,
            nested: bool,
        }

        impl Task for NestFailing {
            fn step(&mut self, _ctx: &mut TaskContext<'_>) -> Result<Step, TaskFault> {
                if self.nested {
                    return Ok(Step::Complete);
                }
                self.nested = true;
                Ok(Step::nest(Failing))
            }

            fn on_cancel(&mut self) {
                self.log.borrow_mut().push("parent:cancel".into());
            }
        }

        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let handle = scheduler.start(NestFailing { log: Rc::clone(&log), nested: false });

        assert!(scheduler.advance(handle, frame(0)).is_err());
        assert_eq!(entries(&log), vec!["parent:cancel"]);
        assert_eq!(scheduler.depth(handle), Some(0));
    }

    #[test]
    fn deep_nesting_hits_depth_limit_without_recursing() {
        let mut scheduler = TaskScheduler::with_max_depth(PauseSwitch::new(), 10_000);
        let handle = scheduler.start(Recursive);

        let err = scheduler.advance(handle, frame(0)).unwrap_err();
        assert!(matches!(err, SchedulingFault::DepthExceeded { limit: 10_000, .. }));
        assert_eq!(scheduler.state(handle), Some(TaskState::Faulted));
    }

    #[test]
    #[should_panic(expected = "Max nesting depth must be positive")]
    fn zero_depth_panics() {
        TaskScheduler::with_max_depth(PauseSwitch::new(), 0);
    }

    #[test]
    fn live_handles_and_reap() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let a = scheduler.start(Probe::new("a", 0, &log));
        let b = scheduler.start(Probe::new("b", 3, &log));
        let c = scheduler.start(Probe::new("c", 3, &log));

        scheduler.advance(a, frame(0)).unwrap();
        scheduler.stop(c).unwrap();

        assert_eq!(scheduler.live_handles(), vec![b]);
        assert_eq!(
            scheduler.reap(),
            vec![(a, TaskState::Completed), (c, TaskState::Cancelled)]
        );
        assert_eq!(scheduler.len(), 1);
        assert_eq!(scheduler.state(a), None);
        assert!(scheduler.is_active(b));
    }

    #[test]
    fn stop_all_cancels_every_live_task() {
        let log = Log::default();
        let mut scheduler = TaskScheduler::new(PauseSwitch::new());
        let a = scheduler.start(Probe::new("a", 3, &log));
        let b = scheduler.start(Probe::new("b", 3, &log));

        scheduler.stop_all();

        assert_eq!(scheduler.state(a), Some(TaskState::Cancelled));
        assert_eq!(scheduler.state(b), Some(TaskState::Cancelled));
        assert!(scheduler.live_handles().is_empty());
    }
}
