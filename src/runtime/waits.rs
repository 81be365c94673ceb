//=========================================================================
// Wait Tracker
//=========================================================================
//
// Driver-side bookkeeping for suspension signals yielded by tasks.
//
// The scheduler hands waits back untouched; this tracker decides, frame
// by frame, when each handle may be advanced again. Paused frames never
// count toward a wait.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::time::Duration;

//=== Internal Dependencies ===============================================

use crate::core::clock::FrameTime;
use crate::core::task::{TaskHandle, Wait};

//=== PendingWait =========================================================

enum PendingWait {
    NextFrame,
    Frames(u32),
    Seconds(Duration),
    Until(Box<dyn FnMut() -> bool>),
}

impl From<Wait> for PendingWait {
    fn from(wait: Wait) -> Self {
        match wait {
            Wait::NextFrame => Self::NextFrame,
            Wait::Frames(n) => Self::Frames(n),
            Wait::Seconds(d) => Self::Seconds(d),
            Wait::Until(predicate) => Self::Until(predicate),
        }
    }
}

impl PendingWait {
    /// Consumes one unpaused frame; returns true once satisfied.
    fn poll(&mut self, time: FrameTime) -> bool {
        match self {
            Self::NextFrame => true,
            Self::Frames(remaining) => {
                *remaining = remaining.saturating_sub(1);
                *remaining == 0
            }
            Self::Seconds(remaining) => {
                *remaining = remaining.saturating_sub(time.delta);
                remaining.is_zero()
            }
            Self::Until(predicate) => predicate(),
        }
    }
}

//=== WaitTracker =========================================================

#[derive(Default)]
pub(crate) struct WaitTracker {
    pending: HashMap<TaskHandle, PendingWait>,
}

impl WaitTracker {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records the wait a handle yielded this frame.
    pub(crate) fn insert(&mut self, handle: TaskHandle, wait: Wait) {
        self.pending.insert(handle, wait.into());
    }

    pub(crate) fn remove(&mut self, handle: TaskHandle) {
        self.pending.remove(&handle);
    }

    pub(crate) fn clear(&mut self) {
        self.pending.clear();
    }

    #[cfg(test)]
    pub(crate) fn is_waiting(&self, handle: TaskHandle) -> bool {
        self.pending.contains_key(&handle)
    }

    /// Returns true if the handle may be advanced this frame.
    ///
    /// Handles with no pending wait are always ready. While paused no wait
    /// makes progress.
    pub(crate) fn ready(&mut self, handle: TaskHandle, time: FrameTime, paused: bool) -> bool {
        let Some(wait) = self.pending.get_mut(&handle) else {
            return true;
        };

        if paused || !wait.poll(time) {
            return false;
        }

        self.pending.remove(&handle);
        true
    }
}

//=========================================================================
// Tests
//=========================================================================
