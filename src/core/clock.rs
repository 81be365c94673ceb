//=========================================================================
// Frame Clock
//=========================================================================
//
// Per-frame time snapshot handed to tasks, modes and waits.
//
// The time source itself is external: the frame driver feeds deltas in
// and this type only accumulates them.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::time::Duration;

//=== FrameTime ===========================================================

/// Time information for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameTime {
    /// Index of the frame, starting at 0 for the first tick.
    pub frame: u64,

    /// Time since the previous frame.
    pub delta: Duration,

    /// Accumulated unpaused time.
    pub elapsed: Duration,
}

impl FrameTime {
    /// Returns the snapshot for the next frame.
    ///
    /// Paused frames still count but do not accumulate elapsed time.
    pub fn next(self, delta: Duration, paused: bool) -> Self {
        Self {
            frame: self.frame + 1,
            delta,
            elapsed: if paused { self.elapsed } else { self.elapsed + delta },
        }
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_accumulates_when_running() {
        let t = FrameTime::default().next(Duration::from_millis(16), false);
        let t = t.next(Duration::from_millis(16), false);

        assert_eq!(t.frame, 2);
        assert_eq!(t.elapsed, Duration::from_millis(32));
        assert_eq!(t.delta, Duration::from_millis(16));
    }

    #[test]
    fn paused_frames_do_not_accumulate() {
        let t = FrameTime::default()
            .next(Duration::from_millis(10), false)
            .next(Duration::from_millis(10), true);

        assert_eq!(t.frame, 2);
        assert_eq!(t.elapsed, Duration::from_millis(10));
    }
}
