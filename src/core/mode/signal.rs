//=========================================================================
// Mode Signals
//=========================================================================
//
// Typed channel from a mode to the stack that owns it.
//
// Each pushed mode gets its own channel. The stack keeps the receiver for
// as long as the mode is on the stack; dropping it on pop turns late
// signals into no-ops.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::rc::Rc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

//=== ModeSignal ==========================================================

/// Stack mutation requested by a mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeSignal {
    /// Pop this mode. Only honored when it is the top mode.
    Release,

    /// Notify the mode that the application is about to pause.
    /// The stack shape does not change.
    Suspend,
}

//=== SignalSender ========================================================

/// Sending side of a mode's signal channel.
///
/// Cheap to clone; owners of a mode can keep one to release it later.
#[derive(Debug, Clone)]
pub struct SignalSender {
    mode: Rc<str>,
    sender: Sender<ModeSignal>,
}

impl SignalSender {
    /// Name of the mode this channel belongs to.
    pub fn mode_name(&self) -> &str {
        &self.mode
    }

    /// Queues a signal for the owning stack.
    ///
    /// Returns false if the mode is no longer on a stack. That case is a
    /// tolerated no-op, never an error.
    pub fn send(&self, signal: ModeSignal) -> bool {
        match self.sender.send(signal) {
            Ok(()) => true,
            Err(_) => {
                debug!("Signal {:?} from '{}' ignored: mode is no longer stacked", signal, self.mode);
                false
            }
        }
    }

    /// Shorthand for `send(ModeSignal::Release)`.
    pub fn release(&self) -> bool {
        self.send(ModeSignal::Release)
    }

    /// Shorthand for `send(ModeSignal::Suspend)`.
    pub fn suspend(&self) -> bool {
        self.send(ModeSignal::Suspend)
    }
}

//=== Channel =============================================================

/// Creates the channel for a mode being pushed.
pub(super) fn channel(mode: &str) -> (SignalSender, Receiver<ModeSignal>) {
    let (sender, receiver) = unbounded();
    (
        SignalSender {
            mode: Rc::from(mode),
            sender,
        },
        receiver,
    )
}

//=========================================================================
// Tests
//=========================================================================
