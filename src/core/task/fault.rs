//=========================================================================
// Task Faults
//=========================================================================
//
// Error types raised by task steps and by the scheduler driving them.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::error::Error;
use std::fmt;

//=== Internal Dependencies ===============================================

use super::TaskHandle;

//=== TaskFault ===========================================================

/// Error returned by a task's own step.
#[derive(Debug)]
pub struct TaskFault {
    message: String,
    source: Option<Box<dyn Error + 'static>>,
}

impl TaskFault {
    /// Creates a fault with a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a fault wrapping an underlying error.
    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: Error + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// The fault message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for TaskFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for TaskFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source.as_deref()
    }
}

//=== SchedulingFault =====================================================

/// Errors reported to whoever drives a task handle.
#[derive(Debug)]
pub enum SchedulingFault {
    /// The handle was never issued by this scheduler or has been reaped.
    UnknownHandle(TaskHandle),

    /// A task step failed. The handle is now `Faulted`.
    Step {
        handle: TaskHandle,
        task: String,
        fault: TaskFault,
    },

    /// Nesting went deeper than the scheduler allows. The handle is now `Faulted`.
    DepthExceeded { handle: TaskHandle, limit: usize },
}

impl SchedulingFault {
    /// The handle the fault belongs to.
    pub fn handle(&self) -> TaskHandle {
        match self {
            Self::UnknownHandle(handle) => *handle,
            Self::Step { handle, .. } => *handle,
            Self::DepthExceeded { handle, .. } => *handle,
        }
    }
}

impl fmt::Display for SchedulingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownHandle(handle) => write!(f, "Unknown task handle {:?}", handle),
            Self::Step { handle, task, fault } => {
                write!(f, "Task '{}' ({:?}) faulted: {}", task, handle, fault)
            }
            Self::DepthExceeded { handle, limit } => {
                write!(f, "Task {:?} exceeded nesting depth {}", handle, limit)
            }
        }
    }
}

impl Error for SchedulingFault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Step { fault, .. } => Some(fault),
            _ => None,
        }
    }
}

//=========================================================================
// Tests
//=========================================================================
