//=========================================================================
// Loader
//=========================================================================
//
// Barrier-style coordination of named asynchronous loads.
//
// Architecture:
//   LoadGroup<A>  ──start(provider)──>  LoadGroupHandle<A>
//      add(name, on_item)                  poll() each frame
//                                            └─ Receiver<LoadEvent<A>>
//                                                     ↑
//   AssetProvider::load_async(name, LoadReply) ───────┘ (any thread)
//
// Loading itself is external. Replies are channelled back and applied on
// the frame thread during `poll`, in the order they were resolved.
//
//=========================================================================

//=== External Dependencies ===============================================

use crossbeam_channel::Sender;
use log::debug;

//=== Module Declarations =================================================

mod error;
mod load_group;

//=== Public API ==========================================================

pub use error::{LoadError, LoadGroupError};
pub use load_group::{LoadGroup, LoadGroupHandle};

//=== Asset Provider ======================================================

/// External async-load primitive.
///
/// Implementations start loading `name` and eventually resolve `reply`,
/// either inline or from another thread.
pub trait AssetProvider<A> {
    fn load_async(&mut self, name: &str, reply: LoadReply<A>);
}

//=== Load Events =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Ticket {
    /// Counts toward the barrier; index into the group's requests.
    Tracked(usize),

    /// Side load outside the barrier.
    Untracked(u64),
}

pub(crate) struct LoadEvent<A> {
    pub(crate) ticket: Ticket,
    pub(crate) name: String,
    pub(crate) result: Result<A, LoadError>,
}

//=== LoadReply ===========================================================

/// One-shot completion slot handed to an [`AssetProvider`].
///
/// Dropping a reply without resolving it reports [`LoadError::Dropped`].
pub struct LoadReply<A> {
    ticket: Ticket,
    name: String,
    sender: Option<Sender<LoadEvent<A>>>,
}

impl<A> LoadReply<A> {
    pub(crate) fn new(ticket: Ticket, name: &str, sender: Sender<LoadEvent<A>>) -> Self {
        Self {
            ticket,
            name: name.to_owned(),
            sender: Some(sender),
        }
    }

    /// Name the load was requested under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Delivers the result to the owning group.
    pub fn resolve(mut self, result: Result<A, LoadError>) {
        self.deliver(result);
    }

    /// Shorthand for `resolve(Ok(asset))`.
    pub fn succeed(self, asset: A) {
        self.resolve(Ok(asset));
    }

    /// Shorthand for `resolve(Err(error))`.
    pub fn fail(self, error: LoadError) {
        self.resolve(Err(error));
    }

    fn deliver(&mut self, result: Result<A, LoadError>) {
        let Some(sender) = self.sender.take() else {
            return;
        };

        let event = LoadEvent {
            ticket: self.ticket,
            name: std::mem::take(&mut self.name),
            result,
        };
        if sender.send(event).is_err() {
            debug!("Load group dropped before its reply arrived");
        }
    }
}

impl<A> Drop for LoadReply<A> {
    fn drop(&mut self) {
        if self.sender.is_some() {
            let name = self.name.clone();
            self.deliver(Err(LoadError::Dropped(name)));
        }
    }
}
