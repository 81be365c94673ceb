//=========================================================================
// Load Group
//=========================================================================
//
// Batch of named loads sharing one completion barrier.
//
// A group is built with `add`, then consumed by `start`, so requests can
// never be added after loading began. The returned handle is polled once
// per frame; its completion callback fires exactly once, when every
// tracked request has succeeded.
//
// A failed request is logged and never counted, so the barrier of a group
// with a failure does not fire. Owners inspect `failures()` to decide
// whether to retry, abort or fall back.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::collections::HashMap;
use std::fmt::Debug;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error};

//=== Internal Dependencies ===============================================

use super::{AssetProvider, LoadError, LoadEvent, LoadGroupError, LoadReply, Ticket};
use crate::core::config::NameResolver;

//=== Types ===============================================================

type ItemCallback<A> = Box<dyn FnOnce(A)>;
type CompletionCallback = Box<dyn FnOnce()>;

struct LoadRequest<A> {
    name: String,
    on_item: Option<ItemCallback<A>>,
}

//=== LoadGroup ===========================================================

/// Requests registered before loading starts.
pub struct LoadGroup<A> {
    requests: Vec<LoadRequest<A>>,
}

impl<A: 'static> LoadGroup<A> {
    pub fn new() -> Self {
        Self { requests: Vec::new() }
    }

    //--- Registration -----------------------------------------------------

    /// Registers a load with no per-item callback.
    pub fn add(&mut self, name: &str) -> &mut Self {
        self.push(name, None)
    }

    /// Registers a load whose callback receives the loaded asset.
    pub fn add_with<F>(&mut self, name: &str, on_item: F) -> &mut Self
    where
        F: FnOnce(A) + 'static,
    {
        self.push(name, Some(Box::new(on_item)))
    }

    /// Registers a load for a logical key resolved through `resolver`.
    pub fn add_resolved<K, R, F>(&mut self, resolver: &R, key: &K, on_item: F) -> Result<&mut Self, LoadGroupError>
    where
        K: Debug,
        R: NameResolver<K>,
        F: FnOnce(A) + 'static,
    {
        let Some(locator) = resolver.resolve(key) else {
            return Err(LoadGroupError::UnresolvedName(format!("{:?}", key)));
        };
        let locator = locator.to_owned();
        Ok(self.add_with(&locator, on_item))
    }

    fn push(&mut self, name: &str, on_item: Option<ItemCallback<A>>) -> &mut Self {
        self.requests.push(LoadRequest {
            name: name.to_owned(),
            on_item,
        });
        self
    }

    //--- Queries ----------------------------------------------------------

    /// Number of registered requests.
    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    //--- Start ------------------------------------------------------------

    /// Fires every request through the provider and returns the barrier handle.
    ///
    /// Fails with [`LoadGroupError::Empty`] when nothing was registered,
    /// since such a barrier could never fire.
    pub fn start<P>(self, provider: &mut P) -> Result<LoadGroupHandle<A>, LoadGroupError>
    where
        P: AssetProvider<A> + ?Sized,
    {
        if self.requests.is_empty() {
            return Err(LoadGroupError::Empty);
        }

        let (sender, receiver) = unbounded();
        let count = self.requests.len();
        let mut names = Vec::with_capacity(count);
        let mut callbacks = Vec::with_capacity(count);

        debug!("Starting load group with {} requests", count);
        for (index, request) in self.requests.into_iter().enumerate() {
            provider.load_async(&request.name, LoadReply::new(Ticket::Tracked(index), &request.name, sender.clone()));
            names.push(request.name);
            callbacks.push(request.on_item);
        }

        Ok(LoadGroupHandle {
            names,
            callbacks,
            completed: 0,
            failures: Vec::new(),
            on_completed: None,
            fired: false,
            sender,
            receiver,
            untracked: HashMap::new(),
            next_untracked: 0,
        })
    }
}

impl<A: 'static> Default for LoadGroup<A> {
    fn default() -> Self {
        Self::new()
    }
}

//=== LoadGroupHandle =====================================================

/// Barrier for a started load group.
pub struct LoadGroupHandle<A> {
    names: Vec<String>,
    callbacks: Vec<Option<ItemCallback<A>>>,
    completed: usize,
    failures: Vec<LoadError>,
    on_completed: Option<CompletionCallback>,
    fired: bool,
    sender: Sender<LoadEvent<A>>,
    receiver: Receiver<LoadEvent<A>>,
    untracked: HashMap<u64, ItemCallback<A>>,
    next_untracked: u64,
}

impl<A: 'static> LoadGroupHandle<A> {
    //--- Callbacks --------------------------------------------------------

    /// Sets the callback fired once when every request has succeeded.
    ///
    /// If the barrier already fired, the callback runs immediately.
    pub fn on_completed<F>(&mut self, callback: F) -> &mut Self
    where
        F: FnOnce() + 'static,
    {
        if self.fired {
            callback();
        } else {
            self.on_completed = Some(Box::new(callback));
        }
        self
    }

    /// Starts a load outside the barrier; it never affects completion.
    pub fn load_untracked<P, F>(&mut self, provider: &mut P, name: &str, on_loaded: F)
    where
        P: AssetProvider<A> + ?Sized,
        F: FnOnce(A) + 'static,
    {
        let id = self.next_untracked;
        self.next_untracked += 1;
        self.untracked.insert(id, Box::new(on_loaded));
        provider.load_async(name, LoadReply::new(Ticket::Untracked(id), name, self.sender.clone()));
    }

    //--- Poll -------------------------------------------------------------

    /// Applies every reply received since the last poll, in arrival order.
    ///
    /// Returns true once the barrier has fired.
    pub fn poll(&mut self) -> bool {
        while let Ok(event) = self.receiver.try_recv() {
            self.apply(event);
        }

        if self.is_done() && !self.fired {
            self.fired = true;
            debug!("Load group complete ({} assets)", self.count());
            if let Some(callback) = self.on_completed.take() {
                callback();
            }
        }

        self.fired
    }

    fn apply(&mut self, event: LoadEvent<A>) {
        match (event.ticket, event.result) {
            (Ticket::Tracked(index), Ok(asset)) => {
                if let Some(callback) = self.callbacks.get_mut(index).and_then(Option::take) {
                    callback(asset);
                }
                self.completed += 1;
                debug!("Loaded '{}' ({}/{})", event.name, self.completed, self.count());
            }
            (Ticket::Tracked(_), Err(err)) => {
                error!("Asset loading failure: {}", err);
                self.failures.push(err);
            }
            (Ticket::Untracked(id), Ok(asset)) => {
                if let Some(callback) = self.untracked.remove(&id) {
                    callback(asset);
                }
            }
            (Ticket::Untracked(id), Err(err)) => {
                self.untracked.remove(&id);
                error!("Asset loading failure: {}", err);
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// True iff at least one request exists and all have succeeded.
    pub fn is_done(&self) -> bool {
        self.count() > 0 && self.completed == self.count()
    }

    /// True once the completion callback has fired.
    pub fn is_finished(&self) -> bool {
        self.fired
    }

    /// Number of tracked requests.
    pub fn count(&self) -> usize {
        self.names.len()
    }

    /// Number of tracked requests that succeeded.
    pub fn completed(&self) -> usize {
        self.completed
    }

    /// Tracked requests that failed, in arrival order.
    pub fn failures(&self) -> &[LoadError] {
        &self.failures
    }

    /// Requested names in registration order.
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

//=========================================================================
// Tests
//=========================================================================
