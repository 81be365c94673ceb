//=========================================================================
// Pause Switch
//=========================================================================
//
// Shared pause flag with change notification.
//
// Architecture:
//   PauseSwitch (cheap clone)
//     └─ Rc<PauseState>
//          ├─ paused: Cell<bool>
//          └─ subscribers: RefCell<Vec<(SubscriptionId, Callback)>>
//
// Every clone observes the same flag. Subscribers are notified only when
// the value actually changes, never on reads.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use log::debug;

//=== Subscription Id =====================================================

/// Identifies a subscriber registered with [`PauseSwitch::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type PauseCallback = Box<dyn FnMut(bool)>;

//=== Internal State ======================================================

struct PauseState {
    paused: Cell<bool>,
    subscribers: RefCell<Vec<(SubscriptionId, PauseCallback)>>,
    next_id: Cell<u64>,
    notifying: Cell<bool>,
    in_flight: RefCell<Vec<SubscriptionId>>,
    pending_removals: RefCell<Vec<SubscriptionId>>,
}

//=== PauseSwitch =========================================================

/// Process-wide pause flag, injected into schedulers and tasks.
///
/// Cloning a switch yields another handle to the same flag, which lets the
/// single writer (whoever pauses the application) and many readers share
/// state without a global. Independent switches are independent flags.
///
/// The switch is single-threaded (`!Send`); the frame thread owns it.
#[derive(Clone)]
pub struct PauseSwitch {
    state: Rc<PauseState>,
}

impl PauseSwitch {
    //--- Construction -----------------------------------------------------

    /// Creates an unpaused switch with no subscribers.
    pub fn new() -> Self {
        Self::with_initial(false)
    }

    /// Creates a switch with the given initial value.
    ///
    /// No notification is sent for the initial value.
    pub fn with_initial(paused: bool) -> Self {
        Self {
            state: Rc::new(PauseState {
                paused: Cell::new(paused),
                subscribers: RefCell::new(Vec::new()),
                next_id: Cell::new(0),
                notifying: Cell::new(false),
                in_flight: RefCell::new(Vec::new()),
                pending_removals: RefCell::new(Vec::new()),
            }),
        }
    }

    //--- Query ------------------------------------------------------------

    /// Returns the current value.
    pub fn is_paused(&self) -> bool {
        self.state.paused.get()
    }

    /// Returns the number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.state.subscribers.borrow().len()
    }

    /// Returns true if both handles refer to the same flag.
    pub fn shares_state_with(&self, other: &PauseSwitch) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }

    //--- Mutation ---------------------------------------------------------

    /// Sets the flag, notifying subscribers if the value changed.
    ///
    /// A change made by a subscriber is announced once the current round
    /// of notifications has finished. Returns true if the value changed.
    pub fn set(&self, paused: bool) -> bool {
        if self.state.paused.get() == paused {
            return false;
        }

        self.state.paused.set(paused);
        debug!("Pause switch changed to {}", paused);
        self.notify(paused);
        true
    }

    /// Flips the flag and returns the new value.
    pub fn toggle(&self) -> bool {
        let next = !self.is_paused();
        self.set(next);
        next
    }

    //--- Subscribers ------------------------------------------------------

    /// Registers a callback invoked with the new value on every change.
    ///
    /// A subscriber added while a notification is in flight first hears
    /// about the next change.
    pub fn subscribe<F>(&self, callback: F) -> SubscriptionId
    where
        F: FnMut(bool) + 'static,
    {
        let id = SubscriptionId(self.state.next_id.get());
        self.state.next_id.set(id.0 + 1);
        self.state
            .subscribers
            .borrow_mut()
            .push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber.
    ///
    /// Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.state.subscribers.borrow_mut();
        if let Some(pos) = subscribers.iter().position(|(sid, _)| *sid == id) {
            drop(subscribers.remove(pos));
            return true;
        }

        // The in-flight batch is detached from the list during notify.
        let detached = self.state.in_flight.borrow().contains(&id);
        let mut removals = self.state.pending_removals.borrow_mut();
        if detached && !removals.contains(&id) {
            removals.push(id);
            return true;
        }

        false
    }

    //--- Internal Helpers -------------------------------------------------

    fn notify(&self, paused: bool) {
        if self.state.notifying.get() {
            debug!("Pause switch changed to {} during notification; announcing after this round", paused);
            return;
        }

        self.state.notifying.set(true);
        let mut announced = paused;

        loop {
            // Callbacks may subscribe, unsubscribe or read the flag, so the
            // list is detached while they run.
            let mut batch = std::mem::take(&mut *self.state.subscribers.borrow_mut());
            *self.state.in_flight.borrow_mut() = batch.iter().map(|(id, _)| *id).collect();

            for (id, callback) in batch.iter_mut() {
                if self.state.pending_removals.borrow().contains(id) {
                    continue;
                }
                callback(announced);
            }

            self.reattach(batch);

            let current = self.state.paused.get();
            if current == announced {
                break;
            }
            announced = current;
        }

        self.state.notifying.set(false);
    }

    /// Puts a notified batch back ahead of subscribers added meanwhile.
    fn reattach(&self, mut batch: Vec<(SubscriptionId, PauseCallback)>) {
        self.state.in_flight.borrow_mut().clear();

        let removals = std::mem::take(&mut *self.state.pending_removals.borrow_mut());
        batch.retain(|(id, _)| !removals.contains(id));

        let mut subscribers = self.state.subscribers.borrow_mut();
        let added = std::mem::take(&mut *subscribers);
        *subscribers = batch;
        subscribers.extend(added);
    }
}

impl Default for PauseSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PauseSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PauseSwitch")
            .field("paused", &self.is_paused())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

//=========================================================================
// Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder(switch: &PauseSwitch) -> (Rc<RefCell<Vec<bool>>>, SubscriptionId) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&log);
        let id = switch.subscribe(move |value| sink.borrow_mut().push(value));
        (log, id)
    }

    #[test]
    fn new_switch_is_unpaused() {
        let switch = PauseSwitch::new();
        assert!(!switch.is_paused());
        assert_eq!(switch.subscriber_count(), 0);
    }

    #[test]
    fn notifies_only_on_change() {
        let switch = PauseSwitch::new();
        let (log, _) = recorder(&switch);

        assert!(switch.set(true));
        assert!(!switch.set(true));
        assert!(switch.set(false));
        assert!(!switch.set(false));

        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn reads_do_not_notify() {
        let switch = PauseSwitch::new();
        let (log, _) = recorder(&switch);

        for _ in 0..5 {
            let _ = switch.is_paused();
        }

        assert!(log.borrow().is_empty());
    }

    #[test]
    fn clones_share_the_flag() {
        let writer = PauseSwitch::new();
        let reader = writer.clone();

        writer.set(true);

        assert!(reader.is_paused());
        assert!(reader.shares_state_with(&writer));
        assert!(!reader.shares_state_with(&PauseSwitch::new()));
    }

    #[test]
    fn toggle_flips_and_notifies() {
        let switch = PauseSwitch::new();
        let (log, _) = recorder(&switch);

        assert!(switch.toggle());
        assert!(!switch.toggle());
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn unsubscribe_stops_notifications() {
        let switch = PauseSwitch::new();
        let (log, id) = recorder(&switch);

        switch.set(true);
        assert!(switch.unsubscribe(id));
        assert!(!switch.unsubscribe(id));
        switch.set(false);

        assert_eq!(*log.borrow(), vec![true]);
    }

    #[test]
    fn callback_can_read_new_value() {
        let switch = PauseSwitch::new();
        let observed = Rc::new(Cell::new(false));
        let reader = switch.clone();
        let sink = Rc::clone(&observed);
        switch.subscribe(move |_| sink.set(reader.is_paused()));

        switch.set(true);

        assert!(observed.get());
    }

    #[test]
    fn subscriber_added_during_notify_hears_next_change() {
        let switch = PauseSwitch::new();
        let late = Rc::new(RefCell::new(Vec::new()));

        let handle = switch.clone();
        let late_sink = Rc::clone(&late);
        let mut added = false;
        switch.subscribe(move |_| {
            if !added {
                added = true;
                let sink = Rc::clone(&late_sink);
                handle.subscribe(move |value| sink.borrow_mut().push(value));
            }
        });

        switch.set(true);
        assert!(late.borrow().is_empty());
        assert_eq!(switch.subscriber_count(), 2);

        switch.set(false);
        assert_eq!(*late.borrow(), vec![false]);
    }

    #[test]
    fn subscriber_can_unsubscribe_itself() {
        let switch = PauseSwitch::new();
        let calls = Rc::new(Cell::new(0));
        let own_id: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        let handle = switch.clone();
        let counter = Rc::clone(&calls);
        let id_slot = Rc::clone(&own_id);
        let id = switch.subscribe(move |_| {
            counter.set(counter.get() + 1);
            if let Some(id) = id_slot.get() {
                handle.unsubscribe(id);
            }
        });
        own_id.set(Some(id));

        switch.set(true);
        switch.set(false);

        assert_eq!(calls.get(), 1);
        assert_eq!(switch.subscriber_count(), 0);
    }

    #[test]
    fn change_made_by_subscriber_is_announced_after_round() {
        let switch = PauseSwitch::new();
        let handle = switch.clone();
        switch.subscribe(move |paused| {
            if paused {
                handle.set(false);
            }
        });
        let (log, _) = recorder(&switch);

        assert!(switch.set(true));

        assert!(!switch.is_paused());
        assert_eq!(*log.borrow(), vec![true, false]);
    }

    #[test]
    fn unsubscribe_during_notify_rejects_unknown_ids() {
        let switch = PauseSwitch::new();
        let (log, other) = recorder(&switch);
        let results = Rc::new(RefCell::new(Vec::new()));

        let handle = switch.clone();
        let sink = Rc::clone(&results);
        switch.subscribe(move |_| {
            let mut sink = sink.borrow_mut();
            sink.push(handle.unsubscribe(SubscriptionId(99)));
            sink.push(handle.unsubscribe(other));
            sink.push(handle.unsubscribe(other));
        });

        switch.set(true);

        assert_eq!(*results.borrow(), vec![false, true, false]);
        assert_eq!(*log.borrow(), vec![true]);
        assert_eq!(switch.subscriber_count(), 1);
    }

    #[test]
    fn subscriber_removed_mid_round_is_skipped() {
        let switch = PauseSwitch::new();
        let target: Rc<Cell<Option<SubscriptionId>>> = Rc::new(Cell::new(None));

        let handle = switch.clone();
        let slot = Rc::clone(&target);
        switch.subscribe(move |_| {
            if let Some(id) = slot.get() {
                handle.unsubscribe(id);
            }
        });
        let (log, id) = recorder(&switch);
        target.set(Some(id));

        switch.set(true);

        assert!(log.borrow().is_empty());
        assert_eq!(switch.subscriber_count(), 1);
    }
}
