//=========================================================================
// Features
//=========================================================================
//
// Flat list of independently ticked units owned by a mode.
//
// Features sit outside the push/pop discipline of the mode stack. They
// are ticked in insertion order once per frame and may finish themselves
// mid-tick; removal is deferred until the whole list has been ticked.
//
//=========================================================================

//=== External Dependencies ===============================================

use log::debug;

//=== Feature Trait =======================================================

/// Independently ticked unit owned by a mode.
pub trait Feature<E>: 'static {
    /// Called once when the feature is added to a set.
    fn initialize(&mut self, _env: &mut E) {}

    /// Called every frame while the feature is runnable.
    fn tick(&mut self, ctx: &mut FeatureContext<'_, E>);

    /// Called once when the feature is removed.
    fn terminate(&mut self, _env: &mut E) {}

    /// If true, the feature is skipped until [`FeatureSet::run`] is called.
    fn wait_for_run(&self) -> bool {
        false
    }
}

//=== FeatureContext ======================================================

/// Per-tick context handed to a feature.
pub struct FeatureContext<'a, E> {
    env: &'a mut E,
    key: &'a str,
    finished: bool,
}

impl<'a, E> FeatureContext<'a, E> {
    pub fn env(&self) -> &E {
        self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        self.env
    }

    /// Key the feature was registered under.
    pub fn key(&self) -> &str {
        self.key
    }

    /// Detaches and terminates this feature once the current tick ends.
    pub fn finish(&mut self) {
        self.finished = true;
    }
}

//=== FeatureSet ==========================================================

struct FeatureSlot<E> {
    key: String,
    feature: Box<dyn Feature<E>>,
    wait_for_run: bool,
    running: bool,
    finished: bool,
}

/// Ordered, keyed collection of features.
pub struct FeatureSet<E> {
    slots: Vec<FeatureSlot<E>>,
}

impl<E: 'static> FeatureSet<E> {
    pub fn new() -> Self {
        Self { slots: Vec::new() }
    }

    //--- Membership -------------------------------------------------------

    /// Adds and initializes a feature.
    ///
    /// Adding a key that is already present is a no-op and returns false.
    pub fn add<F: Feature<E>>(&mut self, key: &str, feature: F, env: &mut E) -> bool {
        if self.contains(key) {
            debug!("Feature '{}' already present, skipping add", key);
            return false;
        }

        let mut feature: Box<dyn Feature<E>> = Box::new(feature);
        feature.initialize(env);

        debug!("Added feature '{}'", key);
        self.slots.push(FeatureSlot {
            key: key.to_owned(),
            wait_for_run: feature.wait_for_run(),
            feature,
            running: false,
            finished: false,
        });
        true
    }

    /// Marks a feature as running, enabling ticks for wait-for-run features.
    ///
    /// Returns false if no feature has this key.
    pub fn run(&mut self, key: &str) -> bool {
        match self.slot_mut(key) {
            Some(slot) => {
                slot.running = true;
                true
            }
            None => false,
        }
    }

    /// Removes and terminates a feature immediately.
    ///
    /// Returns false if no feature has this key.
    pub fn finish(&mut self, key: &str, env: &mut E) -> bool {
        let Some(pos) = self.slots.iter().position(|slot| slot.key == key) else {
            return false;
        };

        let mut slot = self.slots.remove(pos);
        slot.feature.terminate(env);
        debug!("Finished feature '{}'", key);
        true
    }

    /// Terminates every feature in insertion order and empties the set.
    pub fn terminate_all(&mut self, env: &mut E) {
        for mut slot in self.slots.drain(..) {
            slot.feature.terminate(env);
        }
    }

    //--- Queries ----------------------------------------------------------

    pub fn contains(&self, key: &str) -> bool {
        self.slots.iter().any(|slot| slot.key == key)
    }

    pub fn is_running(&self, key: &str) -> bool {
        self.slots.iter().any(|slot| slot.key == key && slot.running)
    }

    /// Keys in insertion order.
    pub fn keys(&self) -> Vec<&str> {
        self.slots.iter().map(|slot| slot.key.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    //--- Tick -------------------------------------------------------------

    /// Ticks runnable features in insertion order, then drops finished ones.
    pub fn tick(&mut self, env: &mut E) {
        let count = self.slots.len();

        for slot in self.slots.iter_mut().take(count) {
            if slot.finished || (slot.wait_for_run && !slot.running) {
                continue;
            }

            let mut ctx = FeatureContext {
                env: &mut *env,
                key: &slot.key,
                finished: false,
            };
            slot.feature.tick(&mut ctx);
            if ctx.finished {
                slot.finished = true;
            }
        }

        self.sweep(env);
    }

    fn sweep(&mut self, env: &mut E) {
        if !self.slots.iter().any(|slot| slot.finished) {
            return;
        }

        let (finished, kept): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.slots).into_iter().partition(|slot| slot.finished);
        self.slots = kept;

        for mut slot in finished {
            slot.feature.terminate(env);
            debug!("Feature '{}' finished itself", slot.key);
        }
    }

    fn slot_mut(&mut self, key: &str) -> Option<&mut FeatureSlot<E>> {
        self.slots.iter_mut().find(|slot| slot.key == key)
    }
}

impl<E: 'static> Default for FeatureSet<E> {
    fn default() -> Self {
        Self::new()
    }
}

//=========================================================================
// Tests
//=========================================================================
