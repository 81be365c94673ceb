//=========================================================================
// Mode Stack
//=========================================================================
//
// LIFO stack of modes; only the top one is ticked.
//
// Modes own their arguments and features. The stack holds the receiving
// end of each mode's signal channel and mutates itself only in response
// to a `Release` coming from the current top.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::marker::PhantomData;

use crossbeam_channel::Receiver;
use log::{debug, warn};

//=== Internal Dependencies ===============================================

use super::signal::{self, ModeSignal, SignalSender};
use super::{FeatureSet, Mode, ModeContext};

//=== Type-Erased Mode ====================================================

/// Object-safe view of a mode bound to its arguments.
trait StackedMode<E> {
    fn name(&self) -> &str;
    fn initialize(&mut self, ctx: &mut ModeContext<'_, E>);
    fn run(&mut self, ctx: &mut ModeContext<'_, E>);
    fn tick(&mut self, ctx: &mut ModeContext<'_, E>);
    fn on_suspend(&mut self, ctx: &mut ModeContext<'_, E>);
    fn terminate(&mut self, env: &mut E);
}

struct Bound<M: Mode<E>, E> {
    mode: M,
    args: M::Args,
    _env: PhantomData<fn(&mut E)>,
}

impl<M: Mode<E>, E> StackedMode<E> for Bound<M, E> {
    fn name(&self) -> &str {
        self.mode.name()
    }

    fn initialize(&mut self, ctx: &mut ModeContext<'_, E>) {
        self.mode.initialize(&self.args, ctx);
    }

    fn run(&mut self, ctx: &mut ModeContext<'_, E>) {
        self.mode.run(&self.args, ctx);
    }

    fn tick(&mut self, ctx: &mut ModeContext<'_, E>) {
        self.mode.tick(&self.args, ctx);
    }

    fn on_suspend(&mut self, ctx: &mut ModeContext<'_, E>) {
        self.mode.on_suspend(&self.args, ctx);
    }

    fn terminate(&mut self, env: &mut E) {
        self.mode.terminate(&self.args, env);
    }
}

//=== Mode Entry ==========================================================

struct ModeEntry<E> {
    mode: Box<dyn StackedMode<E>>,
    sender: SignalSender,
    receiver: Receiver<ModeSignal>,
    features: FeatureSet<E>,
}

impl<E: 'static> ModeEntry<E> {
    fn with_context<R>(&mut self, env: &mut E, hook: impl FnOnce(&mut dyn StackedMode<E>, &mut ModeContext<'_, E>) -> R) -> R {
        let mut ctx = ModeContext::new(env, &self.sender, &mut self.features);
        hook(self.mode.as_mut(), &mut ctx)
    }

    /// Terminates the mode, then its features. The receiver is dropped with the entry.
    fn terminate(mut self, env: &mut E) {
        self.mode.terminate(env);
        self.features.terminate_all(env);
    }
}

//=== ModeStack ===========================================================

/// Stack of modes where only the top mode receives ticks.
///
/// `E` is the environment modes are ticked with: whatever the owner wants
/// to share with them (a task scheduler, services, a parent's data).
pub struct ModeStack<E> {
    entries: Vec<ModeEntry<E>>,
}

impl<E: 'static> ModeStack<E> {
    //--- Construction -----------------------------------------------------

    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    //--- Stack Operations -------------------------------------------------

    /// Pushes a mode on top and initializes it with its arguments.
    ///
    /// Returns a sender for the mode's signal channel, which the owner may
    /// keep to release the mode later.
    pub fn push<M: Mode<E>>(&mut self, mode: M, args: M::Args, env: &mut E) -> SignalSender {
        let (sender, receiver) = signal::channel(mode.name());
        debug!("Pushing mode '{}' at depth {}", mode.name(), self.entries.len());

        self.entries.push(ModeEntry {
            mode: Box::new(Bound { mode, args, _env: PhantomData }),
            sender: sender.clone(),
            receiver,
            features: FeatureSet::new(),
        });

        if let Some(top) = self.entries.last_mut() {
            top.with_context(env, |mode, ctx| mode.initialize(ctx));
        }

        sender
    }

    /// Invokes `run` on the top mode.
    ///
    /// Returns false if the stack is empty.
    pub fn run_top(&mut self, env: &mut E) -> bool {
        let Some(top) = self.entries.last_mut() else {
            debug!("run_top on empty mode stack ignored");
            return false;
        };

        debug!("Running mode '{}'", top.mode.name());
        top.with_context(env, |mode, ctx| mode.run(ctx));
        true
    }

    /// Terminates every mode from top to bottom, leaving the stack empty.
    pub fn terminate(&mut self, env: &mut E) {
        if !self.entries.is_empty() {
            debug!("Terminating mode stack ({} modes)", self.entries.len());
        }

        while let Some(entry) = self.entries.pop() {
            debug!("Terminating mode '{}'", entry.mode.name());
            entry.terminate(env);
        }
    }

    //--- Update Loop ------------------------------------------------------

    /// Ticks the top mode, then its features, then applies signals.
    ///
    /// Signals queued since the last tick are applied first, so a release
    /// sent between frames takes effect before anything is ticked.
    pub fn tick(&mut self, env: &mut E) {
        self.process_signals(env);

        let Some(top) = self.entries.last_mut() else {
            return;
        };

        top.with_context(env, |mode, ctx| mode.tick(ctx));
        top.features.tick(env);

        self.process_signals(env);
    }

    //--- Signal Processing ------------------------------------------------

    /// Applies pending signals from the top mode.
    ///
    /// Signals from modes below the top are discarded. At most one mode is
    /// popped per call; anything the popped mode queued after its release
    /// is dropped with it.
    pub fn process_signals(&mut self, env: &mut E) {
        let Some((top, below)) = self.entries.split_last_mut() else {
            return;
        };

        for entry in below.iter() {
            for signal in entry.receiver.try_iter() {
                warn!(
                    "Ignoring {:?} from '{}': only the top mode may signal the stack",
                    signal,
                    entry.mode.name()
                );
            }
        }

        let mut released = false;
        while let Ok(signal) = top.receiver.try_recv() {
            match signal {
                ModeSignal::Release => {
                    released = true;
                    break;
                }
                ModeSignal::Suspend => {
                    debug!("Mode '{}' suspending", top.mode.name());
                    top.with_context(env, |mode, ctx| mode.on_suspend(ctx));
                }
            }
        }

        if released {
            if let Some(entry) = self.entries.pop() {
                debug!("Mode '{}' released, popping", entry.mode.name());
                entry.terminate(env);
            }
        }
    }

    //--- Queries ----------------------------------------------------------

    /// Sender for the current top mode, so an owner can signal on its behalf.
    pub fn top_signals(&self) -> Option<SignalSender> {
        self.entries.last().map(|entry| entry.sender.clone())
    }

    pub fn top_name(&self) -> Option<&str> {
        self.entries.last().map(|entry| entry.mode.name())
    }

    /// Features of the current top mode.
    pub fn top_features(&self) -> Option<&FeatureSet<E>> {
        self.entries.last().map(|entry| &entry.features)
    }

    /// Mutable features of the current top mode.
    pub fn top_features_mut(&mut self) -> Option<&mut FeatureSet<E>> {
        self.entries.last_mut().map(|entry| &mut entry.features)
    }

    /// Mode names from bottom to top.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.mode.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<E: 'static> Default for ModeStack<E> {
    fn default() -> Self {
        Self::new()
    }
}

//=== Tests ===============================================================
