//=========================================================================
// Mode System
//=========================================================================
//
// Stack-based hierarchical state machine.
//
// Architecture:
//   ModeStack<E>
//     └─ entries: Vec<ModeEntry>        (bottom .. top)
//          ├─ mode: Box<dyn Mode<E>>    (with its typed Args)
//          ├─ receiver: ModeSignal channel
//          └─ features: FeatureSet<E>
//
// Flow:
//   tick(env) → process_signals() → top.tick() → top.features.tick()
//             → process_signals()
//
// A mode may own its own ModeStack, which makes the machine hierarchical.
//
//=========================================================================

//=== Module Declarations =================================================

mod feature;
mod mode_stack;
mod signal;

//=== Public API ==========================================================

pub use feature::{Feature, FeatureContext, FeatureSet};
pub use mode_stack::ModeStack;
pub use signal::{ModeSignal, SignalSender};

//=== Mode Context ========================================================

/// Context passed to mode hooks.
///
/// Gives access to the environment the stack is ticked with, the mode's
/// own signal channel and its feature set.
pub struct ModeContext<'a, E> {
    env: &'a mut E,
    signals: &'a SignalSender,
    features: &'a mut FeatureSet<E>,
}

impl<'a, E: 'static> ModeContext<'a, E> {
    pub(crate) fn new(env: &'a mut E, signals: &'a SignalSender, features: &'a mut FeatureSet<E>) -> Self {
        Self { env, signals, features }
    }

    pub fn env(&self) -> &E {
        self.env
    }

    pub fn env_mut(&mut self) -> &mut E {
        self.env
    }

    /// This mode's signal channel.
    pub fn signals(&self) -> &SignalSender {
        self.signals
    }

    /// Asks the owning stack to pop this mode.
    pub fn release(&self) -> bool {
        self.signals.release()
    }

    /// Features owned by this mode.
    pub fn features(&self) -> &FeatureSet<E> {
        self.features
    }

    /// Adds a feature to this mode. No-op if the key is already present.
    pub fn add_feature<F: Feature<E>>(&mut self, key: &str, feature: F) -> bool {
        self.features.add(key, feature, self.env)
    }

    /// Starts ticking a wait-for-run feature.
    pub fn run_feature(&mut self, key: &str) -> bool {
        self.features.run(key)
    }

    /// Removes and terminates a feature now.
    pub fn finish_feature(&mut self, key: &str) -> bool {
        self.features.finish(key, self.env)
    }

    /// Splits the context so a nested stack can be ticked with the same env.
    pub fn split(&mut self) -> (&mut E, &SignalSender) {
        (self.env, self.signals)
    }
}

//=== Mode Trait ==========================================================

/// One state of the hierarchical state machine.
///
/// The argument bundle is typed per mode and handed to every hook by
/// reference, so a mode never has to downcast its arguments.
///
/// ```rust
/// # use frame_harness::prelude::*;
/// struct Gameplay;
///
/// struct GameplayArgs { room: String }
///
/// impl Mode<()> for Gameplay {
///     type Args = GameplayArgs;
///
///     fn name(&self) -> &str { "gameplay" }
///
///     fn tick(&mut self, args: &GameplayArgs, ctx: &mut ModeContext<'_, ()>) {
///         if args.room.is_empty() {
///             ctx.release();
///         }
///     }
/// }
/// ```
pub trait Mode<E>: 'static {
    /// Caller-defined argument bundle.
    type Args: 'static;

    /// Name used for logs and stack inspection.
    fn name(&self) -> &str;

    /// Called once, right after the mode is pushed.
    fn initialize(&mut self, _args: &Self::Args, _ctx: &mut ModeContext<'_, E>) {}

    /// Called when the owner decides the mode is ready to run.
    fn run(&mut self, _args: &Self::Args, _ctx: &mut ModeContext<'_, E>) {}

    /// Called once per frame while this mode is on top.
    fn tick(&mut self, args: &Self::Args, ctx: &mut ModeContext<'_, E>);

    /// Called when the mode signals `Suspend`.
    fn on_suspend(&mut self, _args: &Self::Args, _ctx: &mut ModeContext<'_, E>) {}

    /// Called exactly once when the mode leaves the stack.
    fn terminate(&mut self, _args: &Self::Args, _env: &mut E) {}
}
