//! Substate registry.
//!
//! A small finite-state primitive: a closed set of substate identifiers, each
//! mapped to an action, with a single "current" pointer and a lock that can be
//! held for a duration, until a condition holds, or for one physics tick.
//!
//! Actions receive the registry itself plus an explicit context value, so a
//! behavior can lock its own registry or mutate the settings it owns without
//! any back-reference stored in the settings.

use std::fmt;
use std::time::Duration;

use bevy::prelude::*;

use crate::error::SubstateError;

/// Identifier of a substate.
///
/// Implemented by small `Copy` enums. `VOID` is the safe no-op state the
/// registry falls back to when asked for something it does not know.
pub trait Substate: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// The sentinel state.
    const VOID: Self;
}

/// Action bound to a substate.
pub type SubstateAction<S, C> = fn(&mut SubstateMachine<S, C>, &mut C);

/// Predicate polled while a registry is held with [`SubstateMachine::hold_until`].
pub type HoldPredicate<C> = Box<dyn Fn(&C) -> bool + Send + Sync>;

/// What releases a held registry.
pub enum HoldCondition<C> {
    /// Released once the timer finishes.
    Elapsed(Timer),
    /// Released the first time the predicate returns true.
    Until(HoldPredicate<C>),
    /// Released on the next poll.
    NextTick,
}

impl<C> fmt::Debug for HoldCondition<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Elapsed(timer) => f
                .debug_tuple("Elapsed")
                .field(&timer.remaining_secs())
                .finish(),
            Self::Until(_) => f.write_str("Until(..)"),
            Self::NextTick => f.write_str("NextTick"),
        }
    }
}

/// Registry of substate actions with a lockable current state.
///
/// Registration order is kept. It only matters for [`run_current`], which
/// never invokes the action in the last registered slot.
///
/// [`run_current`]: SubstateMachine::run_current
#[derive(Component)]
pub struct SubstateMachine<S: Substate, C: Send + Sync + 'static> {
    states: Vec<(S, SubstateAction<S, C>)>,
    current: S,
    locked: bool,
    hold: Option<HoldCondition<C>>,
}

impl<S: Substate, C: Send + Sync + 'static> Default for SubstateMachine<S, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Substate, C: Send + Sync + 'static> fmt::Debug for SubstateMachine<S, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubstateMachine")
            .field(
                "states",
                &self.states.iter().map(|(s, _)| s).collect::<Vec<_>>(),
            )
            .field("current", &self.current)
            .field("locked", &self.locked)
            .field("hold", &self.hold)
            .finish()
    }
}

impl<S: Substate, C: Send + Sync + 'static> SubstateMachine<S, C> {
    /// Create an empty, unlocked registry sitting in `VOID`.
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            current: S::VOID,
            locked: false,
            hold: None,
        }
    }

    /// Register `action` under `state`.
    ///
    /// Fails if `state` already has an action.
    pub fn register(
        &mut self,
        state: S,
        action: SubstateAction<S, C>,
    ) -> Result<(), SubstateError> {
        if self.is_registered(state) {
            warn!("substate {state:?} registered twice; keeping the first action");
            return Err(SubstateError::AlreadyRegistered(format!("{state:?}")));
        }
        self.states.push((state, action));
        Ok(())
    }

    /// Build a registry from `(state, action)` pairs, in order.
    ///
    /// A state listed twice keeps its first action.
    pub fn from_states(states: impl IntoIterator<Item = (S, SubstateAction<S, C>)>) -> Self {
        let mut machine = Self::new();
        for (state, action) in states {
            if machine.is_registered(state) {
                warn!("substate {state:?} listed twice; keeping the first action");
            } else {
                machine.states.push((state, action));
            }
        }
        machine
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_state(
        mut self,
        state: S,
        action: SubstateAction<S, C>,
    ) -> Result<Self, SubstateError> {
        self.register(state, action)?;
        Ok(self)
    }

    /// Whether `state` has a registered action.
    pub fn is_registered(&self, state: S) -> bool {
        self.index_of(state).is_some()
    }

    /// Number of registered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Whether nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Look up the action registered for `state`.
    pub fn get(&self, state: S) -> Result<SubstateAction<S, C>, SubstateError> {
        match self.index_of(state) {
            Some(index) => Ok(self.states[index].1),
            None => {
                warn!("substate {state:?} is not registered");
                Err(SubstateError::NotFound(format!("{state:?}")))
            }
        }
    }

    /// The current substate.
    #[inline]
    pub fn current(&self) -> S {
        self.current
    }

    /// Select `state` as current.
    ///
    /// Ignored while locked and when `state` is already current. Unknown
    /// states select `VOID`.
    pub fn switch_to(&mut self, state: S) {
        if self.locked {
            debug!(
                "substate switch {:?} -> {state:?} ignored while locked",
                self.current
            );
            return;
        }
        if state == self.current {
            return;
        }
        if state == S::VOID || self.is_registered(state) {
            debug!("substate {:?} -> {state:?}", self.current);
            self.current = state;
        } else {
            warn!("unknown substate {state:?}; falling back to {:?}", S::VOID);
            self.current = S::VOID;
        }
    }

    /// Switch to `state` and invoke its action immediately.
    ///
    /// The switch respects the lock; the invocation does not.
    pub fn run(&mut self, state: S, ctx: &mut C) {
        self.switch_to(state);
        if let Ok(action) = self.get(state) {
            action(self, ctx);
        }
    }

    /// Invoke the action of the current substate.
    ///
    /// Does nothing for an unregistered current state or for the last
    /// registered slot.
    pub fn run_current(&mut self, ctx: &mut C) {
        let Some(index) = self.index_of(self.current) else {
            return;
        };
        if index + 1 < self.states.len() {
            let action = self.states[index].1;
            action(self, ctx);
        }
    }

    /// Whether switching is currently suspended.
    #[inline]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// The outstanding hold, if any.
    pub fn hold(&self) -> Option<&HoldCondition<C>> {
        self.hold.as_ref()
    }

    /// Suspend switching until [`unlock`](Self::unlock) is called.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    /// Resume switching and drop any outstanding hold.
    pub fn unlock(&mut self) {
        self.locked = false;
        self.hold = None;
    }

    /// Suspend switching for `duration` of polled time.
    pub fn hold_for(&mut self, duration: Duration) {
        self.begin_hold(HoldCondition::Elapsed(Timer::new(duration, TimerMode::Once)));
    }

    /// Suspend switching until `predicate` returns true on a poll.
    ///
    /// A predicate that never becomes true keeps the registry locked.
    pub fn hold_until(&mut self, predicate: impl Fn(&C) -> bool + Send + Sync + 'static) {
        self.begin_hold(HoldCondition::Until(Box::new(predicate)));
    }

    /// Suspend switching until the next poll.
    pub fn hold_one_tick(&mut self) {
        self.begin_hold(HoldCondition::NextTick);
    }

    /// Advance the outstanding hold by `delta` and release it when its
    /// condition is met. Returns true if the registry was released.
    pub fn poll_hold(&mut self, delta: Duration, ctx: &C) -> bool {
        let released = match self.hold.as_mut() {
            None => return false,
            Some(HoldCondition::Elapsed(timer)) => timer.tick(delta).finished(),
            Some(HoldCondition::Until(predicate)) => predicate(ctx),
            Some(HoldCondition::NextTick) => true,
        };
        if released {
            debug!("substate {:?} released", self.current);
            self.unlock();
        }
        released
    }

    fn begin_hold(&mut self, condition: HoldCondition<C>) {
        debug!("substate {:?} held: {condition:?}", self.current);
        self.locked = true;
        self.hold = Some(condition);
    }

    fn index_of(&self, state: S) -> Option<usize> {
        self.states.iter().position(|(s, _)| *s == state)
    }
}
