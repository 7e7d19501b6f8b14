//! Local state store - the single-writer container the UI reads from.
//!
//! A [`LocalStore`] is an explicit value owned by whoever drives the session (see
//! [`crate::sync::Dispatcher`]); there is no global instance. Commands are applied
//! one at a time, synchronously, to completion.

/// The closed command vocabulary
pub mod command;
/// Command application and derived-value upkeep
pub mod reducer;
/// State arenas and read selectors
pub mod state;

pub use command::{Command, CommandType, IdPayload, Incoming};
pub use state::{AppState, ViewFilter};

use chrono::{DateTime, Utc};

/// Source of "now" for streak evaluation and notification retention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Clock {
    /// Wall clock
    #[default]
    System,
    /// Frozen instant, for tests and replays
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Current instant according to this clock.
    #[must_use]
    pub fn now(self) -> DateTime<Utc> {
        match self {
            Self::System => Utc::now(),
            Self::Fixed(instant) => instant,
        }
    }
}

/// The in-memory state container.
#[derive(Debug, Clone, Default)]
pub struct LocalStore {
    state: AppState,
    clock: Clock,
}

impl LocalStore {
    /// Empty store on the wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store on the given clock.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            state: AppState::default(),
            clock,
        }
    }

    /// Read-only view for the UI.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Applies a command. Never fails.
    pub fn apply(&mut self, command: Command) {
        reducer::reduce(&mut self.state, command, self.clock.now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{at_noon, sample_goal};

    #[test]
    fn test_fresh_store_per_instance() {
        let mut first = LocalStore::with_clock(Clock::Fixed(at_noon(1)));
        let second = LocalStore::with_clock(Clock::Fixed(at_noon(1)));

        first.apply(Command::AddGoal(sample_goal("g1")));

        assert_eq!(first.state().goals.len(), 1);
        assert!(second.state().goals.is_empty());
    }

    #[test]
    fn test_fixed_clock_is_stable() {
        let clock = Clock::Fixed(at_noon(7));
        assert_eq!(clock.now(), clock.now());
    }
}
