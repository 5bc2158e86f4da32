//! Challenge cycle engine: lifecycle, cycle window, arbitration and timing.
//!
//! Nothing in here knows about HTTP or SSE; the presentation layer plugs in
//! through [`CycleNotifier`] and supplies challenge content through
//! [`ChallengeGenerator`].

pub mod challenge;
pub mod cycle;
pub mod game;
pub mod notifier;
pub mod settings;
pub mod state_machine;
pub mod timer;

#[cfg(test)]
pub(crate) mod test_support;

pub use self::challenge::{Challenge, ChallengeGenerator, ChallengeSet, PoolChallengeGenerator};
pub use self::cycle::{Completion, CycleError, CycleId, CycleSnapshot};
pub use self::game::{GameError, SnakeGame};
pub use self::notifier::{CycleNotifier, NotifyError};
pub use self::settings::{Settings, SettingsError};
pub use self::state_machine::{GameEvent, GameState, InvalidTransition};
