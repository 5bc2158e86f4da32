use std::time::Duration;

use thiserror::Error;

/// Default duration of one cycle, in seconds.
pub const DEFAULT_CYCLE_LENGTH: u64 = 120;
/// Default lead time of the end-of-cycle warning, in seconds.
pub const DEFAULT_WARNING_TIME: u64 = 5;
/// Default number of challenges per cycle.
pub const DEFAULT_NUM_CHALLENGES: usize = 3;

/// Timing and sizing parameters of a game. Frozen once the game has started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    /// Total duration of one cycle, in seconds.
    pub cycle_length: u64,
    /// Seconds before the end of a cycle at which the warning fires.
    pub warning_time: u64,
    /// Fixed size of every challenge set.
    pub num_challenges: usize,
}

/// Reasons a [`Settings`] value is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("cycle length must be strictly positive")]
    ZeroCycleLength,
    #[error("a challenge set must contain at least one challenge")]
    ZeroChallenges,
}

impl Settings {
    /// Build validated settings.
    pub fn new(
        cycle_length: u64,
        warning_time: u64,
        num_challenges: usize,
    ) -> Result<Self, SettingsError> {
        let settings = Self {
            cycle_length,
            warning_time,
            num_challenges,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.cycle_length == 0 {
            return Err(SettingsError::ZeroCycleLength);
        }
        if self.num_challenges == 0 {
            return Err(SettingsError::ZeroChallenges);
        }
        Ok(())
    }

    pub fn cycle_duration(&self) -> Duration {
        Duration::from_secs(self.cycle_length)
    }

    pub fn warning_duration(&self) -> Duration {
        Duration::from_secs(self.warning_time)
    }

    /// Whether the cycle is long enough for the warning to fire before it ends.
    pub fn has_warning_window(&self) -> bool {
        self.cycle_length > self.warning_time
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            cycle_length: DEFAULT_CYCLE_LENGTH,
            warning_time: DEFAULT_WARNING_TIME,
            num_challenges: DEFAULT_NUM_CHALLENGES,
        }
    }
}
