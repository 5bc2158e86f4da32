use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::engine::Settings;

/// Current timing and sizing parameters of a game.
#[derive(Debug, Serialize, ToSchema, PartialEq, Eq)]
pub struct SettingsResponse {
    /// Seconds per cycle.
    pub cycle_length: u64,
    /// Seconds before the cycle end at which the warning fires.
    pub warning_time: u64,
    /// Challenges per cycle.
    pub num_challenges: usize,
}

impl From<Settings> for SettingsResponse {
    fn from(settings: Settings) -> Self {
        Self {
            cycle_length: settings.cycle_length,
            warning_time: settings.warning_time,
            num_challenges: settings.num_challenges,
        }
    }
}

/// Partial settings update; omitted fields keep their value.
#[derive(Debug, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(range(min = 30, message = "cycle_length must be at least 30 seconds"))]
    #[serde(default)]
    pub cycle_length: Option<u64>,
    #[serde(default)]
    pub warning_time: Option<u64>,
    #[validate(range(min = 1, max = 5, message = "num_challenges must be between 1 and 5"))]
    #[serde(default)]
    pub num_challenges: Option<usize>,
}

impl UpdateSettingsRequest {
    /// Overlay the provided fields on top of `current`.
    pub fn merge_into(&self, current: Settings) -> Settings {
        Settings {
            cycle_length: self.cycle_length.unwrap_or(current.cycle_length),
            warning_time: self.warning_time.unwrap_or(current.warning_time),
            num_challenges: self.num_challenges.unwrap_or(current.num_challenges),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_are_enforced() {
        let too_short = UpdateSettingsRequest {
            cycle_length: Some(10),
            ..Default::default()
        };
        assert!(too_short.validate().is_err());

        let too_many = UpdateSettingsRequest {
            num_challenges: Some(6),
            ..Default::default()
        };
        assert!(too_many.validate().is_err());

        let none = UpdateSettingsRequest {
            num_challenges: Some(0),
            ..Default::default()
        };
        assert!(none.validate().is_err());

        assert!(UpdateSettingsRequest::default().validate().is_ok());
    }

    #[test]
    fn merge_keeps_omitted_fields() {
        let request = UpdateSettingsRequest {
            num_challenges: Some(5),
            ..Default::default()
        };
        let merged = request.merge_into(Settings::default());
        assert_eq!(merged.num_challenges, 5);
        assert_eq!(merged.cycle_length, Settings::default().cycle_length);
        assert_eq!(merged.warning_time, Settings::default().warning_time);
    }
}
