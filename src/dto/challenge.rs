use serde::Serialize;
use utoipa::ToSchema;

use crate::engine::{Challenge, ChallengeSet};

/// Public projection of a challenge, tagged with its index in the cycle.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ChallengeSummary {
    /// Index to send back when claiming this challenge.
    pub id: usize,
    pub title: String,
    pub description: String,
}

impl ChallengeSummary {
    pub fn new(id: usize, challenge: &Challenge) -> Self {
        Self {
            id,
            title: challenge.title.clone(),
            description: challenge.description.clone(),
        }
    }

    /// Project a whole set, keeping its order.
    pub fn list(set: &ChallengeSet) -> Vec<Self> {
        set.iter()
            .enumerate()
            .map(|(id, challenge)| Self::new(id, challenge))
            .collect()
    }
}
