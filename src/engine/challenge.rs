//! Challenge records and the generator capability the cycle engine pulls fresh sets from.

use std::ops::Index;

use rand::{Rng, rng, seq::IndexedRandom};
use thiserror::Error;

/// A single challenge presented to both teams during a cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Challenge {
    /// Short headline shown to players.
    pub title: String,
    /// Free-form explanation of what the team has to do.
    pub description: String,
}

impl Challenge {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
        }
    }
}

/// Ordered, fixed-length group of challenges that are active for one cycle.
///
/// A set is never mutated once built; the cycle window shares it behind an
/// `Arc` so readers can keep a handle after the window has moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeSet {
    challenges: Vec<Challenge>,
}

impl ChallengeSet {
    pub fn new(challenges: Vec<Challenge>) -> Self {
        Self { challenges }
    }

    /// Number of challenges in the set.
    pub fn len(&self) -> usize {
        self.challenges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.challenges.is_empty()
    }

    /// Challenge at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<&Challenge> {
        self.challenges.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Challenge> {
        self.challenges.iter()
    }
}

impl Index<usize> for ChallengeSet {
    type Output = Challenge;

    fn index(&self, index: usize) -> &Self::Output {
        &self.challenges[index]
    }
}

/// Capability producing a fresh [`ChallengeSet`] of exactly `count` challenges.
///
/// Generation is assumed to always succeed; the engine never retries it.
pub trait ChallengeGenerator: Send + Sync {
    fn generate(&self, count: usize) -> ChallengeSet;
}

/// Raised when a generator cannot be built from the provided content.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeneratorError {
    /// The challenge pool contains no entries to sample from.
    #[error("challenge pool must contain at least one challenge")]
    EmptyPool,
}

/// Generator sampling challenges at random from a fixed pool.
///
/// Challenges within a set are distinct whenever the pool is large enough;
/// smaller pools fall back to sampling with replacement so the requested
/// size is always honoured.
#[derive(Debug, Clone)]
pub struct PoolChallengeGenerator {
    pool: Vec<Challenge>,
}

impl PoolChallengeGenerator {
    pub fn new(pool: Vec<Challenge>) -> Result<Self, GeneratorError> {
        if pool.is_empty() {
            return Err(GeneratorError::EmptyPool);
        }
        Ok(Self { pool })
    }

    /// Number of challenges available for sampling.
    pub fn pool_size(&self) -> usize {
        self.pool.len()
    }
}

impl ChallengeGenerator for PoolChallengeGenerator {
    fn generate(&self, count: usize) -> ChallengeSet {
        let mut rng = rng();

        let challenges = if count <= self.pool.len() {
            self.pool
                .choose_multiple(&mut rng, count)
                .cloned()
                .collect()
        } else {
            (0..count)
                .map(|_| self.pool[rng.random_range(0..self.pool.len())].clone())
                .collect()
        };

        ChallengeSet::new(challenges)
    }
}
