//! Search configuration and defaults.

use std::num::NonZeroUsize;

use bevy_prng::WyRand;
use rand_core::SeedableRng;

use crate::error::ConfigError;
use crate::roster::Skills;
use crate::systems::sdk::{EmptyGroupPolicy, Mode, Tolerance};

/// Groups built when the caller does not say otherwise.
pub const DEFAULT_GROUP_COUNT: usize = 2;
/// Default ceiling on the spread of group means, per rating.
pub const DEFAULT_TOLERANCE: f64 = 0.4;
/// Attempt budget for overall mode.
pub const OVERALL_MAX_ATTEMPTS: usize = 600;
/// Attempt budget for detailed mode; three constraints at once need more draws.
pub const DETAILED_MAX_ATTEMPTS: usize = 2000;

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 10.0;

/// Everything one search needs besides the participants.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SearchConfig {
    /// Number of groups to build (≥ 1).
    pub group_count: usize,
    /// Ceiling(s) on spread; also selects overall vs detailed mode.
    pub tolerance: Tolerance,
    /// `None` uses the mode's default budget.
    pub max_attempts: Option<usize>,
    /// How empty groups take part in the spread.
    pub empty_groups: EmptyGroupPolicy,
    /// Fixed seed for reproducible runs; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            group_count: DEFAULT_GROUP_COUNT,
            tolerance: Tolerance::default(),
            max_attempts: None,
            empty_groups: EmptyGroupPolicy::default(),
            seed: None,
        }
    }
}

impl SearchConfig {
    /// Overall mode with a single tolerance.
    pub fn overall(group_count: usize, tolerance: f64) -> Self {
        Self {
            group_count,
            tolerance: Tolerance::Overall(tolerance),
            ..Self::default()
        }
    }

    /// Detailed mode with one tolerance per sub-rating.
    pub fn detailed(group_count: usize, tolerance: Skills) -> Self {
        Self {
            group_count,
            tolerance: Tolerance::Detailed(tolerance),
            ..Self::default()
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_empty_groups(mut self, policy: EmptyGroupPolicy) -> Self {
        self.empty_groups = policy;
        self
    }

    pub fn mode(&self) -> Mode {
        self.tolerance.mode()
    }

    /// Explicit budget, or the mode default.
    pub fn attempt_budget(&self) -> Result<NonZeroUsize, ConfigError> {
        let n = self
            .max_attempts
            .unwrap_or_else(|| self.mode().default_max_attempts());
        NonZeroUsize::new(n).ok_or(ConfigError::NoAttempts)
    }

    /// Rejects every condition that does not depend on the participants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.group_count == 0 {
            return Err(ConfigError::NoGroups);
        }
        self.attempt_budget()?;
        self.tolerance.validate()
    }

    /// Generator for this run: seeded when `seed` is set, OS entropy otherwise.
    pub fn rng(&self) -> WyRand {
        match self.seed {
            Some(seed) => WyRand::from_seed(seed.to_le_bytes()),
            None => WyRand::from_os_rng(),
        }
    }
}
