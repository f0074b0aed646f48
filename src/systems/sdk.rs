// src/systems/sdk.rs

//! # Search SDK
//!
//! Shared vocabulary for the two cooperating systems:
//! - `partition` draws one random, count-balanced [`Partition`];
//! - `balance` resamples partitions until their rating spread fits a
//!   [`Tolerance`], or the attempt budget runs out.
//!
//! ## Modes
//! - **Overall**: one spread, `max(group mean) - min(group mean)` of the
//!   overall rating.
//! - **Detailed**: three spreads (throwing, cutting, defense). A candidate is
//!   accepted only when *all three* fit their tolerance; the best-so-far is
//!   ranked by their *sum*.
//!
//! ## Empty groups
//! An empty group has mean 0. With [`EmptyGroupPolicy::CountAsZero`] (the
//! default) that 0 takes part in max/min, so asking for more groups than
//! there are participants never meets a tolerance below the top rating.
//! [`EmptyGroupPolicy::Skip`] leaves empty groups out of the spread instead.
//!
//! ## Hooks
//! Implement [`Hook`] to watch a search without changing it: every attempt's
//! [`Dispersion`] is reported through `on_attempt`, the final outcome through
//! `on_finish`. Default methods do nothing.
//!
//! ## Outcomes
//! Running out of attempts is not an error. [`SearchOutcome::Unbalanced`]
//! carries the best partition seen and its exact spread so the caller can
//! accept it (`into_partition`) or relax the tolerance and search again.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::config::{DEFAULT_TOLERANCE, DETAILED_MAX_ATTEMPTS, OVERALL_MAX_ATTEMPTS};
use crate::error::ConfigError;
use crate::mechanics::spread;
use crate::roster::{Group, Partition, Skill, Skills};

/// Which ratings the spread is measured over.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mode {
    Overall,
    Detailed,
}

impl Mode {
    pub fn default_max_attempts(self) -> usize {
        match self {
            Mode::Overall => OVERALL_MAX_ATTEMPTS,
            Mode::Detailed => DETAILED_MAX_ATTEMPTS,
        }
    }

    /// Ratings a participant must carry to be searched in this mode.
    pub fn skills(self) -> &'static [Skill] {
        match self {
            Mode::Overall => &[Skill::Overall],
            Mode::Detailed => &Skill::DETAILED,
        }
    }
}

/// Ceiling(s) on acceptable spread. The variant fixes the mode.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Tolerance {
    Overall(f64),
    Detailed(Skills),
}

impl Default for Tolerance {
    fn default() -> Self {
        Tolerance::Overall(DEFAULT_TOLERANCE)
    }
}

impl Tolerance {
    pub fn mode(&self) -> Mode {
        match self {
            Tolerance::Overall(_) => Mode::Overall,
            Tolerance::Detailed(_) => Mode::Detailed,
        }
    }

    /// Every ceiling must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let check = |skill: Skill, value: f64| {
            if value.is_finite() && value >= 0.0 {
                Ok(())
            } else {
                Err(ConfigError::InvalidTolerance { skill, value })
            }
        };
        match self {
            Tolerance::Overall(t) => check(Skill::Overall, *t),
            Tolerance::Detailed(t) => t.pairs().into_iter().try_for_each(|(s, v)| check(s, v)),
        }
    }
}

/// How empty groups take part in the spread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EmptyGroupPolicy {
    /// Empty groups count with mean 0.
    #[default]
    CountAsZero,
    /// Empty groups are left out of max/min.
    Skip,
}

impl EmptyGroupPolicy {
    #[inline]
    fn includes(self, group: &Group) -> bool {
        match self {
            EmptyGroupPolicy::CountAsZero => true,
            EmptyGroupPolicy::Skip => !group.is_empty(),
        }
    }
}

/// Spread of per-group means: one scalar, or one per sub-rating. Never negative.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Dispersion {
    Overall(f64),
    Detailed(Skills),
}

impl Dispersion {
    pub fn measure(partition: &Partition, mode: Mode, policy: EmptyGroupPolicy) -> Self {
        let spread_of = |skill: Skill| {
            spread::range(
                partition
                    .groups()
                    .iter()
                    .filter(|g| policy.includes(g))
                    .map(|g| g.mean(skill)),
            )
        };
        match mode {
            Mode::Overall => Dispersion::Overall(spread_of(Skill::Overall)),
            Mode::Detailed => Dispersion::Detailed(Skills {
                throwing: spread_of(Skill::Throwing),
                cutting: spread_of(Skill::Cutting),
                defense: spread_of(Skill::Defense),
            }),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Dispersion::Overall(_) => Mode::Overall,
            Dispersion::Detailed(_) => Mode::Detailed,
        }
    }

    /// Scalar used to rank candidates: the spread itself, or the sum of three.
    pub fn score(&self) -> f64 {
        match self {
            Dispersion::Overall(d) => *d,
            Dispersion::Detailed(d) => d.sum(),
        }
    }

    /// Every component at or below its ceiling. False on a mode mismatch.
    pub fn within(&self, tolerance: &Tolerance) -> bool {
        match (self, tolerance) {
            (Dispersion::Overall(d), Tolerance::Overall(t)) => d <= t,
            (Dispersion::Detailed(d), Tolerance::Detailed(t)) => {
                d.throwing <= t.throwing && d.cutting <= t.cutting && d.defense <= t.defense
            }
            _ => false,
        }
    }

    /// How far each component overshoots its ceiling (0 where it fits).
    /// `None` on a mode mismatch.
    pub fn excess_over(&self, tolerance: &Tolerance) -> Option<Dispersion> {
        let over = |d: f64, t: f64| (d - t).max(0.0);
        match (self, tolerance) {
            (Dispersion::Overall(d), Tolerance::Overall(t)) => Some(Dispersion::Overall(over(*d, *t))),
            (Dispersion::Detailed(d), Tolerance::Detailed(t)) => {
                Some(Dispersion::Detailed(d.zip_with(t, over)))
            }
            _ => None,
        }
    }
}

/// Result of one search.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SearchOutcome {
    /// Tolerance met. `dispersion` is `None` when nobody was selected.
    Balanced {
        partition: Partition,
        dispersion: Option<Dispersion>,
        attempts: usize,
    },
    /// Budget exhausted; best partition seen and its spread.
    Unbalanced {
        best: Partition,
        dispersion: Dispersion,
        attempts: usize,
    },
}

impl SearchOutcome {
    pub fn is_balanced(&self) -> bool {
        matches!(self, SearchOutcome::Balanced { .. })
    }

    /// Generation passes made.
    pub fn attempts(&self) -> usize {
        match self {
            SearchOutcome::Balanced { attempts, .. } | SearchOutcome::Unbalanced { attempts, .. } => {
                *attempts
            }
        }
    }

    pub fn dispersion(&self) -> Option<&Dispersion> {
        match self {
            SearchOutcome::Balanced { dispersion, .. } => dispersion.as_ref(),
            SearchOutcome::Unbalanced { dispersion, .. } => Some(dispersion),
        }
    }

    /// Final groups, or the best fallback.
    pub fn partition(&self) -> &Partition {
        match self {
            SearchOutcome::Balanced { partition, .. } => partition,
            SearchOutcome::Unbalanced { best, .. } => best,
        }
    }

    /// Adopt the groups; for `Unbalanced` this is "use the best option found".
    pub fn into_partition(self) -> Partition {
        match self {
            SearchOutcome::Balanced { partition, .. } => partition,
            SearchOutcome::Unbalanced { best, .. } => best,
        }
    }

    /// Exact overshoot of the best spread; `None` when balanced.
    pub fn shortfall(&self, tolerance: &Tolerance) -> Option<Dispersion> {
        match self {
            SearchOutcome::Balanced { .. } => None,
            SearchOutcome::Unbalanced { dispersion, .. } => dispersion.excess_over(tolerance),
        }
    }
}

/// Observer plugged into a search.
pub trait Hook {
    /// (Optional) see every candidate and its spread, attempt index 0-based.
    fn on_attempt(&mut self, _attempt: usize, _candidate: &Partition, _dispersion: &Dispersion) {}
    /// (Optional) see the final outcome. Not called for a cancelled search.
    fn on_finish(&mut self, _outcome: &SearchOutcome) {}
}

/// Shared flag checked once per attempt.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}
