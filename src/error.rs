//! Error types.
//!
//! Only invalid input is an error. A search that runs out of attempts is a
//! normal [`SearchOutcome::Unbalanced`](crate::SearchOutcome::Unbalanced).

use crate::roster::{ParticipantId, Skill};

/// A rating that is not a finite number in `[MIN_RATING, MAX_RATING]`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RatingError {
    #[error("{skill} rating must be between 0 and 10, got {value}")]
    OutOfRange { skill: Skill, value: f64 },
}

/// Input the search refuses before drawing a single candidate.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("group count must be at least 1")]
    NoGroups,

    #[error("attempt budget must be at least 1")]
    NoAttempts,

    #[error("{skill} tolerance must be a finite, non-negative number, got {value}")]
    InvalidTolerance { skill: Skill, value: f64 },

    #[error("group order {order:?} is not a permutation of 0..{}", .order.len())]
    InvalidGroupOrder { order: Vec<usize> },

    #[error("participant {id} is selected more than once")]
    DuplicateParticipant { id: ParticipantId },

    #[error("participant {name} has no {skill} rating")]
    MissingRating { name: String, skill: Skill },
}

#[derive(Debug, thiserror::Error)]
pub enum BalanceError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to start search worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("search worker panicked")]
    WorkerPanicked,
}
