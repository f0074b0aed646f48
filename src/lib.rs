/*!
`team_balance`: randomized, tolerance-bounded partitioning of a participant pool.

What it does
- Splits a pool of participants into N named groups so that group sizes and
  per-category counts are as equal as possible.
- Resamples random balanced-by-count partitions until the spread of the
  per-group mean rating(s) drops below a caller-supplied tolerance, or a fixed
  attempt budget runs out.
- On budget exhaustion returns the best partition seen plus its exact spread,
  so the caller can accept it or relax the tolerance.

How to use (call surface only)
- Build `Participant`s (`roster`) from whatever store you keep them in.
- Call `systems::balance::search(&participants, groups, tolerance, attempts, &mut rng)`,
  or `systems::balance::balance_quick(&participants, &SearchConfig)`.
- Match on `SearchOutcome::{Balanced, Unbalanced}`.

The generic loop underneath is [`resample_best`]:
`draw → measure → accept? → keep best`, repeated at most `max_attempts` times.

What it does NOT do
- No persistence, no UI, no networking. Participants come in as a slice and
  groups go out as values.
*/

use std::num::NonZeroUsize;

/// Where a bounded resampling run ended.
#[derive(Clone, Debug, PartialEq)]
pub enum Search<C, M, S> {
    /// `candidate` satisfied the acceptance predicate on attempt `attempts`.
    Accepted { candidate: C, metric: M, attempts: usize },
    /// Budget spent; `candidate` is the best one drawn.
    Exhausted { candidate: C, metric: M, attempts: usize },
    /// `stop` asked to abandon the run before attempt `attempts` (0-based).
    Stopped { reason: S, attempts: usize },
}

/// Bounded resampling: draw a candidate, measure it, return it if accepted,
/// otherwise keep it if it beats the best so far.
///
/// - `draw(attempt)` produces a fresh candidate.
/// - `measure(attempt, &candidate)` scores it.
/// - `better(a, b)` is true when metric `a` should replace best metric `b`.
/// - `accept(m)` ends the run successfully.
/// - `stop(attempt)` is polled once before each draw; `Some(reason)` abandons
///   the run. Pass `|_| None::<Infallible>` for an uninterruptible run.
///
/// At most `max_attempts` candidates are drawn. Ties keep the earlier best.
pub fn resample_best<C, M, S, Draw, Meas, Better, Accept, Stop>(
    mut draw: Draw,
    mut measure: Meas,
    better: Better,
    accept: Accept,
    mut stop: Stop,
    max_attempts: NonZeroUsize,
) -> Search<C, M, S>
where
    Draw: FnMut(usize) -> C,
    Meas: FnMut(usize, &C) -> M,
    Better: Fn(&M, &M) -> bool,
    Accept: Fn(&M) -> bool,
    Stop: FnMut(usize) -> Option<S>,
{
    if let Some(reason) = stop(0) {
        return Search::Stopped { reason, attempts: 0 };
    }
    let candidate = draw(0);
    let metric = measure(0, &candidate);
    if accept(&metric) {
        return Search::Accepted { candidate, metric, attempts: 1 };
    }
    let (mut best, mut best_metric) = (candidate, metric);

    for attempt in 1..max_attempts.get() {
        if let Some(reason) = stop(attempt) {
            return Search::Stopped { reason, attempts: attempt };
        }
        let candidate = draw(attempt);
        let metric = measure(attempt, &candidate);
        if accept(&metric) {
            return Search::Accepted { candidate, metric, attempts: attempt + 1 };
        }
        if better(&metric, &best_metric) {
            best = candidate;
            best_metric = metric;
        }
    }

    Search::Exhausted {
        candidate: best,
        metric: best_metric,
        attempts: max_attempts.get(),
    }
}

pub mod config;
pub mod error;
pub mod mechanics;
pub mod roster;
pub mod systems;

pub use config::SearchConfig;
pub use error::{BalanceError, ConfigError, RatingError};
pub use roster::{
    Category, Group, MatchResult, Participant, ParticipantId, Partition, Ratings, Record, Skill,
    Skills,
};
pub use systems::sdk::{
    CancelToken, Dispersion, EmptyGroupPolicy, Hook, Mode, SearchOutcome, Tolerance,
};
