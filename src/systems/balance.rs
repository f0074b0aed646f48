//! Balance search controller: resample partitions until the spread of group
//! means fits the tolerance, or the attempt budget runs out.
//!
//! Each call owns its whole state (attempt counter, best-so-far slot, RNG
//! borrow). Nothing is shared between searches.

use std::collections::HashSet;
use std::convert::Infallible;

use rand_core::RngCore;

use crate::config::SearchConfig;
use crate::error::ConfigError;
use crate::roster::{Participant, Partition};
use crate::systems::partition;
use crate::systems::sdk::{CancelToken, Dispersion, Hook, SearchOutcome, Tolerance};
use crate::{Search, resample_best};

/// Search with an explicit tolerance and budget. The tolerance variant picks
/// overall or detailed mode.
pub fn search<R: RngCore + ?Sized>(
    participants: &[Participant],
    group_count: usize,
    tolerance: Tolerance,
    max_attempts: usize,
    rng: &mut R,
) -> Result<SearchOutcome, ConfigError> {
    let cfg = SearchConfig {
        group_count,
        tolerance,
        max_attempts: Some(max_attempts),
        ..SearchConfig::default()
    };
    match drive(participants, &cfg, rng, &mut [], |_| None::<Infallible>)? {
        Finish::Done(outcome) => Ok(outcome),
        Finish::Stopped(never) => match never {},
    }
}

/// Search driven entirely by `cfg`, RNG included (seeded or OS entropy).
pub fn balance_quick(
    participants: &[Participant],
    cfg: &SearchConfig,
) -> Result<SearchOutcome, ConfigError> {
    let mut rng = cfg.rng();
    match drive(participants, cfg, &mut rng, &mut [], |_| None::<Infallible>)? {
        Finish::Done(outcome) => Ok(outcome),
        Finish::Stopped(never) => match never {},
    }
}

/// Full surface: caller RNG, hooks, optional cancellation.
/// `Ok(None)` means the search was cancelled and produced no result.
pub fn search_ext<R: RngCore + ?Sized>(
    participants: &[Participant],
    cfg: &SearchConfig,
    rng: &mut R,
    hooks: &mut [Box<dyn Hook>],
    cancel: Option<&CancelToken>,
) -> Result<Option<SearchOutcome>, ConfigError> {
    let stop = |_attempt: usize| cancel.filter(|c| c.is_cancelled()).map(|_| ());
    Ok(match drive(participants, cfg, rng, hooks, stop)? {
        Finish::Done(outcome) => Some(outcome),
        Finish::Stopped(()) => None,
    })
}

enum Finish<S> {
    Done(SearchOutcome),
    Stopped(S),
}

/// Reject bad input before the first draw.
fn validate(participants: &[Participant], cfg: &SearchConfig) -> Result<(), ConfigError> {
    cfg.validate()?;

    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p.id) {
            return Err(ConfigError::DuplicateParticipant { id: p.id });
        }
        if let Some(&skill) = cfg.mode().skills().iter().find(|&&s| p.rating(s).is_none()) {
            return Err(ConfigError::MissingRating {
                name: p.name.clone(),
                skill,
            });
        }
    }
    Ok(())
}

fn drive<R, S, Stop>(
    participants: &[Participant],
    cfg: &SearchConfig,
    rng: &mut R,
    hooks: &mut [Box<dyn Hook>],
    stop: Stop,
) -> Result<Finish<S>, ConfigError>
where
    R: RngCore + ?Sized,
    Stop: FnMut(usize) -> Option<S>,
{
    validate(participants, cfg)?;
    let budget = cfg.attempt_budget()?;
    let (mode, tolerance, policy) = (cfg.mode(), cfg.tolerance, cfg.empty_groups);
    let group_count = cfg.group_count;

    tracing::debug!(
        participants = participants.len(),
        groups = group_count,
        ?mode,
        budget = budget.get(),
        "starting balance search"
    );

    // Nothing selected: one pass of empty groups, trivially balanced.
    if participants.is_empty() {
        let outcome = SearchOutcome::Balanced {
            partition: partition::fill(participants, group_count, rng),
            dispersion: None,
            attempts: 1,
        };
        finish(hooks, &outcome);
        return Ok(Finish::Done(outcome));
    }

    let found = resample_best(
        |_| partition::fill(participants, group_count, rng),
        |attempt, candidate: &Partition| {
            let d = Dispersion::measure(candidate, mode, policy);
            tracing::trace!(attempt, score = d.score(), "measured candidate");
            for h in hooks.iter_mut() {
                h.on_attempt(attempt, candidate, &d);
            }
            d
        },
        |d, best| d.score() < best.score(),
        |d| d.within(&tolerance),
        stop,
        budget,
    );

    let outcome = match found {
        Search::Accepted { candidate, metric, attempts } => SearchOutcome::Balanced {
            partition: candidate,
            dispersion: Some(metric),
            attempts,
        },
        Search::Exhausted { candidate, metric, attempts } => SearchOutcome::Unbalanced {
            best: candidate,
            dispersion: metric,
            attempts,
        },
        Search::Stopped { reason, attempts } => {
            tracing::debug!(attempts, "balance search cancelled");
            return Ok(Finish::Stopped(reason));
        }
    };
    finish(hooks, &outcome);
    Ok(Finish::Done(outcome))
}

fn finish(hooks: &mut [Box<dyn Hook>], outcome: &SearchOutcome) {
    tracing::debug!(
        balanced = outcome.is_balanced(),
        attempts = outcome.attempts(),
        score = outcome.dispersion().map(Dispersion::score),
        "balance search finished"
    );
    for h in hooks.iter_mut() {
        h.on_finish(outcome);
    }
}
