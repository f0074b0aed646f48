//! Run a search on a worker thread so the caller's thread stays free.
//!
//! The search itself is unchanged; this only moves it and wires a
//! [`CancelToken`] to it.

use std::thread::{self, JoinHandle};

use crate::config::SearchConfig;
use crate::error::{BalanceError, ConfigError};
use crate::roster::Participant;
use crate::systems::balance;
use crate::systems::sdk::{CancelToken, SearchOutcome};

type Worker = JoinHandle<Result<Option<SearchOutcome>, ConfigError>>;

/// A search running on its own thread.
#[derive(Debug)]
pub struct SearchHandle {
    cancel: CancelToken,
    worker: Worker,
}

impl SearchHandle {
    /// Ask the worker to stop before its next attempt.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn token(&self) -> &CancelToken {
        &self.cancel
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    /// Wait for the worker. `Ok(None)` when it was cancelled.
    pub fn join(self) -> Result<Option<SearchOutcome>, BalanceError> {
        let result = self.worker.join().map_err(|_| BalanceError::WorkerPanicked)?;
        Ok(result?)
    }
}

/// Start a search over `participants` on a new thread, RNG from `config`.
pub fn spawn(
    participants: Vec<Participant>,
    config: SearchConfig,
) -> Result<SearchHandle, BalanceError> {
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let worker = thread::Builder::new()
        .name("team-balance-search".into())
        .spawn(move || {
            let mut rng = config.rng();
            balance::search_ext(&participants, &config, &mut rng, &mut [], Some(&token))
        })?;
    Ok(SearchHandle { cancel, worker })
}
