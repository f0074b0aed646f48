// src/roster/mod.rs

// Data model handed in by the participant store and handed back to the
// presentation layer. Nothing here knows about searching.

pub mod group;
pub mod participant;

pub use group::*;
pub use participant::*;

use std::collections::HashSet;

/// Participants of `pool` whose id is in `selected`, in pool order.
/// A participant listed twice in `pool` is returned once.
pub fn select(pool: &[Participant], selected: &HashSet<ParticipantId>) -> Vec<Participant> {
    let mut seen = HashSet::with_capacity(selected.len());
    pool.iter()
        .filter(|p| selected.contains(&p.id) && seen.insert(p.id))
        .cloned()
        .collect()
}
