//! Partition generator: one random, count-balanced assignment of
//! participants to groups.
//!
//! Participants are split into one queue per category and each queue is
//! shuffled. Groups are visited in a random order with a single rotating
//! cursor: category A is dealt first, category B continues from where A
//! stopped. A group takes a participant only while it is below the category
//! cap (`ceil(category size / groups)`) and the total cap
//! (`ceil(total / groups)`).
//!
//! The result has every participant exactly once, group sizes within 1 of
//! each other, and per-category counts within 1 of each other. Ratings are
//! never read here; skill balance comes from resampling in `balance`.

use rand_core::RngCore;

use crate::error::ConfigError;
use crate::mechanics::stoch;
use crate::roster::{Category, Group, Participant, Partition};

/// Participants of each category, in the order they will be dealt.
#[derive(Clone, Debug, Default)]
pub struct Queues {
    lanes: [Vec<Participant>; 2],
}

impl Queues {
    /// Split by category, keeping input order within each lane.
    pub fn split(participants: &[Participant]) -> Self {
        let mut queues = Self::default();
        for p in participants {
            queues.lanes[p.category.index()].push(p.clone());
        }
        queues
    }

    /// Lanes given directly, already in dealing order. Each participant is
    /// dealt to the lane it is listed in, whatever its own category says.
    pub fn from_lanes(a: Vec<Participant>, b: Vec<Participant>) -> Self {
        Self { lanes: [a, b] }
    }

    pub fn lane(&self, category: Category) -> &[Participant] {
        &self.lanes[category.index()]
    }

    pub fn len(&self) -> usize {
        self.lanes.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.lanes.iter().all(Vec::is_empty)
    }

    /// Independent uniform shuffle of each lane.
    pub fn shuffle<R: RngCore + ?Sized>(&mut self, rng: &mut R) {
        for lane in &mut self.lanes {
            stoch::shuffle(rng, lane);
        }
    }
}

/// Per-group admission limits for one generation pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Caps {
    /// Most members of each category one group may hold.
    pub per_category: [usize; 2],
    /// Most members one group may hold.
    pub total: usize,
}

impl Caps {
    /// Caps for dealing `queues` into `group_count` groups.
    pub fn new(queues: &Queues, group_count: usize) -> Result<Self, ConfigError> {
        if group_count == 0 {
            return Err(ConfigError::NoGroups);
        }
        Ok(Self::ceilings(queues, group_count))
    }

    fn ceilings(queues: &Queues, group_count: usize) -> Self {
        Self {
            per_category: [
                queues.lanes[0].len().div_ceil(group_count),
                queues.lanes[1].len().div_ceil(group_count),
            ],
            total: queues.len().div_ceil(group_count),
        }
    }

    #[inline]
    fn admits(&self, tally: &[usize; 2], category: Category) -> bool {
        tally[category.index()] < self.per_category[category.index()]
            && tally[0] + tally[1] < self.total
    }
}

/// Draw one partition into `group_count` groups named "Group 1".."Group N".
/// No participants gives N empty groups.
pub fn generate<R: RngCore + ?Sized>(
    participants: &[Participant],
    group_count: usize,
    rng: &mut R,
) -> Result<Partition, ConfigError> {
    if group_count == 0 {
        return Err(ConfigError::NoGroups);
    }
    Ok(fill(participants, group_count, rng))
}

/// `generate` without the group-count check.
pub(crate) fn fill<R: RngCore + ?Sized>(
    participants: &[Participant],
    group_count: usize,
    rng: &mut R,
) -> Partition {
    let mut queues = Queues::split(participants);
    queues.shuffle(rng);
    let order = stoch::permutation(rng, group_count);
    deal_in_order(queues, &order)
}

/// Deterministic dealing step. `order` is the visiting order of group
/// indices; its length is the group count and it must be a permutation of
/// `0..order.len()`.
pub fn deal(queues: Queues, order: &[usize]) -> Result<Partition, ConfigError> {
    if order.is_empty() {
        return Err(ConfigError::NoGroups);
    }
    if !is_permutation(order) {
        return Err(ConfigError::InvalidGroupOrder {
            order: order.to_vec(),
        });
    }
    Ok(deal_in_order(queues, order))
}

fn is_permutation(order: &[usize]) -> bool {
    let mut seen = vec![false; order.len()];
    order.iter().all(|&g| match seen.get_mut(g) {
        Some(slot) => !std::mem::replace(slot, true),
        None => false,
    })
}

/// `order` is a non-empty permutation of `0..order.len()`.
fn deal_in_order(queues: Queues, order: &[usize]) -> Partition {
    let group_count = order.len();
    let caps = Caps::ceilings(&queues, group_count);
    tracing::trace!(
        groups = group_count,
        cap_a = caps.per_category[0],
        cap_b = caps.per_category[1],
        cap_total = caps.total,
        "dealing participants"
    );

    let mut groups: Vec<Group> = (1..=group_count)
        .map(|i| Group::new(format!("Group {i}")))
        .collect();
    let mut tally = vec![[0usize; 2]; group_count];
    let mut cursor = 0;

    for (category, lane) in Category::ALL.into_iter().zip(queues.lanes) {
        for participant in lane {
            let step = (0..group_count)
                .find(|k| caps.admits(&tally[order[(cursor + k) % group_count]], category))
                .unwrap_or_else(|| least_filled(&tally, order, cursor));
            let slot = (cursor + step) % group_count;
            let g = order[slot];

            tally[g][category.index()] += 1;
            groups[g].push(participant);
            cursor = (slot + 1) % group_count;
        }
    }

    Partition::new(groups)
}

/// Rotation offset of the smallest group; only reached if no group admits.
fn least_filled(tally: &[[usize; 2]], order: &[usize], cursor: usize) -> usize {
    let n = order.len();
    (0..n)
        .min_by_key(|k| {
            let t = tally[order[(cursor + k) % n]];
            t[0] + t[1]
        })
        .unwrap_or(0)
}
