//! Groups (rosters) and partitions.

use crate::mechanics::spread;
use crate::roster::participant::{Category, MatchResult, Participant, ParticipantId, Skill};

/// A named group of participants, kept in insertion order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Group {
    name: String,
    members: Vec<Participant>,
}

impl Group {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    /// Group restored with known members, e.g. from a saved roster.
    pub fn with_members(name: impl Into<String>, members: Vec<Participant>) -> Self {
        Self {
            name: name.into(),
            members,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[Participant] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn contains(&self, id: ParticipantId) -> bool {
        self.members.iter().any(|p| p.id == id)
    }

    /// Members of `category`.
    pub fn count(&self, category: Category) -> usize {
        self.members.iter().filter(|p| p.category == category).count()
    }

    /// Mean `skill` rating over members that carry it; 0 when none do.
    pub fn mean(&self, skill: Skill) -> f64 {
        self.mean_of(skill).unwrap_or(0.0)
    }

    /// Like [`Group::mean`] but `None` instead of 0 for no rated members.
    pub fn mean_of(&self, skill: Skill) -> Option<f64> {
        spread::mean(self.members.iter().filter_map(|p| p.rating(skill)))
    }

    /// Apply one reported result to every member's record.
    pub fn record_result(&mut self, result: MatchResult) {
        for p in &mut self.members {
            p.record.apply(result);
        }
    }

    pub fn into_members(self) -> Vec<Participant> {
        self.members
    }

    pub(crate) fn push(&mut self, participant: Participant) {
        self.members.push(participant);
    }
}

/// The N groups produced by one generation pass.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Partition {
    groups: Vec<Group>,
}

impl Partition {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Mutable access for result reporting; membership itself is fixed.
    pub fn groups_mut(&mut self) -> &mut [Group] {
        &mut self.groups
    }

    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn group_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.iter_mut().find(|g| g.name == name)
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// True when at least one group has a member.
    pub fn has_members(&self) -> bool {
        self.groups.iter().any(|g| !g.is_empty())
    }

    pub fn participant_count(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }

    /// Every placed participant, group by group.
    pub fn participants(&self) -> impl Iterator<Item = &Participant> {
        self.groups.iter().flat_map(|g| g.members.iter())
    }

    /// Group holding `id`, if any.
    pub fn group_of(&self, id: ParticipantId) -> Option<&Group> {
        self.groups.iter().find(|g| g.contains(id))
    }

    pub fn into_groups(self) -> Vec<Group> {
        self.groups
    }
}
