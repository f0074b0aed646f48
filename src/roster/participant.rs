//! Participants and their ratings.

use std::fmt;
use std::hash::{Hash, Hasher};

use uuid::Uuid;

use crate::config::{MAX_RATING, MIN_RATING};
use crate::error::RatingError;

/// Opaque participant identity. Equality of participants is by id only.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ParticipantId(Uuid);

impl ParticipantId {
    /// Fresh random (v4) id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ParticipantId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for ParticipantId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Two-valued match category (e.g. open / women's match). Groups are kept
/// balanced in the count of each.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Category {
    A,
    B,
}

impl Category {
    pub const ALL: [Category; 2] = [Category::A, Category::B];

    /// Slot in per-category arrays.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Category::A => 0,
            Category::B => 1,
        }
    }
}

/// A rated ability. `Overall` is used alone; the other three form the
/// detailed triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Skill {
    Overall,
    Throwing,
    Cutting,
    Defense,
}

impl Skill {
    pub const DETAILED: [Skill; 3] = [Skill::Throwing, Skill::Cutting, Skill::Defense];
}

impl fmt::Display for Skill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Skill::Overall => "overall",
            Skill::Throwing => "throwing",
            Skill::Cutting => "cutting",
            Skill::Defense => "defense",
        })
    }
}

/// One value per detailed sub-rating. Also used for per-skill tolerances
/// and spreads.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Skills {
    pub throwing: f64,
    pub cutting: f64,
    pub defense: f64,
}

impl Skills {
    pub fn new(throwing: f64, cutting: f64, defense: f64) -> Self {
        Self { throwing, cutting, defense }
    }

    /// Same value for all three.
    pub fn splat(v: f64) -> Self {
        Self::new(v, v, v)
    }

    /// `None` for `Skill::Overall`.
    pub fn get(&self, skill: Skill) -> Option<f64> {
        match skill {
            Skill::Overall => None,
            Skill::Throwing => Some(self.throwing),
            Skill::Cutting => Some(self.cutting),
            Skill::Defense => Some(self.defense),
        }
    }

    /// `(skill, value)` in throwing, cutting, defense order.
    pub fn pairs(&self) -> [(Skill, f64); 3] {
        [
            (Skill::Throwing, self.throwing),
            (Skill::Cutting, self.cutting),
            (Skill::Defense, self.defense),
        ]
    }

    pub fn sum(&self) -> f64 {
        self.throwing + self.cutting + self.defense
    }

    /// Component-wise combination.
    pub fn zip_with(&self, other: &Skills, f: impl Fn(f64, f64) -> f64) -> Skills {
        Skills {
            throwing: f(self.throwing, other.throwing),
            cutting: f(self.cutting, other.cutting),
            defense: f(self.defense, other.defense),
        }
    }
}

/// Validated ratings: always an overall value, optionally the detailed triple.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ratings {
    overall: f64,
    skills: Option<Skills>,
}

impl Ratings {
    pub fn overall(overall: f64) -> Result<Self, RatingError> {
        Ok(Self {
            overall: check(Skill::Overall, overall)?,
            skills: None,
        })
    }

    pub fn detailed(
        overall: f64,
        throwing: f64,
        cutting: f64,
        defense: f64,
    ) -> Result<Self, RatingError> {
        Ok(Self {
            overall: check(Skill::Overall, overall)?,
            skills: Some(Skills {
                throwing: check(Skill::Throwing, throwing)?,
                cutting: check(Skill::Cutting, cutting)?,
                defense: check(Skill::Defense, defense)?,
            }),
        })
    }

    pub fn overall_value(&self) -> f64 {
        self.overall
    }

    pub fn skills(&self) -> Option<&Skills> {
        self.skills.as_ref()
    }

    /// `None` when a detailed skill is asked of overall-only ratings.
    pub fn get(&self, skill: Skill) -> Option<f64> {
        match skill {
            Skill::Overall => Some(self.overall),
            _ => self.skills.as_ref().and_then(|s| s.get(skill)),
        }
    }
}

fn check(skill: Skill, value: f64) -> Result<f64, RatingError> {
    if value.is_finite() && (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(RatingError::OutOfRange { skill, value })
    }
}

/// Reported result of one match, from one group's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MatchResult {
    Win,
    Loss,
    Tie,
}

/// Cumulative win/loss/tie record. Never read by the partitioner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Record {
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
}

impl Record {
    pub fn apply(&mut self, result: MatchResult) {
        let slot = match result {
            MatchResult::Win => &mut self.wins,
            MatchResult::Loss => &mut self.losses,
            MatchResult::Tie => &mut self.ties,
        };
        *slot = slot.saturating_add(1);
    }

    pub fn played(&self) -> u32 {
        self.wins
            .saturating_add(self.losses)
            .saturating_add(self.ties)
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub category: Category,
    pub ratings: Ratings,
    pub record: Record,
}

impl Participant {
    /// New participant with a fresh id and an empty record.
    pub fn new(name: impl Into<String>, category: Category, ratings: Ratings) -> Self {
        Self::with_id(ParticipantId::new(), name, category, ratings)
    }

    /// Participant with a caller-supplied id (e.g. loaded from a store).
    pub fn with_id(
        id: ParticipantId,
        name: impl Into<String>,
        category: Category,
        ratings: Ratings,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            ratings,
            record: Record::default(),
        }
    }

    pub fn with_record(mut self, record: Record) -> Self {
        self.record = record;
        self
    }

    #[inline]
    pub fn rating(&self, skill: Skill) -> Option<f64> {
        self.ratings.get(skill)
    }
}

impl PartialEq for Participant {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Participant {}

impl Hash for Participant {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
