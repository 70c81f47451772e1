//! Particle charges and the bound ranges they are drawn from.

use std::num::NonZeroI32;

use indexmap::IndexSet;
use rand::Rng;

/// Charge carried by one particle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Charge {
    /// Not drawn yet. Picked up by the next tick.
    #[default]
    Unassigned,
    /// Drawn as zero. Never deflected and never redrawn until bounds change.
    Neutral,
    Charged(NonZeroI32),
}

impl Charge {
    /// Map a drawn integer to a charge. Zero becomes [`Charge::Neutral`].
    pub fn from_drawn(value: i32) -> Self {
        match NonZeroI32::new(value) {
            Some(q) => Self::Charged(q),
            None => Self::Neutral,
        }
    }

    pub fn value(&self) -> Option<i32> {
        match self {
            Self::Charged(q) => Some(q.get()),
            _ => None,
        }
    }

    pub fn is_unassigned(&self) -> bool {
        matches!(self, Self::Unassigned)
    }

    pub fn is_neutral(&self) -> bool {
        matches!(self, Self::Neutral)
    }

    pub fn is_charged(&self) -> bool {
        matches!(self, Self::Charged(_))
    }
}

/// Inclusive integer range a charge is drawn from. `lower <= upper` always.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChargeBoundPair {
    lower: i32,
    upper: i32,
}

impl ChargeBoundPair {
    /// Build a pair, swapping the bounds if they are reversed.
    pub fn new(a: i32, b: i32) -> Self {
        Self {
            lower: a.min(b),
            upper: a.max(b),
        }
    }

    pub fn lower(&self) -> i32 {
        self.lower
    }

    pub fn upper(&self) -> i32 {
        self.upper
    }

    pub fn as_tuple(&self) -> (i32, i32) {
        (self.lower, self.upper)
    }

    pub fn contains(&self, value: i32) -> bool {
        (self.lower..=self.upper).contains(&value)
    }

    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> i32 {
        rng.random_range(self.lower..=self.upper)
    }
}

impl From<(i32, i32)> for ChargeBoundPair {
    fn from((a, b): (i32, i32)) -> Self {
        Self::new(a, b)
    }
}

/// Ordered, deduplicated collection of [`ChargeBoundPair`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChargeBoundSet {
    pairs: IndexSet<ChargeBoundPair>,
}

impl ChargeBoundSet {
    /// Normalize and deduplicate `pairs`, keeping first-seen order.
    pub fn from_pairs<P>(pairs: impl IntoIterator<Item = P>) -> Self
    where
        P: Into<ChargeBoundPair>,
    {
        Self {
            pairs: pairs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChargeBoundPair> {
        self.pairs.iter()
    }

    /// Owned copy of the bounds as `(lower, upper)` tuples.
    pub fn to_tuples(&self) -> Vec<(i32, i32)> {
        self.pairs.iter().map(ChargeBoundPair::as_tuple).collect()
    }

    /// Pick a pair uniformly, then a value uniformly inside it.
    ///
    /// Returns `None` for an empty set.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Charge> {
        let pair = match self.pairs.len() {
            0 => return None,
            1 => self.pairs.get_index(0)?,
            n => self.pairs.get_index(rng.random_range(0..n))?,
        };
        Some(Charge::from_drawn(pair.draw(rng)))
    }
}
