//! Point magnetic-dipole sources
//!
//! A dipole is a position, a unit moment axis and a non-negative strength.
//! Flux density is recomputed on every query; nothing is cached per source.

use bevy::prelude::*;
use indexmap::IndexMap;

use crate::config::DEGENERATE_DISTANCE_SQUARED;
use crate::error::DeflectionError;
use crate::math::{Point, Real, Vector, zero_vector};

/// Identity of a subscribed field source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(pub u64);

impl From<Entity> for FieldId {
    fn from(entity: Entity) -> Self {
        Self(entity.to_bits())
    }
}

/// Result of [`DipoleField::set_strength`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum StrengthUpdate {
    Applied(Real),
    /// The requested value was negative or non-finite and was replaced.
    Corrected { requested: Real, applied: Real },
}

impl StrengthUpdate {
    pub fn applied(&self) -> Real {
        match *self {
            Self::Applied(value) => value,
            Self::Corrected { applied, .. } => applied,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DipoleField {
    position: Point,
    axis: Vector,
    strength: Real,
}

impl DipoleField {
    /// Build a dipole at `position` whose moment points along `axis`.
    ///
    /// `axis` is normalized. `strength` goes through the same correction as
    /// [`set_strength`](Self::set_strength).
    pub fn new(position: Point, axis: Vector, strength: Real) -> Result<Self, DeflectionError> {
        let axis = axis.try_normalize().ok_or(DeflectionError::InvalidAxis)?;
        let mut field = Self {
            position,
            axis,
            strength: 0.0,
        };
        field.set_strength(strength);
        Ok(field)
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn axis(&self) -> Vector {
        self.axis
    }

    pub fn strength(&self) -> Real {
        self.strength
    }

    #[inline(always)]
    pub fn moment(&self) -> Vector {
        self.axis * self.strength
    }

    /// Update the strength, correcting invalid input instead of failing.
    ///
    /// Negative values are replaced by their magnitude and non-finite values by
    /// zero. A correction is logged as a warning.
    pub fn set_strength(&mut self, strength: Real) -> StrengthUpdate {
        let update = if !strength.is_finite() {
            StrengthUpdate::Corrected {
                requested: strength,
                applied: 0.0,
            }
        } else if strength < 0.0 {
            StrengthUpdate::Corrected {
                requested: strength,
                applied: -strength,
            }
        } else {
            StrengthUpdate::Applied(strength)
        };

        if let StrengthUpdate::Corrected { requested, applied } = update {
            warn!("dipole strength {requested} is invalid, using {applied}");
        }
        self.strength = update.applied();
        update
    }

    /// Flux density induced at `position`.
    ///
    /// Fails with [`DeflectionError::DegenerateInput`] when `position` sits on
    /// the dipole itself, where the point-dipole field is singular, or when the
    /// result overflows to a non-finite vector.
    pub fn flux_density_at(&self, position: Point) -> Result<Vector, DeflectionError> {
        let r = position - self.position;
        let r2 = r.length_squared();
        if !r2.is_finite() || r2 < DEGENERATE_DISTANCE_SQUARED {
            return Err(DeflectionError::DegenerateInput { position });
        }

        let inv_r = r2.sqrt().recip();
        let r_hat = r * inv_r;
        let inv_r3 = inv_r * inv_r * inv_r;
        let m = self.moment();

        // B = (3 r_hat (r_hat . m) - m) / |r|^3
        let b = (3.0 * r_hat * r_hat.dot(m) - m) * inv_r3;
        if !b.is_finite() {
            return Err(DeflectionError::DegenerateInput { position });
        }
        Ok(b)
    }
}

/// Ordered set of subscribed dipoles, unique by [`FieldId`].
#[derive(Clone, Debug, Default)]
pub struct DipoleFieldSet {
    fields: IndexMap<FieldId, DipoleField>,
}

impl DipoleFieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Subscribe a field. Returns `false` and leaves the set untouched when
    /// `id` is already present.
    pub fn insert(&mut self, id: FieldId, field: DipoleField) -> bool {
        if self.fields.contains_key(&id) {
            return false;
        }
        self.fields.insert(id, field);
        true
    }

    /// Insert or replace in place, keeping the original subscription order.
    pub fn upsert(&mut self, id: FieldId, field: DipoleField) {
        self.fields.insert(id, field);
    }

    pub fn remove(&mut self, id: FieldId) -> Option<DipoleField> {
        self.fields.shift_remove(&id)
    }

    pub fn retain(&mut self, mut keep: impl FnMut(FieldId) -> bool) {
        self.fields.retain(|id, _| keep(*id));
    }

    pub fn get(&self, id: FieldId) -> Option<&DipoleField> {
        self.fields.get(&id)
    }

    pub fn get_mut(&mut self, id: FieldId) -> Option<&mut DipoleField> {
        self.fields.get_mut(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (FieldId, &DipoleField)> {
        self.fields.iter().map(|(&id, field)| (id, field))
    }

    /// Sum of all fields at `position`, plus how many sources were singular
    /// there (those contribute nothing).
    pub fn sum_at(&self, position: Point) -> (Vector, usize) {
        let mut total = zero_vector();
        let mut degenerate = 0;
        for field in self.fields.values() {
            match field.flux_density_at(position) {
                Ok(b) => total += b,
                Err(_) => degenerate += 1,
            }
        }
        (total, degenerate)
    }
}
