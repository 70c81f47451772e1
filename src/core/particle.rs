//! Host particle view and the per-particle state the updater keeps alongside it.

use bevy::log::debug;

use crate::core::charge::Charge;
use crate::math::{Point, Vector, zero_vector};

/// What the host hands over for one particle each tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Point,
    pub velocity: Vector,
}

impl Particle {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            velocity: zero_vector(),
        }
    }

    pub fn with_velocity(mut self, velocity: Vector) -> Self {
        self.velocity = velocity;
        self
    }
}

/// Charge and last aggregated flux density for one particle.
///
/// `flux_density` is only meaningful while `charge` is [`Charge::Charged`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ParticleAux {
    pub charge: Charge,
    pub flux_density: Vector,
}

impl ParticleAux {
    pub fn reset_charge(&mut self) {
        self.charge = Charge::Unassigned;
    }
}

/// Auxiliary state kept index-parallel to the host particle array.
#[derive(Clone, Debug, Default)]
pub struct AuxBuffer {
    entries: Vec<ParticleAux>,
}

impl AuxBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[ParticleAux] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> &mut [ParticleAux] {
        &mut self.entries
    }

    pub fn get(&self, index: usize) -> Option<&ParticleAux> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut ParticleAux> {
        self.entries.get_mut(index)
    }

    /// Match the host's live count. New tail entries start unassigned and
    /// surplus tail entries are dropped.
    pub fn sync_len(&mut self, count: usize) {
        self.entries.resize(count, ParticleAux::default());
    }

    /// Force every particle to be recharged on the next tick.
    pub fn reset_charges(&mut self) {
        for entry in self.entries.iter_mut() {
            entry.reset_charge();
        }
    }

    /// Carry entries over a host compaction.
    ///
    /// `map[old]` is the particle's new index, or `None` if it died. Entries
    /// past the end of `map` are dropped. A compaction never grows the array,
    /// so targets at or beyond `map.len()` are discarded, and when two old
    /// indices name the same target the first one wins. Returns how many
    /// entries survived.
    pub fn remap(&mut self, map: &[Option<usize>]) -> usize {
        let new_len = map
            .iter()
            .flatten()
            .filter(|&&idx| idx < map.len())
            .map(|&idx| idx + 1)
            .max()
            .unwrap_or(0);
        let mut survivors = vec![ParticleAux::default(); new_len];
        let mut filled = vec![false; new_len];
        let mut kept = 0;

        for (old_idx, entry) in self.entries.drain(..).enumerate() {
            let Some(Some(new_idx)) = map.get(old_idx).copied() else {
                continue;
            };
            if new_idx >= new_len {
                debug!("remap target {new_idx} for particle {old_idx} is out of range, dropped");
                continue;
            }
            if filled[new_idx] {
                debug!("remap target {new_idx} for particle {old_idx} is already taken, dropped");
                continue;
            }
            survivors[new_idx] = entry;
            filled[new_idx] = true;
            kept += 1;
        }

        self.entries = survivors;
        kept
    }
}
