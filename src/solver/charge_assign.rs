//! Charge assignment stage
//!
//! Draws a charge for every particle that has not been given one yet.

use rand::Rng;

use crate::core::charge::ChargeBoundSet;
use crate::core::particle::ParticleAux;

/// Assign charges to unassigned entries. Returns how many were assigned.
///
/// Entries that already hold a charge, including neutral ones, are never
/// redrawn. With an empty bound set nothing is assigned.
pub fn assign_charges<R: Rng + ?Sized>(
    aux: &mut [ParticleAux],
    bounds: &ChargeBoundSet,
    rng: &mut R,
) -> usize {
    if bounds.is_empty() {
        return 0;
    }

    let mut assigned = 0;
    for entry in aux.iter_mut().filter(|entry| entry.charge.is_unassigned()) {
        if let Some(charge) = bounds.draw(rng) {
            entry.charge = charge;
            assigned += 1;
        }
    }
    assigned
}
