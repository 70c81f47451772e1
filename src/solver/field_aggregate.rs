//! Field aggregation stage
//!
//! Sums the flux density of every subscribed dipole at each charged particle.

use crate::core::dipole::DipoleFieldSet;
use crate::core::particle::{Particle, ParticleAux};

/// Refresh `flux_density` for every charged particle.
///
/// Neutral and unassigned entries are skipped; their flux density is never
/// read. Returns the number of singular (particle, source) samples, which
/// contributed zero.
pub fn aggregate_flux_density(
    particles: &[Particle],
    aux: &mut [ParticleAux],
    fields: &DipoleFieldSet,
) -> usize {
    let mut degenerate_samples = 0;
    for (particle, entry) in particles.iter().zip(aux.iter_mut()) {
        if !entry.charge.is_charged() {
            continue;
        }
        let (flux_density, degenerate) = fields.sum_at(particle.position);
        entry.flux_density = flux_density;
        degenerate_samples += degenerate;
    }
    degenerate_samples
}
