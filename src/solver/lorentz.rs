//! Velocity update stage
//!
//! Applies the magnetic part of the Lorentz force as a velocity delta:
//! `v += gain * q * (B x v)` in a left-handed host, `v x B` in a right-handed one.

use crate::core::particle::{Particle, ParticleAux};
use crate::math::{Handedness, Real, deflection_cross, is_zero_vector};

/// Deflect every charged, moving particle. Returns how many were updated.
pub fn apply_lorentz_deflection(
    particles: &mut [Particle],
    aux: &[ParticleAux],
    force_gain: Real,
    handedness: Handedness,
) -> usize {
    let mut deflected = 0;
    for (particle, entry) in particles.iter_mut().zip(aux.iter()) {
        let Some(charge) = entry.charge.value() else {
            continue;
        };
        if is_zero_vector(particle.velocity) {
            continue;
        }

        let turn = deflection_cross(entry.flux_density, particle.velocity, handedness);
        particle.velocity += turn * (force_gain * charge as Real);
        deflected += 1;
    }
    deflected
}
