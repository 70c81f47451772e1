pub mod charge;
pub mod dipole;
pub mod particle;
pub mod updater;

pub use charge::{Charge, ChargeBoundPair, ChargeBoundSet};
pub use dipole::{DipoleField, DipoleFieldSet, FieldId, StrengthUpdate};
pub use particle::{AuxBuffer, Particle, ParticleAux};
pub use updater::{ChargedParticleUpdater, TickOutcome, TickReport, UpdaterStatus, Validation};
