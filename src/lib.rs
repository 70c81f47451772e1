pub mod config;
pub mod core;
pub mod error;
pub mod math;
pub mod plugin;
pub mod solver;

// Public re-exports for clean API
pub use crate::config::{HostSettings, SimulationSpace, UpdaterParams};
pub use crate::core::{
    Charge, ChargeBoundPair, ChargeBoundSet, ChargedParticleUpdater, DipoleField, DipoleFieldSet,
    FieldId, Particle, ParticleAux, StrengthUpdate, TickOutcome, TickReport, UpdaterStatus,
    Validation,
};
pub use crate::error::{ConfigIssue, DeflectionError};
pub use crate::math::{Handedness, Real, Vector};
pub use crate::plugin::{
    DeflectionDiagnostics, DeflectionPlugin, DeflectionSet, DipoleSource, ParticleBuffer,
    ParticleRemap,
};
