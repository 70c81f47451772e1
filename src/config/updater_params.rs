use bevy::prelude::*;

use crate::config::constants::{DEFAULT_CHARGE_BOUNDS, DEFAULT_FORCE_GAIN};
use crate::math::{Handedness, Real};

/// Parameters for building a [`ChargedParticleUpdater`](crate::ChargedParticleUpdater)
#[derive(Resource, Clone, Debug)]
pub struct UpdaterParams {
    /// Inclusive `(lower, upper)` ranges charges are drawn from.
    /// Reversed pairs are swapped and duplicates dropped on construction.
    pub charge_bounds: Vec<(i32, i32)>,

    /// Seed for the charge generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,

    /// Handedness of the host coordinate system
    pub handedness: Handedness,
}

impl Default for UpdaterParams {
    fn default() -> Self {
        Self {
            charge_bounds: DEFAULT_CHARGE_BOUNDS.to_vec(),
            seed: None,
            handedness: Handedness::default(),
        }
    }
}

impl UpdaterParams {
    pub fn with_charge_bounds(mut self, bounds: impl IntoIterator<Item = (i32, i32)>) -> Self {
        self.charge_bounds = bounds.into_iter().collect();
        self
    }

    /// Fix the generator seed so charge assignment is reproducible
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_handedness(mut self, handedness: Handedness) -> Self {
        self.handedness = handedness;
        self
    }
}

/// Space the host particle system simulates in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SimulationSpace {
    #[default]
    World,
    Local,
}

/// Host-owned context read once per tick.
#[derive(Resource, Clone, Copy, Debug)]
pub struct HostSettings {
    /// Scalar gain on the velocity update (the host's external force multiplier)
    pub force_gain: Real,
    pub external_forces_enabled: bool,
    pub simulation_space: SimulationSpace,
}

impl Default for HostSettings {
    fn default() -> Self {
        Self {
            force_gain: DEFAULT_FORCE_GAIN,
            external_forces_enabled: true,
            simulation_space: SimulationSpace::World,
        }
    }
}

impl HostSettings {
    pub fn with_force_gain(mut self, gain: Real) -> Self {
        self.force_gain = gain;
        self
    }

    pub fn with_external_forces(mut self, enabled: bool) -> Self {
        self.external_forces_enabled = enabled;
        self
    }

    pub fn with_simulation_space(mut self, space: SimulationSpace) -> Self {
        self.simulation_space = space;
        self
    }

    #[inline]
    pub fn is_world_space(&self) -> bool {
        self.simulation_space == SimulationSpace::World
    }
}
