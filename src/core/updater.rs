//! Charged particle updater
//!
//! Owns charge bounds, subscribed dipoles and the per-particle auxiliary
//! buffer, and runs the three solver stages once per fixed tick.

use bevy::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{HostSettings, UpdaterParams};
use crate::core::charge::{Charge, ChargeBoundSet};
use crate::core::dipole::{DipoleField, DipoleFieldSet, FieldId};
use crate::core::particle::{AuxBuffer, Particle, ParticleAux};
use crate::error::{ConfigIssue, DeflectionError};
use crate::math::{Handedness, Point, Vector};
use crate::solver::{aggregate_flux_density, apply_lorentz_deflection, assign_charges};

/// Whether the updater is running.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum UpdaterStatus {
    #[default]
    Active,
    /// Stays disabled until [`ChargedParticleUpdater::try_enable`] succeeds.
    Disabled { issues: Vec<ConfigIssue> },
}

/// Outcome of [`ChargedParticleUpdater::validate`]: every failing condition.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Validation {
    issues: Vec<ConfigIssue>,
}

impl Validation {
    pub fn is_ok(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[ConfigIssue] {
        &self.issues
    }

    pub fn has(&self, issue: ConfigIssue) -> bool {
        self.issues.contains(&issue)
    }

    pub fn into_result(self) -> Result<(), DeflectionError> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(DeflectionError::ConfigurationInvalid {
                issues: self.issues,
            })
        }
    }
}

/// Per-tick counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub particles: usize,
    pub newly_charged: usize,
    pub neutral: usize,
    pub deflected: usize,
    pub degenerate_samples: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Applied(TickReport),
    /// Nothing was done; see [`ChargedParticleUpdater::status`].
    Disabled,
}

impl TickOutcome {
    pub fn report(&self) -> Option<&TickReport> {
        match self {
            Self::Applied(report) => Some(report),
            Self::Disabled => None,
        }
    }
}

#[derive(Resource)]
pub struct ChargedParticleUpdater {
    charge_bounds: ChargeBoundSet,
    fields: DipoleFieldSet,
    aux: AuxBuffer,
    rng: StdRng,
    handedness: Handedness,
    status: UpdaterStatus,
}

impl ChargedParticleUpdater {
    pub fn new(params: UpdaterParams) -> Self {
        let rng = match params.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };

        Self {
            charge_bounds: ChargeBoundSet::from_pairs(params.charge_bounds),
            fields: DipoleFieldSet::new(),
            aux: AuxBuffer::new(),
            rng,
            handedness: params.handedness,
            status: UpdaterStatus::Active,
        }
    }

    /// Check every precondition against `host`, independently.
    pub fn validate(&self, host: &HostSettings) -> Validation {
        let mut issues = self.runtime_issues(host);
        if self.charge_bounds.is_empty() {
            issues.push(ConfigIssue::NoChargeBounds);
        }
        Validation { issues }
    }

    // Subset re-checked every tick; bounds can only become empty at construction.
    fn runtime_issues(&self, host: &HostSettings) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if !host.external_forces_enabled {
            issues.push(ConfigIssue::ExternalForcesDisabled);
        }
        if self.fields.is_empty() {
            issues.push(ConfigIssue::NoFields);
        }
        if !host.is_world_space() {
            issues.push(ConfigIssue::NotWorldSpace);
        }
        issues
    }

    pub fn status(&self) -> &UpdaterStatus {
        &self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == UpdaterStatus::Active
    }

    /// Leave the disabled state after reconfiguration.
    pub fn try_enable(&mut self, host: &HostSettings) -> Result<(), DeflectionError> {
        self.validate(host).into_result()?;
        if !self.is_active() {
            info!("charged particle updater re-enabled");
        }
        self.status = UpdaterStatus::Active;
        Ok(())
    }

    pub fn disable(&mut self) {
        self.status = UpdaterStatus::Disabled { issues: Vec::new() };
    }

    /// Advance one fixed step, updating `particles[i].velocity` in place.
    pub fn tick(&mut self, particles: &mut [Particle], host: &HostSettings) -> TickOutcome {
        if !self.is_active() {
            return TickOutcome::Disabled;
        }

        let issues = self.runtime_issues(host);
        if !issues.is_empty() {
            for issue in &issues {
                warn!("disabling charged particle updater: {issue}");
            }
            self.status = UpdaterStatus::Disabled { issues };
            return TickOutcome::Disabled;
        }

        self.aux.sync_len(particles.len());
        let aux = self.aux.entries_mut();

        let newly_charged = assign_charges(aux, &self.charge_bounds, &mut self.rng);
        let degenerate_samples = aggregate_flux_density(particles, aux, &self.fields);
        let deflected =
            apply_lorentz_deflection(particles, aux, host.force_gain, self.handedness);

        if degenerate_samples > 0 {
            debug!("{degenerate_samples} particle samples coincided with a dipole");
        }

        TickOutcome::Applied(TickReport {
            particles: particles.len(),
            newly_charged,
            neutral: aux.iter().filter(|entry| entry.charge.is_neutral()).count(),
            deflected,
            degenerate_samples,
        })
    }

    /// Replace the charge bounds and queue every particle for recharge.
    pub fn set_charge_bounds(&mut self, pairs: &[(i32, i32)]) -> Result<(), DeflectionError> {
        if pairs.is_empty() {
            return Err(DeflectionError::EmptyBoundsUpdate);
        }
        self.charge_bounds = ChargeBoundSet::from_pairs(pairs.iter().copied());
        self.aux.reset_charges();
        info!("charge bounds replaced ({} pairs)", self.charge_bounds.len());
        Ok(())
    }

    /// Snapshot of the current bounds.
    pub fn charge_bounds(&self) -> Vec<(i32, i32)> {
        self.charge_bounds.to_tuples()
    }

    pub fn handedness(&self) -> Handedness {
        self.handedness
    }

    pub fn add_field(&mut self, id: FieldId, field: DipoleField) -> bool {
        self.fields.insert(id, field)
    }

    pub fn upsert_field(&mut self, id: FieldId, field: DipoleField) {
        self.fields.upsert(id, field);
    }

    pub fn remove_field(&mut self, id: FieldId) -> Option<DipoleField> {
        self.fields.remove(id)
    }

    pub fn retain_fields(&mut self, keep: impl FnMut(FieldId) -> bool) {
        self.fields.retain(keep);
    }

    pub fn field(&self, id: FieldId) -> Option<&DipoleField> {
        self.fields.get(id)
    }

    pub fn field_mut(&mut self, id: FieldId) -> Option<&mut DipoleField> {
        self.fields.get_mut(id)
    }

    pub fn fields(&self) -> &DipoleFieldSet {
        &self.fields
    }

    /// Summed flux density of all fields at an arbitrary point.
    pub fn flux_density_at(&self, position: Point) -> Vector {
        self.fields.sum_at(position).0
    }

    pub fn aux(&self) -> &[ParticleAux] {
        self.aux.entries()
    }

    pub fn charge(&self, index: usize) -> Option<Charge> {
        self.aux.get(index).map(|entry| entry.charge)
    }

    pub fn flux_density(&self, index: usize) -> Option<Vector> {
        self.aux.get(index).map(|entry| entry.flux_density)
    }

    /// Override one particle's charge, growing the buffer if the index has not
    /// been seen yet. `Charge::Unassigned` queues a redraw.
    pub fn force_charge(&mut self, index: usize, charge: Charge) {
        if index >= self.aux.len() {
            self.aux.sync_len(index + 1);
        }
        if let Some(entry) = self.aux.get_mut(index) {
            entry.charge = charge;
        }
    }

    /// Follow a host compaction; see [`AuxBuffer::remap`].
    pub fn remap_particles(&mut self, map: &[Option<usize>]) {
        let before = self.aux.len();
        let kept = self.aux.remap(map);
        debug!("particle remap kept {kept} of {before} entries");
    }
}

impl Default for ChargedParticleUpdater {
    fn default() -> Self {
        Self::new(UpdaterParams::default())
    }
}
