//! Bevy host integration
//!
//! Runs the updater from `FixedUpdate` against a host-owned [`ParticleBuffer`],
//! subscribing every entity that carries a [`DipoleSource`]. Spawning, killing
//! and drawing particles stays with the host.

use std::collections::HashSet;

use bevy::prelude::*;

use crate::config::{HostSettings, UpdaterParams};
use crate::core::{ChargedParticleUpdater, DipoleField, FieldId, Particle, TickOutcome, TickReport};
use crate::math::Real;

/// Marks an entity as a dipole source. The moment axis is the entity's up
/// direction and its position the global translation.
#[derive(Component, Clone, Copy, Debug)]
#[require(Transform)]
pub struct DipoleSource {
    pub strength: Real,
}

impl DipoleSource {
    pub fn new(strength: Real) -> Self {
        Self { strength }
    }
}

/// Particles the updater deflects, in host order.
#[derive(Resource, Default)]
pub struct ParticleBuffer {
    pub particles: Vec<Particle>,
}

/// Old index -> new index (or `None` for dead particles) after the host
/// compacted [`ParticleBuffer`]. Consumed and cleared each fixed step.
#[derive(Resource, Default)]
pub struct ParticleRemap {
    pub map: Vec<Option<usize>>,
}

/// Counters from the most recent fixed step; `None` while disabled.
#[derive(Resource, Default)]
pub struct DeflectionDiagnostics {
    pub last: Option<TickReport>,
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct DeflectionSet;

/// Mirror `DipoleSource` entities into the updater's field set.
///
/// Only fields this system subscribed are dropped when their entity goes away;
/// fields added directly through the updater are left alone.
pub fn sync_dipole_fields(
    mut updater: ResMut<ChargedParticleUpdater>,
    mut sources: Query<(Entity, &mut DipoleSource, &GlobalTransform)>,
    mut synced: Local<HashSet<FieldId>>,
) {
    let mut live = HashSet::new();
    for (entity, mut source, transform) in sources.iter_mut() {
        let id = FieldId::from(entity);
        match DipoleField::new(
            transform.translation(),
            transform.up().as_vec3(),
            source.strength,
        ) {
            Ok(field) => {
                // Write corrected strengths back so the warning fires once.
                if field.strength() != source.strength {
                    source.strength = field.strength();
                }
                updater.upsert_field(id, field);
                live.insert(id);
            }
            Err(err) => warn!("skipping dipole source {entity}: {err}"),
        }
    }
    for id in synced.difference(&live) {
        updater.remove_field(*id);
    }
    *synced = live;
}

/// Retry a disabled updater once the host reconfigures: settings changed or a
/// dipole source appeared or went away.
pub fn reenable_after_reconfigure(
    mut updater: ResMut<ChargedParticleUpdater>,
    host: Res<HostSettings>,
    added: Query<(), Added<DipoleSource>>,
    mut removed: RemovedComponents<DipoleSource>,
) {
    let sources_changed = !added.is_empty() || removed.read().count() > 0;
    if updater.is_active() || !(host.is_changed() || sources_changed) {
        return;
    }
    if let Err(err) = updater.try_enable(&host) {
        debug!("charged particle updater stays disabled: {err}");
    }
}

pub fn apply_particle_remap(mut updater: ResMut<ChargedParticleUpdater>, remap: Res<ParticleRemap>) {
    if !remap.map.is_empty() {
        updater.remap_particles(&remap.map);
    }
}

pub fn deflect_particles(
    mut updater: ResMut<ChargedParticleUpdater>,
    mut buffer: ResMut<ParticleBuffer>,
    host: Res<HostSettings>,
    mut diagnostics: ResMut<DeflectionDiagnostics>,
) {
    diagnostics.last = match updater.tick(&mut buffer.particles, &host) {
        TickOutcome::Applied(report) => Some(report),
        TickOutcome::Disabled => None,
    };
}

pub fn clear_particle_remap_system(mut remap: ResMut<ParticleRemap>) {
    if !remap.map.is_empty() {
        remap.map.clear();
    }
}

#[derive(Default)]
pub struct DeflectionPlugin {
    pub params: UpdaterParams,
}

impl DeflectionPlugin {
    pub fn new(params: UpdaterParams) -> Self {
        Self { params }
    }
}

impl Plugin for DeflectionPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(ChargedParticleUpdater::new(self.params.clone()));
        app.init_resource::<HostSettings>();
        app.init_resource::<ParticleBuffer>();
        app.init_resource::<ParticleRemap>();
        app.init_resource::<DeflectionDiagnostics>();
        app.add_systems(
            FixedUpdate,
            (
                sync_dipole_fields,
                reenable_after_reconfigure,
                apply_particle_remap,
                deflect_particles,
                clear_particle_remap_system,
            )
                .chain()
                .in_set(DeflectionSet),
        );
    }
}
