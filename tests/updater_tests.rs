use std::num::NonZeroI32;

use approx::assert_relative_eq;
use bevy::math::Vec3;
use lorentz3d::{
    Charge, ChargedParticleUpdater, ConfigIssue, DeflectionError, DipoleField, FieldId, Handedness,
    HostSettings, Particle, SimulationSpace, TickOutcome, UpdaterParams, UpdaterStatus,
};

/// Dipole at the origin, moment along +Y, strength 1
fn unit_dipole() -> DipoleField {
    DipoleField::new(Vec3::ZERO, Vec3::Y, 1.0).unwrap()
}

fn updater_with(params: UpdaterParams) -> ChargedParticleUpdater {
    let mut updater = ChargedParticleUpdater::new(params);
    updater.add_field(FieldId(0), unit_dipole());
    updater
}

fn seeded() -> UpdaterParams {
    UpdaterParams::default().with_seed(42)
}

fn charge(q: i32) -> Charge {
    Charge::Charged(NonZeroI32::new(q).unwrap())
}

fn on_axis_particle() -> Particle {
    Particle::new(Vec3::new(0.0, 2.0, 0.0)).with_velocity(Vec3::X)
}

// ==================================================================================
// End-to-end deflection
// ==================================================================================

#[test]
fn single_tick_right_handed() {
    let mut updater = updater_with(seeded());
    let mut particles = vec![on_axis_particle()];
    updater.force_charge(0, charge(1));

    let outcome = updater.tick(&mut particles, &HostSettings::default());

    let report = outcome.report().expect("updater should be active");
    assert_eq!(report.deflected, 1);
    assert_eq!(report.newly_charged, 0);
    assert!(updater.flux_density(0).unwrap().abs_diff_eq(Vec3::new(0.0, 0.25, 0.0), 1e-6));
    // v x B = (1,0,0) x (0,0.25,0) = (0,0,0.25)
    assert!(
        particles[0].velocity.abs_diff_eq(Vec3::new(1.0, 0.0, 0.25), 1e-6),
        "got {}",
        particles[0].velocity
    );
}

#[test]
fn single_tick_left_handed() {
    let mut updater = updater_with(seeded().with_handedness(Handedness::LeftHanded));
    let mut particles = vec![on_axis_particle()];
    updater.force_charge(0, charge(1));

    updater.tick(&mut particles, &HostSettings::default());

    // B x v = (0,0.25,0) x (1,0,0) = (0,0,-0.25)
    assert!(particles[0].velocity.abs_diff_eq(Vec3::new(1.0, 0.0, -0.25), 1e-6));
}

#[test]
fn gain_scales_velocity_delta() {
    let mut updater = updater_with(seeded());
    let mut particles = vec![on_axis_particle()];
    updater.force_charge(0, charge(3));

    updater.tick(&mut particles, &HostSettings::default().with_force_gain(0.5));

    assert_relative_eq!(particles[0].velocity.z, 0.5 * 3.0 * 0.25, epsilon = 1e-6);
}

#[test]
fn zero_velocity_and_neutral_particles_are_untouched() {
    let mut updater = updater_with(seeded().with_charge_bounds([(2, 5)]));
    let mut particles = vec![
        Particle::new(Vec3::new(0.0, 2.0, 0.0)),
        on_axis_particle(),
        Particle::new(Vec3::new(1.0, 1.0, 1.0)).with_velocity(Vec3::new(-2.0, 0.5, 3.0)),
    ];
    updater.force_charge(1, Charge::Neutral);
    updater.force_charge(2, Charge::Neutral);

    for _ in 0..5 {
        updater.tick(&mut particles, &HostSettings::default().with_force_gain(7.0));
    }

    assert_eq!(particles[0].velocity, Vec3::ZERO);
    assert_eq!(particles[1].velocity, Vec3::X);
    assert_eq!(particles[2].velocity, Vec3::new(-2.0, 0.5, 3.0));
    assert!(updater.charge(0).unwrap().is_charged());
}

#[test]
fn several_dipoles_are_summed() {
    let mut updater = updater_with(seeded());
    updater.add_field(FieldId(1), DipoleField::new(Vec3::new(0.0, 4.0, 0.0), Vec3::Y, 1.0).unwrap());
    let mut particles = vec![on_axis_particle()];
    updater.force_charge(0, charge(1));

    updater.tick(&mut particles, &HostSettings::default());

    // Both sources sit 2 units away on the axis
    assert!(updater.flux_density(0).unwrap().abs_diff_eq(Vec3::new(0.0, 0.5, 0.0), 1e-6));
    assert_relative_eq!(updater.flux_density_at(Vec3::new(0.0, 2.0, 0.0)).y, 0.5, epsilon = 1e-6);
}

#[test]
fn particle_on_dipole_is_counted_not_poisoned() {
    let mut updater = updater_with(seeded());
    let mut particles = vec![Particle::new(Vec3::ZERO).with_velocity(Vec3::X)];
    updater.force_charge(0, charge(1));

    let outcome = updater.tick(&mut particles, &HostSettings::default());

    assert_eq!(outcome.report().unwrap().degenerate_samples, 1);
    assert!(particles[0].velocity.is_finite());
    assert_eq!(particles[0].velocity, Vec3::X);
}

// ==================================================================================
// Charge assignment
// ==================================================================================

#[test]
fn charges_are_assigned_once() {
    let mut updater = updater_with(seeded().with_charge_bounds([(-50, 50)]));
    let mut particles = vec![on_axis_particle(); 32];

    updater.tick(&mut particles, &HostSettings::default());
    let first: Vec<_> = (0..32).map(|i| updater.charge(i).unwrap()).collect();
    assert!(first.iter().all(|c| !c.is_unassigned()));

    for _ in 0..10 {
        let outcome = updater.tick(&mut particles, &HostSettings::default());
        assert_eq!(outcome.report().unwrap().newly_charged, 0);
    }
    let later: Vec<_> = (0..32).map(|i| updater.charge(i).unwrap()).collect();
    assert_eq!(first, later);
}

#[test]
fn zero_draw_is_permanently_neutral() {
    let mut updater = updater_with(seeded().with_charge_bounds([(0, 0)]));
    let mut particles = vec![on_axis_particle(); 4];

    for _ in 0..3 {
        let outcome = updater.tick(&mut particles, &HostSettings::default());
        let report = outcome.report().unwrap();
        assert_eq!(report.neutral, 4);
        assert_eq!(report.deflected, 0);
    }
    assert!(particles.iter().all(|p| p.velocity == Vec3::X));
}

#[test]
fn same_seed_gives_same_charges() {
    let params = UpdaterParams::default()
        .with_seed(1234)
        .with_charge_bounds([(-10, -1), (1, 10), (20, 30)]);
    let mut a = updater_with(params.clone());
    let mut b = updater_with(params);
    let mut pa = vec![on_axis_particle(); 64];
    let mut pb = pa.clone();

    a.tick(&mut pa, &HostSettings::default());
    b.tick(&mut pb, &HostSettings::default());

    assert_eq!(a.aux(), b.aux());
    assert_eq!(pa, pb);
}

#[test]
fn new_particles_are_charged_on_arrival() {
    let mut updater = updater_with(seeded().with_charge_bounds([(4, 4)]));
    let mut particles = vec![on_axis_particle(); 2];
    updater.tick(&mut particles, &HostSettings::default());

    particles.push(on_axis_particle());
    let outcome = updater.tick(&mut particles, &HostSettings::default());

    assert_eq!(outcome.report().unwrap().newly_charged, 1);
    assert_eq!(updater.charge(2).unwrap().value(), Some(4));
    assert_eq!(updater.aux().len(), 3);

    particles.truncate(1);
    updater.tick(&mut particles, &HostSettings::default());
    assert_eq!(updater.aux().len(), 1);
}

#[test]
fn remap_keeps_charges_with_their_particles() {
    let mut updater = updater_with(seeded());
    let mut particles = vec![on_axis_particle(); 3];
    for (i, q) in [7, 8, 9].into_iter().enumerate() {
        updater.force_charge(i, charge(q));
    }
    updater.tick(&mut particles, &HostSettings::default());

    // Particle 0 dies, the rest shift down
    particles.remove(0);
    updater.remap_particles(&[None, Some(0), Some(1)]);
    let outcome = updater.tick(&mut particles, &HostSettings::default());

    assert_eq!(outcome.report().unwrap().newly_charged, 0);
    assert_eq!(updater.charge(0).unwrap().value(), Some(8));
    assert_eq!(updater.charge(1).unwrap().value(), Some(9));
}

// ==================================================================================
// Charge bounds
// ==================================================================================

#[test]
fn bounds_are_normalized_and_deduplicated_at_init() {
    let updater = ChargedParticleUpdater::new(seeded().with_charge_bounds([(3, -3), (-3, 3), (1, 2)]));
    assert_eq!(updater.charge_bounds(), vec![(-3, 3), (1, 2)]);
}

#[test]
fn set_charge_bounds_recharges_everyone() {
    let mut updater = updater_with(seeded().with_charge_bounds([(1, 1)]));
    let mut particles = vec![on_axis_particle(); 3];
    updater.force_charge(0, Charge::Neutral);
    updater.tick(&mut particles, &HostSettings::default());

    updater.set_charge_bounds(&[(-6, -6), (-6, -6)]).unwrap();
    assert_eq!(updater.charge_bounds(), vec![(-6, -6)]);
    assert!(updater.aux().iter().all(|entry| entry.charge.is_unassigned()));

    let outcome = updater.tick(&mut particles, &HostSettings::default());
    assert_eq!(outcome.report().unwrap().newly_charged, 3);
    assert!((0..3).all(|i| updater.charge(i).unwrap().value() == Some(-6)));
}

#[test]
fn empty_bounds_update_is_rejected_without_side_effects() {
    let mut updater = updater_with(seeded().with_charge_bounds([(2, 9)]));
    let mut particles = vec![on_axis_particle(); 5];
    updater.tick(&mut particles, &HostSettings::default());
    let bounds_before = updater.charge_bounds();
    let aux_before = updater.aux().to_vec();

    assert_eq!(updater.set_charge_bounds(&[]), Err(DeflectionError::EmptyBoundsUpdate));

    assert_eq!(updater.charge_bounds(), bounds_before);
    assert_eq!(updater.aux(), aux_before.as_slice());
}

#[test]
fn bounds_snapshot_is_independent() {
    let mut updater = updater_with(seeded().with_charge_bounds([(-1, 1), (5, 10)]));
    let mut snapshot = updater.charge_bounds();
    snapshot.push((100, 200));
    snapshot[0] = (0, 0);

    assert_eq!(updater.charge_bounds(), vec![(-1, 1), (5, 10)]);
    updater.set_charge_bounds(&snapshot).unwrap();
    assert_eq!(updater.charge_bounds(), vec![(0, 0), (5, 10), (100, 200)]);
}

// ==================================================================================
// Validation and status
// ==================================================================================

#[test]
fn validate_reports_each_issue() {
    let updater = ChargedParticleUpdater::new(seeded().with_charge_bounds(Vec::new()));
    let host = HostSettings::default()
        .with_external_forces(false)
        .with_simulation_space(SimulationSpace::Local);

    let validation = updater.validate(&host);

    assert!(!validation.is_ok());
    for issue in [
        ConfigIssue::ExternalForcesDisabled,
        ConfigIssue::NoFields,
        ConfigIssue::NoChargeBounds,
        ConfigIssue::NotWorldSpace,
    ] {
        assert!(validation.has(issue), "missing {issue:?}");
    }
    assert!(matches!(
        validation.into_result(),
        Err(DeflectionError::ConfigurationInvalid { issues }) if issues.len() == 4
    ));
}

#[test]
fn valid_configuration_passes() {
    let updater = updater_with(seeded());
    assert!(updater.validate(&HostSettings::default()).is_ok());
}

#[test]
fn failing_runtime_check_disables_until_reenabled() {
    let mut updater = updater_with(seeded());
    let mut particles = vec![on_axis_particle()];
    updater.force_charge(0, charge(1));
    let local = HostSettings::default().with_simulation_space(SimulationSpace::Local);

    assert_eq!(updater.tick(&mut particles, &local), TickOutcome::Disabled);
    assert_eq!(
        updater.status(),
        &UpdaterStatus::Disabled {
            issues: vec![ConfigIssue::NotWorldSpace]
        }
    );
    assert_eq!(particles[0].velocity, Vec3::X);

    // Fixing the host alone is not enough: the state is sticky
    assert_eq!(updater.tick(&mut particles, &HostSettings::default()), TickOutcome::Disabled);
    assert_eq!(particles[0].velocity, Vec3::X);

    updater.try_enable(&HostSettings::default()).unwrap();
    assert!(updater.is_active());
    assert!(updater.tick(&mut particles, &HostSettings::default()).report().is_some());
    assert_ne!(particles[0].velocity, Vec3::X);
}

#[test]
fn removing_last_field_disables() {
    let mut updater = updater_with(seeded());
    let mut particles = vec![on_axis_particle()];
    assert!(updater.remove_field(FieldId(0)).is_some());

    assert_eq!(updater.tick(&mut particles, &HostSettings::default()), TickOutcome::Disabled);
    assert!(matches!(
        updater.try_enable(&HostSettings::default()),
        Err(DeflectionError::ConfigurationInvalid { .. })
    ));
    assert!(!updater.is_active());
}

#[test]
fn empty_bounds_never_charge_but_do_not_disable_ticks() {
    let mut updater = updater_with(seeded().with_charge_bounds(Vec::new()));
    let mut particles = vec![on_axis_particle()];

    let outcome = updater.tick(&mut particles, &HostSettings::default());

    assert_eq!(outcome.report().unwrap().newly_charged, 0);
    assert!(updater.charge(0).unwrap().is_unassigned());
    assert_eq!(particles[0].velocity, Vec3::X);
}

#[test]
fn field_strength_can_be_retuned_in_place() {
    let mut updater = updater_with(seeded());
    let field = updater.field_mut(FieldId(0)).unwrap();
    field.set_strength(-2.0);
    assert_relative_eq!(updater.field(FieldId(0)).unwrap().strength(), 2.0);

    updater.retain_fields(|id| id != FieldId(0));
    assert!(updater.fields().is_empty());
}
