// Charged particles streaming past a pair of dipoles, driven by the deflection plugin.
use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use lorentz3d::config::FIXED_TIMESTEP_HZ;
use lorentz3d::{
    DeflectionDiagnostics, DeflectionPlugin, DeflectionSet, DipoleSource, HostSettings, Particle,
    ParticleBuffer, ParticleRemap, UpdaterParams,
};
use rand::Rng;

const EMITTER_ORIGIN: Vec3 = Vec3::new(-40.0, 0.0, 0.0);
const SPAWN_PER_STEP: usize = 4;
const MAX_PARTICLES: usize = 4000;
const KILL_RADIUS: f32 = 80.0;

#[derive(Component)]
struct ParticleVisual {
    index: usize,
}

#[derive(Resource)]
struct ParticleAssets {
    mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(0.0, 60.0, 90.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));
    commands.spawn((
        DirectionalLight::default(),
        Transform::from_xyz(20.0, 40.0, 20.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    let magnet = meshes.add(Cuboid::new(2.0, 6.0, 2.0));
    for (x, strength) in [(-8.0, 4000.0), (12.0, 2500.0)] {
        commands.spawn((
            DipoleSource::new(strength),
            Mesh3d(magnet.clone()),
            MeshMaterial3d(materials.add(Color::srgb(0.8, 0.2, 0.2))),
            Transform::from_xyz(x, 0.0, 0.0),
        ));
    }

    commands.insert_resource(ParticleAssets {
        mesh: meshes.add(Sphere::new(0.3)),
        material: materials.add(Color::hsl(210.0, 0.7, 0.6)),
    });
}

fn emit_particles(
    mut commands: Commands,
    assets: Res<ParticleAssets>,
    mut buffer: ResMut<ParticleBuffer>,
) {
    let mut rand = rand::rng();
    for _ in 0..SPAWN_PER_STEP {
        if buffer.particles.len() >= MAX_PARTICLES {
            return;
        }
        let position = EMITTER_ORIGIN
            + Vec3::new(0.0, rand.random_range(-3.0..=3.0), rand.random_range(-3.0..=3.0));
        let velocity = Vec3::new(rand.random_range(18.0..=26.0), 0.0, 0.0);

        let index = buffer.particles.len();
        buffer.particles.push(Particle::new(position).with_velocity(velocity));
        commands.spawn((
            ParticleVisual { index },
            Mesh3d(assets.mesh.clone()),
            MeshMaterial3d(assets.material.clone()),
            Transform::from_translation(position),
        ));
    }
}

// The core only touches velocities; moving and culling particles is host work.
fn integrate_positions(time: Res<Time<Fixed>>, mut buffer: ResMut<ParticleBuffer>) {
    let dt = time.delta_secs();
    for particle in buffer.particles.iter_mut() {
        particle.position += particle.velocity * dt;
    }
}

fn cull_escaped_particles(mut buffer: ResMut<ParticleBuffer>, mut remap: ResMut<ParticleRemap>) {
    if buffer.particles.iter().all(|p| p.position.length() < KILL_RADIUS) {
        return;
    }

    let mut map = Vec::with_capacity(buffer.particles.len());
    let mut survivors = Vec::with_capacity(buffer.particles.len());
    for particle in buffer.particles.drain(..) {
        if particle.position.length() < KILL_RADIUS {
            map.push(Some(survivors.len()));
            survivors.push(particle);
        } else {
            map.push(None);
        }
    }
    buffer.particles = survivors;
    remap.map = map;
}

fn apply_visual_remap(
    mut commands: Commands,
    remap: Res<ParticleRemap>,
    mut visuals: Query<(Entity, &mut ParticleVisual)>,
) {
    if remap.map.is_empty() {
        return;
    }

    let map_len = remap.map.len();
    for (entity, mut visual) in visuals.iter_mut() {
        let old_index = visual.index;
        if old_index >= map_len {
            continue;
        }

        match remap.map[old_index] {
            Some(new_index) => visual.index = new_index,
            None => {
                commands.entity(entity).despawn();
            }
        }
    }
}

fn update_particle_transforms(
    buffer: Res<ParticleBuffer>,
    mut query: Query<(&ParticleVisual, &mut Transform)>,
) {
    for (visual, mut transform) in query.iter_mut() {
        if let Some(particle) = buffer.particles.get(visual.index) {
            transform.translation = particle.position;
        }
    }
}

#[derive(Component)]
struct DiagnosticsText;

fn setup_diagnostics(mut commands: Commands) {
    commands.spawn((
        Text::default(),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(10.0),
            left: Val::Px(10.0),
            ..default()
        },
        DiagnosticsText,
    ));
}

fn update_diagnostics(
    diagnostics: Res<DiagnosticsStore>,
    deflection: Res<DeflectionDiagnostics>,
    mut query: Query<&mut Text, With<DiagnosticsText>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);

    for mut text in &mut query {
        text.0 = match deflection.last {
            Some(report) => format!(
                "FPS: {:.1}\nParticles: {}\nDeflected: {}\nNeutral: {}",
                fps, report.particles, report.deflected, report.neutral,
            ),
            None => format!("FPS: {:.1}\nDeflection disabled", fps),
        };
    }
}

fn main() {
    App::new()
        .add_plugins(DefaultPlugins)
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        .add_plugins(DeflectionPlugin::new(
            UpdaterParams::default().with_charge_bounds([(-2, -1), (1, 2), (0, 0)]),
        ))
        .insert_resource(Time::<Fixed>::from_hz(FIXED_TIMESTEP_HZ))
        .insert_resource(HostSettings::default().with_force_gain(0.02))
        .add_systems(Startup, (setup_scene, setup_diagnostics))
        .add_systems(
            FixedUpdate,
            (
                (emit_particles, cull_escaped_particles, apply_visual_remap)
                    .chain()
                    .before(DeflectionSet),
                integrate_positions.after(DeflectionSet),
            ),
        )
        .add_systems(Update, (update_particle_transforms, update_diagnostics))
        .run();
}
