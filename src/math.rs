use bevy::math::Vec3;

pub type Real = f32;

pub type Vector = Vec3;
pub type Point = Vec3;

#[inline(always)]
pub fn zero_vector() -> Vector {
    Vec3::ZERO
}

#[inline(always)]
pub fn is_zero_vector(v: Vector) -> bool {
    v == Vec3::ZERO
}

/// Coordinate-system handedness of the host world.
///
/// The deflection term is written as `B x v` for a left-handed host. A
/// right-handed host (Bevy) negates it so particles still curve the physical
/// way, which makes it the textbook `v x B`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Handedness {
    LeftHanded,
    #[default]
    RightHanded,
}

/// Cross product used by the velocity update, respecting `handedness`.
#[inline(always)]
pub fn deflection_cross(flux_density: Vector, velocity: Vector, handedness: Handedness) -> Vector {
    match handedness {
        Handedness::LeftHanded => flux_density.cross(velocity),
        Handedness::RightHanded => velocity.cross(flux_density),
    }
}
