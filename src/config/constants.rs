// Defaults for the deflection core

/// Charge range handed to particles when no bounds are configured.
pub const DEFAULT_CHARGE_BOUNDS: [(i32, i32); 1] = [(-1, 1)];

/// Squared distance below which a dipole query is treated as singular.
pub const DEGENERATE_DISTANCE_SQUARED: f32 = 1e-12;

/// Fixed simulation rate the plugin installs (ticks per second).
pub const FIXED_TIMESTEP_HZ: f64 = 50.0;

/// Gain applied to the velocity update when the host does not override it.
pub const DEFAULT_FORCE_GAIN: f32 = 1.0;
