//! Configuration and parameters
//!
//! Constants, updater settings and the per-tick host context.

pub mod constants;
pub mod updater_params;

pub use constants::*;
pub use updater_params::*;
