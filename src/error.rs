//! Error types for the deflection core.

use crate::math::Point;

/// A single reason the updater is not simulation-ready.
///
/// Reported one per failing condition so callers can log each separately.
#[derive(thiserror::Error, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigIssue {
    /// The host has external-force coupling switched off.
    #[error("external forces are disabled on the particle host")]
    ExternalForcesDisabled,
    /// No dipole field is subscribed.
    #[error("no dipole fields are subscribed")]
    NoFields,
    /// The charge bound set is empty.
    #[error("charge bounds are empty")]
    NoChargeBounds,
    /// The host simulates in local space instead of world space.
    #[error("particle simulation space must be world space")]
    NotWorldSpace,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum DeflectionError {
    #[error("updater configuration is invalid: {}", join_issues(.issues))]
    ConfigurationInvalid { issues: Vec<ConfigIssue> },

    #[error("flux density is singular at {position} (query coincides with the dipole)")]
    DegenerateInput { position: Point },

    #[error("charge bounds update rejected: no pairs given")]
    EmptyBoundsUpdate,

    #[error("dipole axis must be a finite, non-zero vector")]
    InvalidAxis,
}

fn join_issues(issues: &[ConfigIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
