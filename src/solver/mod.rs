// src/solver/mod.rs
pub mod charge_assign;
pub mod field_aggregate;
pub mod lorentz;

// Re-export from the solver module
pub use charge_assign::*;
pub use field_aggregate::*;
pub use lorentz::*;
