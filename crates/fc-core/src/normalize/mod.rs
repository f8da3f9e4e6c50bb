//! Canonicalization of calculation and scope inputs.
//!
//! Both normalizers are pure and infallible: they fill defaults and drop
//! fields that don't apply. Range checks (e.g. negative amounts) belong to
//! the repository, which knows which operation is being validated.

pub mod calculation;
pub mod scope;

pub use calculation::{normalize_calculation, CalculationInput};
pub use scope::{normalize_scope, parse_list, ScopeInput};
