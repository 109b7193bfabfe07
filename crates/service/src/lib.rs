//! Service layer providing business-oriented CRUD operations on top of models.
//! - Separates business logic from data access.
//! - Reuses entity definitions and data-access helpers in `models` crate.
//! - Owns the in-process monitoring state (metric histories, risk scoring).

pub mod errors;
pub mod task;
pub mod user;
pub mod monitoring;
pub mod build_risk;
#[cfg(test)]
pub mod test_support;
