//! SeaORM entities for the CRUD core plus the data-access helpers the
//! service layer builds on.

pub mod errors;
pub mod db;
pub mod task;
pub mod user;

mod serde_ext;

#[cfg(test)]
mod tests;
