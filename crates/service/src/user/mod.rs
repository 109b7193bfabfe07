//! Entity CRUD service for users.

pub mod repository;
pub mod service;

pub use repository::{SeaOrmUserRepository, UserRepository};
pub use service::UserService;
