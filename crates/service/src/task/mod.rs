//! Entity CRUD service for tasks.

pub mod repository;
pub mod service;

pub use repository::{SeaOrmTaskRepository, TaskRepository};
pub use service::TaskService;
