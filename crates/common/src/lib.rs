//! Pieces shared by every crate in the workspace: logging setup and the
//! small wire types that are not tied to an entity.

pub mod types;

pub mod utils {
    pub mod logging;
}
