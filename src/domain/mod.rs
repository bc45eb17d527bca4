//! Domain layer - Pure business abstractions
//!
//! Repository trait definitions and domain error types. Nothing here builds
//! requests; the only transport type is the `reqwest::Error` wrapped by
//! `LibraryError::Http`.

pub mod errors;
pub mod repositories;

pub use errors::{LibraryError, WorkflowStep};
pub use repositories::*;
