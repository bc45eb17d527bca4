//! Infrastructure layer - Transport implementations
//!
//! This layer contains:
//! - The HTTP client for the REST data service (client)
//! - Repository implementations over that client (repositories)
//! - An in-memory store implementing the same traits (memory)
//! - Persisted session storage (session_store)
//! - Application state wiring repositories together (state)

pub mod client;
pub mod memory;
pub mod repositories;
pub mod session_store;
pub mod state;

pub use client::RestClient;
pub use memory::{Collection, InMemoryStore};
pub use repositories::*;
pub use session_store::SessionStore;
pub use state::AppState;
