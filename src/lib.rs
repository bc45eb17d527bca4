pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod session;
pub mod utils;

pub use domain::{LibraryError, WorkflowStep};
pub use infrastructure::{AppState, InMemoryStore, RestClient, SessionStore};
pub use session::Session;
