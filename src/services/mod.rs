//! Services Layer
//!
//! Business operations of the library client. Each takes the `AppState` with
//! the repositories to work against and, where it matters who is acting, the
//! current `Session`. The CLI is a thin shell over these functions.

use std::future::Future;

use crate::domain::{LibraryError, WorkflowStep};

pub mod auth_service;
pub mod book_service;
pub mod catalog_service;
pub mod loan_service;
pub mod log_service;
pub mod reconcile_service;
pub mod user_service;

// Re-export for convenience
pub use auth_service::{RegisterInput, login, register};
pub use catalog_service::{CatalogEntry, HeldLoan};
pub use loan_service::{borrow_book, force_return, return_book};

/// Tracks which writes of a workflow went through.
///
/// The first failing write is returned unchanged when nothing was applied
/// before it; any later failure becomes `LibraryError::Workflow`.
pub(crate) struct Steps {
    operation: &'static str,
    completed: Vec<WorkflowStep>,
    created: Option<String>,
}

impl Steps {
    pub(crate) fn new(operation: &'static str) -> Self {
        Self {
            operation,
            completed: Vec::new(),
            created: None,
        }
    }

    /// Remember a record created by an earlier step so a later failure
    /// still reports it
    pub(crate) fn note_created(&mut self, created: impl Into<String>) {
        self.created = Some(created.into());
    }

    pub(crate) async fn run<T, F>(&mut self, step: WorkflowStep, write: F) -> Result<T, LibraryError>
    where
        F: Future<Output = Result<T, LibraryError>>,
    {
        match write.await {
            Ok(value) => {
                self.completed.push(step);
                Ok(value)
            }
            // Nothing applied yet, plain failure
            Err(e) if self.completed.is_empty() => Err(e),
            Err(e) => {
                tracing::error!(
                    "{} failed at step '{}' after {} write(s), earlier writes remain applied: {}",
                    self.operation,
                    step,
                    self.completed.len(),
                    e
                );
                Err(LibraryError::Workflow {
                    operation: self.operation,
                    completed: self.completed.clone(),
                    created: self.created.clone(),
                    source: Box::new(e),
                })
            }
        }
    }
}
