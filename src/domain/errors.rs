//! Domain error types
//!
//! The failures a user of the library client can run into. They fall into
//! four groups: local precondition failures (no network call was made), data
//! service failures, lookups that found nothing, and multi-step workflows
//! interrupted half way. Transport failures keep the underlying
//! `reqwest::Error` as their source.

use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LibraryError {
    /// No user is logged in
    #[error("You must be logged in to do this")]
    NotAuthenticated,
    /// Logged-in user lacks the administrator role
    #[error("This action requires the administrator role")]
    Forbidden,
    /// Every copy of the book is already lent
    #[error("No copies available")]
    NoCopiesAvailable,
    /// Account deletion refused while borrowings are still open
    #[error("You cannot cancel your membership while you have active borrowings")]
    ActiveLoansBlockDeletion,
    /// Book deletion refused while copies are lent
    #[error("Cannot delete a book that is currently borrowed")]
    BookInUse,
    #[error(
        "Number of copies ({copies}) cannot be lower than the number of borrowed copies ({borrowed})"
    )]
    CopiesBelowBorrowed { copies: u32, borrowed: usize },
    #[error("Borrowing {0} has already been returned")]
    AlreadyReturned(String),
    #[error("User already exists")]
    UserAlreadyExists,
    /// Input rejected before reaching the data service
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// Transport-level failure (connection refused, timeout, body decode)
    #[error("Request to data service failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Data service answered with a non-2xx status
    #[error("Data service returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Unexpected response from data service: {0}")]
    Decode(String),
    /// Reading or writing the local session file failed
    #[error("Session storage error: {0}")]
    Session(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A workflow failed after some of its writes were already applied
    #[error(
        "{operation} interrupted after {}{}: {source}",
        StepList(.completed),
        CreatedNote(.created)
    )]
    Workflow {
        operation: &'static str,
        completed: Vec<WorkflowStep>,
        /// Record created before the failure that the caller must not lose
        /// (e.g. the card number of a new account)
        created: Option<String>,
        #[source]
        source: Box<LibraryError>,
    },
}

impl LibraryError {
    /// True for failures detected locally, before any write was issued.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LibraryError::NotAuthenticated
                | LibraryError::Forbidden
                | LibraryError::NoCopiesAvailable
                | LibraryError::ActiveLoansBlockDeletion
                | LibraryError::BookInUse
                | LibraryError::CopiesBelowBorrowed { .. }
                | LibraryError::AlreadyReturned(_)
                | LibraryError::UserAlreadyExists
                | LibraryError::Validation(_)
        )
    }

    /// Steps that reached the data service before the failure, if any.
    pub fn completed_steps(&self) -> &[WorkflowStep] {
        match self {
            LibraryError::Workflow { completed, .. } => completed,
            _ => &[],
        }
    }
}

impl From<serde_json::Error> for LibraryError {
    fn from(e: serde_json::Error) -> Self {
        LibraryError::Decode(e.to_string())
    }
}

/// One independent write inside a multi-write workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowStep {
    CreateUser,
    DeleteUser,
    UpdateUser,
    UpdateBook,
    CreateBorrowing,
    CloseBorrowing,
    AppendLog,
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            WorkflowStep::CreateUser => "user created",
            WorkflowStep::DeleteUser => "user deleted",
            WorkflowStep::UpdateUser => "user updated",
            WorkflowStep::UpdateBook => "book updated",
            WorkflowStep::CreateBorrowing => "borrowing created",
            WorkflowStep::CloseBorrowing => "borrowing closed",
            WorkflowStep::AppendLog => "log appended",
        };
        f.write_str(label)
    }
}

struct StepList<'a>(&'a [WorkflowStep]);

impl fmt::Display for StepList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", step)?;
        }
        Ok(())
    }
}

struct CreatedNote<'a>(&'a Option<String>);

impl fmt::Display for CreatedNote<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(created) => write!(f, " ({})", created),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_error_lists_completed_steps() {
        let err = LibraryError::Workflow {
            operation: "Borrow",
            completed: vec![WorkflowStep::UpdateUser, WorkflowStep::UpdateBook],
            created: None,
            source: Box::new(LibraryError::Status {
                status: 500,
                url: "http://localhost:3001/borrowings".to_string(),
            }),
        };

        let message = err.to_string();
        assert!(message.starts_with("Borrow interrupted after user updated, book updated"));
        assert!(message.contains("500"));
        assert_eq!(err.completed_steps().len(), 2);
        assert!(!err.is_precondition());
    }

    #[test]
    fn workflow_error_names_created_record() {
        let err = LibraryError::Workflow {
            operation: "Registration",
            completed: vec![WorkflowStep::CreateUser],
            created: Some("card number abc123def".to_string()),
            source: Box::new(LibraryError::Status {
                status: 500,
                url: "http://localhost:3001/logs".to_string(),
            }),
        };

        assert!(err.to_string().starts_with(
            "Registration interrupted after user created (card number abc123def): "
        ));
    }

    #[test]
    fn precondition_classification() {
        assert!(LibraryError::NoCopiesAvailable.is_precondition());
        assert!(LibraryError::ActiveLoansBlockDeletion.is_precondition());
        assert!(!LibraryError::InvalidCredentials.is_precondition());
        assert!(!LibraryError::NotFound("Book 1".into()).is_precondition());
    }
}
