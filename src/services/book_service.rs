//! Book Service - inventory management for administrators

use chrono::{DateTime, Utc};

use crate::domain::{BorrowingFilter, LibraryError};
use crate::infrastructure::AppState;
use crate::models::{Book, Borrowing, LogAction, NewBook};
use crate::services::log_service;
use crate::session::Session;
use crate::utils::{Page, paginate};

/// Fields an administrator fills in for a book
#[derive(Debug, Clone)]
pub struct BookInput {
    pub title: String,
    pub author: String,
    pub description: String,
    pub year: i32,
    pub copies: u32,
}

impl BookInput {
    fn validate(&self) -> Result<(), LibraryError> {
        if self.title.trim().is_empty() {
            return Err(LibraryError::Validation("Title is required".into()));
        }
        if self.author.trim().is_empty() {
            return Err(LibraryError::Validation("Author is required".into()));
        }
        if self.description.trim().is_empty() {
            return Err(LibraryError::Validation("Description is required".into()));
        }
        if self.copies == 0 {
            return Err(LibraryError::Validation("A book needs at least one copy".into()));
        }
        Ok(())
    }
}

/// Lending state of one borrowing, as shown to administrators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanStatus {
    Borrowed,
    Overdue,
    Returned,
}

impl LoanStatus {
    pub fn of(borrowing: &Borrowing, now: DateTime<Utc>) -> Self {
        if !borrowing.is_active() {
            LoanStatus::Returned
        } else if borrowing.is_overdue(now) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Borrowed
        }
    }
}

/// A borrowing of one book joined with its borrower
#[derive(Debug, Clone)]
pub struct BookLoanRow {
    pub borrowing: Borrowing,
    /// "Name Surname (cardId)", or "Unknown user" when the account is gone
    pub borrower: String,
    pub status: LoanStatus,
    pub days_overdue: i64,
}

pub async fn add_book(
    state: &AppState,
    session: &Session,
    input: BookInput,
) -> Result<Book, LibraryError> {
    let admin = session.require_admin()?;
    input.validate()?;

    let book = state
        .book_repo
        .create(NewBook {
            title: input.title.trim().to_string(),
            author: input.author.trim().to_string(),
            description: input.description.trim().to_string(),
            year: input.year,
            copies: input.copies,
            borrowed_by: Vec::new(),
        })
        .await?;

    log_service::append(
        state,
        &admin.id,
        LogAction::BookAdded,
        format!("Administrator {} added book: {}", admin.email, book.title),
    )
    .await?;

    tracing::info!("Added book {} '{}'", book.id, book.title);
    Ok(book)
}

/// Replace the editable fields of a book. The lending state comes from the
/// stored record, never from the caller.
pub async fn update_book(
    state: &AppState,
    session: &Session,
    id: &str,
    input: BookInput,
) -> Result<Book, LibraryError> {
    let admin = session.require_admin()?;
    input.validate()?;

    let stored = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("Book {}", id)))?;

    if (input.copies as usize) < stored.borrowed_count() {
        return Err(LibraryError::CopiesBelowBorrowed {
            copies: input.copies,
            borrowed: stored.borrowed_count(),
        });
    }

    let updated = Book {
        id: stored.id,
        title: input.title.trim().to_string(),
        author: input.author.trim().to_string(),
        description: input.description.trim().to_string(),
        year: input.year,
        copies: input.copies,
        borrowed_by: stored.borrowed_by,
    };
    let updated = state.book_repo.update(&updated).await?;

    log_service::append(
        state,
        &admin.id,
        LogAction::BookUpdated,
        format!("Administrator {} updated book: {}", admin.email, updated.title),
    )
    .await?;

    Ok(updated)
}

/// Delete a book that has no copy out on loan
pub async fn delete_book(state: &AppState, session: &Session, id: &str) -> Result<(), LibraryError> {
    let admin = session.require_admin()?;

    let book = state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("Book {}", id)))?;
    if book.is_borrowed() {
        return Err(LibraryError::BookInUse);
    }

    state.book_repo.delete(&book.id).await?;

    log_service::append(
        state,
        &admin.id,
        LogAction::BookDeleted,
        format!("Administrator {} deleted book: {}", admin.email, book.title),
    )
    .await?;

    tracing::info!("Deleted book {} '{}'", book.id, book.title);
    Ok(())
}

/// Every borrowing of a book, newest first, joined with borrower names
pub async fn book_loans(
    state: &AppState,
    session: &Session,
    book_id: &str,
    page: usize,
    page_size: usize,
    now: DateTime<Utc>,
) -> Result<Page<BookLoanRow>, LibraryError> {
    session.require_admin()?;

    let (borrowings, users) = tokio::try_join!(
        state.borrowing_repo.find(BorrowingFilter::default()),
        state.user_repo.find(Default::default()),
    )?;

    let mut rows: Vec<BookLoanRow> = borrowings
        .into_iter()
        .filter(|b| b.book_id == book_id)
        .map(|borrowing| {
            let borrower = users
                .iter()
                .find(|u| u.id == borrowing.user_id)
                .map(|u| format!("{} ({})", u.display_name(), u.card_id))
                .unwrap_or_else(|| "Unknown user".to_string());
            BookLoanRow {
                status: LoanStatus::of(&borrowing, now),
                days_overdue: borrowing.days_overdue(now),
                borrower,
                borrowing,
            }
        })
        .collect();
    rows.reverse();

    Ok(paginate(rows, page, page_size))
}
