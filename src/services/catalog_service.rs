//! Catalog listing with availability and the current user's own loans.

use chrono::{DateTime, Utc};

use crate::domain::{BorrowingFilter, LibraryError};
use crate::infrastructure::AppState;
use crate::models::{Book, Borrowing};
use crate::session::Session;
use crate::utils::dates::Urgency;

/// A book as seen from the catalog
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub book: Book,
    pub available: u32,
    /// The session user's open borrowing of this book, if any
    pub loan: Option<HeldLoan>,
}

#[derive(Debug, Clone)]
pub struct HeldLoan {
    pub borrowing_id: String,
    pub expected_return_date: String,
    pub remaining_days: i64,
    pub urgency: Urgency,
}

impl HeldLoan {
    fn from_borrowing(borrowing: &Borrowing, now: DateTime<Utc>) -> Self {
        let remaining_days = borrowing.remaining_days(now).unwrap_or(0);
        Self {
            borrowing_id: borrowing.id.clone(),
            expected_return_date: borrowing.expected_return_date.clone(),
            remaining_days,
            urgency: Urgency::from_remaining_days(remaining_days),
        }
    }
}

/// Every book in store order. Anonymous sessions see availability only.
pub async fn list_books(
    state: &AppState,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<Vec<CatalogEntry>, LibraryError> {
    let books = state.book_repo.find_all().await?;

    let held = match session.user() {
        Some(user) => {
            state
                .borrowing_repo
                .find(BorrowingFilter::active_for_user(&user.id))
                .await?
        }
        None => Vec::new(),
    };

    Ok(books
        .into_iter()
        .map(|book| {
            let loan = held
                .iter()
                .find(|b| b.book_id == book.id)
                .map(|b| HeldLoan::from_borrowing(b, now));
            CatalogEntry {
                available: book.available_copies(),
                book,
                loan,
            }
        })
        .collect())
}

pub async fn book_details(state: &AppState, id: &str) -> Result<Book, LibraryError> {
    state
        .book_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("Book {}", id)))
}
