//! Consistency check between borrowings and the denormalized lending fields.
//!
//! Active borrowings are the source of truth. From them we derive which card
//! ids each book's `borrowedBy` should hold and which titles each user's
//! `borrowedBooks` should hold, compare as multisets, and optionally rewrite
//! the records that drifted (for example after an interrupted borrow).

use std::collections::HashMap;

use crate::domain::{BorrowingFilter, LibraryError};
use crate::infrastructure::AppState;
use crate::models::{Book, LogAction, User};
use crate::services::log_service;
use crate::session::Session;

#[derive(Debug, Clone, PartialEq)]
pub struct BookDrift {
    pub book_id: String,
    pub title: String,
    pub stored: Vec<String>,
    pub expected: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserDrift {
    pub user_id: String,
    pub email: String,
    pub stored: Vec<String>,
    pub expected: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReconcileReport {
    pub books: Vec<BookDrift>,
    pub users: Vec<UserDrift>,
    /// Active borrowings pointing at a user or book that no longer exists
    pub orphaned_borrowings: Vec<String>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.books.is_empty() && self.users.is_empty() && self.orphaned_borrowings.is_empty()
    }
}

fn sorted(mut items: Vec<String>) -> Vec<String> {
    items.sort();
    items
}

/// Compare stored lending fields with what active borrowings imply. Admin only.
pub async fn check(state: &AppState, session: &Session) -> Result<ReconcileReport, LibraryError> {
    session.require_admin()?;

    let (books, users, active) = tokio::try_join!(
        state.book_repo.find_all(),
        state.user_repo.find(Default::default()),
        state.borrowing_repo.find(BorrowingFilter {
            user_id: None,
            active_only: true,
        }),
    )?;

    let books_by_id: HashMap<&str, &Book> = books.iter().map(|b| (b.id.as_str(), b)).collect();
    let users_by_id: HashMap<&str, &User> = users.iter().map(|u| (u.id.as_str(), u)).collect();

    let mut expected_cards: HashMap<&str, Vec<String>> = HashMap::new();
    let mut expected_titles: HashMap<&str, Vec<String>> = HashMap::new();
    let mut report = ReconcileReport::default();

    for borrowing in &active {
        let book = books_by_id.get(borrowing.book_id.as_str()).copied();
        let user = users_by_id.get(borrowing.user_id.as_str()).copied();
        match (book, user) {
            (Some(book), Some(user)) => {
                expected_cards
                    .entry(book.id.as_str())
                    .or_default()
                    .push(user.card_id.clone());
                expected_titles
                    .entry(user.id.as_str())
                    .or_default()
                    .push(book.title.clone());
            }
            _ => report.orphaned_borrowings.push(borrowing.id.clone()),
        }
    }

    for book in &books {
        let stored = sorted(book.borrowed_by.clone());
        let expected = sorted(expected_cards.remove(book.id.as_str()).unwrap_or_default());
        if stored != expected {
            report.books.push(BookDrift {
                book_id: book.id.clone(),
                title: book.title.clone(),
                stored,
                expected,
            });
        }
    }

    for user in &users {
        let stored = sorted(user.borrowed_books.clone());
        let expected = sorted(expected_titles.remove(user.id.as_str()).unwrap_or_default());
        if stored != expected {
            report.users.push(UserDrift {
                user_id: user.id.clone(),
                email: user.email.clone(),
                stored,
                expected,
            });
        }
    }

    if !report.is_consistent() {
        tracing::warn!(
            "Lending state drift: {} book(s), {} user(s), {} orphaned borrowing(s)",
            report.books.len(),
            report.users.len(),
            report.orphaned_borrowings.len()
        );
    }
    Ok(report)
}

/// Rewrite every drifted book and user with the derived values. Orphaned
/// borrowings are reported but left alone. Returns the report found before
/// repairing.
pub async fn repair(state: &AppState, session: &Session) -> Result<ReconcileReport, LibraryError> {
    let admin = session.require_admin()?;
    let report = check(state, session).await?;

    for drift in &report.books {
        let Some(mut book) = state.book_repo.find_by_id(&drift.book_id).await? else {
            continue;
        };
        book.borrowed_by = drift.expected.clone();
        state.book_repo.update(&book).await?;
        tracing::info!("Repaired borrowers of book {}", book.id);
    }

    for drift in &report.users {
        let Some(mut user) = state.user_repo.find_by_id(&drift.user_id).await? else {
            continue;
        };
        user.borrowed_books = drift.expected.clone();
        state.user_repo.update(&user).await?;
        tracing::info!("Repaired borrowed titles of user {}", user.id);
    }

    if !report.books.is_empty() || !report.users.is_empty() {
        log_service::append(
            state,
            &admin.id,
            LogAction::Repair,
            format!(
                "Administrator {} repaired {} book(s) and {} user(s)",
                admin.email,
                report.books.len(),
                report.users.len()
            ),
        )
        .await?;
    }

    Ok(report)
}
