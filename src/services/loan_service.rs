//! Loan Service - borrow, return and forced return
//!
//! "Who holds what" lives in three places on the data service: the book's
//! `borrowedBy`, the user's `borrowedBooks` and the borrowing rows. Each
//! workflow here updates all three with independent, sequential writes. There
//! is no transaction: when a write fails, the ones before it stay applied and
//! the error lists them (see `LibraryError::Workflow`). `reconcile_service`
//! can repair the resulting drift.

use chrono::Utc;

use crate::domain::{LibraryError, WorkflowStep};
use crate::infrastructure::AppState;
use crate::models::{Book, Borrowing, LogAction, NewBorrowing, User, remove_first};
use crate::services::{Steps, log_service};
use crate::session::Session;
use crate::utils::dates;

/// Records of a completed borrow
#[derive(Debug, Clone)]
pub struct BorrowReceipt {
    pub book: Book,
    pub user: User,
    pub borrowing: Borrowing,
}

/// Records of a completed return. Book or user are `None` when the record had
/// disappeared from the store and was skipped.
#[derive(Debug, Clone)]
pub struct ReturnReceipt {
    pub borrowing: Borrowing,
    pub book: Option<Book>,
    pub user: Option<User>,
}

/// Borrow one copy of `book` for the session user.
///
/// `book` is the caller's snapshot (typically from the catalog); availability
/// is checked against it before anything is sent to the data service.
pub async fn borrow_book(
    state: &AppState,
    session: &Session,
    book: &Book,
) -> Result<BorrowReceipt, LibraryError> {
    let actor = session.require_user()?;
    if !book.has_available_copy() {
        return Err(LibraryError::NoCopiesAvailable);
    }

    let mut user = state
        .user_repo
        .find_by_id(&actor.id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("User {}", actor.id)))?;

    let mut steps = Steps::new("Borrow");

    user.borrowed_books.push(book.title.clone());
    let user = steps
        .run(WorkflowStep::UpdateUser, state.user_repo.update(&user))
        .await?;

    let mut lent = book.clone();
    lent.borrowed_by.push(user.card_id.clone());
    let lent = steps
        .run(WorkflowStep::UpdateBook, state.book_repo.update(&lent))
        .await?;

    let new_borrowing = NewBorrowing::starting_at(&user.id, &book.id, Utc::now());
    let borrowing = steps
        .run(
            WorkflowStep::CreateBorrowing,
            state.borrowing_repo.create(new_borrowing),
        )
        .await?;

    steps
        .run(
            WorkflowStep::AppendLog,
            log_service::append(
                state,
                &user.id,
                LogAction::Borrow,
                format!("User {} borrowed book: {}", user.email, book.title),
            ),
        )
        .await?;

    tracing::info!(
        "{} borrowed '{}' until {}",
        user.card_id,
        book.title,
        borrowing.expected_return_date
    );

    Ok(BorrowReceipt {
        book: lent,
        user,
        borrowing,
    })
}

/// Fetch the book by id, then borrow it.
pub async fn borrow_book_by_id(
    state: &AppState,
    session: &Session,
    book_id: &str,
) -> Result<BorrowReceipt, LibraryError> {
    session.require_user()?;
    let book = state
        .book_repo
        .find_by_id(book_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("Book {}", book_id)))?;
    borrow_book(state, session, &book).await
}

/// Return one of the session user's own active borrowings.
pub async fn return_book(
    state: &AppState,
    session: &Session,
    borrowing_id: &str,
) -> Result<ReturnReceipt, LibraryError> {
    let actor = session.require_user()?;

    let borrowing = state
        .borrowing_repo
        .find_by_id(borrowing_id)
        .await?
        .filter(|b| b.user_id == actor.id)
        .ok_or_else(|| LibraryError::NotFound(format!("Borrowing {}", borrowing_id)))?;
    if !borrowing.is_active() {
        return Err(LibraryError::AlreadyReturned(borrowing.id));
    }

    let (book, user) = tokio::try_join!(
        state.book_repo.find_by_id(&borrowing.book_id),
        state.user_repo.find_by_id(&actor.id),
    )?;
    let book = book.ok_or_else(|| LibraryError::NotFound(format!("Book {}", borrowing.book_id)))?;
    let user = user.ok_or_else(|| LibraryError::NotFound(format!("User {}", actor.id)))?;

    let details = format!("User {} returned book: {}", user.email, book.title);
    let receipt = close_borrowing(
        state,
        Steps::new("Return"),
        borrowing,
        Some(book),
        Some(user),
        LogAction::Return,
        details,
    )
    .await?;

    tracing::info!("Borrowing {} returned", receipt.borrowing.id);
    Ok(receipt)
}

/// Administrator override: close any active borrowing by id.
///
/// The caller is expected to have confirmed the action. Borrower or book
/// records that no longer exist are skipped; the borrowing is closed anyway.
pub async fn force_return(
    state: &AppState,
    session: &Session,
    borrowing_id: &str,
) -> Result<ReturnReceipt, LibraryError> {
    let admin = session.require_admin()?;

    let borrowing = state
        .borrowing_repo
        .find_by_id(borrowing_id)
        .await?
        .ok_or_else(|| LibraryError::NotFound(format!("Borrowing {}", borrowing_id)))?;
    if !borrowing.is_active() {
        return Err(LibraryError::AlreadyReturned(borrowing.id));
    }

    let (book, user) = tokio::try_join!(
        state.book_repo.find_by_id(&borrowing.book_id),
        state.user_repo.find_by_id(&borrowing.user_id),
    )?;
    if book.is_none() {
        tracing::warn!("Forced return of {}: book {} is gone", borrowing.id, borrowing.book_id);
    }
    if user.is_none() {
        tracing::warn!("Forced return of {}: user {} is gone", borrowing.id, borrowing.user_id);
    }

    let title = book.as_ref().map_or("(deleted book)", |b| b.title.as_str());
    let borrower = user.as_ref().map_or("(deleted user)", |u| u.email.as_str());
    let details = format!(
        "Administrator {} forced return of book: {} from user {}",
        admin.email, title, borrower
    );

    let receipt = close_borrowing(
        state,
        Steps::new("Forced return"),
        borrowing,
        book,
        user,
        LogAction::ForcedReturn,
        details,
    )
    .await?;

    tracing::info!("Administrator {} force-returned {}", admin.email, receipt.borrowing.id);
    Ok(receipt)
}

/// Shared tail of both return paths: close the borrowing, drop one card id
/// from the book, drop one title from the user, then log.
async fn close_borrowing(
    state: &AppState,
    mut steps: Steps,
    mut borrowing: Borrowing,
    book: Option<Book>,
    user: Option<User>,
    action: LogAction,
    details: String,
) -> Result<ReturnReceipt, LibraryError> {
    borrowing.return_date = dates::now_timestamp();
    let borrowing = steps
        .run(
            WorkflowStep::CloseBorrowing,
            state.borrowing_repo.update(&borrowing),
        )
        .await?;

    let card_id = user.as_ref().map(|u| u.card_id.clone());
    let title = book.as_ref().map(|b| b.title.clone());

    let book = match (book, card_id.as_deref()) {
        (Some(mut book), Some(card_id)) => {
            if !remove_first(&mut book.borrowed_by, card_id) {
                tracing::warn!("Card {} was not listed on book {}", card_id, book.id);
            }
            Some(
                steps
                    .run(WorkflowStep::UpdateBook, state.book_repo.update(&book))
                    .await?,
            )
        }
        (book, _) => book,
    };

    let user = match (user, title.as_deref()) {
        (Some(mut user), Some(title)) => {
            if !remove_first(&mut user.borrowed_books, title) {
                tracing::warn!("Title '{}' was not listed on user {}", title, user.id);
            }
            Some(
                steps
                    .run(WorkflowStep::UpdateUser, state.user_repo.update(&user))
                    .await?,
            )
        }
        (user, _) => user,
    };

    steps
        .run(
            WorkflowStep::AppendLog,
            log_service::append(state, &borrowing.user_id, action, details),
        )
        .await?;

    Ok(ReturnReceipt {
        borrowing,
        book,
        user,
    })
}
