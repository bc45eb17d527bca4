//! User panel: borrowing statistics, open loans and account deletion.

use chrono::{DateTime, Datelike, Utc};

use crate::domain::{BorrowingFilter, LibraryError, WorkflowStep};
use crate::infrastructure::AppState;
use crate::models::{Borrowing, LogAction};
use crate::services::{Steps, log_service};
use crate::session::Session;
use crate::utils::dates;
use crate::utils::{Page, paginate};

/// Counters over a set of borrowings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanCounts {
    pub borrowed: usize,
    pub returned_on_time: usize,
    pub returned_late: usize,
    pub currently_borrowed: usize,
}

impl LoanCounts {
    fn tally<'a>(borrowings: impl IntoIterator<Item = &'a Borrowing>) -> Self {
        let mut counts = LoanCounts::default();
        for b in borrowings {
            counts.borrowed += 1;
            match b.returned_on_time() {
                Some(true) => counts.returned_on_time += 1,
                Some(false) => counts.returned_late += 1,
                None if b.is_active() => counts.currently_borrowed += 1,
                None => {}
            }
        }
        counts
    }
}

#[derive(Debug, Clone)]
pub struct BorrowingStats {
    pub overall: LoanCounts,
    pub year: i32,
    pub month: u32,
    /// Borrowings that started in the selected month
    pub in_month: LoanCounts,
    pub history: Page<Borrowing>,
}

/// An open borrowing joined with its book
#[derive(Debug, Clone)]
pub struct ActiveLoan {
    pub borrowing: Borrowing,
    pub book_title: Option<String>,
    pub book_author: Option<String>,
    pub days_overdue: i64,
}

pub async fn borrowing_stats(
    state: &AppState,
    session: &Session,
    year: i32,
    month: u32,
    page: usize,
    page_size: usize,
) -> Result<BorrowingStats, LibraryError> {
    let user = session.require_user()?;
    if !(1..=12).contains(&month) {
        return Err(LibraryError::Validation(format!("Invalid month {}", month)));
    }

    let borrowings = state
        .borrowing_repo
        .find(BorrowingFilter::for_user(&user.id))
        .await?;

    let overall = LoanCounts::tally(&borrowings);
    let in_month = LoanCounts::tally(borrowings.iter().filter(|b| {
        dates::parse_timestamp(&b.borrow_date)
            .is_some_and(|start| start.year() == year && start.month() == month)
    }));

    Ok(BorrowingStats {
        overall,
        year,
        month,
        in_month,
        history: paginate(borrowings, page, page_size),
    })
}

/// The session user's open borrowings with book details and lateness
pub async fn active_loans(
    state: &AppState,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<Vec<ActiveLoan>, LibraryError> {
    let user = session.require_user()?;

    let (borrowings, books) = tokio::try_join!(
        state
            .borrowing_repo
            .find(BorrowingFilter::active_for_user(&user.id)),
        state.book_repo.find_all(),
    )?;

    Ok(borrowings
        .into_iter()
        .map(|borrowing| {
            let book = books.iter().find(|b| b.id == borrowing.book_id);
            ActiveLoan {
                book_title: book.map(|b| b.title.clone()),
                book_author: book.map(|b| b.author.clone()),
                days_overdue: borrowing.days_overdue(now),
                borrowing,
            }
        })
        .collect())
}

/// Delete the session user's account.
///
/// Refused while any borrowing is still open. Historical borrowings and logs
/// keep pointing at the deleted id. The caller must end the session on
/// success, and also when the error's completed steps include the deletion.
pub async fn delete_account(state: &AppState, session: &Session) -> Result<(), LibraryError> {
    let user = session.require_user()?;

    let open = state
        .borrowing_repo
        .find(BorrowingFilter::active_for_user(&user.id))
        .await?;
    if !open.is_empty() {
        tracing::info!(
            "Refusing to delete {}: {} active borrowing(s)",
            user.email,
            open.len()
        );
        return Err(LibraryError::ActiveLoansBlockDeletion);
    }

    let mut steps = Steps::new("Account deletion");
    steps
        .run(WorkflowStep::DeleteUser, state.user_repo.delete(&user.id))
        .await?;

    steps
        .run(
            WorkflowStep::AppendLog,
            log_service::append(
                state,
                &user.id,
                LogAction::AccountDeletion,
                format!("User {} deleted their account", user.email),
            ),
        )
        .await?;

    tracing::info!("Deleted account {}", user.email);
    Ok(())
}
