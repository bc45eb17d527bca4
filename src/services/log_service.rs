//! Event log: append entries and page through them.

use crate::domain::LibraryError;
use crate::infrastructure::AppState;
use crate::models::{LogAction, LogEntry, NewLogEntry};
use crate::session::Session;
use crate::utils::dates;
use crate::utils::{Page, paginate};

/// Append an entry stamped with the current time
pub async fn append(
    state: &AppState,
    user_id: &str,
    action: LogAction,
    details: impl Into<String>,
) -> Result<LogEntry, LibraryError> {
    let entry = NewLogEntry {
        date: dates::now_timestamp(),
        user_id: user_id.to_string(),
        action,
        details: details.into(),
    };
    tracing::debug!("Log {}: {}", entry.action, entry.details);
    state.log_repo.create(entry).await
}

/// One page of the event log, in store order. Admin only.
pub async fn list_logs(
    state: &AppState,
    session: &Session,
    page: usize,
    page_size: usize,
) -> Result<Page<LogEntry>, LibraryError> {
    session.require_admin()?;
    let logs = state.log_repo.find_all().await?;
    Ok(paginate(logs, page, page_size))
}
