use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id;
use crate::utils::dates;

/// One lending of one copy. Never deleted: returning a copy fills in
/// `return_date`, an empty string marks the borrowing as still active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Borrowing {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub user_id: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub book_id: String,
    pub borrow_date: String,
    // Existing data uses the lowercase "r"
    #[serde(rename = "expectedreturnDate", alias = "expectedReturnDate")]
    pub expected_return_date: String,
    #[serde(default)]
    pub return_date: String,
}

impl Borrowing {
    pub fn is_active(&self) -> bool {
        self.return_date.is_empty()
    }

    /// Whole days past the due date, rounded up; 0 once returned or while on time.
    pub fn days_overdue(&self, now: DateTime<Utc>) -> i64 {
        if !self.is_active() {
            return 0;
        }
        match dates::parse_timestamp(&self.expected_return_date) {
            Some(due) => dates::days_overdue(due, now),
            None => {
                tracing::warn!(
                    "Borrowing {} has an unreadable due date '{}'",
                    self.id,
                    self.expected_return_date
                );
                0
            }
        }
    }

    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        self.days_overdue(now) > 0
    }

    /// Days left until the due date (negative once late).
    pub fn remaining_days(&self, now: DateTime<Utc>) -> Option<i64> {
        dates::parse_timestamp(&self.expected_return_date).map(|due| dates::remaining_days(due, now))
    }

    /// `Some(true)` when returned by the due date, `Some(false)` when late,
    /// `None` while active or when a date cannot be read.
    pub fn returned_on_time(&self) -> Option<bool> {
        if self.is_active() {
            return None;
        }
        let returned = dates::parse_timestamp(&self.return_date)?;
        let due = dates::parse_timestamp(&self.expected_return_date)?;
        Some(returned <= due)
    }
}

/// Payload for `POST /borrowings`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBorrowing {
    pub user_id: String,
    pub book_id: String,
    pub borrow_date: String,
    #[serde(rename = "expectedreturnDate")]
    pub expected_return_date: String,
    pub return_date: String,
}

impl NewBorrowing {
    /// An active borrowing starting at `now`, due after the fixed loan period.
    pub fn starting_at(user_id: &str, book_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.to_string(),
            book_id: book_id.to_string(),
            borrow_date: dates::format_timestamp(now),
            expected_return_date: dates::format_timestamp(dates::due_date(now)),
            return_date: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn borrowing(expected: &str, returned: &str) -> Borrowing {
        Borrowing {
            id: "b1".into(),
            user_id: "u1".into(),
            book_id: "1".into(),
            borrow_date: "2025-01-01T10:00:00.000Z".into(),
            expected_return_date: expected.into(),
            return_date: returned.into(),
        }
    }

    #[test]
    fn reads_both_due_date_spellings() {
        let legacy = r#"{"id": "1", "userId": 2, "bookId": "3", "borrowDate": "2025-01-01T10:00:00.000Z",
                         "expectedreturnDate": "2025-01-15T10:00:00.000Z", "returnDate": ""}"#;
        let camel = r#"{"id": "1", "userId": "2", "bookId": "3", "borrowDate": "2025-01-01T10:00:00.000Z",
                        "expectedReturnDate": "2025-01-15T10:00:00.000Z"}"#;

        let a: Borrowing = serde_json::from_str(legacy).unwrap();
        let b: Borrowing = serde_json::from_str(camel).unwrap();

        assert_eq!(a.user_id, "2");
        assert_eq!(a.expected_return_date, b.expected_return_date);
        assert!(b.is_active());

        let value = serde_json::to_value(&a).unwrap();
        assert!(value.get("expectedreturnDate").is_some());
    }

    #[test]
    fn overdue_only_while_active() {
        let now = Utc.with_ymd_and_hms(2025, 1, 20, 9, 0, 0).unwrap();

        let late = borrowing("2025-01-15T10:00:00.000Z", "");
        assert_eq!(late.days_overdue(now), 5);
        assert!(late.is_overdue(now));

        let returned = borrowing("2025-01-15T10:00:00.000Z", "2025-01-19T10:00:00.000Z");
        assert_eq!(returned.days_overdue(now), 0);
        assert_eq!(returned.returned_on_time(), Some(false));
    }

    #[test]
    fn new_borrowing_is_due_in_fourteen_days() {
        let now = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 0).unwrap();
        let new = NewBorrowing::starting_at("u1", "b1", now);

        let start = dates::parse_timestamp(&new.borrow_date).unwrap();
        let due = dates::parse_timestamp(&new.expected_return_date).unwrap();
        assert_eq!(due - start, Duration::days(14));
        assert!(new.return_date.is_empty());
    }
}
