//! Plain-text rendering of service results.

use std::fmt::Write;

use crate::models::{Book, LogEntry, User};
use crate::services::CatalogEntry;
use crate::services::book_service::{BookLoanRow, LoanStatus};
use crate::services::reconcile_service::ReconcileReport;
use crate::services::user_service::{ActiveLoan, BorrowingStats, LoanCounts};
use crate::utils::Page;
use crate::utils::dates::{self, Urgency};

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Date part of a stored timestamp, or the raw value when it cannot be read
fn short_date(raw: &str) -> String {
    dates::parse_timestamp(raw)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn page_footer<T>(out: &mut String, page: &Page<T>) {
    if page.total_pages > 1 {
        let _ = writeln!(out, "Page {} of {}", page.page, page.total_pages);
    }
}

pub fn catalog(entries: &[CatalogEntry]) -> String {
    if entries.is_empty() {
        return "The catalog is empty.\n".to_string();
    }

    let mut out = String::new();
    for entry in entries {
        let availability = if entry.available == 0 {
            "no copies available".to_string()
        } else {
            format!("{} of {} available", entry.available, entry.book.copies)
        };
        let _ = writeln!(
            out,
            "[{}] {} by {} ({})",
            entry.book.id, entry.book.title, entry.book.author, availability
        );
        if let Some(loan) = &entry.loan {
            let marker = match loan.urgency {
                Urgency::Critical => "!!",
                Urgency::Soon => "!",
                Urgency::Normal => "",
            };
            let _ = writeln!(
                out,
                "      you hold this book, due in {} day(s) {}",
                loan.remaining_days, marker
            );
        }
    }
    out
}

pub fn book(book: &Book) -> String {
    format!(
        "{}\nAuthor: {}\nYear: {}\nCopies: {} ({} borrowed)\n\n{}\n",
        book.title,
        book.author,
        book.year,
        book.copies,
        book.borrowed_count(),
        book.description
    )
}

pub fn user(user: &User) -> String {
    format!(
        "{}\nEmail: {}\nCard number: {}\nRole: {}\nBorrowed titles: {}\n",
        user.display_name(),
        user.email,
        user.card_id,
        user.role,
        user.borrowed_books.len()
    )
}

pub fn active_loans(loans: &[ActiveLoan]) -> String {
    if loans.is_empty() {
        return "You have no borrowed books.\n".to_string();
    }

    let mut out = String::new();
    for loan in loans {
        let _ = writeln!(
            out,
            "[{}] {} by {}",
            loan.borrowing.id,
            loan.book_title.as_deref().unwrap_or("(unknown book)"),
            loan.book_author.as_deref().unwrap_or("?"),
        );
        let _ = write!(
            out,
            "      borrowed {}, due {}",
            short_date(&loan.borrowing.borrow_date),
            short_date(&loan.borrowing.expected_return_date)
        );
        if loan.days_overdue > 0 {
            let _ = write!(out, ", OVERDUE by {} day(s)", loan.days_overdue);
        }
        out.push('\n');
    }
    out
}

fn counts(out: &mut String, label: &str, counts: &LoanCounts) {
    let _ = writeln!(out, "{}", label);
    let _ = writeln!(out, "  borrowed:            {}", counts.borrowed);
    let _ = writeln!(out, "  returned on time:    {}", counts.returned_on_time);
    let _ = writeln!(out, "  returned late:       {}", counts.returned_late);
    let _ = writeln!(out, "  currently borrowed:  {}", counts.currently_borrowed);
}

pub fn stats(stats: &BorrowingStats) -> String {
    let mut out = String::new();
    counts(&mut out, "Overall", &stats.overall);

    let month = stats
        .month
        .checked_sub(1)
        .and_then(|m| MONTHS.get(m as usize))
        .copied()
        .unwrap_or("?");
    counts(&mut out, &format!("{} {}", month, stats.year), &stats.in_month);

    out.push_str("\nHistory\n");
    for b in &stats.history.items {
        let returned = if b.is_active() {
            "not returned".to_string()
        } else {
            short_date(&b.return_date)
        };
        let _ = writeln!(
            out,
            "  book {} | borrowed {} | due {} | returned {}",
            b.book_id,
            short_date(&b.borrow_date),
            short_date(&b.expected_return_date),
            returned
        );
    }
    page_footer(&mut out, &stats.history);
    out
}

pub fn book_loans(page: &Page<BookLoanRow>) -> String {
    if page.items.is_empty() {
        return "This book has never been borrowed.\n".to_string();
    }

    let mut out = String::new();
    for row in &page.items {
        let status = match row.status {
            LoanStatus::Borrowed => "borrowed".to_string(),
            LoanStatus::Overdue => format!("overdue by {} day(s)", row.days_overdue),
            LoanStatus::Returned => "returned".to_string(),
        };
        let _ = writeln!(
            out,
            "[{}] {} | borrowed {} | {}",
            row.borrowing.id,
            row.borrower,
            short_date(&row.borrowing.borrow_date),
            status
        );
    }
    page_footer(&mut out, page);
    out
}

pub fn logs(page: &Page<LogEntry>) -> String {
    if page.items.is_empty() {
        return "The event log is empty.\n".to_string();
    }

    let mut out = String::new();
    for entry in &page.items {
        let when = dates::parse_timestamp(&entry.date)
            .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| entry.date.clone());
        let _ = writeln!(out, "{}: {} - {}", when, entry.action, entry.details);
    }
    page_footer(&mut out, page);
    out
}

pub fn reconcile(report: &ReconcileReport) -> String {
    if report.is_consistent() {
        return "No inconsistencies found.\n".to_string();
    }

    let mut out = String::from("Inconsistencies found:\n");
    for drift in &report.books {
        let _ = writeln!(
            out,
            "  - book {} '{}': borrowedBy {:?}, expected {:?}",
            drift.book_id, drift.title, drift.stored, drift.expected
        );
    }
    for drift in &report.users {
        let _ = writeln!(
            out,
            "  - user {} ({}): borrowedBooks {:?}, expected {:?}",
            drift.user_id, drift.email, drift.stored, drift.expected
        );
    }
    for id in &report.orphaned_borrowings {
        let _ = writeln!(out, "  - borrowing {} references a missing user or book", id);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::HeldLoan;
    use crate::utils::paginate;

    fn sample_book(copies: u32, borrowed_by: &[&str]) -> Book {
        Book {
            id: "1".into(),
            title: "Lalka".into(),
            author: "Bolesław Prus".into(),
            description: "A novel.".into(),
            year: 1890,
            copies,
            borrowed_by: borrowed_by.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn catalog_marks_unavailable_and_held_books() {
        let entries = vec![
            CatalogEntry {
                available: 0,
                book: sample_book(1, &["abc123def"]),
                loan: Some(HeldLoan {
                    borrowing_id: "b1".into(),
                    expected_return_date: "2025-01-15T10:00:00.000Z".into(),
                    remaining_days: 2,
                    urgency: Urgency::Critical,
                }),
            },
        ];

        let out = catalog(&entries);
        assert!(out.contains("[1] Lalka by Bolesław Prus (no copies available)"));
        assert!(out.contains("due in 2 day(s) !!"));
    }

    #[test]
    fn logs_show_page_footer_only_when_needed() {
        let entries: Vec<LogEntry> = (0..7)
            .map(|i| LogEntry {
                id: i.to_string(),
                date: "2025-02-01T08:30:00.000Z".into(),
                user_id: "1".into(),
                action: crate::models::LogAction::Login,
                details: format!("entry {}", i),
            })
            .collect();

        let first = logs(&paginate(entries.clone(), 1, 5));
        assert!(first.contains("2025-02-01 08:30:00: Logowanie - entry 0"));
        assert!(first.contains("Page 1 of 2"));

        let single = logs(&paginate(entries, 1, 10));
        assert!(!single.contains("Page"));
    }
}
