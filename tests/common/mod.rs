#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};
use libris::infrastructure::{AppState, InMemoryStore};
use libris::models::{Book, Borrowing, Role, User};
use libris::session::Session;
use libris::utils::dates;

pub fn member(id: &str, card_id: &str) -> User {
    User {
        id: id.to_string(),
        name: "Jan".into(),
        surname: format!("Kowalski-{}", id),
        email: format!("{}@example.com", id),
        card_id: card_id.to_string(),
        password: "secret1".into(),
        role: Role::Member,
        borrowed_books: Vec::new(),
    }
}

pub fn admin() -> User {
    User {
        role: Role::Admin,
        email: "admin@example.com".into(),
        ..member("admin", "admin0001")
    }
}

pub fn book(id: &str, title: &str, copies: u32) -> Book {
    Book {
        id: id.to_string(),
        title: title.to_string(),
        author: "Henryk Sienkiewicz".into(),
        description: "Historical novel.".into(),
        year: 1884,
        copies,
        borrowed_by: Vec::new(),
    }
}

/// An active borrowing started `days_ago` days ago, minus half a day so
/// day counts never sit on a boundary
pub fn active_borrowing(id: &str, user_id: &str, book_id: &str, days_ago: i64) -> Borrowing {
    let start = Utc::now() - Duration::days(days_ago) + Duration::hours(12);
    Borrowing {
        id: id.to_string(),
        user_id: user_id.to_string(),
        book_id: book_id.to_string(),
        borrow_date: dates::format_timestamp(start),
        expected_return_date: dates::format_timestamp(dates::due_date(start)),
        return_date: String::new(),
    }
}

pub fn setup() -> (AppState, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    (AppState::in_memory(store.clone()), store)
}

pub fn session_for(user: &User) -> Session {
    Session::for_user(user.clone())
}
