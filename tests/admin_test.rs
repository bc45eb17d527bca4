mod common;

use chrono::Utc;
use libris::domain::LibraryError;
use libris::models::LogAction;
use libris::services::book_service::{self, BookInput, LoanStatus};
use libris::services::{log_service, reconcile_service};

use common::{active_borrowing, admin, book, member, session_for, setup};

fn input(copies: u32) -> BookInput {
    BookInput {
        title: "Quo Vadis".into(),
        author: "Henryk Sienkiewicz".into(),
        description: "Rome under Nero.".into(),
        year: 1896,
        copies,
    }
}

#[tokio::test]
async fn add_book_requires_admin() {
    let (state, store) = setup();

    let err = book_service::add_book(&state, &session_for(&member("1", "abc123def")), input(2))
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::Forbidden));
    assert_eq!(store.write_count(), 0);

    let created = book_service::add_book(&state, &session_for(&admin()), input(2))
        .await
        .unwrap();
    assert_eq!(created.copies, 2);
    assert!(created.borrowed_by.is_empty());
    assert_eq!(store.logs().await[0].action, LogAction::BookAdded);
}

#[tokio::test]
async fn copies_cannot_drop_below_borrowed() {
    let (state, store) = setup();
    let mut lent = book("7", "Quo Vadis", 3);
    lent.borrowed_by = vec!["abc123def".into(), "xyz987uvw".into()];
    store.seed_book(lent).await;
    let session = session_for(&admin());

    let err = book_service::update_book(&state, &session, "7", input(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        LibraryError::CopiesBelowBorrowed {
            copies: 1,
            borrowed: 2
        }
    ));
    assert_eq!(store.write_count(), 0);

    let updated = book_service::update_book(&state, &session, "7", input(2))
        .await
        .unwrap();
    assert_eq!(updated.copies, 2);
    assert_eq!(updated.borrowed_by.len(), 2);
    assert_eq!(updated.year, 1896);
}

#[tokio::test]
async fn borrowed_book_cannot_be_deleted() {
    let (state, store) = setup();
    let mut lent = book("7", "Quo Vadis", 1);
    lent.borrowed_by = vec!["abc123def".into()];
    store.seed_book(lent).await;
    store.seed_book(book("8", "Krzyżacy", 1)).await;
    let session = session_for(&admin());

    let err = book_service::delete_book(&state, &session, "7")
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::BookInUse));
    assert_eq!(store.write_count(), 0);

    book_service::delete_book(&state, &session, "8").await.unwrap();
    let books = store.books().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, "7");
    assert_eq!(store.logs().await[0].action, LogAction::BookDeleted);
}

#[tokio::test]
async fn book_loans_newest_first_with_status() {
    let (state, store) = setup();
    store.seed_user(member("1", "abc123def")).await;
    store.seed_book(book("7", "Quo Vadis", 2)).await;

    let mut returned = active_borrowing("b1", "1", "7", 40);
    returned.return_date = returned.expected_return_date.clone();
    store.seed_borrowing(returned).await;
    store
        .seed_borrowing(active_borrowing("b2", "1", "7", 20))
        .await;
    store
        .seed_borrowing(active_borrowing("b3", "ghost", "7", 1))
        .await;
    store
        .seed_borrowing(active_borrowing("b4", "1", "8", 1))
        .await;

    let page = book_service::book_loans(&state, &session_for(&admin()), "7", 1, 5, Utc::now())
        .await
        .unwrap();

    let ids: Vec<&str> = page.items.iter().map(|r| r.borrowing.id.as_str()).collect();
    assert_eq!(ids, vec!["b3", "b2", "b1"]);
    assert_eq!(page.items[0].borrower, "Unknown user");
    assert_eq!(page.items[0].status, LoanStatus::Borrowed);
    assert_eq!(page.items[1].status, LoanStatus::Overdue);
    assert_eq!(page.items[1].days_overdue, 6);
    assert!(page.items[1].borrower.ends_with("(abc123def)"));
    assert_eq!(page.items[2].status, LoanStatus::Returned);
}

#[tokio::test]
async fn logs_are_paged_for_admins_only() {
    let (state, store) = setup();
    for i in 0..7 {
        log_service::append(&state, "1", LogAction::Login, format!("login {}", i))
            .await
            .unwrap();
    }

    let err = log_service::list_logs(&state, &session_for(&member("1", "abc123def")), 1, 5)
        .await
        .unwrap_err();
    assert!(matches!(err, LibraryError::Forbidden));

    let page = log_service::list_logs(&state, &session_for(&admin()), 2, 5)
        .await
        .unwrap();
    assert_eq!(page.total_items, 7);
    assert_eq!(page.total_pages, 2);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].details, "login 5");
    assert_eq!(store.logs().await.len(), 7);
}

#[tokio::test]
async fn check_finds_drift_and_repair_fixes_it() {
    let (state, store) = setup();
    let mut jan = member("1", "abc123def");
    // Title recorded but no matching borrowing
    jan.borrowed_books = vec!["Krzyżacy".into()];
    store.seed_user(jan).await;
    // Active borrowing never reflected on the book
    store.seed_book(book("7", "Quo Vadis", 2)).await;
    store.seed_book(book("8", "Krzyżacy", 1)).await;
    store
        .seed_borrowing(active_borrowing("b1", "1", "7", 2))
        .await;
    store
        .seed_borrowing(active_borrowing("b2", "ghost", "8", 2))
        .await;
    let session = session_for(&admin());

    let report = reconcile_service::check(&state, &session).await.unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.books.len(), 1);
    assert_eq!(report.books[0].book_id, "7");
    assert_eq!(report.books[0].expected, vec!["abc123def"]);
    assert_eq!(report.users.len(), 1);
    assert_eq!(report.users[0].expected, vec!["Quo Vadis"]);
    assert_eq!(report.orphaned_borrowings, vec!["b2"]);
    assert_eq!(store.write_count(), 0);

    reconcile_service::repair(&state, &session).await.unwrap();

    assert_eq!(store.books().await[0].borrowed_by, vec!["abc123def"]);
    assert_eq!(store.users().await[0].borrowed_books, vec!["Quo Vadis"]);
    assert_eq!(store.logs().await.last().unwrap().action, LogAction::Repair);

    let after = reconcile_service::check(&state, &session).await.unwrap();
    assert!(after.books.is_empty());
    assert!(after.users.is_empty());
    assert_eq!(after.orphaned_borrowings, vec!["b2"]);
}
