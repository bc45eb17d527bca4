//! Repository implementations over the REST data service

pub mod book_repository;
pub mod borrowing_repository;
pub mod log_repository;
pub mod user_repository;

pub use book_repository::RestBookRepository;
pub use borrowing_repository::RestBorrowingRepository;
pub use log_repository::RestLogRepository;
pub use user_repository::RestUserRepository;
