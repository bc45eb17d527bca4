pub mod book;
pub mod borrowing;
pub mod log;
pub mod user;

pub use book::{Book, NewBook};
pub use borrowing::{Borrowing, NewBorrowing};
pub use log::{LogAction, LogEntry, NewLogEntry};
pub use user::{NewUser, Role, User};

/// The data service hands out ids as JSON strings, but records seeded by hand
/// often carry plain numbers. Both normalize to `String`.
pub(crate) mod id {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        })
    }
}

/// Remove the first element equal to `value`. Returns whether one was found.
pub(crate) fn remove_first(items: &mut Vec<String>, value: &str) -> bool {
    match items.iter().position(|item| item == value) {
        Some(index) => {
            items.remove(index);
            true
        }
        None => false,
    }
}
