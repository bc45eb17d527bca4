use std::fmt;

use serde::{Deserialize, Serialize};

use super::id;

/// Category of an event log entry.
///
/// The stored labels are the ones existing log data already uses, so entries
/// written here sort together with older ones. Unknown labels are kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LogAction {
    Registration,
    Login,
    Borrow,
    Return,
    ForcedReturn,
    AccountDeletion,
    BookAdded,
    BookUpdated,
    BookDeleted,
    Repair,
    Other(String),
}

impl LogAction {
    pub fn label(&self) -> &str {
        match self {
            LogAction::Registration => "Rejestracja",
            LogAction::Login => "Logowanie",
            LogAction::Borrow => "Wypożyczenie książki",
            LogAction::Return => "Zwrot książki",
            LogAction::ForcedReturn => "Wymuszony zwrot książki",
            LogAction::AccountDeletion => "Usunięcie konta",
            LogAction::BookAdded => "Dodanie książki",
            LogAction::BookUpdated => "Edycja książki",
            LogAction::BookDeleted => "Usunięcie książki",
            LogAction::Repair => "Naprawa danych",
            LogAction::Other(label) => label,
        }
    }
}

impl From<String> for LogAction {
    fn from(label: String) -> Self {
        match label.as_str() {
            "Rejestracja" => LogAction::Registration,
            "Logowanie" => LogAction::Login,
            "Wypożyczenie książki" => LogAction::Borrow,
            "Zwrot książki" => LogAction::Return,
            "Wymuszony zwrot książki" => LogAction::ForcedReturn,
            "Usunięcie konta" => LogAction::AccountDeletion,
            "Dodanie książki" => LogAction::BookAdded,
            "Edycja książki" => LogAction::BookUpdated,
            "Usunięcie książki" => LogAction::BookDeleted,
            "Naprawa danych" => LogAction::Repair,
            _ => LogAction::Other(label),
        }
    }
}

impl From<LogAction> for String {
    fn from(action: LogAction) -> Self {
        match action {
            LogAction::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Append-only activity record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub date: String,
    #[serde(deserialize_with = "id::deserialize")]
    pub user_id: String,
    pub action: LogAction,
    #[serde(default)]
    pub details: String,
}

/// Payload for `POST /logs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLogEntry {
    pub date: String,
    pub user_id: String,
    pub action: LogAction,
    pub details: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_and_unknown_actions_survive_the_wire() {
        let json = r#"[{"id": 1, "date": "2025-01-01T00:00:00.000Z", "userId": "4", "action": "Logowanie", "details": "x"},
                       {"id": "2", "date": "2025-01-01T00:00:00.000Z", "userId": "4", "action": "Import", "details": ""}]"#;
        let entries: Vec<LogEntry> = serde_json::from_str(json).unwrap();

        assert_eq!(entries[0].action, LogAction::Login);
        assert_eq!(entries[1].action, LogAction::Other("Import".into()));
        assert_eq!(serde_json::to_value(&entries[1]).unwrap()["action"], "Import");
        assert_eq!(serde_json::to_value(LogAction::Borrow).unwrap(), "Wypożyczenie książki");
    }
}
