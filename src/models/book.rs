use serde::{Deserialize, Serialize};

use super::id;

/// A catalog title together with its lending state.
///
/// `borrowed_by` holds one card id per lent copy, so its length never exceeds
/// `copies` when the record is consistent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub description: String,
    pub year: i32,
    pub copies: u32,
    #[serde(default)]
    pub borrowed_by: Vec<String>,
}

impl Book {
    pub fn borrowed_count(&self) -> usize {
        self.borrowed_by.len()
    }

    pub fn has_available_copy(&self) -> bool {
        self.copies as usize > self.borrowed_by.len()
    }

    pub fn available_copies(&self) -> u32 {
        (self.copies as usize).saturating_sub(self.borrowed_by.len()) as u32
    }

    pub fn is_borrowed(&self) -> bool {
        !self.borrowed_by.is_empty()
    }
}

/// Payload for `POST /books`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub description: String,
    pub year: i32,
    pub copies: u32,
    pub borrowed_by: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_numeric_id_and_missing_borrowers() {
        let json = r#"{"id": 7, "title": "Solaris", "author": "Stanisław Lem", "year": 1961, "copies": 2}"#;
        let book: Book = serde_json::from_str(json).unwrap();

        assert_eq!(book.id, "7");
        assert!(book.borrowed_by.is_empty());
        assert_eq!(book.description, "");
        assert_eq!(book.available_copies(), 2);
    }

    #[test]
    fn availability_follows_borrowers() {
        let json = r#"{"id": "a1", "title": "Solaris", "author": "Stanisław Lem", "description": "",
                       "year": 1961, "copies": 1, "borrowedBy": ["k3j9x0q2a"]}"#;
        let book: Book = serde_json::from_str(json).unwrap();

        assert!(!book.has_available_copy());
        assert_eq!(book.available_copies(), 0);

        let value = serde_json::to_value(&book).unwrap();
        assert_eq!(value["borrowedBy"][0], "k3j9x0q2a");
    }
}
