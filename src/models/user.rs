use std::fmt;

use serde::{Deserialize, Serialize};

use super::id;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Role {
    Admin,
    /// Regular library member; the data service spells it "Klient".
    #[default]
    #[serde(rename = "Klient")]
    Member,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("Admin"),
            Role::Member => f.write_str("Klient"),
        }
    }
}

/// Library member as stored by the data service.
///
/// The password is kept in plain text by the service; the `Debug` impl keeps it
/// out of logs. `borrowed_books` is a multiset of titles, one per open
/// borrowing.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(deserialize_with = "id::deserialize")]
    pub id: String,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub card_id: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub borrowed_books: Vec<String>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn display_name(&self) -> String {
        format!("{} {}", self.name, self.surname)
    }
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("surname", &self.surname)
            .field("email", &self.email)
            .field("card_id", &self.card_id)
            .field("role", &self.role)
            .field("borrowed_books", &self.borrowed_books)
            .finish_non_exhaustive()
    }
}

/// Payload for `POST /users`
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUser {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub card_id: String,
    pub password: String,
    pub role: Role,
    pub borrowed_books: Vec<String>,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("email", &self.email)
            .field("card_id", &self.card_id)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_uses_service_spelling() {
        let json = r#"{"id": "1", "name": "Jan", "surname": "Kowalski", "email": "jan@example.com",
                       "cardId": "ab12cd34e", "password": "secret1", "role": "Klient", "borrowedBooks": []}"#;
        let user: User = serde_json::from_str(json).unwrap();

        assert_eq!(user.role, Role::Member);
        assert!(!user.is_admin());
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), "Admin");
        assert_eq!(serde_json::to_value(Role::Member).unwrap(), "Klient");
    }

    #[test]
    fn debug_output_hides_password() {
        let user = User {
            id: "1".into(),
            name: "Jan".into(),
            surname: "Kowalski".into(),
            email: "jan@example.com".into(),
            card_id: "ab12cd34e".into(),
            password: "hunter22".into(),
            role: Role::Member,
            borrowed_books: vec![],
        };

        assert!(!format!("{:?}", user).contains("hunter22"));
    }
}
