//! Registration and login.
//!
//! Credentials are matched by the data service itself through query
//! parameters; this is a convenience check, not a security boundary.

use rand::Rng;
use rand::distributions::Alphanumeric;

use crate::domain::{LibraryError, UserFilter, WorkflowStep};
use crate::infrastructure::AppState;
use crate::models::{LogAction, NewUser, Role, User};
use crate::services::{Steps, log_service};
use crate::session::Session;

pub const CARD_ID_LEN: usize = 9;
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct RegisterInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

impl RegisterInput {
    fn validate(&self) -> Result<(), LibraryError> {
        if self.name.trim().is_empty() {
            return Err(LibraryError::Validation("Name is required".into()));
        }
        if self.surname.trim().is_empty() {
            return Err(LibraryError::Validation("Surname is required".into()));
        }
        if !is_plausible_email(self.email.trim()) {
            return Err(LibraryError::Validation("Invalid email address".into()));
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(LibraryError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        Ok(())
    }
}

fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && domain
            .split_once('.')
            .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Card ids are 9–10 ASCII alphanumerics.
pub fn is_valid_card_id(card_id: &str) -> bool {
    (9..=10).contains(&card_id.len()) && card_id.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Random lowercase alphanumeric card id
pub fn generate_card_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(CARD_ID_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect()
}

/// Returns true when a user with this email is already registered
pub async fn user_exists(state: &AppState, email: &str) -> Result<bool, LibraryError> {
    let matches = state.user_repo.find(UserFilter::by_email(email)).await?;
    Ok(!matches.is_empty())
}

/// Register a new member and log the registration.
///
/// If the log write fails after the account was created, the returned
/// `Workflow` error carries the new card number so the member can still log in.
pub async fn register(state: &AppState, input: RegisterInput) -> Result<User, LibraryError> {
    input.validate()?;
    let email = input.email.trim().to_string();

    if user_exists(state, &email).await? {
        return Err(LibraryError::UserAlreadyExists);
    }

    let new_user = NewUser {
        name: input.name.trim().to_string(),
        surname: input.surname.trim().to_string(),
        email,
        card_id: generate_card_id(),
        password: input.password,
        role: Role::Member,
        borrowed_books: Vec::new(),
    };
    let mut steps = Steps::new("Registration");
    let user = steps
        .run(WorkflowStep::CreateUser, state.user_repo.create(new_user))
        .await?;
    steps.note_created(format!("your card number is {}", user.card_id));

    steps
        .run(
            WorkflowStep::AppendLog,
            log_service::append(
                state,
                &user.id,
                LogAction::Registration,
                format!("Registered user {}", user.email),
            ),
        )
        .await?;

    tracing::info!("Registered user {} with card {}", user.email, user.card_id);
    Ok(user)
}

/// Look up the user by card id and password. The first match wins.
pub async fn login(state: &AppState, card_id: &str, password: &str) -> Result<User, LibraryError> {
    if !is_valid_card_id(card_id) {
        return Err(LibraryError::Validation(
            "Card number must be 9 to 10 alphanumeric characters".into(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(LibraryError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let user = state
        .user_repo
        .find(UserFilter::by_credentials(card_id, password))
        .await?
        .into_iter()
        .next()
        .ok_or(LibraryError::InvalidCredentials)?;

    log_service::append(
        state,
        &user.id,
        LogAction::Login,
        format!("User {} logged in.", user.email),
    )
    .await?;

    tracing::info!("User {} logged in", user.email);
    Ok(user)
}

/// Replace the cached user with the current store record. A user deleted in
/// the meantime ends the session.
pub async fn refresh_session(state: &AppState, session: &mut Session) -> Result<(), LibraryError> {
    let Some(cached) = session.user() else {
        return Ok(());
    };

    match state.user_repo.find_by_id(&cached.id).await? {
        Some(user) => session.login(user),
        None => {
            tracing::warn!("Cached user {} no longer exists; logging out", cached.id);
            session.logout();
        }
    }
    Ok(())
}
