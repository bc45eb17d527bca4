//! Command dispatch: builds the context, calls the services, prints results.
//!
//! This is the only layer that touches stdin/stdout and the session file.
//! Services receive the session explicitly and never persist it themselves.

use std::io::{self, Write};

use chrono::{Datelike, Utc};

use super::args::{AdminCommands, BookFields, Cli, Commands};
use super::render;
use crate::config::Config;
use crate::domain::{LibraryError, WorkflowStep};
use crate::infrastructure::{AppState, RestClient, SessionStore};
use crate::services::auth_service::{self, RegisterInput};
use crate::services::book_service::{self, BookInput};
use crate::services::{catalog_service, loan_service, log_service, reconcile_service, user_service};
use crate::session::Session;

pub struct AppContext {
    pub state: AppState,
    pub session: Session,
    pub store: SessionStore,
    pub page_size: usize,
}

impl AppContext {
    /// Connect to the data service and restore the cached session
    pub fn from_config(config: &Config) -> Result<Self, LibraryError> {
        let client = RestClient::new(&config.api_url, config.http_timeout)?;
        let store = SessionStore::new(config.session_file.clone());
        let session = store.hydrate()?;
        tracing::debug!(
            "Using {} with session file {:?}",
            config.api_url,
            store.path()
        );

        Ok(Self {
            state: AppState::new(client),
            session,
            store,
            page_size: config.page_size,
        })
    }
}

pub async fn run(cli: Cli, config: Config) -> Result<(), LibraryError> {
    let mut ctx = AppContext::from_config(&config)?;
    dispatch(&mut ctx, cli.command).await
}

pub async fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<(), LibraryError> {
    match command {
        Commands::Books => handle_books(ctx).await,
        Commands::Book { id } => handle_book(ctx, &id).await,
        Commands::Borrow { book_id } => handle_borrow(ctx, &book_id).await,
        Commands::Return { borrowing_id } => handle_return(ctx, &borrowing_id).await,
        Commands::Loans => handle_loans(ctx).await,
        Commands::Stats { year, month, page } => handle_stats(ctx, year, month, page).await,
        Commands::Login { card_id, password } => handle_login(ctx, &card_id, &password).await,
        Commands::Logout => handle_logout(ctx),
        Commands::Whoami => handle_whoami(ctx).await,
        Commands::Register {
            name,
            surname,
            email,
            password,
        } => {
            handle_register(
                ctx,
                RegisterInput {
                    name,
                    surname,
                    email,
                    password,
                },
            )
            .await
        }
        Commands::DeleteAccount { yes } => handle_delete_account(ctx, yes).await,
        Commands::Admin(cmd) => match cmd {
            AdminCommands::AddBook(fields) => handle_add_book(ctx, fields).await,
            AdminCommands::EditBook {
                id,
                title,
                author,
                description,
                year,
                copies,
            } => {
                ctx.session.require_admin()?;
                let current = catalog_service::book_details(&ctx.state, &id).await?;
                let input = BookInput {
                    title: title.unwrap_or(current.title),
                    author: author.unwrap_or(current.author),
                    description: description.unwrap_or(current.description),
                    year: year.unwrap_or(current.year),
                    copies: copies.unwrap_or(current.copies),
                };
                handle_edit_book(ctx, &id, input).await
            }
            AdminCommands::DeleteBook { id, yes } => handle_delete_book(ctx, &id, yes).await,
            AdminCommands::BookLoans { id, page } => handle_book_loans(ctx, &id, page).await,
            AdminCommands::ForceReturn { borrowing_id, yes } => {
                handle_force_return(ctx, &borrowing_id, yes).await
            }
            AdminCommands::Logs { page } => handle_logs(ctx, page).await,
            AdminCommands::Check => handle_check(ctx).await,
            AdminCommands::Repair { yes } => handle_repair(ctx, yes).await,
        },
    }
}

/// Ask for a yes/no answer on stdin. Anything but "y"/"yes" declines.
fn confirm(prompt: &str) -> Result<bool, LibraryError> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

async fn handle_books(ctx: &mut AppContext) -> Result<(), LibraryError> {
    let entries = catalog_service::list_books(&ctx.state, &ctx.session, Utc::now()).await?;
    print!("{}", render::catalog(&entries));
    Ok(())
}

async fn handle_book(ctx: &mut AppContext, id: &str) -> Result<(), LibraryError> {
    let book = catalog_service::book_details(&ctx.state, id).await?;
    print!("{}", render::book(&book));
    Ok(())
}

async fn handle_borrow(ctx: &mut AppContext, book_id: &str) -> Result<(), LibraryError> {
    let receipt = loan_service::borrow_book_by_id(&ctx.state, &ctx.session, book_id).await?;

    // The user record now lists the new title
    ctx.session.login(receipt.user.clone());
    ctx.store.persist(&ctx.session)?;

    println!(
        "Borrowed '{}' (borrowing {}). Return it by {}.",
        receipt.book.title,
        receipt.borrowing.id,
        receipt
            .borrowing
            .expected_return_date
            .get(..10)
            .unwrap_or(receipt.borrowing.expected_return_date.as_str())
    );
    Ok(())
}

async fn handle_return(ctx: &mut AppContext, borrowing_id: &str) -> Result<(), LibraryError> {
    let receipt = loan_service::return_book(&ctx.state, &ctx.session, borrowing_id).await?;

    if let Some(user) = receipt.user.clone() {
        ctx.session.login(user);
        ctx.store.persist(&ctx.session)?;
    }

    match &receipt.book {
        Some(book) => println!("Returned '{}'.", book.title),
        None => println!("Borrowing {} closed.", receipt.borrowing.id),
    }
    Ok(())
}

async fn handle_loans(ctx: &mut AppContext) -> Result<(), LibraryError> {
    let loans = user_service::active_loans(&ctx.state, &ctx.session, Utc::now()).await?;
    print!("{}", render::active_loans(&loans));
    Ok(())
}

async fn handle_stats(
    ctx: &mut AppContext,
    year: Option<i32>,
    month: Option<u32>,
    page: usize,
) -> Result<(), LibraryError> {
    let today = Utc::now();
    let stats = user_service::borrowing_stats(
        &ctx.state,
        &ctx.session,
        year.unwrap_or(today.year()),
        month.unwrap_or(today.month()),
        page,
        ctx.page_size,
    )
    .await?;
    print!("{}", render::stats(&stats));
    Ok(())
}

async fn handle_login(ctx: &mut AppContext, card_id: &str, password: &str) -> Result<(), LibraryError> {
    let user = auth_service::login(&ctx.state, card_id, password).await?;
    println!("Logged in as {}.", user.display_name());

    ctx.session.login(user);
    ctx.store.persist(&ctx.session)
}

fn handle_logout(ctx: &mut AppContext) -> Result<(), LibraryError> {
    ctx.session.logout();
    ctx.store.clear()?;
    println!("Logged out.");
    Ok(())
}

async fn handle_whoami(ctx: &mut AppContext) -> Result<(), LibraryError> {
    auth_service::refresh_session(&ctx.state, &mut ctx.session).await?;
    ctx.store.persist(&ctx.session)?;

    match ctx.session.user() {
        Some(user) => print!("{}", render::user(user)),
        None => println!("Not logged in."),
    }
    Ok(())
}

async fn handle_register(ctx: &mut AppContext, input: RegisterInput) -> Result<(), LibraryError> {
    let user = auth_service::register(&ctx.state, input).await?;
    println!(
        "Account created. Your card number is {}; use it to log in.",
        user.card_id
    );
    Ok(())
}

async fn handle_delete_account(ctx: &mut AppContext, yes: bool) -> Result<(), LibraryError> {
    ctx.session.require_user()?;
    if !yes && !confirm("Cancel your membership? This cannot be undone")? {
        println!("Cancelled.");
        return Ok(());
    }

    let result = user_service::delete_account(&ctx.state, &ctx.session).await;
    let deleted = match &result {
        Ok(()) => true,
        Err(e) => e.completed_steps().contains(&WorkflowStep::DeleteUser),
    };
    if deleted {
        ctx.session.logout();
        ctx.store.clear()?;
    }

    result?;
    println!("Your account has been deleted.");
    Ok(())
}

async fn handle_add_book(ctx: &mut AppContext, fields: BookFields) -> Result<(), LibraryError> {
    let book = book_service::add_book(
        &ctx.state,
        &ctx.session,
        BookInput {
            title: fields.title,
            author: fields.author,
            description: fields.description,
            year: fields.year,
            copies: fields.copies,
        },
    )
    .await?;
    println!("Added '{}' with id {}.", book.title, book.id);
    Ok(())
}

async fn handle_edit_book(ctx: &mut AppContext, id: &str, input: BookInput) -> Result<(), LibraryError> {
    let book = book_service::update_book(&ctx.state, &ctx.session, id, input).await?;
    println!("Updated '{}'.", book.title);
    Ok(())
}

async fn handle_delete_book(ctx: &mut AppContext, id: &str, yes: bool) -> Result<(), LibraryError> {
    ctx.session.require_admin()?;
    if !yes && !confirm(&format!("Delete book {}?", id))? {
        println!("Cancelled.");
        return Ok(());
    }

    book_service::delete_book(&ctx.state, &ctx.session, id).await?;
    println!("Book {} deleted.", id);
    Ok(())
}

async fn handle_book_loans(ctx: &mut AppContext, id: &str, page: usize) -> Result<(), LibraryError> {
    let rows = book_service::book_loans(
        &ctx.state,
        &ctx.session,
        id,
        page,
        ctx.page_size,
        Utc::now(),
    )
    .await?;
    print!("{}", render::book_loans(&rows));
    Ok(())
}

async fn handle_force_return(
    ctx: &mut AppContext,
    borrowing_id: &str,
    yes: bool,
) -> Result<(), LibraryError> {
    ctx.session.require_admin()?;
    if !yes && !confirm(&format!("Force the return of borrowing {}?", borrowing_id))? {
        println!("Cancelled.");
        return Ok(());
    }

    let receipt = loan_service::force_return(&ctx.state, &ctx.session, borrowing_id).await?;
    println!("Borrowing {} closed.", receipt.borrowing.id);
    Ok(())
}

async fn handle_logs(ctx: &mut AppContext, page: usize) -> Result<(), LibraryError> {
    let logs = log_service::list_logs(&ctx.state, &ctx.session, page, ctx.page_size).await?;
    print!("{}", render::logs(&logs));
    Ok(())
}

async fn handle_check(ctx: &mut AppContext) -> Result<(), LibraryError> {
    let report = reconcile_service::check(&ctx.state, &ctx.session).await?;
    print!("{}", render::reconcile(&report));
    Ok(())
}

async fn handle_repair(ctx: &mut AppContext, yes: bool) -> Result<(), LibraryError> {
    let report = reconcile_service::check(&ctx.state, &ctx.session).await?;
    print!("{}", render::reconcile(&report));
    if report.is_consistent() {
        return Ok(());
    }
    if !yes && !confirm("Rewrite the drifted records?")? {
        println!("Cancelled.");
        return Ok(());
    }

    let repaired = reconcile_service::repair(&ctx.state, &ctx.session).await?;
    println!(
        "Repaired {} book(s) and {} user(s).",
        repaired.books.len(),
        repaired.users.len()
    );
    Ok(())
}
