use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "libris")]
#[command(about = "Library catalog, loans and administration client", long_about = None, version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Base URL of the data service (overrides LIBRARY_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Named profile; keeps a separate session per profile
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the catalog with available copies
    #[command(alias = "ls")]
    Books,

    /// Show one book
    Book { id: String },

    /// Borrow a copy of a book
    Borrow { book_id: String },

    /// Return one of your borrowings
    Return { borrowing_id: String },

    /// Your active borrowings
    Loans,

    /// Borrowing statistics and history
    Stats {
        /// Year of the monthly breakdown (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,

        /// Month of the monthly breakdown, 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,

        /// History page
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Log in with your card number
    Login { card_id: String, password: String },

    /// Forget the cached session
    Logout,

    /// Show the logged-in user
    Whoami,

    /// Create a new library account
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        surname: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Cancel your membership
    DeleteAccount {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Administrator commands
    #[command(subcommand)]
    Admin(AdminCommands),
}

#[derive(Args, Debug, Clone)]
pub struct BookFields {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub author: String,
    #[arg(long)]
    pub description: String,
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub copies: u32,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Add a book to the catalog
    AddBook(BookFields),

    /// Edit a book; omitted fields keep their value
    EditBook {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        copies: Option<u32>,
    },

    /// Delete a book with no copy on loan
    DeleteBook {
        id: String,
        #[arg(long)]
        yes: bool,
    },

    /// Borrowing history of one book
    BookLoans {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Close a borrowing on behalf of its borrower
    ForceReturn {
        borrowing_id: String,
        #[arg(long)]
        yes: bool,
    },

    /// Event log
    Logs {
        #[arg(long, default_value_t = 1)]
        page: usize,
    },

    /// Report drift between borrowings and book/user lending fields
    Check,

    /// Rewrite drifted book/user lending fields from borrowings
    Repair {
        #[arg(long)]
        yes: bool,
    },
}
