//! CLI command definitions and dispatch.

use std::path::PathBuf;

use anyhow::{Context, bail};
use bookverse_application::{
    AdminDashboard, AuthSession, AuthenticatedClient, BooksApi, CartApi, CustomerDashboard,
    OrdersApi, RecommendApi, SessionEvent,
};
use bookverse_domain::{
    BookDraft, GuardDecision, ImageUpload, OrderLine, OrderStatus, Registration, Route,
    UserProfile, parse_price, parse_quantity, parse_tags,
};
use bookverse_infrastructure::{ClientConfig, connect};
use clap::{Args, Parser, Subcommand};

use crate::output::{OutputFormat, Printer};

/// BookVerse - bookstore storefront client
#[derive(Debug, Parser)]
#[command(name = "bookverse", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text", global = true)]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Fields of the admin book form.
#[derive(Debug, Clone, Args)]
pub struct BookArgs {
    /// Title
    #[arg(long)]
    pub title: String,
    /// Author
    #[arg(long)]
    pub author: String,
    /// Unit price; blank means zero
    #[arg(long, default_value = "")]
    pub price: String,
    /// Units in stock; blank means zero
    #[arg(long, default_value = "")]
    pub quantity: String,
    /// Blurb
    #[arg(long, default_value = "")]
    pub description: String,
    /// Comma-separated tags
    #[arg(long, default_value = "")]
    pub tags: String,
    /// Cover image file
    #[arg(long)]
    pub image: Option<PathBuf>,
}

impl BookArgs {
    /// Turns the form fields into a draft, reading the cover image if given.
    ///
    /// # Errors
    ///
    /// Returns an error for malformed numbers or an unreadable image.
    pub async fn to_draft(&self) -> anyhow::Result<BookDraft> {
        let image = match &self.image {
            Some(path) => {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("failed to read {}", path.display()))?;
                let file_name = path
                    .file_name()
                    .map_or_else(|| "cover".to_string(), |name| name.to_string_lossy().into_owned());
                Some(ImageUpload { file_name, bytes })
            }
            None => None,
        };

        Ok(BookDraft {
            title: self.title.clone(),
            author: self.author.clone(),
            price: parse_price(&self.price)?,
            quantity: parse_quantity(&self.quantity)?,
            description: self.description.clone(),
            tags: parse_tags(&self.tags),
            image,
        })
    }
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and remember the session
    Login {
        /// Account email
        email: String,
        /// Account password
        #[arg(long, env = "BOOKVERSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Create an account
    Register {
        /// Account email
        email: String,
        /// Given name
        #[arg(long)]
        firstname: String,
        /// Family name
        #[arg(long)]
        lastname: String,
        /// Account password
        #[arg(long, env = "BOOKVERSE_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Forget the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List the catalog
    Books {
        /// Page number, starting at 1
        #[arg(default_value_t = 1)]
        page: u32,
    },
    /// Search the catalog
    Search {
        /// Search terms
        query: Vec<String>,
    },
    /// Add a book to the catalog (admin)
    BookCreate(BookArgs),
    /// Replace a book's details (admin)
    BookUpdate {
        /// Book id
        id: String,
        /// New details
        #[command(flatten)]
        book: BookArgs,
    },
    /// Remove a book from the catalog (admin)
    BookDelete {
        /// Book id
        id: String,
    },
    /// Add a book to the server-side cart
    CartAdd {
        /// Book id
        book_id: String,
        /// Units to add
        #[arg(default_value_t = 1)]
        quantity: u32,
    },
    /// Place an order
    Checkout {
        /// Items as `BOOK_ID` or `BOOK_ID:QUANTITY`
        #[arg(required = true)]
        items: Vec<OrderLine>,
    },
    /// List orders
    Orders {
        /// Only orders placed by the signed-in user
        #[arg(long)]
        mine: bool,
    },
    /// Show one order
    Order {
        /// Order id
        id: String,
    },
    /// Change an order's status (admin)
    SetStatus {
        /// Order id
        id: String,
        /// New status, e.g. `paid` or `pending-payment`
        status: OrderStatus,
    },
    /// Ask the assistant for reading suggestions
    Recommend {
        /// What you feel like reading
        text: Vec<String>,
    },
    /// Show the admin overview, or your own with `--mine`
    Dashboard {
        /// Only the signed-in user's orders and spending
        #[arg(long)]
        mine: bool,
    },
    /// Check whether a storefront page may be opened
    Route {
        /// Page path, e.g. `/admin/books`
        path: String,
    },
}

impl Cli {
    /// Loads configuration, runs the command and reports session events.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or the command fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        let config = ClientConfig::load(self.config.as_deref())?;
        let client = connect(&config)?;
        let mut events = client.lifecycle().subscribe();

        let result = self.command.run(&client, Printer::new(self.format)).await;

        while let Ok(event) = events.try_recv() {
            report(&event);
        }
        result
    }
}

fn report(event: &SessionEvent) {
    match event {
        SessionEvent::SignInRequired { reason } => {
            tracing::warn!(%reason, "Session expired");
            eprintln!("Your session has expired. Run `bookverse login` to sign in again.");
        }
        other => tracing::debug!(event = ?other, "Session event"),
    }
}

async fn signed_in_user(session: &AuthSession) -> anyhow::Result<UserProfile> {
    match session.restore().await {
        Some(user) => Ok(user),
        None => bail!("not signed in; run `bookverse login` first"),
    }
}

impl Command {
    /// Runs the command against `client`.
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails.
    pub async fn run(self, client: &AuthenticatedClient, out: Printer) -> anyhow::Result<()> {
        let books = BooksApi::new(client.clone());
        let orders = OrdersApi::new(client.clone());

        match self {
            Self::Login { email, password } => {
                let session = AuthSession::new(client.clone());
                let user = session.login(&email, &password).await?;
                tracing::info!(route = %client.lifecycle().current_route(), "Signed in");
                out.user(&user)
            }
            Self::Register {
                email,
                firstname,
                lastname,
                password,
            } => {
                let session = AuthSession::new(client.clone());
                session
                    .register(&Registration {
                        email,
                        password,
                        firstname,
                        lastname,
                    })
                    .await?;
                out.success("Account created. Sign in with `bookverse login`.")
            }
            Self::Logout => {
                AuthSession::new(client.clone()).logout();
                out.success("Signed out")
            }
            Self::Whoami => {
                let session = AuthSession::new(client.clone());
                out.user(&signed_in_user(&session).await?)
            }
            Self::Books { page } => out.books(&books.list(page).await?),
            Self::Search { query } => out.books(&books.search(&query.join(" ")).await?),
            Self::BookCreate(args) => match books.create(&args.to_draft().await?).await? {
                Some(book) => out.book(&book),
                None => out.success("Book created"),
            },
            Self::BookUpdate { id, book } => {
                match books.update(&id, &book.to_draft().await?).await? {
                    Some(book) => out.book(&book),
                    None => out.success("Book updated"),
                }
            }
            Self::BookDelete { id } => {
                books.delete(&id).await?;
                out.success("Book deleted")
            }
            Self::CartAdd { book_id, quantity } => {
                CartApi::new(client.clone()).add(&book_id, quantity).await?;
                out.success("Added to cart")
            }
            Self::Checkout { items } => match orders.place(&items).await? {
                Some(order) => out.order(&order),
                None => out.success("Order placed"),
            },
            Self::Orders { mine } => {
                let list = if mine {
                    let session = AuthSession::new(client.clone());
                    orders.mine(&signed_in_user(&session).await?).await?
                } else {
                    orders.list().await?
                };
                out.orders(&list)
            }
            Self::Order { id } => out.order(&orders.get(&id).await?),
            Self::SetStatus { id, status } => {
                orders.update_status(&id, status.clone()).await?;
                out.success(&format!("Order {id} is now {status}"))
            }
            Self::Recommend { text } => {
                let answer = RecommendApi::new(client.clone())
                    .search(&text.join(" "))
                    .await?;
                out.text(&answer)
            }
            Self::Dashboard { mine: true } => {
                let session = AuthSession::new(client.clone());
                let user = signed_in_user(&session).await?;
                let stats = CustomerDashboard::new(orders).load(&user).await?;
                out.customer_stats(&user, &stats)
            }
            Self::Dashboard { mine: false } => {
                let stats = AdminDashboard::new(books, orders).load().await?;
                out.stats(&stats)
            }
            Self::Route { path } => {
                let session = AuthSession::new(client.clone());
                session.restore().await;
                let route = Route::parse(&path);
                match session.guard(route) {
                    GuardDecision::Allow => out.success(&format!("{route} is open")),
                    GuardDecision::Wait => out.success(&format!("{route} is waiting on the session")),
                    GuardDecision::Redirect(target) => {
                        out.success(&format!("{route} redirects to {target}"))
                    }
                }
            }
        }
    }
}
