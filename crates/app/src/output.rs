//! Text and JSON output for CLI commands.

use std::io::{self, Write};

use bookverse_domain::{AdminStats, Book, CustomerStats, Order, UserProfile};
use serde::Serialize;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Writes command results to stdout in the selected format.
#[derive(Debug, Clone, Copy)]
pub struct Printer {
    format: OutputFormat,
}

impl Printer {
    /// Creates a printer for `format`.
    #[must_use]
    pub const fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    fn json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
        let mut stdout = io::stdout().lock();
        serde_json::to_writer_pretty(&mut stdout, value)?;
        writeln!(stdout)?;
        Ok(())
    }

    /// Prints a confirmation line. JSON mode prints `{"message": ...}`.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn success(&self, message: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => println!("✓ {message}"),
            OutputFormat::Json => Self::json(&serde_json::json!({ "message": message }))?,
        }
        Ok(())
    }

    /// Prints a user profile.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn user(&self, user: &UserProfile) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(user);
        }
        print_kv("Name", &user.display_name());
        print_kv("Email", &user.email);
        print_kv("Id", &user.id);
        print_kv("Admin", if user.is_admin() { "yes" } else { "no" });
        Ok(())
    }

    /// Prints a list of books.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn books(&self, books: &[Book]) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(books);
        }
        if books.is_empty() {
            println!("No books found.");
        }
        for book in books {
            println!(
                "{:<26} {:>8.2}  {} by {}",
                book.id, book.price, book.title, book.author
            );
        }
        Ok(())
    }

    /// Prints a single book.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn book(&self, book: &Book) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(book);
        }
        print_kv("Id", &book.id);
        print_kv("Title", &book.title);
        print_kv("Author", &book.author);
        print_kv("Price", &format!("{:.2}", book.price));
        if let Some(quantity) = book.quantity {
            print_kv("In stock", &quantity.to_string());
        }
        if !book.tags.is_empty() {
            print_kv("Tags", &book.tags.join(", "));
        }
        Ok(())
    }

    /// Prints a list of orders.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn orders(&self, orders: &[Order]) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(orders);
        }
        if orders.is_empty() {
            println!("No orders found.");
        }
        for order in orders {
            println!(
                "{:<26} {:<16} {:>3} item(s) {:>9.2}  {}",
                order.id,
                order.status,
                order.unit_count(),
                order.total_cost,
                order.user.email
            );
        }
        Ok(())
    }

    /// Prints one order with its items.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn order(&self, order: &Order) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(order);
        }
        print_kv("Id", &order.id);
        print_kv("Status", order.status.as_str());
        print_kv("Customer", &order.user.email);
        print_kv("Total", &format!("{:.2}", order.total_cost));
        for item in &order.items {
            println!("    {:>3} x {}", item.quantity, item.title());
        }
        Ok(())
    }

    /// Prints the admin overview.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn stats(&self, stats: &AdminStats) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(stats);
        }
        print_kv("Books", &stats.total_books.to_string());
        print_kv("Orders", &stats.total_orders.to_string());
        print_kv("Revenue", &format!("{:.2}", stats.total_revenue));
        print_kv("Pending payment", &stats.pending_orders.to_string());
        println!("Recent orders:");
        self.orders(&stats.recent_orders)
    }

    /// Prints a customer's own overview.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn customer_stats(&self, user: &UserProfile, stats: &CustomerStats) -> anyhow::Result<()> {
        if self.format == OutputFormat::Json {
            return Self::json(stats);
        }
        println!("Welcome back, {}!", user.firstname);
        print_kv("Orders", &stats.order_count.to_string());
        print_kv("Total spent", &format!("{:.2}", stats.total_spent));
        println!("Recent orders:");
        self.orders(&stats.recent_orders)
    }

    /// Prints free text, such as a recommendation.
    ///
    /// # Errors
    ///
    /// Returns an error if stdout cannot be written.
    pub fn text(&self, text: &str) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Text => println!("{text}"),
            OutputFormat::Json => Self::json(&serde_json::json!({ "text": text }))?,
        }
        Ok(())
    }
}

/// Print a key-value pair
fn print_kv(key: &str, value: &str) {
    println!("  {:<18} {value}", format!("{key}:"));
}
