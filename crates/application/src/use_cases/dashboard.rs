//! Dashboard loaders for the back office and for customers.

use bookverse_domain::{AdminStats, CustomerStats, UserProfile};

use super::{BooksApi, OrdersApi};
use crate::error::ApiResult;

/// Loads the figures shown on the admin dashboard.
#[derive(Debug, Clone)]
pub struct AdminDashboard {
    books: BooksApi,
    orders: OrdersApi,
}

impl AdminDashboard {
    /// Creates the dashboard loader.
    #[must_use]
    pub const fn new(books: BooksApi, orders: OrdersApi) -> Self {
        Self { books, orders }
    }

    /// Fetches the catalog and orders concurrently and summarizes them.
    ///
    /// # Errors
    ///
    /// Returns the first failing call's error.
    pub async fn load(&self) -> ApiResult<AdminStats> {
        let (books, orders) = tokio::try_join!(self.books.list(1), self.orders.list())?;
        Ok(AdminStats::compute(&books, &orders))
    }
}

/// Loads a signed-in customer's own dashboard.
#[derive(Debug, Clone)]
pub struct CustomerDashboard {
    orders: OrdersApi,
}

impl CustomerDashboard {
    /// Creates the dashboard loader.
    #[must_use]
    pub const fn new(orders: OrdersApi) -> Self {
        Self { orders }
    }

    /// Fetches the order list and summarizes the orders placed by `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the order list cannot be fetched.
    pub async fn load(&self, user: &UserProfile) -> ApiResult<CustomerStats> {
        let orders = self.orders.list().await?;
        Ok(CustomerStats::compute(&orders, user))
    }
}
