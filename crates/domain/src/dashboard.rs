//! Overview statistics for the back office and the customer dashboard.

use serde::Serialize;

use crate::auth::UserProfile;
use crate::catalog::Book;
use crate::order::Order;

/// How many orders the overview lists as "recent".
pub const RECENT_ORDER_COUNT: usize = 5;

/// How many of their own orders a customer sees on the dashboard.
pub const RECENT_CUSTOMER_ORDER_COUNT: usize = 3;

/// Figures shown on the admin overview.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    /// Books in the catalog
    pub total_books: usize,
    /// Orders placed
    pub total_orders: usize,
    /// Sum of all order totals
    pub total_revenue: f64,
    /// Orders awaiting payment
    pub pending_orders: usize,
    /// First orders of the list, as returned by the backend
    pub recent_orders: Vec<Order>,
}

impl AdminStats {
    /// Computes the overview from the catalog and order list.
    #[must_use]
    pub fn compute(books: &[Book], orders: &[Order]) -> Self {
        Self {
            total_books: books.len(),
            total_orders: orders.len(),
            total_revenue: orders.iter().map(|order| order.total_cost).sum(),
            pending_orders: orders.iter().filter(|order| order.status.is_pending()).count(),
            recent_orders: orders.iter().take(RECENT_ORDER_COUNT).cloned().collect(),
        }
    }
}

/// Figures shown on a customer's own dashboard.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    /// Orders placed by the customer
    pub order_count: usize,
    /// Sum of those orders' totals
    pub total_spent: f64,
    /// First of the customer's orders, in backend order
    pub recent_orders: Vec<Order>,
}

impl CustomerStats {
    /// Computes the dashboard from the full order list, keeping only the
    /// orders that belong to `user`.
    #[must_use]
    pub fn compute(orders: &[Order], user: &UserProfile) -> Self {
        let mine: Vec<&Order> = orders.iter().filter(|order| order.belongs_to(user)).collect();
        Self {
            order_count: mine.len(),
            total_spent: mine.iter().map(|order| order.total_cost).sum(),
            recent_orders: mine
                .into_iter()
                .take(RECENT_CUSTOMER_ORDER_COUNT)
                .cloned()
                .collect(),
        }
    }
}
