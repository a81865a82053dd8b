//! Order types for checkout, order history and the admin order desk.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::auth::UserProfile;
use crate::error::DomainError;

/// Fulfilment status of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    /// Placed, awaiting payment
    PendingPayment,
    /// Paid
    Paid,
    /// Handed to the carrier
    Shipped,
    /// Received by the customer
    Delivered,
    /// Cancelled
    Cancelled,
    /// Status string this client does not know about
    Other(String),
}

impl OrderStatus {
    /// Statuses an administrator can assign.
    #[must_use]
    pub const fn assignable() -> [Self; 5] {
        [
            Self::PendingPayment,
            Self::Paid,
            Self::Shipped,
            Self::Delivered,
            Self::Cancelled,
        ]
    }

    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::PendingPayment => "PENDING PAYMENT",
            Self::Paid => "PAID",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
            Self::Other(value) => value,
        }
    }

    /// Returns true if the order still awaits payment.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(self, Self::PendingPayment)
    }
}

impl From<String> for OrderStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "PENDING PAYMENT" => Self::PendingPayment,
            "PAID" => Self::Paid,
            "SHIPPED" => Self::Shipped,
            "DELIVERED" => Self::Delivered,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Other(value),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Other(value) => value,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = DomainError;

    /// Parses user input leniently: case-insensitive, `-`/`_` read as spaces.
    /// Only assignable statuses are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', '_'], " ").to_uppercase();
        match Self::from(normalized) {
            Self::Other(_) => Err(DomainError::InvalidIdentifier(format!(
                "unknown order status: {s}"
            ))),
            status => Ok(status),
        }
    }
}

/// Customer reference embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct OrderCustomer {
    /// Account identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Account email
    #[serde(default)]
    pub email: String,
}

/// Shapes the backend sends for an order's customer.
#[derive(Deserialize)]
#[serde(untagged)]
enum CustomerRef {
    Populated(OrderCustomer),
    Id(String),
}

/// Reads a populated customer, a bare id, or `null`.
fn deserialize_customer<'de, D>(deserializer: D) -> Result<OrderCustomer, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<CustomerRef>::deserialize(deserializer)? {
        Some(CustomerRef::Populated(customer)) => customer,
        Some(CustomerRef::Id(id)) => OrderCustomer {
            id,
            email: String::new(),
        },
        None => OrderCustomer::default(),
    })
}

/// Book snapshot embedded in an order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedBook {
    /// Book identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Title
    pub title: String,
    /// Unit price
    pub price: f64,
    /// Blurb
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    /// Line identifier
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Ordered book; `None` once the book has been deleted from the catalog
    #[serde(rename = "bookId", default)]
    pub book: Option<OrderedBook>,
    /// Ordered quantity
    pub quantity: u32,
}

impl OrderItem {
    /// Title to display, with a placeholder for deleted books.
    #[must_use]
    pub fn title(&self) -> &str {
        self.book
            .as_ref()
            .map_or("Unknown book", |book| book.title.as_str())
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    #[serde(rename = "_id")]
    pub id: String,
    /// Ordering customer
    #[serde(rename = "userId", default, deserialize_with = "deserialize_customer")]
    pub user: OrderCustomer,
    /// Ordered lines
    #[serde(default)]
    pub items: Vec<OrderItem>,
    /// Total charged
    pub total_cost: f64,
    /// Fulfilment status
    pub status: OrderStatus,
    /// Creation timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Total number of units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.quantity))
    }

    /// Returns true if the order was placed by `user`, matched by id or email.
    #[must_use]
    pub fn belongs_to(&self, user: &UserProfile) -> bool {
        (!self.user.id.is_empty() && self.user.id == user.id)
            || (!self.user.email.is_empty() && self.user.email == user.email)
    }
}

/// Item of a checkout request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Book being ordered
    pub book_id: String,
    /// Units ordered
    pub quantity: u32,
}

impl FromStr for OrderLine {
    type Err = DomainError;

    /// Parses `BOOK_ID` or `BOOK_ID:QUANTITY` (quantity defaults to 1).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (book_id, quantity) = match s.split_once(':') {
            Some((id, qty)) => {
                let quantity = qty
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|q| *q > 0)
                    .ok_or_else(|| DomainError::InvalidNumber {
                        field: "quantity",
                        value: qty.to_string(),
                    })?;
                (id.trim(), quantity)
            }
            None => (s.trim(), 1),
        };
        if book_id.is_empty() {
            return Err(DomainError::InvalidIdentifier(s.to_string()));
        }
        Ok(Self {
            book_id: book_id.to_string(),
            quantity,
        })
    }
}

/// Body of `POST /orders/place`.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceOrder {
    /// Lines to order
    pub items: Vec<OrderLine>,
}

/// Body of `PATCH /orders/{id}/status`.
#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    /// New status
    pub status: OrderStatus,
}
