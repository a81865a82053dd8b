//! In-memory shopping cart.
//!
//! The cart lives only for the duration of a session; it is never sent to the
//! backend as a whole. Checkout converts it into [`OrderLine`]s.

use crate::catalog::Book;
use crate::order::OrderLine;

/// A book in the cart together with the wanted quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    /// Book snapshot taken when it was added
    pub book: Book,
    /// Units wanted, always at least one
    pub quantity: u32,
}

/// Shopping cart keyed by book id, preserving insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Returns the cart lines.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Returns true if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Adds `quantity` units of `book`, merging with an existing line.
    ///
    /// Adding zero units is a no-op.
    pub fn add(&mut self, book: Book, quantity: u32) {
        if quantity == 0 {
            return;
        }
        match self.items.iter_mut().find(|item| item.book.id == book.id) {
            Some(item) => item.quantity = item.quantity.saturating_add(quantity),
            None => self.items.push(CartItem { book, quantity }),
        }
    }

    /// Removes the line for `book_id`, if present.
    pub fn remove(&mut self, book_id: &str) {
        self.items.retain(|item| item.book.id != book_id);
    }

    /// Sets the quantity for `book_id`; zero removes the line.
    ///
    /// Unknown ids are ignored.
    pub fn update_quantity(&mut self, book_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(book_id);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.book.id == book_id) {
            item.quantity = quantity;
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Total number of units.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.items
            .iter()
            .fold(0, |total, item| total.saturating_add(item.quantity))
    }

    /// Total price of all units.
    #[must_use]
    pub fn total_price(&self) -> f64 {
        self.items
            .iter()
            .map(|item| item.book.price * f64::from(item.quantity))
            .sum()
    }

    /// Converts the cart into checkout lines.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.items
            .iter()
            .map(|item| OrderLine {
                book_id: item.book.id.clone(),
                quantity: item.quantity,
            })
            .collect()
    }
}
