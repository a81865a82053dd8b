//! Checkout, order history and the admin order desk.

use bookverse_domain::{
    ApiRequest, Cart, DomainError, Order, OrderLine, OrderStatus, PlaceOrder, StatusUpdate,
    UserProfile,
};

use crate::error::ApiResult;
use crate::pipeline::AuthenticatedClient;

fn order_path(id: &str) -> Result<String, DomainError> {
    let id = id.trim();
    if id.is_empty() || id.contains('/') {
        return Err(DomainError::InvalidIdentifier(id.to_string()));
    }
    Ok(format!("/orders/{id}"))
}

/// Calls against the `/orders` endpoints.
#[derive(Debug, Clone)]
pub struct OrdersApi {
    client: AuthenticatedClient,
}

impl OrdersApi {
    /// Creates the API on top of a pipeline.
    #[must_use]
    pub const fn new(client: AuthenticatedClient) -> Self {
        Self { client }
    }

    /// Places an order for the given lines.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::EmptyCart`] for an empty order, or the call's
    /// error.
    pub async fn place(&self, lines: &[OrderLine]) -> ApiResult<Option<Order>> {
        if lines.is_empty() {
            return Err(DomainError::EmptyCart.into());
        }
        let request = ApiRequest::post("/orders/place").with_json(&PlaceOrder {
            items: lines.to_vec(),
        })?;
        let order: Option<Order> = self.client.get_optional_data(&request).await?;
        tracing::info!(
            lines = lines.len(),
            order = order.as_ref().map(|o| o.id.as_str()),
            "Order placed"
        );
        Ok(order)
    }

    /// Places an order for everything in the cart, emptying it on success.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart is empty or the call fails; the cart is
    /// left untouched.
    pub async fn checkout(&self, cart: &mut Cart) -> ApiResult<Option<Order>> {
        let order = self.place(&cart.order_lines()).await?;
        cart.clear();
        Ok(order)
    }

    /// Lists every order visible to the caller.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn list(&self) -> ApiResult<Vec<Order>> {
        Ok(self
            .client
            .get_optional_data(&ApiRequest::get("/orders/all"))
            .await?
            .unwrap_or_default())
    }

    /// Lists the orders placed by `user`.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails.
    pub async fn mine(&self, user: &UserProfile) -> ApiResult<Vec<Order>> {
        let mut orders = self.list().await?;
        orders.retain(|order| order.belongs_to(user));
        Ok(orders)
    }

    /// Fetches one order.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is invalid or the call fails.
    pub async fn get(&self, id: &str) -> ApiResult<Order> {
        self.client.get_data(&ApiRequest::get(order_path(id)?)).await
    }

    /// Moves an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the status is not assignable or the call fails.
    pub async fn update_status(&self, id: &str, status: OrderStatus) -> ApiResult<()> {
        if let OrderStatus::Other(value) = &status {
            return Err(DomainError::InvalidIdentifier(format!("unknown order status: {value}")).into());
        }
        let path = format!("{}/status", order_path(id)?);
        let request = ApiRequest::patch(path).with_json(&StatusUpdate {
            status: status.clone(),
        })?;
        self.client.execute(&request).await?;
        tracing::info!(id, %status, "Order status updated");
        Ok(())
    }
}
