//! Order service: checkout, status administration and order reads.

use std::sync::Arc;

use common::{AggregateId, Identity, Money, ProductId, UserId};
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use store::{CartStore, CatalogStore, EventStore};

use crate::command::CommandHandler;
use crate::error::DomainError;
use crate::sync::{Committed, Mutation};

use super::{Order, OrderLine, OrderStatus, ShippingDetails};

/// Checkout form as submitted by the customer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    #[serde(default)]
    pub shipping_address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub notes: Option<String>,
}

impl CheckoutRequest {
    pub fn new(shipping_address: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self {
            shipping_address: shipping_address.into(),
            phone_number: phone_number.into(),
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Service for placing and administering orders.
pub struct OrderService<S: EventStore> {
    handler: CommandHandler<S, Order>,
    carts: Arc<dyn CartStore>,
    catalog: Arc<dyn CatalogStore>,
    shipping_fee: Money,
}

impl<S: EventStore> OrderService<S> {
    pub fn new(
        store: S,
        carts: Arc<dyn CartStore>,
        catalog: Arc<dyn CatalogStore>,
        shipping_fee: Money,
    ) -> Self {
        Self {
            handler: CommandHandler::new(store),
            carts,
            catalog,
            shipping_fee,
        }
    }

    /// Converts the user's cart into a `pending` order, then takes the ordered
    /// lines out of the cart.
    ///
    /// Prices are frozen from a single catalog read. Only the quantities read
    /// at checkout are consumed, after the order has been appended; anything
    /// added meanwhile stays in the cart. If consuming fails the order stands.
    #[tracing::instrument(skip(self, request))]
    pub async fn create_order(
        &self,
        user_id: &UserId,
        request: CheckoutRequest,
    ) -> Result<Committed<Order>, DomainError> {
        let cart = self.carts.lines(user_id).await?;
        if cart.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let shipping = ShippingDetails::new(
            &request.shipping_address,
            &request.phone_number,
            request.notes.as_deref(),
        )?;

        let ids: Vec<ProductId> = cart.iter().map(|line| line.product_id).collect();
        let products = self.catalog.get_many(&ids).await?;
        let lines: Vec<OrderLine> = cart
            .iter()
            .filter_map(|line| {
                products.get(&line.product_id).map(|product| OrderLine {
                    product_id: line.product_id,
                    product_name: product.name.clone(),
                    quantity: line.quantity,
                    price: product.price,
                })
            })
            .collect();
        if lines.is_empty() {
            return Err(DomainError::EmptyCart);
        }

        let order_id = AggregateId::new();
        let owner = user_id.clone();
        let fee = self.shipping_fee;
        let result = self
            .handler
            .execute(order_id, |order| {
                order.place(order_id, owner, lines, shipping, fee)
            })
            .await?;
        let order = result.aggregate;

        if let Err(err) = self.carts.consume(user_id, &cart).await {
            metrics::counter!("checkout_cart_clear_failures_total").increment(1);
            tracing::error!(%order_id, error = %err, "order placed but cart could not be cleared");
        }

        metrics::counter!("orders_placed_total").increment(1);
        metrics::histogram!("order_total_amount")
            .record(order.total_amount().amount().to_f64().unwrap_or_default());
        tracing::info!(%order_id, total = %order.total_amount(), "order placed");

        Ok(Committed::new(order, Mutation::PlaceOrder))
    }

    /// Sets an order's status. Admin only; unknown statuses are rejected.
    #[tracing::instrument(skip(self, identity), fields(admin = %identity.user_id))]
    pub async fn update_status(
        &self,
        identity: &Identity,
        order_id: AggregateId,
        status: &str,
    ) -> Result<Committed<Order>, DomainError> {
        identity.require_admin()?;
        let target: OrderStatus = status.parse()?;

        let changed_by = identity.user_id.clone();
        let result = self
            .handler
            .execute(order_id, |order| order.change_status(target, changed_by))
            .await?;

        if !result.events.is_empty() {
            metrics::counter!("order_status_transitions_total", "to" => target.as_str())
                .increment(1);
            tracing::info!(%order_id, to = %target, "order status changed");
        }

        Ok(Committed::new(result.aggregate, Mutation::ChangeOrderStatus))
    }

    /// Loads an order the caller may see. Other users' orders are reported as missing.
    #[tracing::instrument(skip(self, identity))]
    pub async fn get_order(
        &self,
        identity: &Identity,
        order_id: AggregateId,
    ) -> Result<Order, DomainError> {
        self.handler
            .load_existing(order_id)
            .await?
            .filter(|order| order.user_id().is_some_and(|owner| identity.can_read(owner)))
            .ok_or_else(|| DomainError::not_found("order", order_id))
    }
}
