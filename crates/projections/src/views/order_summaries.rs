//! Per-order summaries for "my orders" and the admin order list.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{AggregateId, Identity, Money, UserId};
use domain::{OrderEvent, OrderLine, OrderStatus, PaymentMethod, ShippingDetails, TrackingStep};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{OrderRecord, Projection};

/// Denormalized order record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderSummary {
    pub order_id: AggregateId,
    pub user_id: UserId,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    pub item_count: u32,
    pub shipping_fee: Money,
    pub total_amount: Money,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl OrderSummary {
    pub fn progress_steps(&self) -> [TrackingStep; 4] {
        self.status.progress_steps()
    }
}

#[derive(Clone, Default)]
pub struct OrderSummariesView {
    orders: Arc<RwLock<HashMap<AggregateId, OrderSummary>>>,
}

impl OrderSummariesView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, order_id: AggregateId) -> Option<OrderSummary> {
        self.orders.read().await.get(&order_id).cloned()
    }

    /// Orders placed by one user, newest first.
    pub async fn for_user(&self, user_id: &UserId) -> Vec<OrderSummary> {
        self.collect(|summary| &summary.user_id == user_id).await
    }

    /// Every order, newest first.
    pub async fn all(&self) -> Vec<OrderSummary> {
        self.collect(|_| true).await
    }

    /// Own orders for customers, all orders for admins.
    pub async fn list_for(&self, identity: &Identity) -> Vec<OrderSummary> {
        if identity.is_admin {
            self.all().await
        } else {
            self.for_user(&identity.user_id).await
        }
    }

    pub async fn by_status(&self, status: OrderStatus) -> Vec<OrderSummary> {
        self.collect(|summary| summary.status == status).await
    }

    async fn collect(&self, keep: impl Fn(&OrderSummary) -> bool) -> Vec<OrderSummary> {
        let orders = self.orders.read().await;
        let mut result: Vec<OrderSummary> = orders.values().filter(|s| keep(s)).cloned().collect();
        result.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.order_id.as_uuid().cmp(&a.order_id.as_uuid()))
        });
        result
    }
}

#[async_trait]
impl Projection for OrderSummariesView {
    fn name(&self) -> &'static str {
        "OrderSummariesView"
    }

    async fn apply(&self, record: &OrderRecord<'_>) -> Result<()> {
        let order_id = record.order_id;
        let mut orders = self.orders.write().await;
        match record.event {
            OrderEvent::OrderPlaced(data) => {
                orders.insert(
                    order_id,
                    OrderSummary {
                        order_id,
                        user_id: data.user_id.clone(),
                        status: OrderStatus::Pending,
                        lines: data.lines.clone(),
                        item_count: data.lines.iter().map(|line| line.quantity).sum(),
                        shipping_fee: data.shipping_fee,
                        total_amount: data.total_amount,
                        shipping: data.shipping.clone(),
                        payment_method: data.payment_method,
                        created_at: data.placed_at,
                        updated_at: data.placed_at,
                    },
                );
            }
            OrderEvent::OrderStatusChanged(data) => match orders.get_mut(&order_id) {
                Some(summary) => {
                    summary.status = data.to;
                    summary.updated_at = data.changed_at;
                }
                None => tracing::warn!(%order_id, "status change for unknown order"),
            },
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.orders.write().await.clear();
        Ok(())
    }
}
