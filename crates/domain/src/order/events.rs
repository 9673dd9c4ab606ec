//! Order domain events.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::{OrderLine, OrderStatus, PaymentMethod, ShippingDetails};

/// Events recorded on an order.
///
/// `OrderPlaced` fixes everything about the order; afterwards only
/// `OrderStatusChanged` events occur.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum OrderEvent {
    OrderPlaced(OrderPlacedData),
    OrderStatusChanged(OrderStatusChangedData),
}

impl DomainEvent for OrderEvent {
    fn event_type(&self) -> &'static str {
        match self {
            OrderEvent::OrderPlaced(_) => "OrderPlaced",
            OrderEvent::OrderStatusChanged(_) => "OrderStatusChanged",
        }
    }
}

/// Data for OrderPlaced event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderPlacedData {
    pub order_id: AggregateId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub shipping: ShippingDetails,
    pub payment_method: PaymentMethod,
    /// Fee in force when the order was placed.
    pub shipping_fee: Money,
    /// Sum of line totals plus the shipping fee.
    pub total_amount: Money,
    pub placed_at: DateTime<Utc>,
}

/// Data for OrderStatusChanged event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderStatusChangedData {
    pub from: OrderStatus,
    pub to: OrderStatus,
    /// The admin who made the change.
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
}

impl OrderEvent {
    pub fn order_placed(
        order_id: AggregateId,
        user_id: UserId,
        lines: Vec<OrderLine>,
        shipping: ShippingDetails,
        shipping_fee: Money,
    ) -> Self {
        let total_amount = lines.iter().map(OrderLine::line_total).sum::<Money>() + shipping_fee;
        OrderEvent::OrderPlaced(OrderPlacedData {
            order_id,
            user_id,
            lines,
            shipping,
            payment_method: PaymentMethod::CashOnDelivery,
            shipping_fee,
            total_amount,
            placed_at: Utc::now(),
        })
    }

    pub fn status_changed(from: OrderStatus, to: OrderStatus, changed_by: UserId) -> Self {
        OrderEvent::OrderStatusChanged(OrderStatusChangedData {
            from,
            to,
            changed_by,
            changed_at: Utc::now(),
        })
    }
}
