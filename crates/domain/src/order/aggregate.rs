//! Order aggregate.

use chrono::{DateTime, Utc};
use common::{AggregateId, Money, UserId};
use store::Version;

use crate::aggregate::Aggregate;

use super::{
    OrderError, OrderEvent, OrderLine, OrderStatus, PaymentMethod, ShippingDetails, TrackingStep,
    events::{OrderPlacedData, OrderStatusChangedData},
};

/// Order aggregate root.
///
/// Immutable after placement except for its status.
#[derive(Debug, Clone, Default)]
pub struct Order {
    id: Option<AggregateId>,
    version: Version,
    user_id: Option<UserId>,
    lines: Vec<OrderLine>,
    shipping: Option<ShippingDetails>,
    payment_method: PaymentMethod,
    shipping_fee: Money,
    total_amount: Money,
    status: OrderStatus,
    created_at: Option<DateTime<Utc>>,
    history: Vec<OrderStatusChangedData>,
}

impl Aggregate for Order {
    type Event = OrderEvent;
    type Error = OrderError;

    fn aggregate_type() -> &'static str {
        "Order"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            OrderEvent::OrderPlaced(data) => self.apply_placed(data),
            OrderEvent::OrderStatusChanged(data) => {
                self.status = data.to;
                self.history.push(data);
            }
        }
    }
}

// Query methods
impl Order {
    pub fn user_id(&self) -> Option<&UserId> {
        self.user_id.as_ref()
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn shipping(&self) -> Option<&ShippingDetails> {
        self.shipping.as_ref()
    }

    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn shipping_fee(&self) -> Money {
        self.shipping_fee
    }

    pub fn total_amount(&self) -> Money {
        self.total_amount
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    /// Status changes, oldest first.
    pub fn history(&self) -> &[OrderStatusChangedData] {
        &self.history
    }

    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(OrderLine::line_total).sum()
    }

    /// Recomputes the total from the frozen lines and fee.
    pub fn recomputed_total(&self) -> Money {
        self.subtotal() + self.shipping_fee
    }

    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    pub fn progress_steps(&self) -> [TrackingStep; 4] {
        self.status.progress_steps()
    }
}

// Command methods (return events)
impl Order {
    /// Places a new order with status `pending`.
    pub fn place(
        &self,
        order_id: AggregateId,
        user_id: UserId,
        lines: Vec<OrderLine>,
        shipping: ShippingDetails,
        shipping_fee: Money,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_some() {
            return Err(OrderError::AlreadyPlaced);
        }
        if lines.is_empty() {
            return Err(OrderError::NoLines);
        }

        Ok(vec![OrderEvent::order_placed(
            order_id,
            user_id,
            lines,
            shipping,
            shipping_fee,
        )])
    }

    /// Moves the order to `target`. Setting the current status again records nothing.
    pub fn change_status(
        &self,
        target: OrderStatus,
        changed_by: UserId,
    ) -> Result<Vec<OrderEvent>, OrderError> {
        if self.id.is_none() {
            return Err(OrderError::NotPlaced);
        }
        if target == self.status {
            return Ok(vec![]);
        }
        if !self.status.can_transition_to(target) {
            return Err(OrderError::TerminalStatus {
                status: self.status,
            });
        }

        Ok(vec![OrderEvent::status_changed(
            self.status,
            target,
            changed_by,
        )])
    }
}

// Event application
impl Order {
    fn apply_placed(&mut self, data: OrderPlacedData) {
        self.id = Some(data.order_id);
        self.user_id = Some(data.user_id);
        self.lines = data.lines;
        self.shipping = Some(data.shipping);
        self.payment_method = data.payment_method;
        self.shipping_fee = data.shipping_fee;
        self.total_amount = data.total_amount;
        self.status = OrderStatus::Pending;
        self.created_at = Some(data.placed_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::ProductId;

    fn lines() -> Vec<OrderLine> {
        vec![
            OrderLine {
                product_id: ProductId::new(1),
                product_name: "Premium Cat Food Mix".to_string(),
                quantity: 2,
                price: Money::from_major(890),
            },
            OrderLine {
                product_id: ProductId::new(2),
                product_name: "Interactive Dog Toy Set".to_string(),
                quantity: 1,
                price: Money::from_major(450),
            },
        ]
    }

    fn placed_order() -> Order {
        let mut order = Order::default();
        let events = order
            .place(
                AggregateId::new(),
                UserId::new("alice"),
                lines(),
                ShippingDetails::new("Dhaka", "0170", None).unwrap(),
                Money::from_major(50),
            )
            .unwrap();
        order.apply_events(events);
        order
    }

    #[test]
    fn place_sets_pending_and_total() {
        let order = placed_order();
        assert_eq!(order.status(), OrderStatus::Pending);
        assert_eq!(order.total_amount(), Money::from_major(2280));
        assert_eq!(order.recomputed_total(), order.total_amount());
        assert_eq!(order.item_count(), 3);
        assert_eq!(order.user_id(), Some(&UserId::new("alice")));
    }

    #[test]
    fn place_twice_or_without_lines_fails() {
        let order = placed_order();
        let again = order.place(
            AggregateId::new(),
            UserId::new("alice"),
            lines(),
            ShippingDetails::new("Dhaka", "0170", None).unwrap(),
            Money::from_major(50),
        );
        assert!(matches!(again, Err(OrderError::AlreadyPlaced)));

        let empty = Order::default().place(
            AggregateId::new(),
            UserId::new("alice"),
            vec![],
            ShippingDetails::new("Dhaka", "0170", None).unwrap(),
            Money::from_major(50),
        );
        assert!(matches!(empty, Err(OrderError::NoLines)));
    }

    #[test]
    fn status_changes_are_recorded() {
        let mut order = placed_order();
        let root = UserId::new("root");

        let events = order.change_status(OrderStatus::Shipped, root.clone()).unwrap();
        order.apply_events(events);
        assert_eq!(order.status(), OrderStatus::Shipped);

        let events = order.change_status(OrderStatus::Delivered, root.clone()).unwrap();
        order.apply_events(events);

        assert_eq!(order.history().len(), 2);
        assert_eq!(order.history()[0].from, OrderStatus::Pending);
        assert_eq!(order.history()[1].to, OrderStatus::Delivered);
        assert_eq!(order.history()[1].changed_by, root);
    }

    #[test]
    fn terminal_orders_reject_changes() {
        let mut order = placed_order();
        let events = order
            .change_status(OrderStatus::Cancelled, UserId::new("root"))
            .unwrap();
        order.apply_events(events);

        for target in [OrderStatus::Pending, OrderStatus::Delivered] {
            assert!(matches!(
                order.change_status(target, UserId::new("root")),
                Err(OrderError::TerminalStatus {
                    status: OrderStatus::Cancelled
                })
            ));
        }
    }

    #[test]
    fn same_status_is_a_no_op() {
        let order = placed_order();
        let events = order
            .change_status(OrderStatus::Pending, UserId::new("root"))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn unplaced_order_cannot_change_status() {
        assert!(matches!(
            Order::default().change_status(OrderStatus::Confirmed, UserId::new("root")),
            Err(OrderError::NotPlaced)
        ));
    }
}
