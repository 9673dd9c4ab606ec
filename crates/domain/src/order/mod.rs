//! Order Builder and Order Status Engine.

mod aggregate;
mod events;
mod service;
mod status;
mod value_objects;

pub use aggregate::Order;
pub use events::{OrderEvent, OrderPlacedData, OrderStatusChangedData};
pub use service::{CheckoutRequest, OrderService};
pub use status::{OrderStatus, TrackingStep};
pub use value_objects::{OrderLine, PaymentMethod, ShippingDetails};

use thiserror::Error;

/// Errors raised by the order aggregate.
#[derive(Debug, Error)]
pub enum OrderError {
    #[error("Order already placed")]
    AlreadyPlaced,

    #[error("Order does not exist")]
    NotPlaced,

    #[error("Order has no lines")]
    NoLines,

    #[error("Order is {status} and can no longer change status")]
    TerminalStatus { status: OrderStatus },
}
