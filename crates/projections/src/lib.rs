//! Read models fed from the order event log.
//!
//! - [`Projection`]: turns decoded order events into a read model
//! - [`ProjectionProcessor`]: replays the log into registered projections
//! - [`OrderSummariesView`]: "my orders" and the admin order list
//! - [`SalesDashboardView`]: revenue and status counts for the admin console

pub mod error;
pub mod processor;
pub mod projection;
pub mod views;

pub use error::{ProjectionError, Result};
pub use processor::ProjectionProcessor;
pub use projection::{OrderRecord, Projection, ProjectionPosition};
pub use views::{DashboardStats, OrderSummariesView, OrderSummary, SalesDashboardView};
