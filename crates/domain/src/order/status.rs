//! Order status state machine.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The status of an order.
///
/// ```text
/// pending ──► confirmed ──► shipped ──► delivered
///    │            │            │
///    └────────────┴────────────┴──► cancelled
/// ```
///
/// Admins may move a non-terminal order to any status, including skipping
/// ahead or stepping back. `delivered` and `cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

/// One step of the customer-facing progress tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackingStep {
    pub status: OrderStatus,
    pub completed: bool,
    pub active: bool,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ];

    /// The forward path shown as progress steps.
    pub const TRACKED: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
    ];

    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    /// Statuses an admin may move an order in this status to.
    pub fn allowed_targets(&self) -> &'static [OrderStatus] {
        if self.is_terminal() { &[] } else { &Self::ALL }
    }

    pub fn can_transition_to(&self, target: OrderStatus) -> bool {
        self.allowed_targets().contains(&target)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Progress tracker steps. A cancelled order marks no step.
    pub fn progress_steps(&self) -> [TrackingStep; 4] {
        let mut steps = Self::TRACKED.map(|status| TrackingStep {
            status,
            completed: false,
            active: false,
        });
        if let Some(current) = Self::TRACKED.iter().position(|s| s == self) {
            for (index, step) in steps.iter_mut().enumerate() {
                step.completed = index <= current;
                step.active = index == current;
            }
        }
        steps
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::UnknownStatus {
                value: s.to_string(),
            })
    }
}
