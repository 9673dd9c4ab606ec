//! Admin dashboard figures.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use common::{AggregateId, Money};
use domain::{OrderEvent, OrderStatus};
use serde::Serialize;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{OrderRecord, Projection};

/// Snapshot of the dashboard counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    /// Sum of `totalAmount` over delivered orders.
    pub total_revenue: Money,
    pub orders_by_status: BTreeMap<&'static str, u64>,
}

#[derive(Debug, Clone, Copy)]
struct Tracked {
    status: OrderStatus,
    total_amount: Money,
}

/// Keeps the current status and total of every order.
#[derive(Clone, Default)]
pub struct SalesDashboardView {
    orders: Arc<RwLock<HashMap<AggregateId, Tracked>>>,
}

impl SalesDashboardView {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn stats(&self) -> DashboardStats {
        let orders = self.orders.read().await;

        let mut stats = DashboardStats {
            orders_by_status: OrderStatus::ALL.iter().map(|s| (s.as_str(), 0)).collect(),
            ..DashboardStats::default()
        };
        for tracked in orders.values() {
            stats.total_orders += 1;
            *stats.orders_by_status.entry(tracked.status.as_str()).or_default() += 1;
            match tracked.status {
                OrderStatus::Pending => stats.pending_orders += 1,
                OrderStatus::Delivered => stats.total_revenue += tracked.total_amount,
                _ => {}
            }
        }
        stats
    }
}

#[async_trait]
impl Projection for SalesDashboardView {
    fn name(&self) -> &'static str {
        "SalesDashboardView"
    }

    async fn apply(&self, record: &OrderRecord<'_>) -> Result<()> {
        let mut orders = self.orders.write().await;
        match record.event {
            OrderEvent::OrderPlaced(data) => {
                orders.insert(
                    record.order_id,
                    Tracked {
                        status: OrderStatus::Pending,
                        total_amount: data.total_amount,
                    },
                );
            }
            OrderEvent::OrderStatusChanged(data) => {
                if let Some(tracked) = orders.get_mut(&record.order_id) {
                    tracked.status = data.to;
                }
            }
        }
        Ok(())
    }

    async fn reset(&self) -> Result<()> {
        self.orders.write().await.clear();
        Ok(())
    }
}
