mod order_summaries;
mod sales_dashboard;

pub use order_summaries::{OrderSummariesView, OrderSummary};
pub use sales_dashboard::{DashboardStats, SalesDashboardView};
