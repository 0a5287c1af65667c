//! ChainERP Views
//!
//! Stateless derivations over the dashboard store: table filters and
//! pagination, KPI cards, chart series and page summary figures. Nothing in
//! here mutates state; randomness and the clock are always passed in.

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod analytics;
pub mod query;
pub mod stats;
pub mod summary;

// Re-exports
pub use analytics::{calculate_change, ChartPoint, Kpi, LedgerAnalytics};
pub use query::{
    paginate, AuditFilter, CustomerFilter, Filter, InvoiceFilter, OrderFilter, Page,
    ProductFilter, StockFilter, TicketFilter,
};
pub use stats::{AuditStats, CrmStats, InventoryStats, InvoiceStats, OrderPipeline};
pub use summary::DashboardSummary;
