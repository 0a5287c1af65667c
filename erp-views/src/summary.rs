//! Dashboard overview assembled from a store snapshot

use crate::analytics::{self, ChartPoint, Kpi, LedgerAnalytics, RevenuePoint};
use crate::query::{paginate, AuditFilter, Filter, Page};
use crate::stats::{AuditStats, CrmStats, InventoryStats, InvoiceStats, OrderPipeline};
use chrono::{DateTime, Utc};
use erp_core::{AuditLogEntry, DashboardSnapshot};
use rand::Rng;
use serde::Serialize;

/// Everything the landing page and the page headers show
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    /// Generation time
    pub generated_at: DateTime<Utc>,
    /// Logged-in user's name, if any
    pub user: Option<String>,
    /// Unread notifications
    pub unread_notifications: usize,
    /// KPI cards
    pub kpis: Vec<Kpi>,
    /// Revenue chart
    pub revenue: Vec<RevenuePoint>,
    /// Order status chart
    pub order_status: Vec<ChartPoint>,
    /// Order pipeline
    pub pipeline: OrderPipeline,
    /// Invoice totals
    pub invoices: InvoiceStats,
    /// Inventory totals
    pub inventory: InventoryStats,
    /// CRM figures
    pub crm: CrmStats,
    /// Ledger figures
    pub ledger: LedgerAnalytics,
    /// Audit figures
    pub audit: AuditStats,
    /// First page of the audit table
    pub recent_audit: Page<AuditLogEntry>,
}

impl DashboardSummary {
    /// Build from a snapshot
    pub fn build<R: Rng + ?Sized>(
        snapshot: &DashboardSnapshot,
        now: DateTime<Utc>,
        page_size: usize,
        rng: &mut R,
    ) -> Self {
        let audit_rows: Vec<AuditLogEntry> = AuditFilter::default()
            .apply(&snapshot.audit_entries)
            .into_iter()
            .cloned()
            .collect();

        Self {
            generated_at: now,
            user: snapshot.current_user.as_ref().map(|u| u.name.clone()),
            unread_notifications: snapshot.unread_notifications(),
            kpis: analytics::calculate_kpis(
                &snapshot.orders,
                &snapshot.invoices,
                &snapshot.customers,
                rng,
            ),
            revenue: analytics::revenue_over_time(&snapshot.invoices, now, rng),
            order_status: analytics::order_status_distribution(&snapshot.orders),
            pipeline: OrderPipeline::compute(&snapshot.orders),
            invoices: InvoiceStats::compute(&snapshot.invoices),
            inventory: InventoryStats::compute(&snapshot.products),
            crm: CrmStats::compute(&snapshot.customers, &snapshot.tickets),
            ledger: analytics::ledger_analytics(&snapshot.ledger_entries),
            audit: AuditStats::compute(&snapshot.audit_entries, now),
            recent_audit: paginate(&audit_rows, 0, page_size),
        }
    }
}
