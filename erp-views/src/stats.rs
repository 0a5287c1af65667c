//! Summary figures shown above the dashboard tables

use chrono::{DateTime, Utc};
use erp_core::{
    ActionKind, AuditLogEntry, Customer, CustomerStatus, Invoice, InvoiceStatus, Order,
    OrderStatus, Product, SupportTicket, TicketPriority, TicketStatus,
};
use rust_decimal::Decimal;
use serde::Serialize;

/// CRM page figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmStats {
    /// Customers in `customer` status
    pub active_customers: usize,
    /// Leads
    pub leads: usize,
    /// Prospects
    pub prospects: usize,
    /// Customers with more than one order
    pub repeat_customers: usize,
    /// Tickets open or in progress
    pub open_tickets: usize,
    /// Share of the pipeline that converted, whole percent
    pub conversion_rate: u32,
    /// Tickets per status, every status listed
    pub tickets_by_status: Vec<(TicketStatus, usize)>,
    /// Tickets per priority, every priority listed
    pub tickets_by_priority: Vec<(TicketPriority, usize)>,
    /// Top five customers by spend
    pub top_customers: Vec<Customer>,
}

impl CrmStats {
    /// Compute from customers and tickets
    pub fn compute(customers: &[Customer], tickets: &[SupportTicket]) -> Self {
        let count = |status: CustomerStatus| {
            customers.iter().filter(|c| c.status == status).count()
        };
        let active_customers = count(CustomerStatus::Customer);
        let leads = count(CustomerStatus::Lead);
        let prospects = count(CustomerStatus::Prospect);

        let pipeline = leads + prospects + active_customers;
        let conversion_rate = if pipeline == 0 {
            0
        } else {
            (active_customers as f64 / pipeline as f64 * 100.0).round() as u32
        };

        let mut top_customers = customers.to_vec();
        top_customers.sort_by(|a, b| b.total_spent.cmp(&a.total_spent));
        top_customers.truncate(5);

        Self {
            active_customers,
            leads,
            prospects,
            repeat_customers: customers.iter().filter(|c| c.total_orders > 1).count(),
            open_tickets: tickets
                .iter()
                .filter(|t| matches!(t.status, TicketStatus::Open | TicketStatus::InProgress))
                .count(),
            conversion_rate,
            tickets_by_status: TicketStatus::ALL
                .iter()
                .map(|&s| (s, tickets.iter().filter(|t| t.status == s).count()))
                .collect(),
            tickets_by_priority: TicketPriority::ALL
                .iter()
                .map(|&p| (p, tickets.iter().filter(|t| t.priority == p).count()))
                .collect(),
            top_customers,
        }
    }
}

/// Inventory page figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    /// Products listed
    pub total_products: usize,
    /// Σ stock × price
    pub total_value: Decimal,
    /// Σ stock
    pub total_units: u64,
    /// Stock at or below reorder point
    pub low_stock_count: usize,
    /// Stock at zero
    pub out_of_stock_count: usize,
    /// Stock above reorder point
    pub in_stock_count: usize,
}

impl InventoryStats {
    /// Compute from products
    pub fn compute(products: &[Product]) -> Self {
        Self {
            total_products: products.len(),
            total_value: products
                .iter()
                .map(|p| p.price * Decimal::from(p.stock_level))
                .sum(),
            total_units: products.iter().map(|p| u64::from(p.stock_level)).sum(),
            low_stock_count: products.iter().filter(|p| p.is_low_stock()).count(),
            out_of_stock_count: products.iter().filter(|p| p.is_out_of_stock()).count(),
            in_stock_count: products.iter().filter(|p| !p.is_low_stock()).count(),
        }
    }
}

/// Invoices page figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceStats {
    /// Σ all invoices
    pub total_value: Decimal,
    /// Σ paid
    pub paid_value: Decimal,
    /// Σ sent + overdue
    pub outstanding_value: Decimal,
    /// Σ overdue
    pub overdue_value: Decimal,
}

impl InvoiceStats {
    /// Compute from invoices
    pub fn compute(invoices: &[Invoice]) -> Self {
        let sum = |pred: &dyn Fn(InvoiceStatus) -> bool| -> Decimal {
            invoices
                .iter()
                .filter(|i| pred(i.status))
                .map(|i| i.amount)
                .sum()
        };

        Self {
            total_value: sum(&|_| true),
            paid_value: sum(&|s| s == InvoiceStatus::Paid),
            outstanding_value: sum(&|s| matches!(s, InvoiceStatus::Sent | InvoiceStatus::Overdue)),
            overdue_value: sum(&|s| s == InvoiceStatus::Overdue),
        }
    }
}

/// ERP page order pipeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPipeline {
    /// All orders
    pub total: usize,
    /// Orders per status, every status listed
    pub by_status: Vec<(OrderStatus, usize)>,
}

impl OrderPipeline {
    /// Compute from orders
    pub fn compute(orders: &[Order]) -> Self {
        Self {
            total: orders.len(),
            by_status: OrderStatus::ALL
                .iter()
                .map(|&s| (s, orders.iter().filter(|o| o.status == s).count()))
                .collect(),
        }
    }

    /// Count for one status
    pub fn count(&self, status: OrderStatus) -> usize {
        self.by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map_or(0, |(_, n)| *n)
    }
}

/// Audit page figures
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStats {
    /// All entries
    pub total_entries: usize,
    /// Entries dated today (UTC)
    pub today_entries: usize,
    /// Entries carrying a ledger hash
    pub ledger_linked: usize,
    /// Distinct actor names
    pub unique_users: usize,
    /// Distinct actions, first-seen order
    pub actions: Vec<String>,
    /// Distinct entity types, first-seen order
    pub entity_types: Vec<String>,
}

impl AuditStats {
    /// Compute from audit entries; "today" is the calendar day of `now`
    pub fn compute(entries: &[AuditLogEntry], now: DateTime<Utc>) -> Self {
        let today = now.date_naive();
        let mut users: Vec<&str> = Vec::new();
        let mut actions: Vec<String> = Vec::new();
        let mut entity_types: Vec<String> = Vec::new();

        for entry in entries {
            if !users.contains(&entry.user_name.as_str()) {
                users.push(&entry.user_name);
            }
            if !actions.contains(&entry.action) {
                actions.push(entry.action.clone());
            }
            if !entity_types.contains(&entry.entity_type) {
                entity_types.push(entry.entity_type.clone());
            }
        }

        Self {
            total_entries: entries.len(),
            today_entries: entries
                .iter()
                .filter(|e| e.timestamp.date_naive() == today)
                .count(),
            ledger_linked: entries.iter().filter(|e| e.blockchain_hash.is_some()).count(),
            unique_users: users.len(),
            actions,
            entity_types,
        }
    }
}

/// Action classification used for row styling
pub fn classify_action(action: &str) -> ActionKind {
    ActionKind::classify(action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn customer(id: &str, status: CustomerStatus, total_orders: u32, spent: Decimal) -> Customer {
        Customer {
            id: id.to_string(),
            name: format!("Customer {}", id),
            email: format!("{}@acme.com", id),
            phone: String::new(),
            company: "Acme".to_string(),
            status,
            total_orders,
            total_spent: spent,
            created_at: Utc::now(),
            last_order_at: None,
        }
    }

    fn invoice(status: InvoiceStatus, amount: Decimal) -> Invoice {
        Invoice {
            id: "INV00001".to_string(),
            order_id: "ORD00001".to_string(),
            customer_id: "CUS0001".to_string(),
            customer_name: "Jane".to_string(),
            amount,
            status,
            due_date: Utc::now(),
            created_at: Utc::now(),
            paid_at: None,
            blockchain_hash: None,
            blockchain_verified: false,
        }
    }

    #[test]
    fn test_crm_stats() {
        let customers: Vec<Customer> = (0..7)
            .map(|i| {
                let status = match i % 3 {
                    0 => CustomerStatus::Customer,
                    1 => CustomerStatus::Lead,
                    _ => CustomerStatus::Prospect,
                };
                customer(&format!("C{}", i), status, i, Decimal::from(i * 100))
            })
            .collect();

        let stats = CrmStats::compute(&customers, &[]);
        assert_eq!(stats.active_customers, 3);
        assert_eq!(stats.leads, 2);
        assert_eq!(stats.prospects, 2);
        assert_eq!(stats.conversion_rate, 43);
        assert_eq!(stats.repeat_customers, 5);
        assert_eq!(stats.top_customers.len(), 5);
        assert_eq!(stats.top_customers[0].id, "C6");
        assert!(stats.tickets_by_status.iter().all(|(_, n)| *n == 0));
        assert_eq!(stats.tickets_by_priority.len(), TicketPriority::ALL.len());
    }

    #[test]
    fn test_crm_stats_empty_pipeline() {
        let stats = CrmStats::compute(&[], &[]);
        assert_eq!(stats.conversion_rate, 0);
    }

    #[test]
    fn test_invoice_stats() {
        let invoices = vec![
            invoice(InvoiceStatus::Paid, dec!(100)),
            invoice(InvoiceStatus::Sent, dec!(40)),
            invoice(InvoiceStatus::Overdue, dec!(10)),
            invoice(InvoiceStatus::Draft, dec!(5)),
        ];
        let stats = InvoiceStats::compute(&invoices);
        assert_eq!(stats.total_value, dec!(155));
        assert_eq!(stats.paid_value, dec!(100));
        assert_eq!(stats.outstanding_value, dec!(50));
        assert_eq!(stats.overdue_value, dec!(10));
    }

    #[test]
    fn test_audit_stats_today() {
        let now = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
        let entry = |id: &str, user: &str, at: DateTime<Utc>, hash: Option<&str>| AuditLogEntry {
            id: id.to_string(),
            action: "Created order".to_string(),
            entity_type: "Order".to_string(),
            entity_id: "ORD1".to_string(),
            user_id: "USR001".to_string(),
            user_name: user.to_string(),
            timestamp: at,
            details: String::new(),
            ip_address: None,
            changes: None,
            blockchain_hash: hash.map(str::to_string),
        };
        let entries = vec![
            entry("A1", "Alex", now, Some("0x1")),
            entry("A2", "Sarah", now - Duration::hours(1), None),
            entry("A3", "Alex", now - Duration::days(2), Some("0x2")),
        ];

        let stats = AuditStats::compute(&entries, now);
        assert_eq!(stats.total_entries, 3);
        assert_eq!(stats.today_entries, 2);
        assert_eq!(stats.ledger_linked, 2);
        assert_eq!(stats.unique_users, 2);
        assert_eq!(stats.actions, vec!["Created order".to_string()]);
    }

    #[test]
    fn test_classify_action() {
        assert_eq!(classify_action("Added customer"), ActionKind::Create);
        assert_eq!(classify_action("Updated order status"), ActionKind::Update);
        assert_eq!(classify_action("Removed user"), ActionKind::Delete);
        assert_eq!(classify_action("Exported report"), ActionKind::Other);
    }
}
