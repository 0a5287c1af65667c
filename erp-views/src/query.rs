//! Table filters and pagination
//!
//! Every table on the dashboard narrows its rows with a free-text search
//! plus zero or more exact-match selectors. Search is a case-insensitive
//! substring match; an empty search matches everything. A selector of
//! "all" is represented as `None`.

use erp_core::{
    AuditLogEntry, Customer, CustomerStatus, Invoice, InvoiceStatus, Order, OrderStatus, Product,
    SupportTicket, TicketPriority, TicketStatus,
};
use serde::Serialize;

/// Row predicate for one table
pub trait Filter<T> {
    /// Whether `item` should be shown
    fn matches(&self, item: &T) -> bool;

    /// Matching rows, in input order
    fn apply<'a>(&self, items: &'a [T]) -> Vec<&'a T> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Case-insensitive substring match against any field
fn search_hits<'a>(query: &str, fields: impl IntoIterator<Item = &'a str>) -> bool {
    if query.is_empty() {
        return true;
    }
    let needle = query.to_lowercase();
    fields
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

fn selected<T: PartialEq>(selector: &Option<T>, value: &T) -> bool {
    selector.as_ref().map_or(true, |wanted| wanted == value)
}

/// Orders table: id or customer name, optional status
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Search text
    pub search: String,
    /// Status selector
    pub status: Option<OrderStatus>,
}

impl Filter<Order> for OrderFilter {
    fn matches(&self, order: &Order) -> bool {
        search_hits(&self.search, [order.id.as_str(), order.customer_name.as_str()])
            && selected(&self.status, &order.status)
    }
}

/// Invoices table: id or customer name, optional status
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    /// Search text
    pub search: String,
    /// Status selector
    pub status: Option<InvoiceStatus>,
}

impl Filter<Invoice> for InvoiceFilter {
    fn matches(&self, invoice: &Invoice) -> bool {
        search_hits(
            &self.search,
            [invoice.id.as_str(), invoice.customer_name.as_str()],
        ) && selected(&self.status, &invoice.status)
    }
}

/// Customers table: name, email or company, optional status
#[derive(Debug, Clone, Default)]
pub struct CustomerFilter {
    /// Search text
    pub search: String,
    /// Status selector
    pub status: Option<CustomerStatus>,
}

impl Filter<Customer> for CustomerFilter {
    fn matches(&self, customer: &Customer) -> bool {
        search_hits(
            &self.search,
            [
                customer.name.as_str(),
                customer.email.as_str(),
                customer.company.as_str(),
            ],
        ) && selected(&self.status, &customer.status)
    }
}

/// Stock level selector for the inventory table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StockFilter {
    /// Any stock level
    #[default]
    All,
    /// At or below the reorder point
    Low,
    /// Zero units
    Out,
    /// Above the reorder point
    Ok,
}

impl StockFilter {
    /// Parse a selector value; unknown values mean `All`
    pub fn parse(s: &str) -> Self {
        match s {
            "low" => StockFilter::Low,
            "out" => StockFilter::Out,
            "ok" => StockFilter::Ok,
            _ => StockFilter::All,
        }
    }

    fn admits(self, product: &Product) -> bool {
        match self {
            StockFilter::All => true,
            StockFilter::Low => product.is_low_stock(),
            StockFilter::Out => product.is_out_of_stock(),
            StockFilter::Ok => !product.is_low_stock(),
        }
    }
}

/// Inventory table: name or SKU, optional category, stock level
#[derive(Debug, Clone, Default)]
pub struct ProductFilter {
    /// Search text
    pub search: String,
    /// Category selector
    pub category: Option<String>,
    /// Stock selector
    pub stock: StockFilter,
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, product: &Product) -> bool {
        search_hits(&self.search, [product.name.as_str(), product.sku.as_str()])
            && selected(&self.category, &product.category)
            && self.stock.admits(product)
    }
}

/// Tickets table: subject or ticket number, optional status and priority
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Search text
    pub search: String,
    /// Status selector
    pub status: Option<TicketStatus>,
    /// Priority selector
    pub priority: Option<TicketPriority>,
}

impl Filter<SupportTicket> for TicketFilter {
    fn matches(&self, ticket: &SupportTicket) -> bool {
        search_hits(
            &self.search,
            [ticket.subject.as_str(), ticket.ticket_number.as_str()],
        ) && selected(&self.status, &ticket.status)
            && selected(&self.priority, &ticket.priority)
    }
}

/// Audit table: action, entity id, actor name or ledger hash; optional
/// exact action and entity type
#[derive(Debug, Clone, Default)]
pub struct AuditFilter {
    /// Search text
    pub search: String,
    /// Exact action
    pub action: Option<String>,
    /// Exact entity type
    pub entity_type: Option<String>,
}

impl Filter<AuditLogEntry> for AuditFilter {
    fn matches(&self, entry: &AuditLogEntry) -> bool {
        let fields = [
            Some(entry.action.as_str()),
            Some(entry.entity_id.as_str()),
            Some(entry.user_name.as_str()),
            entry.blockchain_hash.as_deref(),
        ];
        search_hits(&self.search, fields.into_iter().flatten())
            && selected(&self.action, &entry.action)
            && selected(&self.entity_type, &entry.entity_type)
    }

    /// Matching rows, newest first
    fn apply<'a>(&self, items: &'a [AuditLogEntry]) -> Vec<&'a AuditLogEntry> {
        let mut rows: Vec<&AuditLogEntry> =
            items.iter().filter(|entry| self.matches(entry)).collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }
}

/// Distinct values in first-seen order, for building selector options
pub fn distinct<'a, T>(items: &'a [T], key: impl Fn(&'a T) -> &'a str) -> Vec<&'a str> {
    let mut seen: Vec<&str> = Vec::new();
    for item in items {
        let value = key(item);
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

/// One page of rows
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows before paging
    pub total: usize,
    /// Offset of the first row
    pub offset: usize,
}

impl<T> Page<T> {
    /// Whether rows exist past this page
    pub fn has_more(&self) -> bool {
        self.offset + self.items.len() < self.total
    }
}

/// Exact slice `[offset, offset + limit)` clamped to the input
pub fn paginate<T: Clone>(items: &[T], offset: usize, limit: usize) -> Page<T> {
    let start = offset.min(items.len());
    let end = start.saturating_add(limit).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        total: items.len(),
        offset: start,
    }
}
