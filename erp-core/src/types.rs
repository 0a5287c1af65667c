//! Core domain types
//!
//! All types are designed for:
//! - Stable JSON shapes (serde, camelCase fields like the dashboard expects)
//! - Exact arithmetic (Decimal for money)
//! - UTC timestamps throughout

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Implements `as_str`, `parse`, `ALL` and `Display` for a fieldless status enum.
macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $name {
            /// Every variant, in lifecycle order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Wire name
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            /// Parse from wire name
            pub fn parse(s: &str) -> Option<Self> {
                match s {
                    $($text => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

/// Dashboard user role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Full access
    Admin,
    /// ERP and CRM operations
    Manager,
    /// Orders and customers
    Sales,
    /// Read-only ledger and audit access
    Auditor,
    /// Tickets and customers
    Support,
}

string_enum!(UserRole {
    Admin => "admin",
    Manager => "manager",
    Sales => "sales",
    Auditor => "auditor",
    Support => "support",
});

impl UserRole {
    /// Pages this role may open
    pub fn permissions(&self) -> &'static [Permission] {
        use Permission::*;
        match self {
            UserRole::Admin => Permission::ALL,
            UserRole::Manager => &[
                Dashboard, Erp, Crm, Orders, Invoices, Customers, Inventory, Tickets,
            ],
            UserRole::Sales => &[Dashboard, Crm, Orders, Customers],
            UserRole::Auditor => &[Dashboard, Blockchain, Audit],
            UserRole::Support => &[Dashboard, Crm, Tickets, Customers],
        }
    }

    /// Check a single permission
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Dashboard page a role may be granted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    /// Landing page
    Dashboard,
    /// ERP overview
    Erp,
    /// CRM overview
    Crm,
    /// Ledger explorer
    Blockchain,
    /// Orders table
    Orders,
    /// Invoices table
    Invoices,
    /// Customers table
    Customers,
    /// Inventory table
    Inventory,
    /// Support tickets
    Tickets,
    /// Settings page
    Settings,
    /// Audit trail
    Audit,
}

string_enum!(Permission {
    Dashboard => "dashboard",
    Erp => "erp",
    Crm => "crm",
    Blockchain => "blockchain",
    Orders => "orders",
    Invoices => "invoices",
    Customers => "customers",
    Inventory => "inventory",
    Tickets => "tickets",
    Settings => "settings",
    Audit => "audit",
});

/// Dashboard user (also the persisted session identity)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Login email
    pub email: String,
    /// Role
    pub role: UserRole,
    /// Avatar initials
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Order status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Submitted, not yet picked up
    Pending,
    /// Being prepared
    Processing,
    /// Handed to carrier
    Shipped,
    /// Received by customer
    Delivered,
    /// Cancelled
    Cancelled,
}

string_enum!(OrderStatus {
    Pending => "pending",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

/// Order line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product ID
    pub product_id: String,
    /// Product name at order time
    pub product_name: String,
    /// Quantity
    pub quantity: u32,
    /// Unit price at order time
    pub unit_price: Decimal,
    /// quantity × unit price
    pub total: Decimal,
}

/// Customer order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order ID
    pub id: String,
    /// Customer ID
    pub customer_id: String,
    /// Customer name at order time
    pub customer_name: String,
    /// Line items
    pub items: Vec<OrderItem>,
    /// Current status
    pub status: OrderStatus,
    /// Sum of line totals
    pub total_amount: Decimal,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last status change
    pub updated_at: DateTime<Utc>,
    /// Hash of the ledger entry recorded at creation
    pub blockchain_hash: Option<String>,
    /// Ledger verified flag
    pub blockchain_verified: bool,
}

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Not yet sent
    Draft,
    /// Sent to customer
    Sent,
    /// Paid
    Paid,
    /// Past due date
    Overdue,
    /// Cancelled
    Cancelled,
}

string_enum!(InvoiceStatus {
    Draft => "draft",
    Sent => "sent",
    Paid => "paid",
    Overdue => "overdue",
    Cancelled => "cancelled",
});

/// Invoice generated from an order
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Invoice ID
    pub id: String,
    /// Source order
    pub order_id: String,
    /// Customer ID
    pub customer_id: String,
    /// Customer name
    pub customer_name: String,
    /// Amount due
    pub amount: Decimal,
    /// Current status
    pub status: InvoiceStatus,
    /// Due date
    pub due_date: DateTime<Utc>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Set when the status becomes paid
    pub paid_at: Option<DateTime<Utc>>,
    /// Hash of the ledger entry recorded at creation
    pub blockchain_hash: Option<String>,
    /// Ledger verified flag
    pub blockchain_verified: bool,
}

/// Customer lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerStatus {
    /// First contact
    Lead,
    /// Qualified
    Prospect,
    /// Paying customer
    Customer,
    /// Lost
    Churned,
}

string_enum!(CustomerStatus {
    Lead => "lead",
    Prospect => "prospect",
    Customer => "customer",
    Churned => "churned",
});

/// CRM customer record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    /// Customer ID
    pub id: String,
    /// Contact name
    pub name: String,
    /// Contact email
    pub email: String,
    /// Contact phone
    pub phone: String,
    /// Company
    pub company: String,
    /// Lifecycle status
    pub status: CustomerStatus,
    /// Number of orders placed
    pub total_orders: u32,
    /// Lifetime spend
    pub total_spent: Decimal,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Most recent order
    pub last_order_at: Option<DateTime<Utc>>,
}

/// Inventory product
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Product ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Stock keeping unit
    pub sku: String,
    /// Category
    pub category: String,
    /// Unit price
    pub price: Decimal,
    /// Units on hand
    pub stock_level: u32,
    /// Reorder threshold
    pub reorder_point: u32,
    /// Last restock
    pub last_restocked: DateTime<Utc>,
}

impl Product {
    /// Stock at or below the reorder point
    pub fn is_low_stock(&self) -> bool {
        self.stock_level <= self.reorder_point
    }

    /// No units left
    pub fn is_out_of_stock(&self) -> bool {
        self.stock_level == 0
    }
}

/// Ledger record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    /// Order created or changed
    Order,
    /// Invoice created or changed
    Invoice,
    /// Stock movement
    Inventory,
    /// System record
    Audit,
}

string_enum!(RecordType {
    Order => "order",
    Invoice => "invoice",
    Inventory => "inventory",
    Audit => "audit",
});

/// Simulated blockchain transaction
///
/// `hash` is random, not a digest of `data`; `previous_hash` is whatever hash
/// was at the head of the ledger when this entry was prepended.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Entry ID
    pub id: String,
    /// Random 0x-prefixed 64 hex digit hash
    pub hash: String,
    /// Record type
    pub record_type: RecordType,
    /// Domain record ID
    pub record_id: String,
    /// Append timestamp
    pub timestamp: DateTime<Utc>,
    /// Hash of the previous head
    pub previous_hash: String,
    /// Verified flag
    pub verified: bool,
    /// Payload
    pub data: serde_json::Map<String, serde_json::Value>,
}

/// Support ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TicketStatus {
    /// New
    Open,
    /// Assigned and being worked
    InProgress,
    /// Fixed
    Resolved,
    /// Closed
    Closed,
}

string_enum!(TicketStatus {
    Open => "open",
    InProgress => "in-progress",
    Resolved => "resolved",
    Closed => "closed",
});

/// Support ticket priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketPriority {
    /// Low
    Low,
    /// Medium
    Medium,
    /// High
    High,
    /// Critical
    Critical,
}

string_enum!(TicketPriority {
    Low => "low",
    Medium => "medium",
    High => "high",
    Critical => "critical",
});

/// Support ticket
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportTicket {
    /// Ticket ID
    pub id: String,
    /// Human-facing number (TKT-nnnnnn)
    pub ticket_number: String,
    /// Customer ID
    pub customer_id: String,
    /// Customer name
    pub customer_name: String,
    /// Subject line
    pub subject: String,
    /// Description
    pub description: String,
    /// Status
    pub status: TicketStatus,
    /// Priority
    pub priority: TicketPriority,
    /// Assignee name
    pub assigned_to: Option<String>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Last change
    pub updated_at: DateTime<Utc>,
    /// Set when resolved or closed
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Before/after values recorded on an audit entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditChange {
    /// Value before the action
    pub before: String,
    /// Value after the action
    pub after: String,
}

/// Human-readable audit trail entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Entry ID
    pub id: String,
    /// Action ("Created order", ...)
    pub action: String,
    /// Entity type ("Order", "Invoice", ...)
    pub entity_type: String,
    /// Entity ID
    pub entity_id: String,
    /// Actor user ID
    pub user_id: String,
    /// Actor display name
    pub user_name: String,
    /// Timestamp
    pub timestamp: DateTime<Utc>,
    /// Free-form details
    pub details: String,
    /// Client address
    pub ip_address: Option<String>,
    /// Before/after values
    pub changes: Option<AuditChange>,
    /// Hash of the ledger entry written with this action
    pub blockchain_hash: Option<String>,
}

impl AuditLogEntry {
    /// Verified iff a ledger hash is attached and it starts with `0x`
    pub fn is_chain_verified(&self) -> bool {
        self.blockchain_hash
            .as_deref()
            .is_some_and(|hash| hash.starts_with("0x"))
    }
}

/// Notification kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Informational
    Info,
    /// Needs attention
    Warning,
    /// Action succeeded
    Success,
    /// Action failed
    Error,
}

string_enum!(NotificationKind {
    Info => "info",
    Warning => "warning",
    Success => "success",
    Error => "error",
});

/// Header notification
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Notification ID
    pub id: String,
    /// Kind
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    /// Title
    pub title: String,
    /// Message
    pub message: String,
    /// Read flag
    pub read: bool,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(TicketStatus::InProgress.as_str(), "in-progress");
        assert_eq!(TicketStatus::parse("in-progress"), Some(TicketStatus::InProgress));
        assert_eq!(OrderStatus::parse("shipped"), Some(OrderStatus::Shipped));
        assert_eq!(OrderStatus::parse("lost"), None);

        let json = serde_json::to_string(&TicketStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
    }

    #[test]
    fn test_role_permissions() {
        assert_eq!(UserRole::Admin.permissions().len(), 11);
        assert!(UserRole::Auditor.has_permission(Permission::Audit));
        assert!(!UserRole::Sales.has_permission(Permission::Inventory));
        assert!(UserRole::Support.has_permission(Permission::Tickets));
        assert!(!UserRole::Manager.has_permission(Permission::Settings));
    }

    #[test]
    fn test_user_identity_shape() {
        let user = User {
            id: "USR001".to_string(),
            name: "Alex Thompson".to_string(),
            email: "alex@company.com".to_string(),
            role: UserRole::Admin,
            avatar: Some("AT".to_string()),
        };

        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["role"], "admin");
        assert_eq!(value["avatar"], "AT");
        assert_eq!(value.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_product_stock_flags() {
        let mut product = Product {
            id: "PRD001".to_string(),
            name: "API Gateway".to_string(),
            sku: "SKU-ABC123".to_string(),
            category: "Software".to_string(),
            price: dec!(499),
            stock_level: 20,
            reorder_point: 20,
            last_restocked: Utc::now(),
        };
        assert!(product.is_low_stock());
        assert!(!product.is_out_of_stock());

        product.stock_level = 0;
        assert!(product.is_out_of_stock());
    }

    #[test]
    fn test_audit_chain_verified() {
        let mut entry = AuditLogEntry {
            id: "AUD1".to_string(),
            action: "Created order".to_string(),
            entity_type: "Order".to_string(),
            entity_id: "ORD1".to_string(),
            user_id: "USR001".to_string(),
            user_name: "System".to_string(),
            timestamp: Utc::now(),
            details: String::new(),
            ip_address: None,
            changes: None,
            blockchain_hash: None,
        };
        assert!(!entry.is_chain_verified());

        entry.blockchain_hash = Some("deadbeef".to_string());
        assert!(!entry.is_chain_verified());

        entry.blockchain_hash = Some("0xdeadbeef".to_string());
        assert!(entry.is_chain_verified());
    }
}
