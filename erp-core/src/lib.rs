//! ChainERP Core
//!
//! In-memory state behind the enterprise dashboard: domain records, a
//! simulated append-only ledger and a human-readable audit trail.
//!
//! # Architecture
//!
//! - **DataStore**: owns every record collection and exposes the mutators
//! - **Ledger**: prepends pseudo-blockchain entries (random hash + previous-hash pointer)
//! - **AuditLog**: prepends one audit entry per mutation
//! - **Actor**: a single task owns the store and applies UI commands in order
//!
//! # Invariants
//!
//! - Every Order/Invoice/Product mutation appends one ledger entry and one audit entry
//! - Customer and ticket mutations append one audit entry only
//! - A rejected mutation leaves every collection untouched
//! - The ledger hash chain is referential only; nothing is content-hashed

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    missing_debug_implementations,
    clippy::all
)]

pub mod types;
pub mod ids;
pub mod ledger;
pub mod audit;
pub mod store;
pub mod seed;
pub mod session;
pub mod error;
pub mod actor;
pub mod config;
pub mod metrics;

// Re-exports
pub use error::{Error, Result};
pub use types::{
    AuditLogEntry, Customer, CustomerStatus, Invoice, InvoiceStatus, LedgerEntry, Notification,
    NotificationKind, Order, OrderItem, OrderStatus, Permission, Product, RecordType,
    SupportTicket, TicketPriority, TicketStatus, User, UserRole,
};
pub use ledger::{Ledger, RecordVerdict, Verification};
pub use audit::{ActionKind, Actor, AuditLog};
pub use store::{DataStore, NewCustomer, NewOrder, NewTicket, OrderLine};
pub use session::{AuthSession, FileSessionStore, MemorySessionStore, SessionStore};
pub use actor::{spawn_dashboard_actor, DashboardHandle, DashboardSnapshot};
pub use metrics::Metrics;
pub use config::Config;
