//! Error types for the dashboard core

use thiserror::Error;

/// Result type for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Store errors
///
/// Mutators return these instead of applying partially; callers that only
/// care about "did it happen" can treat any `Err` as a no-op.
#[derive(Error, Debug)]
pub enum Error {
    /// Order not found
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Invoice not found
    #[error("Invoice not found: {0}")]
    InvoiceNotFound(String),

    /// Customer not found
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Ticket not found
    #[error("Ticket not found: {0}")]
    TicketNotFound(String),

    /// Audit entry not found
    #[error("Audit entry not found: {0}")]
    AuditEntryNotFound(String),

    /// Missing or malformed form input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// True for the "record does not exist" family
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Error::OrderNotFound(_)
                | Error::InvoiceNotFound(_)
                | Error::CustomerNotFound(_)
                | Error::ProductNotFound(_)
                | Error::TicketNotFound(_)
                | Error::AuditEntryNotFound(_)
        )
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}
