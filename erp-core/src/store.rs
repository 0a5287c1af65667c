//! In-memory data store
//!
//! Owns every record collection together with the ledger and the audit log.
//! Each mutator validates its input first and only then touches state, so a
//! rejected call leaves everything as it was.
//!
//! | Mutation                 | Ledger entry | Audit entry |
//! |--------------------------|--------------|-------------|
//! | create / update order    | yes          | yes         |
//! | generate / update invoice| yes          | yes         |
//! | restock product          | yes          | yes         |
//! | add / update customer    | no           | yes         |
//! | create / update ticket   | no           | yes         |

use crate::audit::{Actor, AuditLog, AuditRecord};
use crate::config::Config;
use crate::ids;
use crate::ledger::{payload, Ledger, RecordVerdict, Verification};
use crate::metrics::Metrics;
use crate::seed::{self, SeedData};
use crate::types::{
    Customer, CustomerStatus, Invoice, InvoiceStatus, Notification, NotificationKind, Order,
    OrderItem, OrderStatus, Product, RecordType, SupportTicket, TicketPriority, TicketStatus,
    User,
};
use crate::{Error, Result};
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// One requested order line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Product ID; blank lines are skipped
    pub product_id: String,
    /// Quantity
    pub quantity: u32,
}

/// Order form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    /// Customer ID
    pub customer_id: String,
    /// Requested lines
    pub lines: Vec<OrderLine>,
}

/// Customer form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCustomer {
    /// Contact name (required)
    pub name: String,
    /// Contact email (required)
    pub email: String,
    /// Contact phone
    #[serde(default)]
    pub phone: String,
    /// Company
    #[serde(default)]
    pub company: String,
    /// Initial status
    #[serde(default = "default_customer_status")]
    pub status: CustomerStatus,
}

fn default_customer_status() -> CustomerStatus {
    CustomerStatus::Lead
}

/// Support ticket form
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTicket {
    /// Customer ID (required)
    pub customer_id: String,
    /// Subject (required)
    pub subject: String,
    /// Description (required)
    pub description: String,
    /// Priority
    pub priority: TicketPriority,
    /// Initial status
    #[serde(default = "default_ticket_status")]
    pub status: TicketStatus,
    /// Assignee
    #[serde(default)]
    pub assigned_to: Option<String>,
}

fn default_ticket_status() -> TicketStatus {
    TicketStatus::Open
}

/// Application state
#[derive(Debug)]
pub struct DataStore {
    users: Vec<User>,
    products: Vec<Product>,
    customers: Vec<Customer>,
    orders: Vec<Order>,
    invoices: Vec<Invoice>,
    tickets: Vec<SupportTicket>,
    notifications: Vec<Notification>,
    ledger: Ledger,
    audit: AuditLog,
    actor: Actor,
    invoice_due_days: i64,
    seed_config: crate::config::SeedConfig,
    rng: StdRng,
    metrics: Metrics,
}

impl DataStore {
    /// Store seeded according to `config`
    pub fn new(config: &Config) -> Self {
        let mut rng = match config.seed.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let data = seed::generate(&config.seed, &mut rng, Utc::now());
        let mut store = Self::from_seed_data(data, config, rng);
        store.push_startup_notifications();

        tracing::info!(
            orders = store.orders.len(),
            customers = store.customers.len(),
            ledger_entries = store.ledger.len(),
            "Data store initialized"
        );
        store
    }

    /// Store over an explicit dataset
    pub fn from_seed_data(data: SeedData, config: &Config, mut rng: StdRng) -> Self {
        let ledger = Ledger::from_entries(data.ledger_entries, child_rng(&mut rng));
        let audit = crate::audit::AuditLog::from_entries(data.audit_entries, child_rng(&mut rng));

        Self {
            users: data.users,
            products: data.products,
            customers: data.customers,
            orders: data.orders,
            invoices: data.invoices,
            tickets: data.tickets,
            notifications: Vec::new(),
            ledger,
            audit,
            actor: Actor::system(),
            invoice_due_days: config.invoicing.due_days,
            seed_config: config.seed.clone(),
            rng,
            metrics: Metrics::default(),
        }
    }

    // ========== Read access ==========

    /// Known users
    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Products
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Customers, newest first
    pub fn customers(&self) -> &[Customer] {
        &self.customers
    }

    /// Orders, newest first
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    /// Invoices, newest first
    pub fn invoices(&self) -> &[Invoice] {
        &self.invoices
    }

    /// Support tickets, newest first
    pub fn tickets(&self) -> &[SupportTicket] {
        &self.tickets
    }

    /// Notifications, newest first
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Unread notification count
    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }

    /// Ledger
    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Audit log
    pub fn audit(&self) -> &AuditLog {
        &self.audit
    }

    /// Metrics
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Actor stamped on audit entries
    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    /// Order by ID
    pub fn order(&self, id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    /// Invoice by ID
    pub fn invoice(&self, id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.id == id)
    }

    /// Invoice generated for an order
    pub fn invoice_for_order(&self, order_id: &str) -> Option<&Invoice> {
        self.invoices.iter().find(|i| i.order_id == order_id)
    }

    /// Customer by ID
    pub fn customer(&self, id: &str) -> Option<&Customer> {
        self.customers.iter().find(|c| c.id == id)
    }

    /// Product by ID
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Ticket by ID
    pub fn ticket(&self, id: &str) -> Option<&SupportTicket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    // ========== Session ==========

    /// Change who is stamped on subsequent audit entries
    pub fn set_actor(&mut self, actor: Actor) {
        self.actor = actor;
    }

    // ========== Orders ==========

    /// Create an order from a form submission
    ///
    /// Blank and unknown product lines are dropped; at least one valid line
    /// must remain. The order starts `pending`.
    pub fn create_order(&mut self, request: NewOrder) -> Result<Order> {
        let items = self.resolve_order_lines(&request)?;
        let customer = self
            .customer(&request.customer_id)
            .ok_or_else(|| self.reject(Error::CustomerNotFound(request.customer_id.clone())))?;
        let customer_id = customer.id.clone();
        let customer_name = customer.name.clone();

        let total_amount: Decimal = items.iter().map(|item| item.total).sum();
        let status = OrderStatus::Pending;
        let order_id = ids::prefixed_id("ORD", &mut self.rng);
        let now = Utc::now();

        let hash = self.append_ledger(
            RecordType::Order,
            &order_id,
            payload([
                ("customerId", json!(customer_id)),
                ("totalAmount", json!(total_amount)),
                ("status", json!(status)),
            ]),
        );

        let order = Order {
            id: order_id.clone(),
            customer_id: customer_id.clone(),
            customer_name,
            items,
            status,
            total_amount,
            created_at: now,
            updated_at: now,
            blockchain_hash: Some(hash.clone()),
            blockchain_verified: true,
        };
        self.orders.insert(0, order.clone());

        if let Some(customer) = self.customers.iter_mut().find(|c| c.id == customer_id) {
            customer.total_orders += 1;
            customer.total_spent += total_amount;
            customer.last_order_at = Some(now);
        }

        self.append_audit(
            AuditRecord::new("Created order", "Order", &order_id).with_ledger_hash(hash),
        );

        tracing::info!(order_id = %order.id, total = %order.total_amount, "Order created");
        Ok(order)
    }

    /// Set an order's status
    ///
    /// Any status may follow any other.
    pub fn update_order_status(&mut self, order_id: &str, status: OrderStatus) -> Result<()> {
        let Some(index) = self.orders.iter().position(|o| o.id == order_id) else {
            return Err(self.reject(Error::OrderNotFound(order_id.to_string())));
        };

        let order = &mut self.orders[index];
        let before = order.status;
        order.status = status;
        order.updated_at = Utc::now();

        let hash = self.append_ledger(
            RecordType::Order,
            order_id,
            payload([
                ("status", json!(status)),
                ("action", json!("status_update")),
            ]),
        );
        self.append_audit(
            AuditRecord::new("Updated order status", "Order", order_id)
                .with_change(before.as_str(), status.as_str())
                .with_ledger_hash(hash),
        );

        tracing::info!(%order_id, from = %before, to = %status, "Order status updated");
        Ok(())
    }

    // ========== Invoices ==========

    /// Generate the invoice for an order
    ///
    /// Idempotent per order: if an invoice already exists it is returned
    /// unchanged and nothing is recorded.
    pub fn generate_invoice(&mut self, order_id: &str) -> Result<Invoice> {
        let order = self
            .order(order_id)
            .ok_or_else(|| self.reject(Error::OrderNotFound(order_id.to_string())))?;

        if let Some(existing) = self.invoice_for_order(order_id) {
            tracing::debug!(%order_id, invoice_id = %existing.id, "Invoice already exists");
            return Ok(existing.clone());
        }

        let customer_id = order.customer_id.clone();
        let customer_name = order.customer_name.clone();
        let amount = order.total_amount;
        let now = Utc::now();
        let Some(due_date) = Duration::try_days(self.invoice_due_days)
            .and_then(|term| now.checked_add_signed(term))
        else {
            return Err(self.reject(Error::Config(format!(
                "invoice term of {} days is out of range",
                self.invoice_due_days
            ))));
        };
        let invoice_id = ids::prefixed_id("INV", &mut self.rng);

        let hash = self.append_ledger(
            RecordType::Invoice,
            &invoice_id,
            payload([
                ("orderId", json!(order_id)),
                ("amount", json!(amount)),
                ("customerId", json!(customer_id)),
            ]),
        );

        let invoice = Invoice {
            id: invoice_id.clone(),
            order_id: order_id.to_string(),
            customer_id,
            customer_name,
            amount,
            status: InvoiceStatus::Sent,
            due_date,
            created_at: now,
            paid_at: None,
            blockchain_hash: Some(hash.clone()),
            blockchain_verified: true,
        };
        self.invoices.insert(0, invoice.clone());

        self.append_audit(
            AuditRecord::new("Generated invoice", "Invoice", &invoice_id).with_ledger_hash(hash),
        );

        tracing::info!(%order_id, invoice_id = %invoice.id, "Invoice generated");
        Ok(invoice)
    }

    /// Set an invoice's status; `paid` stamps the payment time
    pub fn update_invoice_status(&mut self, invoice_id: &str, status: InvoiceStatus) -> Result<()> {
        let Some(index) = self.invoices.iter().position(|i| i.id == invoice_id) else {
            return Err(self.reject(Error::InvoiceNotFound(invoice_id.to_string())));
        };

        let invoice = &mut self.invoices[index];
        let before = invoice.status;
        invoice.status = status;
        if status == InvoiceStatus::Paid {
            invoice.paid_at = Some(Utc::now());
        }

        let hash = self.append_ledger(
            RecordType::Invoice,
            invoice_id,
            payload([
                ("status", json!(status)),
                ("action", json!("status_update")),
            ]),
        );
        self.append_audit(
            AuditRecord::new("Updated invoice status", "Invoice", invoice_id)
                .with_change(before.as_str(), status.as_str())
                .with_ledger_hash(hash),
        );

        tracing::info!(%invoice_id, from = %before, to = %status, "Invoice status updated");
        Ok(())
    }

    // ========== Customers ==========

    /// Add a customer; name and email are required
    pub fn add_customer(&mut self, request: NewCustomer) -> Result<Customer> {
        let name = request.name.trim();
        let email = request.email.trim();
        if name.is_empty() || email.is_empty() {
            return Err(self.reject(Error::InvalidInput(
                "customer name and email are required".to_string(),
            )));
        }

        let customer = Customer {
            id: ids::prefixed_id("CUS", &mut self.rng),
            name: name.to_string(),
            email: email.to_string(),
            phone: request.phone.trim().to_string(),
            company: request.company.trim().to_string(),
            status: request.status,
            total_orders: 0,
            total_spent: Decimal::ZERO,
            created_at: Utc::now(),
            last_order_at: None,
        };
        self.customers.insert(0, customer.clone());

        self.append_audit(AuditRecord::new("Added customer", "Customer", &customer.id));

        tracing::info!(customer_id = %customer.id, "Customer added");
        Ok(customer)
    }

    /// Set a customer's lifecycle status
    pub fn update_customer_status(
        &mut self,
        customer_id: &str,
        status: CustomerStatus,
    ) -> Result<()> {
        let Some(customer) = self.customers.iter_mut().find(|c| c.id == customer_id) else {
            return Err(self.reject(Error::CustomerNotFound(customer_id.to_string())));
        };
        let before = customer.status;
        customer.status = status;

        self.append_audit(
            AuditRecord::new("Updated customer status", "Customer", customer_id)
                .with_change(before.as_str(), status.as_str()),
        );

        tracing::info!(%customer_id, from = %before, to = %status, "Customer status updated");
        Ok(())
    }

    // ========== Tickets ==========

    /// Open a support ticket; customer, subject and description are required
    pub fn create_ticket(&mut self, request: NewTicket) -> Result<SupportTicket> {
        if request.subject.trim().is_empty() || request.description.trim().is_empty() {
            return Err(self.reject(Error::InvalidInput(
                "ticket subject and description are required".to_string(),
            )));
        }
        let customer = self
            .customer(&request.customer_id)
            .ok_or_else(|| self.reject(Error::CustomerNotFound(request.customer_id.clone())))?;
        let customer_name = customer.name.clone();

        let now = Utc::now();
        let resolved = matches!(request.status, TicketStatus::Resolved | TicketStatus::Closed);
        let ticket = SupportTicket {
            id: ids::prefixed_id("TKT", &mut self.rng),
            ticket_number: ids::ticket_number(now),
            customer_id: request.customer_id,
            customer_name,
            subject: request.subject.trim().to_string(),
            description: request.description.trim().to_string(),
            status: request.status,
            priority: request.priority,
            assigned_to: request.assigned_to,
            created_at: now,
            updated_at: now,
            resolved_at: resolved.then_some(now),
        };
        self.tickets.insert(0, ticket.clone());

        self.append_audit(AuditRecord::new("Created support ticket", "Ticket", &ticket.id));

        tracing::info!(ticket_id = %ticket.id, priority = %ticket.priority, "Ticket created");
        Ok(ticket)
    }

    /// Set a ticket's status; `resolved` and `closed` stamp the resolution time
    pub fn update_ticket_status(&mut self, ticket_id: &str, status: TicketStatus) -> Result<()> {
        let Some(ticket) = self.tickets.iter_mut().find(|t| t.id == ticket_id) else {
            return Err(self.reject(Error::TicketNotFound(ticket_id.to_string())));
        };
        let now = Utc::now();
        let before = ticket.status;
        ticket.status = status;
        ticket.updated_at = now;
        if matches!(status, TicketStatus::Resolved | TicketStatus::Closed) {
            ticket.resolved_at = Some(now);
        }

        self.append_audit(
            AuditRecord::new("Updated ticket status", "Ticket", ticket_id)
                .with_change(before.as_str(), status.as_str()),
        );

        tracing::info!(%ticket_id, from = %before, to = %status, "Ticket status updated");
        Ok(())
    }

    // ========== Inventory ==========

    /// Add `quantity` units to a product's stock
    ///
    /// Strictly additive; `quantity` must be positive.
    pub fn restock_product(&mut self, product_id: &str, quantity: u32) -> Result<Product> {
        if quantity == 0 {
            return Err(self.reject(Error::InvalidInput(
                "restock quantity must be positive".to_string(),
            )));
        }
        let Some(index) = self.products.iter().position(|p| p.id == product_id) else {
            return Err(self.reject(Error::ProductNotFound(product_id.to_string())));
        };
        let before = self.products[index].stock_level;
        let Some(after) = before.checked_add(quantity) else {
            return Err(self.reject(Error::InvalidInput(format!(
                "restock of {} would overflow stock level {}",
                quantity, before
            ))));
        };

        let product = &mut self.products[index];
        product.stock_level = after;
        product.last_restocked = Utc::now();
        let product = product.clone();

        let hash = self.append_ledger(
            RecordType::Inventory,
            product_id,
            payload([
                ("quantity", json!(quantity)),
                ("action", json!("stock_update")),
            ]),
        );
        self.append_audit(
            AuditRecord::new("Updated product stock", "Product", product_id)
                .with_change(before.to_string(), after.to_string())
                .with_ledger_hash(hash),
        );

        tracing::info!(%product_id, quantity, stock_level = after, "Product restocked");
        Ok(product)
    }

    // ========== Notifications ==========

    /// Post a notification
    pub fn notify(
        &mut self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> &Notification {
        let notification = Notification {
            id: ids::prefixed_id("NOT", &mut self.rng),
            kind,
            title: title.into(),
            message: message.into(),
            read: false,
            created_at: Utc::now(),
        };
        self.notifications.insert(0, notification);
        &self.notifications[0]
    }

    /// Mark one notification read; unknown IDs are ignored
    pub fn mark_notification_read(&mut self, notification_id: &str) -> bool {
        match self
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
        {
            Some(notification) => {
                notification.read = true;
                true
            }
            None => false,
        }
    }

    /// Drop every notification
    pub fn clear_notifications(&mut self) {
        self.notifications.clear();
    }

    // ========== Verification ==========

    /// Free-text ledger lookup by record ID or hash fragment
    pub fn verify(&self, query: &str) -> Verification<'_> {
        self.ledger.search(query)
    }

    /// Exact record-ID lookup with verdict
    pub fn verify_record(&self, record_id: &str) -> RecordVerdict {
        self.ledger.verify_record(record_id)
    }

    /// Prefix check on an audit entry's ledger hash
    pub fn verify_audit_entry(&self, audit_id: &str) -> Result<bool> {
        self.audit.verify_entry(audit_id)
    }

    // ========== Maintenance ==========

    /// Regenerate every domain collection; notifications survive
    pub fn refresh(&mut self) {
        let data = seed::generate(&self.seed_config, &mut self.rng, Utc::now());
        self.users = data.users;
        self.products = data.products;
        self.customers = data.customers;
        self.orders = data.orders;
        self.invoices = data.invoices;
        self.tickets = data.tickets;
        self.ledger = Ledger::from_entries(data.ledger_entries, child_rng(&mut self.rng));
        self.audit = AuditLog::from_entries(data.audit_entries, child_rng(&mut self.rng));
        tracing::info!("Data store refreshed");
    }

    fn push_startup_notifications(&mut self) {
        let low_stock = self.products.iter().filter(|p| p.is_low_stock()).count();
        if low_stock > 0 {
            self.notify(
                NotificationKind::Warning,
                "Low Stock Alert",
                format!("{} products are below reorder point.", low_stock),
            );
        }
        self.notify(
            NotificationKind::Info,
            "Welcome to BlockChain ERP",
            "Your enterprise dashboard is ready.",
        );
    }

    fn resolve_order_lines(&self, request: &NewOrder) -> Result<Vec<OrderItem>> {
        if request.customer_id.trim().is_empty() {
            return Err(self.reject(Error::InvalidInput("order customer is required".to_string())));
        }
        if request.lines.iter().any(|l| !l.product_id.is_empty() && l.quantity == 0) {
            return Err(self.reject(Error::InvalidInput(
                "order line quantity must be positive".to_string(),
            )));
        }

        let items: Vec<OrderItem> = request
            .lines
            .iter()
            .filter(|line| !line.product_id.is_empty())
            .filter_map(|line| {
                let product = self.product(&line.product_id)?;
                Some(OrderItem {
                    product_id: product.id.clone(),
                    product_name: product.name.clone(),
                    quantity: line.quantity,
                    unit_price: product.price,
                    total: product.price * Decimal::from(line.quantity),
                })
            })
            .collect();

        if items.is_empty() {
            return Err(self.reject(Error::InvalidInput(
                "order needs at least one known product".to_string(),
            )));
        }
        Ok(items)
    }

    fn append_ledger(
        &mut self,
        record_type: RecordType,
        record_id: &str,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> String {
        let hash = self.ledger.append(record_type, record_id, data).hash.clone();
        self.metrics.record_ledger_append();
        hash
    }

    fn append_audit(&mut self, record: AuditRecord<'_>) {
        self.audit.append(record, &self.actor);
        self.metrics.record_audit_append();
    }

    fn reject(&self, error: Error) -> Error {
        tracing::warn!(error = %error, "Mutation rejected");
        self.metrics.record_rejected();
        error
    }
}

fn child_rng(rng: &mut StdRng) -> StdRng {
    StdRng::seed_from_u64(rng.gen())
}
