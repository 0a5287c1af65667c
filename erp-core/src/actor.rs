//! Actor-based event loop for the dashboard
//!
//! A single task owns the [`DataStore`] and the login session. UI events
//! arrive as messages and are applied one at a time, in arrival order, so no
//! locks are needed anywhere.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │          DashboardHandle (Clone)              │
//! │   page actions, simulated latency timers     │
//! └──────────────────────┬───────────────────────┘
//!                        │ mpsc::channel (bounded)
//!                        ▼
//! ┌──────────────────────────────────────────────┐
//! │         DashboardActor (single task)          │
//! │   AuthSession ──► actor stamp ──► DataStore   │
//! │                  mutation + notification      │
//! └──────────────────────────────────────────────┘
//! ```

use crate::config::UiConfig;
use crate::ledger::RecordVerdict;
use crate::session::{AuthSession, SessionStore};
use crate::store::{DataStore, NewCustomer, NewOrder, NewTicket};
use crate::types::{
    AuditLogEntry, Customer, CustomerStatus, Invoice, InvoiceStatus, LedgerEntry, Notification,
    NotificationKind, Order, OrderStatus, Permission, Product, SupportTicket, TicketStatus, User,
    UserRole,
};
use crate::{Error, Result};
use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tokio::time::Duration;

/// Owned copy of everything the views derive from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Logged-in user
    pub current_user: Option<User>,
    /// Products
    pub products: Vec<Product>,
    /// Customers, newest first
    pub customers: Vec<Customer>,
    /// Orders, newest first
    pub orders: Vec<Order>,
    /// Invoices, newest first
    pub invoices: Vec<Invoice>,
    /// Support tickets, newest first
    pub tickets: Vec<SupportTicket>,
    /// Ledger entries, newest first
    pub ledger_entries: Vec<LedgerEntry>,
    /// Audit entries, newest first
    pub audit_entries: Vec<AuditLogEntry>,
    /// Notifications, newest first
    pub notifications: Vec<Notification>,
}

impl DashboardSnapshot {
    /// Capture the store and current user
    pub fn capture(store: &DataStore, current_user: Option<User>) -> Self {
        Self {
            current_user,
            products: store.products().to_vec(),
            customers: store.customers().to_vec(),
            orders: store.orders().to_vec(),
            invoices: store.invoices().to_vec(),
            tickets: store.tickets().to_vec(),
            ledger_entries: store.ledger().entries().cloned().collect(),
            audit_entries: store.audit().entries().cloned().collect(),
            notifications: store.notifications().to_vec(),
        }
    }

    /// Unread notification count
    pub fn unread_notifications(&self) -> usize {
        self.notifications.iter().filter(|n| !n.read).count()
    }
}

/// Message sent to the dashboard actor
#[derive(Debug)]
pub enum DashboardMessage {
    /// Email/password login
    Login {
        email: String,
        password: String,
        response: oneshot::Sender<bool>,
    },

    /// Quick login by role
    LoginAsRole {
        role: UserRole,
        response: oneshot::Sender<bool>,
    },

    /// Logout
    Logout { response: oneshot::Sender<()> },

    /// Permission check for the current user
    CheckPermission {
        permission: Permission,
        response: oneshot::Sender<bool>,
    },

    /// Create an order
    CreateOrder {
        request: NewOrder,
        response: oneshot::Sender<Result<Order>>,
    },

    /// Change an order's status
    UpdateOrderStatus {
        order_id: String,
        status: OrderStatus,
        response: oneshot::Sender<Result<()>>,
    },

    /// Generate the invoice for an order
    GenerateInvoice {
        order_id: String,
        response: oneshot::Sender<Result<Invoice>>,
    },

    /// Change an invoice's status
    UpdateInvoiceStatus {
        invoice_id: String,
        status: InvoiceStatus,
        response: oneshot::Sender<Result<()>>,
    },

    /// Add a customer
    AddCustomer {
        request: NewCustomer,
        response: oneshot::Sender<Result<Customer>>,
    },

    /// Change a customer's status
    UpdateCustomerStatus {
        customer_id: String,
        status: CustomerStatus,
        response: oneshot::Sender<Result<()>>,
    },

    /// Open a support ticket
    CreateTicket {
        request: NewTicket,
        response: oneshot::Sender<Result<SupportTicket>>,
    },

    /// Change a ticket's status
    UpdateTicketStatus {
        ticket_id: String,
        status: TicketStatus,
        response: oneshot::Sender<Result<()>>,
    },

    /// Restock a product
    RestockProduct {
        product_id: String,
        quantity: u32,
        response: oneshot::Sender<Result<Product>>,
    },

    /// Free-text ledger lookup
    Verify {
        query: String,
        response: oneshot::Sender<Option<LedgerEntry>>,
    },

    /// Exact record lookup with verdict
    VerifyRecord {
        record_id: String,
        response: oneshot::Sender<RecordVerdict>,
    },

    /// Audit hash prefix check
    VerifyAuditEntry {
        audit_id: String,
        response: oneshot::Sender<Result<bool>>,
    },

    /// Post a notification
    Notify {
        kind: NotificationKind,
        title: String,
        message: String,
        response: oneshot::Sender<()>,
    },

    /// Mark a notification read
    MarkNotificationRead {
        notification_id: String,
        response: oneshot::Sender<bool>,
    },

    /// Drop all notifications
    ClearNotifications { response: oneshot::Sender<()> },

    /// Regenerate the dataset
    Refresh { response: oneshot::Sender<()> },

    /// Copy current state
    Snapshot {
        response: oneshot::Sender<DashboardSnapshot>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that owns the store and session
pub struct DashboardActor<S: SessionStore> {
    store: DataStore,
    session: AuthSession<S>,
    mailbox: mpsc::Receiver<DashboardMessage>,
}

impl<S: SessionStore> std::fmt::Debug for DashboardActor<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardActor")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl<S: SessionStore> DashboardActor<S> {
    /// Create new actor
    ///
    /// The store's audit actor follows whoever the session has restored.
    pub fn new(
        mut store: DataStore,
        session: AuthSession<S>,
        mailbox: mpsc::Receiver<DashboardMessage>,
    ) -> Self {
        store.set_actor(session.actor());
        Self {
            store,
            session,
            mailbox,
        }
    }

    /// Run the actor event loop until shutdown or all handles drop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, DashboardMessage::Shutdown) {
                tracing::info!("Dashboard actor shutting down");
                break;
            }
            self.store.metrics().record_command();
            self.handle_message(msg);
        }
    }

    fn handle_message(&mut self, msg: DashboardMessage) {
        match msg {
            DashboardMessage::Login {
                email,
                password,
                response,
            } => {
                let ok = self.session.login(&email, &password);
                self.sync_actor();
                let _ = response.send(ok);
            }

            DashboardMessage::LoginAsRole { role, response } => {
                let ok = self.session.login_as_role(role);
                self.sync_actor();
                let _ = response.send(ok);
            }

            DashboardMessage::Logout { response } => {
                self.session.logout();
                self.sync_actor();
                let _ = response.send(());
            }

            DashboardMessage::CheckPermission {
                permission,
                response,
            } => {
                let _ = response.send(self.session.check_permission(permission));
            }

            DashboardMessage::CreateOrder { request, response } => {
                let result = self.store.create_order(request);
                if let Ok(order) = &result {
                    self.store.notify(
                        NotificationKind::Success,
                        "Order Created",
                        format!(
                            "Order {} has been created and recorded on blockchain.",
                            order.id
                        ),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::UpdateOrderStatus {
                order_id,
                status,
                response,
            } => {
                let result = self.store.update_order_status(&order_id, status);
                if result.is_ok() {
                    self.store.notify(
                        NotificationKind::Info,
                        "Order Updated",
                        format!("Order {} status changed to {}.", order_id, status),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::GenerateInvoice { order_id, response } => {
                let result = self.store.generate_invoice(&order_id);
                if let Ok(invoice) = &result {
                    self.store.notify(
                        NotificationKind::Success,
                        "Invoice Generated",
                        format!("Invoice {} created and verified on blockchain.", invoice.id),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::UpdateInvoiceStatus {
                invoice_id,
                status,
                response,
            } => {
                let result = self.store.update_invoice_status(&invoice_id, status);
                if result.is_ok() {
                    let (kind, title) = if status == InvoiceStatus::Paid {
                        (NotificationKind::Success, "Payment Received")
                    } else {
                        (NotificationKind::Info, "Invoice Updated")
                    };
                    self.store.notify(
                        kind,
                        title,
                        format!("Invoice {} status changed to {}.", invoice_id, status),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::AddCustomer { request, response } => {
                let result = self.store.add_customer(request);
                if let Ok(customer) = &result {
                    self.store.notify(
                        NotificationKind::Success,
                        "Customer Added",
                        format!("{} has been added to the CRM.", customer.name),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::UpdateCustomerStatus {
                customer_id,
                status,
                response,
            } => {
                let result = self.store.update_customer_status(&customer_id, status);
                if result.is_ok() {
                    self.store.notify(
                        NotificationKind::Info,
                        "Status Updated",
                        format!("Customer status changed to {}.", status),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::CreateTicket { request, response } => {
                let result = self.store.create_ticket(request);
                if let Ok(ticket) = &result {
                    self.store.notify(
                        NotificationKind::Success,
                        "Ticket Created",
                        format!(
                            "Support ticket for {} has been created.",
                            ticket.customer_name
                        ),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::UpdateTicketStatus {
                ticket_id,
                status,
                response,
            } => {
                let result = self.store.update_ticket_status(&ticket_id, status);
                if result.is_ok() {
                    self.store.notify(
                        NotificationKind::Success,
                        "Ticket Updated",
                        format!("Ticket status changed to {}.", status),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::RestockProduct {
                product_id,
                quantity,
                response,
            } => {
                let result = self.store.restock_product(&product_id, quantity);
                if let Ok(product) = &result {
                    self.store.notify(
                        NotificationKind::Success,
                        "Stock Updated",
                        format!(
                            "Added {} units to {}. Recorded on blockchain.",
                            quantity, product.name
                        ),
                    );
                }
                let _ = response.send(result);
            }

            DashboardMessage::Verify { query, response } => {
                let found = self.store.verify(&query).entry().cloned();
                let _ = response.send(found);
            }

            DashboardMessage::VerifyRecord {
                record_id,
                response,
            } => {
                let _ = response.send(self.store.verify_record(&record_id));
            }

            DashboardMessage::VerifyAuditEntry { audit_id, response } => {
                let _ = response.send(self.store.verify_audit_entry(&audit_id));
            }

            DashboardMessage::Notify {
                kind,
                title,
                message,
                response,
            } => {
                self.store.notify(kind, title, message);
                let _ = response.send(());
            }

            DashboardMessage::MarkNotificationRead {
                notification_id,
                response,
            } => {
                let _ = response.send(self.store.mark_notification_read(&notification_id));
            }

            DashboardMessage::ClearNotifications { response } => {
                self.store.clear_notifications();
                let _ = response.send(());
            }

            DashboardMessage::Refresh { response } => {
                self.store.refresh();
                let _ = response.send(());
            }

            DashboardMessage::Snapshot { response } => {
                let snapshot =
                    DashboardSnapshot::capture(&self.store, self.session.current_user().cloned());
                let _ = response.send(snapshot);
            }

            DashboardMessage::Shutdown => {
                // Handled in run loop
            }
        }
    }

    fn sync_actor(&mut self) {
        self.store.set_actor(self.session.actor());
    }
}

/// Handle for sending messages to the actor
#[derive(Clone, Debug)]
pub struct DashboardHandle {
    sender: mpsc::Sender<DashboardMessage>,
    verify_latency: Duration,
    save_latency: Duration,
}

impl DashboardHandle {
    /// Create new handle
    pub fn new(sender: mpsc::Sender<DashboardMessage>, ui: &UiConfig) -> Self {
        Self {
            sender,
            verify_latency: ui.verify_latency(),
            save_latency: ui.save_latency(),
        }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> DashboardMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(build(tx))
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;

        rx.await
            .map_err(|_| Error::Concurrency("Response channel closed".to_string()))
    }

    /// Email/password login
    pub async fn login(&self, email: impl Into<String>, password: impl Into<String>) -> Result<bool> {
        let (email, password) = (email.into(), password.into());
        self.request(|response| DashboardMessage::Login {
            email,
            password,
            response,
        })
        .await
    }

    /// Quick login by role
    pub async fn login_as_role(&self, role: UserRole) -> Result<bool> {
        self.request(|response| DashboardMessage::LoginAsRole { role, response })
            .await
    }

    /// Logout
    pub async fn logout(&self) -> Result<()> {
        self.request(|response| DashboardMessage::Logout { response })
            .await
    }

    /// Permission check for the current user
    pub async fn check_permission(&self, permission: Permission) -> Result<bool> {
        self.request(|response| DashboardMessage::CheckPermission {
            permission,
            response,
        })
        .await
    }

    /// Create an order
    pub async fn create_order(&self, request: NewOrder) -> Result<Order> {
        self.request(|response| DashboardMessage::CreateOrder { request, response })
            .await?
    }

    /// Change an order's status
    pub async fn update_order_status(
        &self,
        order_id: impl Into<String>,
        status: OrderStatus,
    ) -> Result<()> {
        let order_id = order_id.into();
        self.request(|response| DashboardMessage::UpdateOrderStatus {
            order_id,
            status,
            response,
        })
        .await?
    }

    /// Generate the invoice for an order
    pub async fn generate_invoice(&self, order_id: impl Into<String>) -> Result<Invoice> {
        let order_id = order_id.into();
        self.request(|response| DashboardMessage::GenerateInvoice { order_id, response })
            .await?
    }

    /// Change an invoice's status
    pub async fn update_invoice_status(
        &self,
        invoice_id: impl Into<String>,
        status: InvoiceStatus,
    ) -> Result<()> {
        let invoice_id = invoice_id.into();
        self.request(|response| DashboardMessage::UpdateInvoiceStatus {
            invoice_id,
            status,
            response,
        })
        .await?
    }

    /// Add a customer
    pub async fn add_customer(&self, request: NewCustomer) -> Result<Customer> {
        self.request(|response| DashboardMessage::AddCustomer { request, response })
            .await?
    }

    /// Change a customer's status
    pub async fn update_customer_status(
        &self,
        customer_id: impl Into<String>,
        status: CustomerStatus,
    ) -> Result<()> {
        let customer_id = customer_id.into();
        self.request(|response| DashboardMessage::UpdateCustomerStatus {
            customer_id,
            status,
            response,
        })
        .await?
    }

    /// Open a support ticket
    pub async fn create_ticket(&self, request: NewTicket) -> Result<SupportTicket> {
        self.request(|response| DashboardMessage::CreateTicket { request, response })
            .await?
    }

    /// Change a ticket's status
    pub async fn update_ticket_status(
        &self,
        ticket_id: impl Into<String>,
        status: TicketStatus,
    ) -> Result<()> {
        let ticket_id = ticket_id.into();
        self.request(|response| DashboardMessage::UpdateTicketStatus {
            ticket_id,
            status,
            response,
        })
        .await?
    }

    /// Restock a product
    pub async fn restock_product(
        &self,
        product_id: impl Into<String>,
        quantity: u32,
    ) -> Result<Product> {
        let product_id = product_id.into();
        self.request(|response| DashboardMessage::RestockProduct {
            product_id,
            quantity,
            response,
        })
        .await?
    }

    /// Free-text ledger lookup; `None` when blank or unmatched
    pub async fn verify(&self, query: impl Into<String>) -> Result<Option<LedgerEntry>> {
        let query = query.into();
        self.request(|response| DashboardMessage::Verify { query, response })
            .await
    }

    /// Exact record lookup with verdict
    pub async fn verify_record(&self, record_id: impl Into<String>) -> Result<RecordVerdict> {
        let record_id = record_id.into();
        self.request(|response| DashboardMessage::VerifyRecord {
            record_id,
            response,
        })
        .await
    }

    /// Audit hash check, answered after the simulated verification latency
    ///
    /// The actor answers immediately; the wait happens here so other
    /// commands are not held up.
    pub async fn verify_audit_entry(&self, audit_id: impl Into<String>) -> Result<bool> {
        let audit_id = audit_id.into();
        let result = self
            .request(|response| DashboardMessage::VerifyAuditEntry { audit_id, response })
            .await?;
        tokio::time::sleep(self.verify_latency).await;
        result
    }

    /// Save preferences; notifies after the simulated save latency
    pub async fn save_settings(&self) -> Result<()> {
        tokio::time::sleep(self.save_latency).await;
        self.notify(
            NotificationKind::Success,
            "Settings Saved",
            "Your preferences have been updated successfully.",
        )
        .await
    }

    /// Post a notification
    pub async fn notify(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<()> {
        let (title, message) = (title.into(), message.into());
        self.request(|response| DashboardMessage::Notify {
            kind,
            title,
            message,
            response,
        })
        .await
    }

    /// Mark a notification read
    pub async fn mark_notification_read(&self, notification_id: impl Into<String>) -> Result<bool> {
        let notification_id = notification_id.into();
        self.request(|response| DashboardMessage::MarkNotificationRead {
            notification_id,
            response,
        })
        .await
    }

    /// Drop all notifications
    pub async fn clear_notifications(&self) -> Result<()> {
        self.request(|response| DashboardMessage::ClearNotifications { response })
            .await
    }

    /// Regenerate the dataset
    pub async fn refresh(&self) -> Result<()> {
        self.request(|response| DashboardMessage::Refresh { response })
            .await
    }

    /// Copy current state
    pub async fn snapshot(&self) -> Result<DashboardSnapshot> {
        self.request(|response| DashboardMessage::Snapshot { response })
            .await
    }

    /// Shutdown actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(DashboardMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("Actor mailbox closed".to_string()))?;
        Ok(())
    }
}

/// Spawn the dashboard actor
pub fn spawn_dashboard_actor<S>(
    store: DataStore,
    session: AuthSession<S>,
    ui: &UiConfig,
) -> DashboardHandle
where
    S: SessionStore + 'static,
{
    let (tx, rx) = mpsc::channel(ui.mailbox_capacity);
    let actor = DashboardActor::new(store, session, rx);

    tokio::spawn(async move {
        actor.run().await;
    });

    DashboardHandle::new(tx, ui)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use crate::store::OrderLine;
    use crate::{seed, Config};

    fn spawn_test_actor() -> DashboardHandle {
        let mut config = Config::default();
        config.seed.rng_seed = Some(3);
        config.ui.verify_latency_ms = 0;
        config.ui.save_latency_ms = 0;

        let store = DataStore::new(&config);
        let session = AuthSession::new(seed::users(), MemorySessionStore::new());
        spawn_dashboard_actor(store, session, &config.ui)
    }

    #[tokio::test]
    async fn test_actor_spawn_and_shutdown() {
        let handle = spawn_test_actor();
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_closed_mailbox_reports_concurrency_error() {
        let handle = spawn_test_actor();
        handle.shutdown().await.unwrap();
        tokio::task::yield_now().await;

        let err = handle.refresh().await.unwrap_err();
        assert!(matches!(err, Error::Concurrency(_)));
    }

    #[tokio::test]
    async fn test_create_order_posts_notification() {
        let handle = spawn_test_actor();
        let before = handle.snapshot().await.unwrap();

        let order = handle
            .create_order(NewOrder {
                customer_id: before.customers[0].id.clone(),
                lines: vec![OrderLine {
                    product_id: "PRD003".to_string(),
                    quantity: 1,
                }],
            })
            .await
            .unwrap();

        let after = handle.snapshot().await.unwrap();
        assert_eq!(after.orders[0].id, order.id);
        assert_eq!(after.notifications[0].title, "Order Created");
        assert_eq!(
            after.unread_notifications(),
            before.unread_notifications() + 1
        );
        assert_eq!(after.ledger_entries.len(), before.ledger_entries.len() + 1);
    }

    #[tokio::test]
    async fn test_rejected_command_posts_nothing() {
        let handle = spawn_test_actor();
        let before = handle.snapshot().await.unwrap();

        let err = handle.restock_product("PRD001", 0).await.unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));

        let after = handle.snapshot().await.unwrap();
        assert_eq!(after.notifications.len(), before.notifications.len());
        assert_eq!(after.audit_entries.len(), before.audit_entries.len());
    }

    #[tokio::test]
    async fn test_login_stamps_audit_actor() {
        let handle = spawn_test_actor();
        assert!(!handle.check_permission(Permission::Tickets).await.unwrap());

        assert!(handle.login("chris@company.com", "pw").await.unwrap());
        assert!(handle.check_permission(Permission::Tickets).await.unwrap());
        handle
            .update_customer_status("CUS0001", CustomerStatus::Churned)
            .await
            .unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.current_user.unwrap().id, "USR005");
        assert_eq!(snapshot.audit_entries[0].user_name, "Chris Wilson");

        handle.logout().await.unwrap();
        handle.restock_product("PRD001", 5).await.unwrap();
        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.audit_entries[0].user_name, "System");
    }

    #[tokio::test]
    async fn test_invoice_paid_notification() {
        let handle = spawn_test_actor();
        let snapshot = handle.snapshot().await.unwrap();
        let order_id = snapshot.orders[0].id.clone();

        let invoice = handle.generate_invoice(&order_id).await.unwrap();
        handle
            .update_invoice_status(&invoice.id, InvoiceStatus::Paid)
            .await
            .unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        assert_eq!(snapshot.notifications[0].title, "Payment Received");
    }

    #[tokio::test]
    async fn test_verification_commands() {
        let handle = spawn_test_actor();
        let snapshot = handle.snapshot().await.unwrap();
        let entry = snapshot.ledger_entries[0].clone();

        let found = handle.verify(entry.hash[2..12].to_uppercase()).await.unwrap();
        assert!(found.is_some());
        assert!(handle.verify("   ").await.unwrap().is_none());

        let verdict = handle.verify_record(&entry.record_id).await.unwrap();
        assert!(verdict.found);

        let audit = &snapshot.audit_entries[0];
        let verified = handle.verify_audit_entry(&audit.id).await.unwrap();
        assert_eq!(verified, audit.is_chain_verified());
        assert!(handle.verify_audit_entry("AUD-NOPE").await.is_err());
    }

    #[tokio::test]
    async fn test_save_settings_and_notifications() {
        let handle = spawn_test_actor();
        handle.save_settings().await.unwrap();

        let snapshot = handle.snapshot().await.unwrap();
        let saved = &snapshot.notifications[0];
        assert_eq!(saved.title, "Settings Saved");

        assert!(handle.mark_notification_read(&saved.id).await.unwrap());
        handle.clear_notifications().await.unwrap();
        assert!(handle.snapshot().await.unwrap().notifications.is_empty());
    }
}
