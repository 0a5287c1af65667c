//! Metrics collection for observability
//!
//! # Metrics
//!
//! - `erp_ledger_entries_total` - Ledger entries appended
//! - `erp_audit_entries_total` - Audit entries recorded
//! - `erp_mutations_rejected_total` - Mutators that refused their input
//! - `erp_commands_total` - Commands handled by the dashboard actor

use prometheus::{IntCounter, Registry};
use std::sync::Arc;

/// Metrics collector
///
/// Counters live in a private registry so several stores can coexist in one
/// process (tests, refreshes).
#[derive(Clone, Debug)]
pub struct Metrics {
    /// Ledger entries appended
    pub ledger_entries_total: IntCounter,

    /// Audit entries recorded
    pub audit_entries_total: IntCounter,

    /// Rejected mutations
    pub mutations_rejected_total: IntCounter,

    /// Commands handled by the actor
    pub commands_total: IntCounter,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let ledger_entries_total =
            IntCounter::new("erp_ledger_entries_total", "Ledger entries appended")?;
        registry.register(Box::new(ledger_entries_total.clone()))?;

        let audit_entries_total =
            IntCounter::new("erp_audit_entries_total", "Audit entries recorded")?;
        registry.register(Box::new(audit_entries_total.clone()))?;

        let mutations_rejected_total = IntCounter::new(
            "erp_mutations_rejected_total",
            "Mutators that refused their input",
        )?;
        registry.register(Box::new(mutations_rejected_total.clone()))?;

        let commands_total =
            IntCounter::new("erp_commands_total", "Commands handled by the dashboard actor")?;
        registry.register(Box::new(commands_total.clone()))?;

        Ok(Self {
            ledger_entries_total,
            audit_entries_total,
            mutations_rejected_total,
            commands_total,
            registry,
        })
    }

    /// Record ledger append
    pub fn record_ledger_append(&self) {
        self.ledger_entries_total.inc();
    }

    /// Record audit append
    pub fn record_audit_append(&self) {
        self.audit_entries_total.inc();
    }

    /// Record rejected mutation
    pub fn record_rejected(&self) {
        self.mutations_rejected_total.inc();
    }

    /// Record handled command
    pub fn record_command(&self) {
        self.commands_total.inc();
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        assert_eq!(metrics.ledger_entries_total.get(), 0);
        assert_eq!(metrics.audit_entries_total.get(), 0);
    }

    #[test]
    fn test_independent_registries() {
        let a = Metrics::new().unwrap();
        let b = Metrics::new().unwrap();
        a.record_ledger_append();
        a.record_audit_append();

        assert_eq!(a.ledger_entries_total.get(), 1);
        assert_eq!(b.ledger_entries_total.get(), 0);
        assert_eq!(a.registry().gather().len(), 4);
    }
}
