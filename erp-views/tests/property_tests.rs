//! Property-based tests for view derivations
//!
//! - Status filters partition the rows: every row lands under exactly one status
//! - Pagination slices are exact and clamp at the end
//! - Searches never return rows the unfiltered table lacks

use chrono::Utc;
use erp_core::{seed, Config, CustomerStatus, InvoiceStatus, OrderStatus, TicketStatus};
use erp_views::query::{
    paginate, CustomerFilter, Filter, InvoiceFilter, OrderFilter, ProductFilter, StockFilter,
    TicketFilter,
};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn seeded(seed: u64) -> seed::SeedData {
    let mut config = Config::default().seed;
    config.customers = 20;
    config.orders = 40;
    config.tickets = 15;
    config.ledger_entries = 10;
    config.audit_entries = 10;
    seed::generate(&config, &mut StdRng::seed_from_u64(seed), Utc::now())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Property: order status filters partition the table
    #[test]
    fn prop_order_status_partition(seed in any::<u64>()) {
        let data = seeded(seed);
        let total: usize = OrderStatus::ALL
            .iter()
            .map(|&status| OrderFilter { status: Some(status), ..Default::default() }
                .apply(&data.orders)
                .len())
            .sum();
        prop_assert_eq!(total, data.orders.len());
        prop_assert_eq!(OrderFilter::default().apply(&data.orders).len(), data.orders.len());
    }

    /// Property: invoice, customer and ticket status filters partition their tables
    #[test]
    fn prop_other_status_partitions(seed in any::<u64>()) {
        let data = seeded(seed);

        let invoices: usize = InvoiceStatus::ALL
            .iter()
            .map(|&status| InvoiceFilter { status: Some(status), ..Default::default() }
                .apply(&data.invoices)
                .len())
            .sum();
        prop_assert_eq!(invoices, data.invoices.len());

        let customers: usize = CustomerStatus::ALL
            .iter()
            .map(|&status| CustomerFilter { status: Some(status), ..Default::default() }
                .apply(&data.customers)
                .len())
            .sum();
        prop_assert_eq!(customers, data.customers.len());

        let tickets: usize = TicketStatus::ALL
            .iter()
            .map(|&status| TicketFilter { status: Some(status), ..Default::default() }
                .apply(&data.tickets)
                .len())
            .sum();
        prop_assert_eq!(tickets, data.tickets.len());
    }

    /// Property: "low" and "ok" stock filters split the inventory; "out" is within "low"
    #[test]
    fn prop_stock_filters_split(seed in any::<u64>()) {
        let data = seeded(seed);
        let count = |stock: StockFilter| {
            ProductFilter { stock, ..Default::default() }.apply(&data.products).len()
        };

        prop_assert_eq!(count(StockFilter::Low) + count(StockFilter::Ok), data.products.len());
        prop_assert!(count(StockFilter::Out) <= count(StockFilter::Low));
    }

    /// Property: pagination returns exactly the requested window
    #[test]
    fn prop_paginate_exact(len in 0usize..300, offset in 0usize..400, limit in 0usize..120) {
        let rows: Vec<usize> = (0..len).collect();
        let page = paginate(&rows, offset, limit);

        let start = offset.min(len);
        let end = (start + limit).min(len);
        prop_assert_eq!(page.total, len);
        prop_assert_eq!(page.items, rows[start..end].to_vec());
    }

    /// Property: search results are a subset of the table and all contain the query
    #[test]
    fn prop_search_subset(seed in any::<u64>(), query in "[a-zA-Z0-9]{0,4}") {
        let data = seeded(seed);
        let filter = OrderFilter { search: query.clone(), ..Default::default() };
        let needle = query.to_lowercase();

        for order in filter.apply(&data.orders) {
            prop_assert!(
                order.id.to_lowercase().contains(&needle)
                    || order.customer_name.to_lowercase().contains(&needle)
            );
        }
    }
}
