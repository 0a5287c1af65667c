//! Dashboard analytics
//!
//! KPI cards and chart series. Several series add synthetic padding to the
//! true counts so the charts look populated; the padding is drawn from the
//! caller's RNG and every time window is anchored at the caller's `now`, so a
//! seeded RNG reproduces the same figures.

use chrono::{DateTime, Datelike, Duration, Months, Utc};
use erp_core::{
    Customer, CustomerStatus, Invoice, InvoiceStatus, LedgerEntry, Order, OrderStatus, Product,
};
use rand::Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Direction shown on a KPI card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    /// Up or flat
    Increase,
    /// Down
    Decrease,
}

/// KPI card
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpi {
    /// Card label
    pub label: &'static str,
    /// Headline value
    pub value: Decimal,
    /// Percent change vs. the previous period
    pub change: f64,
    /// Direction of change
    pub change_type: ChangeType,
    /// Value prefix ("$")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<&'static str>,
}

/// Named count with optional display colour
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    /// Label
    pub name: String,
    /// Count
    pub value: u64,
    /// Fill colour
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<&'static str>,
}

impl ChartPoint {
    fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
            fill: None,
        }
    }

    fn filled(name: impl Into<String>, value: u64, fill: &'static str) -> Self {
        Self {
            name: name.into(),
            value,
            fill: Some(fill),
        }
    }
}

/// Monthly revenue bar
#[derive(Debug, Clone, Serialize)]
pub struct RevenuePoint {
    /// Month abbreviation
    pub name: String,
    /// Revenue, rounded to whole units
    pub revenue: Decimal,
    /// Revenue / 2000, floored
    pub orders: u64,
}

/// Inventory level bar
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryLevel {
    /// Product name, truncated for the axis
    pub name: String,
    /// Units on hand
    pub stock_level: u32,
    /// Reorder threshold
    pub reorder_point: u32,
    /// Stock at or below the reorder point
    pub is_low_stock: bool,
}

/// Customer growth point
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrowthPoint {
    /// Month abbreviation
    pub name: String,
    /// Customers added this month
    pub new_customers: u64,
    /// Running total
    pub total: u64,
}

/// Ledger activity for one day
#[derive(Debug, Clone, Serialize)]
pub struct TimelinePoint {
    /// Day label ("Mar 07")
    pub name: String,
    /// Transactions
    pub value: u64,
    /// Verified transactions
    pub verified: u64,
    /// Tampered transactions
    pub tampered: u64,
}

/// Ledger summary
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerAnalytics {
    /// Entries
    pub total_transactions: usize,
    /// Entries flagged verified
    pub verified_count: usize,
    /// Entries not verified
    pub tampered_count: usize,
    /// Verified share in percent, one decimal; 0 for an empty ledger
    pub verification_rate: f64,
    /// Entries per record type, first-seen order
    pub by_type: Vec<ChartPoint>,
}

const ORDER_STATUS_COLORS: &[(OrderStatus, &str)] = &[
    (OrderStatus::Pending, "#f59e0b"),
    (OrderStatus::Processing, "#3b82f6"),
    (OrderStatus::Shipped, "#8b5cf6"),
    (OrderStatus::Delivered, "#22c55e"),
    (OrderStatus::Cancelled, "#ef4444"),
];

const DEFAULT_FILL: &str = "#6b7280";

/// Percent change rounded to one decimal; 100 when `previous` is zero
pub fn calculate_change(current: f64, previous: f64) -> f64 {
    if previous == 0.0 {
        return 100.0;
    }
    round1((current - previous) / previous * 100.0)
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn change_type(current: f64, previous: f64) -> ChangeType {
    if current >= previous {
        ChangeType::Increase
    } else {
        ChangeType::Decrease
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `now` shifted back `months` calendar months
fn months_back(now: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    now.checked_sub_months(Months::new(months)).unwrap_or(now)
}

fn same_month(a: DateTime<Utc>, b: DateTime<Utc>) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn paid_revenue(invoices: &[Invoice]) -> Decimal {
    invoices
        .iter()
        .filter(|i| i.status == InvoiceStatus::Paid)
        .map(|i| i.amount)
        .sum()
}

fn count_status(customers: &[Customer], status: CustomerStatus) -> usize {
    customers.iter().filter(|c| c.status == status).count()
}

/// Counts per key in first-seen order
fn tally<T, K: PartialEq + Copy>(items: &[T], key: impl Fn(&T) -> K) -> Vec<(K, u64)> {
    let mut counts: Vec<(K, u64)> = Vec::new();
    for item in items {
        let k = key(item);
        match counts.iter_mut().find(|(seen, _)| *seen == k) {
            Some((_, count)) => *count += 1,
            None => counts.push((k, 1)),
        }
    }
    counts
}

/// The five KPI cards
///
/// Revenue and order changes compare against a simulated previous period of
/// 0.8 to 1.1 times the current value; the other three changes are fixed.
pub fn calculate_kpis<R: Rng + ?Sized>(
    orders: &[Order],
    invoices: &[Invoice],
    customers: &[Customer],
    rng: &mut R,
) -> Vec<Kpi> {
    let total_revenue = paid_revenue(invoices);
    let total_orders = orders.len();
    let pending_orders = orders
        .iter()
        .filter(|o| matches!(o.status, OrderStatus::Pending | OrderStatus::Processing))
        .count();
    let active_customers = count_status(customers, CustomerStatus::Customer);
    let leads = count_status(customers, CustomerStatus::Lead)
        + count_status(customers, CustomerStatus::Prospect);

    let revenue = total_revenue.to_f64().unwrap_or_default();
    let previous_revenue = revenue * rng.gen_range(0.8..1.1);
    let previous_orders = (total_orders as f64 * rng.gen_range(0.8..1.1)).floor();

    vec![
        Kpi {
            label: "Total Revenue",
            value: total_revenue,
            change: calculate_change(revenue, previous_revenue),
            change_type: change_type(revenue, previous_revenue),
            prefix: Some("$"),
        },
        Kpi {
            label: "Total Orders",
            value: Decimal::from(total_orders),
            change: calculate_change(total_orders as f64, previous_orders),
            change_type: change_type(total_orders as f64, previous_orders),
            prefix: None,
        },
        Kpi {
            label: "Active Customers",
            value: Decimal::from(active_customers),
            change: 12.5,
            change_type: ChangeType::Increase,
            prefix: None,
        },
        Kpi {
            label: "Pending Orders",
            value: Decimal::from(pending_orders),
            change: -8.3,
            change_type: ChangeType::Decrease,
            prefix: None,
        },
        Kpi {
            label: "Leads Pipeline",
            value: Decimal::from(leads),
            change: 23.1,
            change_type: ChangeType::Increase,
            prefix: None,
        },
    ]
}

/// Twelve months of revenue ending at `now`, oldest first
pub fn revenue_over_time<R: Rng + ?Sized>(
    invoices: &[Invoice],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<RevenuePoint> {
    (0..12u32)
        .rev()
        .map(|back| {
            let month = months_back(now, back);
            let actual: Decimal = invoices
                .iter()
                .filter(|i| i.status == InvoiceStatus::Paid)
                .filter(|i| i.paid_at.is_some_and(|paid| same_month(paid, month)))
                .map(|i| i.amount)
                .sum();
            let baseline = Decimal::new(rng.gen_range(10_000_000..15_000_000), 2);
            let revenue = (actual + baseline).round();

            RevenuePoint {
                name: month.format("%b").to_string(),
                revenue,
                orders: (revenue / Decimal::from(2000)).floor().to_u64().unwrap_or_default(),
            }
        })
        .collect()
}

/// Orders per status, statuses in first-seen order
pub fn order_status_distribution(orders: &[Order]) -> Vec<ChartPoint> {
    tally(orders, |o| o.status)
        .into_iter()
        .map(|(status, count)| {
            let fill = ORDER_STATUS_COLORS
                .iter()
                .find(|(s, _)| *s == status)
                .map_or(DEFAULT_FILL, |(_, fill)| *fill);
            ChartPoint::filled(capitalize(status.as_str()), count, fill)
        })
        .collect()
}

/// Invoices per status, statuses in first-seen order
pub fn invoice_status_breakdown(invoices: &[Invoice]) -> Vec<ChartPoint> {
    tally(invoices, |i| i.status)
        .into_iter()
        .map(|(status, count)| ChartPoint::new(capitalize(status.as_str()), count))
        .collect()
}

/// Stock bars; names longer than 15 characters are cut with "..."
pub fn inventory_levels(products: &[Product]) -> Vec<InventoryLevel> {
    products
        .iter()
        .map(|p| InventoryLevel {
            name: truncate_label(&p.name, 15),
            stock_level: p.stock_level,
            reorder_point: p.reorder_point,
            is_low_stock: p.is_low_stock(),
        })
        .collect()
}

fn truncate_label(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let head: String = name.chars().take(max).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}

/// Products at or below their reorder point, lowest stock first
pub fn low_stock_alerts(products: &[Product]) -> Vec<&Product> {
    let mut low: Vec<&Product> = products.iter().filter(|p| p.is_low_stock()).collect();
    low.sort_by_key(|p| p.stock_level);
    low
}

/// Six months of order counts ending at `now`, padded by 15 to 34 each
pub fn orders_per_month<R: Rng + ?Sized>(
    orders: &[Order],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<ChartPoint> {
    (0..6u32)
        .rev()
        .map(|back| {
            let month = months_back(now, back);
            let actual = orders
                .iter()
                .filter(|o| same_month(o.created_at, month))
                .count() as u64;
            ChartPoint::new(month.format("%b").to_string(), actual + rng.gen_range(15..35))
        })
        .collect()
}

/// Sales funnel from leads to closed deals
pub fn customer_funnel<R: Rng + ?Sized>(customers: &[Customer], rng: &mut R) -> Vec<ChartPoint> {
    let leads = count_status(customers, CustomerStatus::Lead) as u64;
    let prospects = count_status(customers, CustomerStatus::Prospect) as u64;
    let active = count_status(customers, CustomerStatus::Customer) as u64;

    vec![
        ChartPoint::new("Leads", leads + rng.gen_range(50..80)),
        ChartPoint::new("Qualified", prospects + rng.gen_range(30..50)),
        ChartPoint::new("Proposals", (prospects + 20) * 6 / 10),
        ChartPoint::new("Negotiation", (prospects + 15) * 4 / 10),
        ChartPoint::new("Closed Won", active),
    ]
}

/// Twelve months of cumulative customer counts ending at `now`
///
/// Starts from 40% of the current customer count and adds 3 to 10 per month.
pub fn customer_growth<R: Rng + ?Sized>(
    customers: &[Customer],
    now: DateTime<Utc>,
    rng: &mut R,
) -> Vec<GrowthPoint> {
    let mut total = customers.len() as u64 * 2 / 5;
    (0..12u32)
        .rev()
        .map(|back| {
            let new_customers = rng.gen_range(3..11);
            total += new_customers;
            GrowthPoint {
                name: months_back(now, back).format("%b").to_string(),
                new_customers,
                total,
            }
        })
        .collect()
}

/// Customers with more than one order vs. the rest
pub fn repeat_vs_new_customers(customers: &[Customer]) -> Vec<ChartPoint> {
    let repeat = customers.iter().filter(|c| c.total_orders > 1).count() as u64;
    let new = customers.len() as u64 - repeat;
    vec![
        ChartPoint::filled("Repeat Customers", repeat, "#22c55e"),
        ChartPoint::filled("New Customers", new, "#3b82f6"),
    ]
}

/// Ledger totals and per-type counts
pub fn ledger_analytics(entries: &[LedgerEntry]) -> LedgerAnalytics {
    let total_transactions = entries.len();
    let verified_count = entries.iter().filter(|e| e.verified).count();
    let verification_rate = if total_transactions == 0 {
        0.0
    } else {
        round1(verified_count as f64 / total_transactions as f64 * 100.0)
    };

    LedgerAnalytics {
        total_transactions,
        verified_count,
        tampered_count: total_transactions - verified_count,
        verification_rate,
        by_type: tally(entries, |e| e.record_type)
            .into_iter()
            .map(|(record_type, count)| ChartPoint::new(capitalize(record_type.as_str()), count))
            .collect(),
    }
}

/// Thirty days of synthetic ledger activity ending at `now`
///
/// Each day draws 5 to 19 transactions; 95% (floored) are verified and the
/// remaining 5% (ceiled) tampered.
pub fn transaction_timeline<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Vec<TimelinePoint> {
    (0..30i64)
        .rev()
        .map(|back| {
            let value: u64 = rng.gen_range(5..20);
            TimelinePoint {
                name: (now - Duration::days(back)).format("%b %d").to_string(),
                value,
                verified: value * 95 / 100,
                tampered: (value * 5 + 99) / 100,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use erp_core::RecordType;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rust_decimal_macros::dec;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn customer(status: CustomerStatus, total_orders: u32) -> Customer {
        Customer {
            id: "CUS0001".to_string(),
            name: "Jane Doe".to_string(),
            email: "jane@acme.com".to_string(),
            phone: String::new(),
            company: "Acme".to_string(),
            status,
            total_orders,
            total_spent: Decimal::ZERO,
            created_at: now(),
            last_order_at: None,
        }
    }

    fn invoice(status: InvoiceStatus, amount: Decimal, paid_at: Option<DateTime<Utc>>) -> Invoice {
        Invoice {
            id: "INV00001".to_string(),
            order_id: "ORD00001".to_string(),
            customer_id: "CUS0001".to_string(),
            customer_name: "Jane Doe".to_string(),
            amount,
            status,
            due_date: now(),
            created_at: now(),
            paid_at,
            blockchain_hash: None,
            blockchain_verified: true,
        }
    }

    fn ledger_entry(record_type: RecordType, verified: bool) -> LedgerEntry {
        LedgerEntry {
            id: "BLK000001".to_string(),
            hash: "0x01".to_string(),
            record_type,
            record_id: "ORD00001".to_string(),
            timestamp: now(),
            previous_hash: "0x00".to_string(),
            verified,
            data: serde_json::Map::new(),
        }
    }

    #[test]
    fn test_calculate_change() {
        assert_eq!(calculate_change(120.0, 100.0), 20.0);
        assert_eq!(calculate_change(5.0, 0.0), 100.0);
        assert_eq!(calculate_change(2.0, 3.0), -33.3);
    }

    #[test]
    fn test_kpis_fixed_cards() {
        let customers = vec![
            customer(CustomerStatus::Customer, 3),
            customer(CustomerStatus::Lead, 0),
            customer(CustomerStatus::Prospect, 0),
        ];
        let invoices = vec![
            invoice(InvoiceStatus::Paid, dec!(1000), Some(now())),
            invoice(InvoiceStatus::Sent, dec!(500), None),
        ];
        let mut rng = StdRng::seed_from_u64(1);

        let kpis = calculate_kpis(&[], &invoices, &customers, &mut rng);
        assert_eq!(kpis.len(), 5);
        assert_eq!(kpis[0].value, dec!(1000));
        assert_eq!(kpis[0].prefix, Some("$"));
        assert!(kpis[0].change > -10.0 && kpis[0].change <= 25.0);
        assert_eq!(kpis[1].change, 100.0);
        assert_eq!(kpis[2].value, dec!(1));
        assert_eq!(kpis[3].change, -8.3);
        assert_eq!(kpis[4].value, dec!(2));
    }

    #[test]
    fn test_revenue_over_time_padding() {
        let invoices = vec![invoice(InvoiceStatus::Paid, dec!(20000), Some(now()))];
        let mut rng = StdRng::seed_from_u64(2);

        let series = revenue_over_time(&invoices, now(), &mut rng);
        assert_eq!(series.len(), 12);
        assert_eq!(series[11].name, "Jun");
        assert_eq!(series[0].name, "Jul");
        assert!(series[11].revenue >= dec!(120000) && series[11].revenue <= dec!(170000));
        for point in &series[..11] {
            assert!(point.revenue >= dec!(100000) && point.revenue <= dec!(150000));
            assert_eq!(
                Decimal::from(point.orders),
                (point.revenue / dec!(2000)).floor()
            );
        }
    }

    #[test]
    fn test_seeded_rng_is_reproducible() {
        let customers = vec![customer(CustomerStatus::Lead, 0); 10];
        let a = customer_growth(&customers, now(), &mut StdRng::seed_from_u64(9));
        let b = customer_growth(&customers, now(), &mut StdRng::seed_from_u64(9));
        let totals_a: Vec<u64> = a.iter().map(|p| p.total).collect();
        let totals_b: Vec<u64> = b.iter().map(|p| p.total).collect();
        assert_eq!(totals_a, totals_b);
        assert!(a[0].total >= 4 + 3 && a[0].total <= 4 + 10);
    }

    #[test]
    fn test_funnel_formulas() {
        let customers = vec![
            customer(CustomerStatus::Prospect, 0),
            customer(CustomerStatus::Prospect, 0),
            customer(CustomerStatus::Customer, 2),
        ];
        let funnel = customer_funnel(&customers, &mut StdRng::seed_from_u64(4));
        assert!((32..52).contains(&funnel[1].value));
        assert_eq!(funnel[2].value, 13);
        assert_eq!(funnel[3].value, 6);
        assert_eq!(funnel[4].value, 1);
    }

    #[test]
    fn test_status_distribution_first_seen_order() {
        let mut invoices = vec![
            invoice(InvoiceStatus::Overdue, dec!(1), None),
            invoice(InvoiceStatus::Paid, dec!(1), None),
            invoice(InvoiceStatus::Overdue, dec!(1), None),
        ];
        invoices[1].paid_at = Some(now());

        let breakdown = invoice_status_breakdown(&invoices);
        assert_eq!(breakdown[0], ChartPoint::new("Overdue", 2));
        assert_eq!(breakdown[1], ChartPoint::new("Paid", 1));
        assert_eq!(breakdown.len(), 2);
    }

    #[test]
    fn test_inventory_labels_and_alerts() {
        let mut a = erp_core::seed::generate(
            &erp_core::config::SeedConfig::default(),
            &mut StdRng::seed_from_u64(5),
            now(),
        )
        .products;
        a[0].name = "Enterprise Server Rack".to_string();
        a[0].stock_level = 0;

        let levels = inventory_levels(&a);
        assert_eq!(levels[0].name, "Enterprise Serv...");
        assert!(levels[0].is_low_stock);

        let alerts = low_stock_alerts(&a);
        assert_eq!(alerts[0].stock_level, 0);
        assert!(alerts.windows(2).all(|w| w[0].stock_level <= w[1].stock_level));
    }

    #[test]
    fn test_ledger_analytics() {
        assert_eq!(ledger_analytics(&[]).verification_rate, 0.0);

        let entries = vec![
            ledger_entry(RecordType::Order, true),
            ledger_entry(RecordType::Invoice, true),
            ledger_entry(RecordType::Order, false),
        ];
        let stats = ledger_analytics(&entries);
        assert_eq!(stats.tampered_count, 1);
        assert_eq!(stats.verification_rate, 66.7);
        assert_eq!(stats.by_type[0], ChartPoint::new("Order", 2));
    }

    #[test]
    fn test_transaction_timeline() {
        let timeline = transaction_timeline(now(), &mut StdRng::seed_from_u64(6));
        assert_eq!(timeline.len(), 30);
        assert_eq!(timeline[29].name, "Jun 15");
        for day in &timeline {
            assert!((5..20).contains(&day.value));
            assert_eq!(day.tampered, 1);
            assert_eq!(day.verified, (day.value as f64 * 0.95).floor() as u64);
        }
    }
}
