//! # Financial Period Engine
//!
//! Turns ad hoc income/expense entries and recurring fixed incomes/costs into
//! consistent, chronologically ordered period buckets for charting.
//!
//! ## Core Concepts
//!
//! - **Anchor**: the start date of one reporting period (day, week start,
//!   first of month, Jan 1)
//! - **Year-to-date** windows run from Jan 1 through `now`; trailing windows
//!   cover the last 7 days, 4 weeks, 6 months or 5 years
//! - **Fixed items** contribute their monthly-equivalent amount (amount / 1, 3
//!   or 12) to every anchor between their start date and `now`
//! - **Purity**: `now` is always an argument; nothing here reads a clock or
//!   keeps state between calls
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use financial_period_engine::*;
//!
//! let rent = FixedItem {
//!     id: RecordId::Int(1),
//!     concept: "Alquiler".to_string(),
//!     amount: 120.0,
//!     frequency: Frequency::Monthly,
//!     start_date: NaiveDate::from_ymd_opt(2023, 1, 15).unwrap(),
//!     direction: Direction::Cost,
//! };
//!
//! let now = NaiveDate::from_ymd_opt(2023, 3, 10).unwrap();
//! let buckets = aggregate(&[], &[rent], &[], Granularity::Monthly, true, now);
//!
//! assert_eq!(buckets.len(), 3);
//! assert_eq!(buckets[0].expense, 0.0);
//! assert_eq!(buckets[1].expense, 120.0);
//! ```

pub mod bucketizer;
pub mod cache;
pub mod calendar;
pub mod change_rate;
pub mod dedup;
pub mod engine;
pub mod error;
pub mod ingestion;
pub mod proration;
pub mod schema;
pub mod utils;

pub use bucketizer::{matches, Bucketizer, DateSource};
pub use cache::{content_hash, AggregationCache, CacheKey};
pub use calendar::{generate_periods, period_label, period_labels, PeriodCalendar};
pub use change_rate::{compute_change_rates, percent_change};
pub use dedup::{dedupe, dedupe_cloned};
pub use engine::{aggregate, Aggregator};
pub use error::{PeriodEngineError, Result};
pub use ingestion::*;
pub use proration::{monthly_equivalent, prorate};
pub use schema::*;

use chrono::NaiveDate;
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReport {
    pub granularity: Granularity,
    pub year_to_date: bool,
    pub buckets: Vec<PeriodBucket>,
    /// Column sums over `buckets`
    pub totals: PeriodSummary,
    /// Month-over-month change, always taken from the trailing monthly window
    pub change_rates: ChangeRates,
}

pub struct PeriodReportProcessor;

impl PeriodReportProcessor {
    pub fn process(snapshot: &LedgerSnapshot, request: &ReportRequest) -> Result<PeriodReport> {
        validate_snapshot_integrity(snapshot)?;

        info!(
            "Building {:?} report (year_to_date: {}) as of {}",
            request.granularity, request.year_to_date, request.now
        );

        let transactions = dedupe_cloned(&snapshot.transactions);
        let fixed_costs = dedupe_cloned(&snapshot.fixed_costs);
        let fixed_incomes = dedupe_cloned(&snapshot.fixed_incomes);

        let duplicates = snapshot.transactions.len() - transactions.len()
            + snapshot.fixed_costs.len()
            - fixed_costs.len()
            + snapshot.fixed_incomes.len()
            - fixed_incomes.len();
        if duplicates > 0 {
            debug!("Collapsed {} duplicate records before aggregation", duplicates);
        }

        let aggregator = Aggregator::new(request.options);
        let buckets = aggregator.aggregate(
            &transactions,
            &fixed_costs,
            &fixed_incomes,
            request.granularity,
            request.year_to_date,
            request.now,
        );

        let monthly = aggregator.aggregate(
            &transactions,
            &fixed_costs,
            &fixed_incomes,
            Granularity::Monthly,
            false,
            request.now,
        );
        let monthly_summaries: Vec<PeriodSummary> =
            monthly.iter().map(PeriodSummary::from).collect();

        Ok(PeriodReport {
            granularity: request.granularity,
            year_to_date: request.year_to_date,
            totals: summarize(&buckets),
            change_rates: compute_change_rates(&monthly_summaries),
            buckets,
        })
    }

    /// Same as [`process`](Self::process) with a request built from loose arguments.
    pub fn process_at(
        snapshot: &LedgerSnapshot,
        granularity: Granularity,
        year_to_date: bool,
        now: NaiveDate,
    ) -> Result<PeriodReport> {
        let request = ReportRequest {
            granularity,
            year_to_date,
            now,
            options: EngineOptions::default(),
        };
        Self::process(snapshot, &request)
    }
}

pub fn build_period_report(snapshot: &LedgerSnapshot, request: &ReportRequest) -> Result<PeriodReport> {
    PeriodReportProcessor::process(snapshot, request)
}

pub fn summarize(buckets: &[PeriodBucket]) -> PeriodSummary {
    let (income, expense) = buckets
        .iter()
        .fold((0.0, 0.0), |(inc, exp), b| (inc + b.income, exp + b.expense));
    PeriodSummary::new(income, expense)
}

fn validate_snapshot_integrity(snapshot: &LedgerSnapshot) -> Result<()> {
    for transaction in &snapshot.transactions {
        for (column, value) in [("income", transaction.income), ("expense", transaction.expense)] {
            if !value.is_finite() || value < 0.0 {
                return Err(PeriodEngineError::ValidationError {
                    record: transaction.id.to_string(),
                    details: format!("{} must be a non-negative number, got {}", column, value),
                });
            }
        }
    }

    for item in snapshot.fixed_costs.iter().chain(&snapshot.fixed_incomes) {
        if !item.amount.is_finite() || item.amount <= 0.0 {
            return Err(PeriodEngineError::ValidationError {
                record: item.id.to_string(),
                details: format!(
                    "fixed {:?} '{}' must have a positive amount, got {}",
                    item.direction, item.concept, item.amount
                ),
            });
        }
    }

    Ok(())
}
