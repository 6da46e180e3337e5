use crate::bucketizer::{Bucketizer, DateSource};
use crate::calendar::{period_labels, PeriodCalendar};
use crate::proration::prorate;
use crate::schema::{EngineOptions, FixedItem, Granularity, PeriodBucket, Transaction};
use chrono::NaiveDate;
use log::debug;

/// Combines ad hoc transactions with prorated fixed items into one bucket per
/// calendar anchor. Holds configuration only; every call recomputes from its
/// arguments.
pub struct Aggregator {
    calendar: PeriodCalendar,
    bucketizer: Bucketizer,
}

impl Aggregator {
    pub fn new(options: EngineOptions) -> Self {
        Self {
            calendar: PeriodCalendar::new(options),
            bucketizer: Bucketizer::new(options),
        }
    }

    pub fn aggregate(
        &self,
        transactions: &[Transaction],
        fixed_costs: &[FixedItem],
        fixed_incomes: &[FixedItem],
        granularity: Granularity,
        year_to_date: bool,
        now: NaiveDate,
    ) -> Vec<PeriodBucket> {
        let anchors = self.calendar.generate(granularity, year_to_date, now);
        let labels = period_labels(&anchors, granularity);

        // Date resolution does not depend on the anchor, so do it once per record.
        let resolved: Vec<(NaiveDate, DateSource, &Transaction)> = transactions
            .iter()
            .map(|t| {
                let (date, source) = self.bucketizer.resolve_date(t, now);
                (date, source, t)
            })
            .collect();

        let label_dated = resolved
            .iter()
            .filter(|(_, source, _)| *source == DateSource::MonthLabel)
            .count();
        debug!(
            "Aggregating {} transactions ({} dated by month label), {} fixed costs, {} fixed incomes over {} {:?} periods",
            transactions.len(),
            label_dated,
            fixed_costs.len(),
            fixed_incomes.len(),
            anchors.len(),
            granularity
        );

        anchors
            .into_iter()
            .zip(labels)
            .map(|(anchor, label)| {
                let (mut income, mut expense) = resolved
                    .iter()
                    .filter(|(date, _, _)| self.bucketizer.date_matches(*date, anchor, granularity))
                    .fold((0.0, 0.0), |(inc, exp), (_, _, t)| {
                        (inc + t.income, exp + t.expense)
                    });

                income += fixed_incomes
                    .iter()
                    .map(|item| prorate(item, anchor, now))
                    .sum::<f64>();
                expense += fixed_costs
                    .iter()
                    .map(|item| prorate(item, anchor, now))
                    .sum::<f64>();

                PeriodBucket::new(anchor, label, income, expense)
            })
            .collect()
    }
}

/// Buckets for the default options (weeks starting on Sunday).
pub fn aggregate(
    transactions: &[Transaction],
    fixed_costs: &[FixedItem],
    fixed_incomes: &[FixedItem],
    granularity: Granularity,
    year_to_date: bool,
    now: NaiveDate,
) -> Vec<PeriodBucket> {
    Aggregator::new(EngineOptions::default()).aggregate(
        transactions,
        fixed_costs,
        fixed_incomes,
        granularity,
        year_to_date,
        now,
    )
}
