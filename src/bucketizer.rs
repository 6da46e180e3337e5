use crate::schema::{EngineOptions, Granularity, Transaction};
use crate::utils::{first_of_month_in_year, month_from_label, parse_date, week_start};
use chrono::{Datelike, NaiveDate};
use log::debug;

/// How a transaction's effective date was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateSource {
    Explicit,
    /// First day of the labelled month in `now`'s year. The label carries no
    /// year, so entries from earlier years land in the current one.
    MonthLabel,
    /// Neither a usable date nor a known month label.
    Now,
}

pub struct Bucketizer {
    options: EngineOptions,
}

impl Bucketizer {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Effective date of `transaction` and where it came from.
    pub fn resolve_date(&self, transaction: &Transaction, now: NaiveDate) -> (NaiveDate, DateSource) {
        if let Some(date) = transaction.date.as_deref().and_then(parse_date) {
            return (date, DateSource::Explicit);
        }

        let from_label = transaction
            .month
            .as_deref()
            .and_then(|label| month_from_label(label).ok())
            .and_then(|month| first_of_month_in_year(now.year(), month));

        if let Some(date) = from_label {
            return (date, DateSource::MonthLabel);
        }

        debug!(
            "Transaction {} has no usable date (date: {:?}, month: {:?}); bucketing at {}",
            transaction.id, transaction.date, transaction.month, now
        );
        (now, DateSource::Now)
    }

    pub fn matches(
        &self,
        transaction: &Transaction,
        anchor: NaiveDate,
        granularity: Granularity,
        now: NaiveDate,
    ) -> bool {
        let (date, _) = self.resolve_date(transaction, now);
        self.date_matches(date, anchor, granularity)
    }

    pub fn date_matches(&self, date: NaiveDate, anchor: NaiveDate, granularity: Granularity) -> bool {
        match granularity {
            Granularity::Daily => date == anchor,
            Granularity::Weekly => {
                week_start(date, self.options.week_start)
                    == week_start(anchor, self.options.week_start)
            }
            Granularity::Monthly => date.year() == anchor.year() && date.month() == anchor.month(),
            Granularity::Annual => date.year() == anchor.year(),
        }
    }
}

/// Whether `transaction` falls in the period anchored at `anchor`, using
/// default options. `now` supplies the year for month-label records and the
/// fallback date for undated ones.
pub fn matches(
    transaction: &Transaction,
    anchor: NaiveDate,
    granularity: Granularity,
    now: NaiveDate,
) -> bool {
    Bucketizer::new(EngineOptions::default()).matches(transaction, anchor, granularity, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{RecordId, WeekStart};

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn tx(month: Option<&str>, date: Option<&str>) -> Transaction {
        Transaction {
            id: RecordId::Int(1),
            month: month.map(str::to_string),
            date: date.map(str::to_string),
            income: 100.0,
            expense: 0.0,
            concept: "Venta libros".to_string(),
        }
    }

    #[test]
    fn test_explicit_date_wins_over_label() {
        let bucketizer = Bucketizer::new(EngineOptions::default());
        let t = tx(Some("Enero"), Some("2023-05-20"));
        assert_eq!(
            bucketizer.resolve_date(&t, d(2023, 6, 1)),
            (d(2023, 5, 20), DateSource::Explicit)
        );
    }

    #[test]
    fn test_month_label_uses_current_year() {
        let bucketizer = Bucketizer::new(EngineOptions::default());
        let t = tx(Some("Marzo"), None);
        assert_eq!(
            bucketizer.resolve_date(&t, d(2024, 6, 1)),
            (d(2024, 3, 1), DateSource::MonthLabel)
        );
    }

    #[test]
    fn test_unparseable_date_falls_back_to_label_then_now() {
        let bucketizer = Bucketizer::new(EngineOptions::default());
        let now = d(2024, 6, 12);

        let t = tx(Some("Febrero"), Some("garbage"));
        assert_eq!(bucketizer.resolve_date(&t, now).0, d(2024, 2, 1));

        let t = tx(Some("Nonexistent"), Some("garbage"));
        assert_eq!(bucketizer.resolve_date(&t, now), (now, DateSource::Now));

        let t = tx(None, None);
        assert_eq!(bucketizer.resolve_date(&t, now), (now, DateSource::Now));
    }

    #[test]
    fn test_daily_matching() {
        let now = d(2024, 3, 20);
        let t = tx(None, Some("2024-03-15"));
        assert!(matches(&t, d(2024, 3, 15), Granularity::Daily, now));
        assert!(!matches(&t, d(2024, 3, 16), Granularity::Daily, now));
    }

    #[test]
    fn test_weekly_matching_respects_week_start() {
        let now = d(2024, 3, 20);
        // Sunday 2024-03-17
        let t = tx(None, Some("2024-03-17"));
        assert!(matches(&t, d(2024, 3, 17), Granularity::Weekly, now));
        assert!(!matches(&t, d(2024, 3, 10), Granularity::Weekly, now));

        let monday = Bucketizer::new(EngineOptions {
            week_start: WeekStart::Monday,
        });
        assert!(monday.matches(&t, d(2024, 3, 11), Granularity::Weekly, now));
        assert!(!monday.matches(&t, d(2024, 3, 18), Granularity::Weekly, now));
    }

    #[test]
    fn test_monthly_matching_checks_year() {
        let now = d(2024, 3, 20);
        let t = tx(None, Some("2023-03-05"));
        assert!(matches(&t, d(2023, 3, 1), Granularity::Monthly, now));
        assert!(!matches(&t, d(2024, 3, 1), Granularity::Monthly, now));
    }

    #[test]
    fn test_annual_matching() {
        let now = d(2024, 3, 20);
        let t = tx(Some("Diciembre"), None);
        assert!(matches(&t, d(2024, 1, 1), Granularity::Annual, now));
        assert!(!matches(&t, d(2023, 1, 1), Granularity::Annual, now));
    }
}
