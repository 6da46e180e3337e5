use crate::schema::{EngineOptions, Granularity};
use crate::utils::{
    first_of_month, first_of_year, month_label, shift_days, shift_months, short_month_label,
    week_start,
};
use chrono::{Datelike, NaiveDate};
use log::debug;

const TRAILING_DAYS: i64 = 7;
const TRAILING_WEEKS: i64 = 4;
const TRAILING_MONTHS: i32 = 6;
const ANNUAL_YEARS: i32 = 5;

/// Produces the ordered period anchors for a granularity and window.
pub struct PeriodCalendar {
    options: EngineOptions,
}

impl PeriodCalendar {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    /// Anchors in strictly ascending order, none later than `now`.
    pub fn generate(
        &self,
        granularity: Granularity,
        year_to_date: bool,
        now: NaiveDate,
    ) -> Vec<NaiveDate> {
        let mut anchors = match (granularity, year_to_date) {
            (Granularity::Daily, true) => {
                step_through(first_of_year(now), now, |d| shift_days(d, 1))
            }
            (Granularity::Daily, false) => (0..TRAILING_DAYS)
                .rev()
                .map(|back| shift_days(now, -back))
                .collect(),
            (Granularity::Weekly, true) => {
                let first = week_start(first_of_year(now), self.options.week_start);
                let last = week_start(now, self.options.week_start);
                step_through(first, last, |d| shift_days(d, 7))
            }
            (Granularity::Weekly, false) => {
                let last = week_start(now, self.options.week_start);
                (0..TRAILING_WEEKS)
                    .rev()
                    .map(|back| shift_days(last, -7 * back))
                    .collect()
            }
            (Granularity::Monthly, true) => {
                step_through(first_of_year(now), first_of_month(now), |d| {
                    shift_months(d, 1)
                })
            }
            (Granularity::Monthly, false) => {
                let last = first_of_month(now);
                (0..TRAILING_MONTHS)
                    .rev()
                    .map(|back| shift_months(last, -back))
                    .collect()
            }
            (Granularity::Annual, _) => {
                let last = first_of_year(now);
                (0..ANNUAL_YEARS)
                    .rev()
                    .map(|back| shift_months(last, -12 * back))
                    .collect()
            }
        };

        // Date arithmetic saturates at chrono's range limits, which can repeat an anchor.
        anchors.dedup();

        if anchors.is_empty() {
            anchors.push(self.current_anchor(granularity, now));
        }

        debug!(
            "Generated {} {:?} anchors (year_to_date: {}) up to {}",
            anchors.len(),
            granularity,
            year_to_date,
            now
        );

        anchors
    }

    /// Anchor of the period containing `now`.
    pub fn current_anchor(&self, granularity: Granularity, now: NaiveDate) -> NaiveDate {
        match granularity {
            Granularity::Daily => now,
            Granularity::Weekly => week_start(now, self.options.week_start),
            Granularity::Monthly => first_of_month(now),
            Granularity::Annual => first_of_year(now),
        }
    }
}

fn step_through(
    start: NaiveDate,
    end: NaiveDate,
    step: impl Fn(NaiveDate) -> NaiveDate,
) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        dates.push(current);
        let next = step(current);
        if next <= current {
            break;
        }
        current = next;
    }
    dates
}

/// Chart labels for a run of anchors. Monthly labels carry the year only when
/// the run spans more than one calendar year.
pub fn period_labels(anchors: &[NaiveDate], granularity: Granularity) -> Vec<String> {
    let spans_years = match (anchors.first(), anchors.last()) {
        (Some(first), Some(last)) => first.year() != last.year(),
        _ => false,
    };

    anchors
        .iter()
        .map(|anchor| period_label(*anchor, granularity, spans_years))
        .collect()
}

pub fn period_label(anchor: NaiveDate, granularity: Granularity, with_year: bool) -> String {
    match granularity {
        Granularity::Daily => format!("{} {}", anchor.day(), short_month_label(anchor.month())),
        Granularity::Weekly => format!("Sem {:02}/{:02}", anchor.day(), anchor.month()),
        Granularity::Monthly if with_year => {
            format!("{} {}", month_label(anchor.month()), anchor.year())
        }
        Granularity::Monthly => month_label(anchor.month()).to_string(),
        Granularity::Annual => anchor.year().to_string(),
    }
}

/// Anchors for the default options (weeks starting on Sunday).
pub fn generate_periods(
    granularity: Granularity,
    year_to_date: bool,
    now: NaiveDate,
) -> Vec<NaiveDate> {
    PeriodCalendar::new(EngineOptions::default()).generate(granularity, year_to_date, now)
}
