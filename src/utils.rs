use crate::error::{PeriodEngineError, Result};
use crate::schema::WeekStart;
use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime};

const MONTH_NAMES_ES: [&str; 12] = [
    "Enero",
    "Febrero",
    "Marzo",
    "Abril",
    "Mayo",
    "Junio",
    "Julio",
    "Agosto",
    "Septiembre",
    "Octubre",
    "Noviembre",
    "Diciembre",
];

const MONTH_NAMES_EN: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// Spanish month name for a 1-based month number.
pub fn month_label(month: u32) -> &'static str {
    month
        .checked_sub(1)
        .and_then(|idx| MONTH_NAMES_ES.get(idx as usize))
        .copied()
        .unwrap_or("")
}

/// Three letter form of [`month_label`], e.g. "Ene".
pub fn short_month_label(month: u32) -> &'static str {
    let label = month_label(month);
    label.get(..3).unwrap_or(label)
}

/// Resolves a month name to its 1-based number. Accepts Spanish and English
/// names in any case; "Setiembre" is accepted as a Spanish variant.
pub fn month_from_label(label: &str) -> Result<u32> {
    let needle = label.trim().to_lowercase();

    if needle == "setiembre" {
        return Ok(9);
    }

    MONTH_NAMES_ES
        .iter()
        .position(|name| name.to_lowercase() == needle)
        .or_else(|| MONTH_NAMES_EN.iter().position(|name| *name == needle))
        .map(|idx| idx as u32 + 1)
        .ok_or_else(|| PeriodEngineError::InvalidMonthLabel(label.to_string()))
}

/// Parses the date formats the storage layer is known to emit.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

/// Strict variant of [`parse_date`] for records where a date is mandatory.
pub fn parse_required_date(raw: &str) -> Result<NaiveDate> {
    parse_date(raw).ok_or_else(|| {
        PeriodEngineError::DateError(format!(
            "Invalid date '{}'. Expected YYYY-MM-DD, RFC 3339 or DD/MM/YYYY",
            raw
        ))
    })
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn first_of_year(date: NaiveDate) -> NaiveDate {
    date.with_ordinal(1).unwrap_or(date)
}

pub fn first_of_month_in_year(year: i32, month: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, 1)
}

/// Moves `date` by whole months; day-of-month is clamped by chrono.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let shifted = if months >= 0 {
        date.checked_add_months(Months::new(months.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(months.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    let shifted = if days >= 0 {
        date.checked_add_days(Days::new(days.unsigned_abs()))
    } else {
        date.checked_sub_days(Days::new(days.unsigned_abs()))
    };
    shifted.unwrap_or(date)
}

/// First day of the week containing `date`.
pub fn week_start(date: NaiveDate, week_start: WeekStart) -> NaiveDate {
    let offset = match week_start {
        WeekStart::Sunday => date.weekday().num_days_from_sunday(),
        WeekStart::Monday => date.weekday().num_days_from_monday(),
    };
    shift_days(date, -(offset as i64))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_month_labels() {
        assert_eq!(month_label(1), "Enero");
        assert_eq!(month_label(12), "Diciembre");
        assert_eq!(month_label(13), "");
        assert_eq!(month_label(0), "");
        assert_eq!(short_month_label(3), "Mar");
    }

    #[test]
    fn test_month_from_label() {
        assert_eq!(month_from_label("Enero").unwrap(), 1);
        assert_eq!(month_from_label("  marzo ").unwrap(), 3);
        assert_eq!(month_from_label("SEPTIEMBRE").unwrap(), 9);
        assert_eq!(month_from_label("Setiembre").unwrap(), 9);
        assert_eq!(month_from_label("October").unwrap(), 10);
        assert!(matches!(
            month_from_label("Brumario"),
            Err(PeriodEngineError::InvalidMonthLabel(_))
        ));
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("2023-03-10"), Some(d(2023, 3, 10)));
        assert_eq!(parse_date("2023-03-10T23:30:00Z"), Some(d(2023, 3, 10)));
        assert_eq!(parse_date("2023-03-10T08:15:00.250"), Some(d(2023, 3, 10)));
        assert_eq!(parse_date("10/03/2023"), Some(d(2023, 3, 10)));
        assert_eq!(parse_date("not a date"), None);
        assert!(parse_required_date("2023-02-30").is_err());
    }

    #[test]
    fn test_shift_months_crosses_years() {
        assert_eq!(shift_months(d(2023, 1, 1), -1), d(2022, 12, 1));
        assert_eq!(shift_months(d(2023, 11, 1), 3), d(2024, 2, 1));
        assert_eq!(shift_months(d(2023, 1, 31), 1), d(2023, 2, 28));
    }

    #[test]
    fn test_week_start() {
        // 2023-01-01 was a Sunday
        assert_eq!(week_start(d(2023, 1, 1), WeekStart::Sunday), d(2023, 1, 1));
        assert_eq!(week_start(d(2023, 1, 1), WeekStart::Monday), d(2022, 12, 26));
        assert_eq!(week_start(d(2024, 3, 13), WeekStart::Sunday), d(2024, 3, 10));
        assert_eq!(week_start(d(2024, 3, 13), WeekStart::Monday), d(2024, 3, 11));
    }

    #[test]
    fn test_first_of_helpers() {
        assert_eq!(first_of_month(d(2024, 2, 29)), d(2024, 2, 1));
        assert_eq!(first_of_year(d(2024, 6, 1)), d(2024, 1, 1));
        assert_eq!(first_of_month_in_year(2024, 13), None);
    }
}
