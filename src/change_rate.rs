use crate::schema::{ChangeRates, PeriodSummary};

/// Percentage change between the last two summaries, in chronological order.
/// Fields whose previous value is zero, and every field when fewer than two
/// summaries are given, report `"0"`.
pub fn compute_change_rates(summaries: &[PeriodSummary]) -> ChangeRates {
    let [.., previous, current] = summaries else {
        return ChangeRates::default();
    };

    ChangeRates {
        income_pct: percent_change(current.income, previous.income),
        expense_pct: percent_change(current.expense, previous.expense),
        profit_pct: percent_change(current.profit, previous.profit),
    }
}

/// `round((current - previous) / previous * 100)` as a string, with halves
/// rounded toward positive infinity. Never yields NaN or infinity.
pub fn percent_change(current: f64, previous: f64) -> String {
    if previous == 0.0 {
        return "0".to_string();
    }

    let pct = ((current - previous) / previous * 100.0 + 0.5).floor();
    if !pct.is_finite() {
        return "0".to_string();
    }

    (pct as i64).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn income_only(income: f64) -> PeriodSummary {
        PeriodSummary::new(income, 0.0)
    }

    #[test]
    fn test_drop_to_zero_is_minus_hundred() {
        let rates = compute_change_rates(&[income_only(1000.0), income_only(0.0)]);
        assert_eq!(rates.income_pct, "-100");
    }

    #[test]
    fn test_zero_previous_is_guarded() {
        let rates = compute_change_rates(&[income_only(0.0), income_only(500.0)]);
        assert_eq!(rates.income_pct, "0");
        assert_eq!(rates.expense_pct, "0");
    }

    #[test]
    fn test_fewer_than_two_summaries() {
        assert_eq!(compute_change_rates(&[]), ChangeRates::default());
        assert_eq!(
            compute_change_rates(&[PeriodSummary::new(10.0, 5.0)]),
            ChangeRates::default()
        );
    }

    #[test]
    fn test_uses_only_last_two() {
        let rates = compute_change_rates(&[
            PeriodSummary::new(1.0, 1.0),
            PeriodSummary::new(200.0, 100.0),
            PeriodSummary::new(250.0, 50.0),
        ]);
        assert_eq!(rates.income_pct, "25");
        assert_eq!(rates.expense_pct, "-50");
        assert_eq!(rates.profit_pct, "100");
    }

    #[test]
    fn test_one_zero_field_does_not_block_others() {
        let rates = compute_change_rates(&[
            PeriodSummary::new(100.0, 0.0),
            PeriodSummary::new(150.0, 30.0),
        ]);
        assert_eq!(rates.income_pct, "50");
        assert_eq!(rates.expense_pct, "0");
        assert_eq!(rates.profit_pct, "20");
    }

    #[test]
    fn test_negative_previous_profit() {
        // (-50 - -100) / -100 * 100 = -50
        assert_eq!(percent_change(-50.0, -100.0), "-50");
    }

    #[test]
    fn test_half_rounds_up() {
        assert_eq!(percent_change(9.0, 8.0), "13");
        assert_eq!(percent_change(1.0, 8.0), "-87");
    }

    #[test]
    fn test_non_finite_inputs_never_leak() {
        assert_eq!(percent_change(f64::INFINITY, 10.0), "0");
        assert_eq!(percent_change(f64::NAN, 10.0), "0");
    }
}
