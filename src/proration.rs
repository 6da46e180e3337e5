//! Monthly-equivalent contribution of recurring items.
//!
//! A fixed item contributes `amount / months_per_period` to every eligible
//! anchor, whatever the granularity. Daily and weekly anchors therefore each
//! receive a full monthly share; totals at those granularities are not
//! comparable with the monthly view.

use crate::schema::FixedItem;
use chrono::NaiveDate;

/// Contribution of `item` to the period starting at `anchor`. Zero before the
/// item's start date and for anchors after `now`.
pub fn prorate(item: &FixedItem, anchor: NaiveDate, now: NaiveDate) -> f64 {
    if !is_eligible(item, anchor, now) {
        return 0.0;
    }
    monthly_equivalent(item)
}

pub fn is_eligible(item: &FixedItem, anchor: NaiveDate, now: NaiveDate) -> bool {
    anchor >= item.start_date && anchor <= now
}

pub fn monthly_equivalent(item: &FixedItem) -> f64 {
    item.amount / item.frequency.months_per_period() as f64
}
