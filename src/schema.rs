use crate::error::{PeriodEngineError, Result};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of a stored record. Storage hands out either numeric or string ids;
/// the two spaces never collide, so `7` and `"7"` are different records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RecordId {
    Int(i64),
    Text(String),
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(id) => write!(f, "{}", id),
            RecordId::Text(id) => write!(f, "{}", id),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Int(id)
    }
}

impl From<&str> for RecordId {
    fn from(id: &str) -> Self {
        RecordId::Text(id.to_string())
    }
}

/// Anything carrying a stable record identity.
pub trait Identified {
    fn record_id(&self) -> &RecordId;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Transaction {
    pub id: RecordId,

    #[serde(default)]
    #[schemars(
        description = "Period label as entered on the form, a month name such as 'Enero'. Used only when no explicit date is present."
    )]
    pub month: Option<String>,

    #[serde(default)]
    #[schemars(
        description = "Explicit date (YYYY-MM-DD, RFC 3339 or DD/MM/YYYY). Takes precedence over the month label."
    )]
    pub date: Option<String>,

    #[serde(default)]
    #[schemars(description = "Income amount, never negative")]
    pub income: f64,

    #[serde(default)]
    #[schemars(description = "Expense amount, never negative")]
    pub expense: f64,

    #[serde(default)]
    pub concept: String,
}

impl Transaction {
    pub fn profit(&self) -> f64 {
        self.income - self.expense
    }
}

impl Identified for Transaction {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Direction {
    #[schemars(description = "Recurring cost, contributes to the expense column")]
    Cost,

    #[schemars(description = "Recurring income, contributes to the income column")]
    Income,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// How many months one billing of this frequency covers.
    pub fn months_per_period(&self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Annual => 12,
        }
    }
}

impl FromStr for Frequency {
    type Err = PeriodEngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "monthly" | "mensual" => Ok(Frequency::Monthly),
            "quarterly" | "trimestral" => Ok(Frequency::Quarterly),
            "annual" | "yearly" | "anual" => Ok(Frequency::Annual),
            _ => Err(PeriodEngineError::InvalidFrequency(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FixedItem {
    pub id: RecordId,

    #[schemars(description = "Label shown in listings, e.g. 'Alquiler oficina'")]
    pub concept: String,

    #[schemars(description = "Amount billed once per frequency period. Always positive.")]
    pub amount: f64,

    pub frequency: Frequency,

    #[schemars(description = "First date on which the item contributes to a period")]
    pub start_date: NaiveDate,

    pub direction: Direction,
}

impl Identified for FixedItem {
    fn record_id(&self) -> &RecordId {
        &self.id
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
    Annual,
}

impl FromStr for Granularity {
    type Err = PeriodEngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "diario" => Ok(Granularity::Daily),
            "weekly" | "semanal" => Ok(Granularity::Weekly),
            "monthly" | "mensual" => Ok(Granularity::Monthly),
            "annual" | "yearly" | "anual" => Ok(Granularity::Annual),
            _ => Err(PeriodEngineError::InvalidGranularity(s.to_string())),
        }
    }
}

/// First day of the week used for weekly anchors and weekly matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum WeekStart {
    #[default]
    Sunday,
    Monday,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
pub struct EngineOptions {
    #[serde(default)]
    pub week_start: WeekStart,
}

/// One reporting period's totals. Only constructed through [`PeriodBucket::new`],
/// which derives `profit` from the other two columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodBucket {
    pub anchor: NaiveDate,
    pub label: String,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

impl PeriodBucket {
    pub fn new(anchor: NaiveDate, label: String, income: f64, expense: f64) -> Self {
        Self {
            anchor,
            label,
            income,
            expense,
            profit: income - expense,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PeriodSummary {
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

impl PeriodSummary {
    pub fn new(income: f64, expense: f64) -> Self {
        Self {
            income,
            expense,
            profit: income - expense,
        }
    }
}

impl From<&PeriodBucket> for PeriodSummary {
    fn from(bucket: &PeriodBucket) -> Self {
        Self {
            income: bucket.income,
            expense: bucket.expense,
            profit: bucket.profit,
        }
    }
}

/// Integer percentages formatted as strings, e.g. `"-100"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRates {
    pub income_pct: String,
    pub expense_pct: String,
    pub profit_pct: String,
}

impl Default for ChangeRates {
    fn default() -> Self {
        Self {
            income_pct: "0".to_string(),
            expense_pct: "0".to_string(),
            profit_pct: "0".to_string(),
        }
    }
}

/// In-memory collections handed over by the storage layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LedgerSnapshot {
    #[serde(default)]
    pub transactions: Vec<Transaction>,

    #[serde(default)]
    pub fixed_costs: Vec<FixedItem>,

    #[serde(default)]
    pub fixed_incomes: Vec<FixedItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportRequest {
    pub granularity: Granularity,

    #[serde(default)]
    #[schemars(
        description = "true: window from Jan 1 of the current year through now. false: fixed trailing window (7 days, 4 weeks, 6 months)."
    )]
    pub year_to_date: bool,

    #[schemars(description = "Reference date for the report. Never read from a clock inside the engine.")]
    pub now: NaiveDate,

    #[serde(default)]
    pub options: EngineOptions,
}

impl ReportRequest {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ReportRequest)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

impl LedgerSnapshot {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(LedgerSnapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_generation() {
        let schema_json = ReportRequest::schema_as_json().unwrap();
        assert!(schema_json.contains("granularity"));
        assert!(schema_json.contains("year_to_date"));
        assert!(schema_json.contains("week_start"));
    }

    #[test]
    fn test_record_id_untagged() {
        let ids: Vec<RecordId> = serde_json::from_str(r#"[7, "7", "abc"]"#).unwrap();
        assert_eq!(ids[0], RecordId::Int(7));
        assert_eq!(ids[1], RecordId::Text("7".to_string()));
        assert_ne!(ids[0], ids[1]);
        assert_eq!(ids[2].to_string(), "abc");
    }

    #[test]
    fn test_frequency_parsing() {
        assert_eq!("Mensual".parse::<Frequency>().unwrap(), Frequency::Monthly);
        assert_eq!(" quarterly ".parse::<Frequency>().unwrap(), Frequency::Quarterly);
        assert_eq!("ANUAL".parse::<Frequency>().unwrap(), Frequency::Annual);
        assert!(matches!(
            "weekly".parse::<Frequency>(),
            Err(PeriodEngineError::InvalidFrequency(_))
        ));
    }

    #[test]
    fn test_granularity_parsing() {
        assert_eq!("Semanal".parse::<Granularity>().unwrap(), Granularity::Weekly);
        assert_eq!("daily".parse::<Granularity>().unwrap(), Granularity::Daily);
        assert!(matches!(
            "hourly".parse::<Granularity>(),
            Err(PeriodEngineError::InvalidGranularity(_))
        ));
    }

    #[test]
    fn test_request_defaults_options() {
        let request: ReportRequest =
            serde_json::from_str(r#"{"granularity": "Weekly", "now": "2024-03-13"}"#).unwrap();
        assert!(!request.year_to_date);
        assert_eq!(request.options.week_start, WeekStart::Sunday);

        let request: ReportRequest = serde_json::from_str(
            r#"{"granularity": "Weekly", "now": "2024-03-13", "options": {"week_start": "Monday"}}"#,
        )
        .unwrap();
        assert_eq!(request.options.week_start, WeekStart::Monday);
    }

    #[test]
    fn test_bucket_profit_is_derived() {
        let bucket = PeriodBucket::new(
            NaiveDate::from_ymd_opt(2023, 3, 1).unwrap(),
            "Marzo".to_string(),
            250.5,
            100.25,
        );
        assert_eq!(bucket.profit, bucket.income - bucket.expense);
    }

    #[test]
    fn test_snapshot_defaults_missing_collections() {
        let snapshot: LedgerSnapshot =
            serde_json::from_str(r#"{"transactions": [{"id": 1, "income": 10.0}]}"#).unwrap();
        assert_eq!(snapshot.transactions.len(), 1);
        assert!(snapshot.fixed_costs.is_empty());
        assert_eq!(snapshot.transactions[0].expense, 0.0);
        assert!(snapshot.transactions[0].month.is_none());
    }
}
