use crate::error::{PeriodEngineError, Result};
use crate::schema::{Direction, FixedItem, Frequency, LedgerSnapshot, RecordId, Transaction};
use crate::utils::parse_required_date;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

/// A recurring item as the storage layer persists it: frequency and start date
/// are free-form strings until validated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFixedItem {
    pub id: RecordId,
    #[serde(default)]
    pub concept: String,
    pub amount: f64,
    pub frequency: String,
    #[serde(alias = "startDate")]
    pub start_date: String,
}

/// Raw persisted collections. Records are kept as JSON values so one bad
/// record does not discard its neighbours.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoredLedger {
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default, alias = "fixedCosts")]
    pub fixed_costs: Vec<Value>,
    #[serde(default, alias = "fixedIncomes")]
    pub fixed_incomes: Vec<Value>,
}

pub fn convert_fixed_item(raw: &StoredFixedItem, direction: Direction) -> Result<FixedItem> {
    let frequency: Frequency = raw.frequency.parse()?;

    if !raw.amount.is_finite() || raw.amount <= 0.0 {
        return Err(PeriodEngineError::InvalidAmount {
            id: raw.id.to_string(),
            amount: raw.amount,
            details: "fixed amounts must be positive".to_string(),
        });
    }

    let start_date = parse_required_date(&raw.start_date)?;

    Ok(FixedItem {
        id: raw.id.clone(),
        concept: raw.concept.clone(),
        amount: raw.amount,
        frequency,
        start_date,
        direction,
    })
}

impl LedgerSnapshot {
    /// Lenient conversion: records that fail to parse or validate are dropped
    /// and logged.
    pub fn from_stored(raw: StoredLedger) -> Self {
        let transactions = raw
            .transactions
            .into_iter()
            .filter_map(|value| match serde_json::from_value::<Transaction>(value) {
                Ok(t) => Some(t),
                Err(e) => {
                    warn!("Dropping malformed transaction record: {}", e);
                    None
                }
            })
            .collect();

        let snapshot = Self {
            transactions,
            fixed_costs: convert_fixed_values(raw.fixed_costs, Direction::Cost),
            fixed_incomes: convert_fixed_values(raw.fixed_incomes, Direction::Income),
        };

        debug!(
            "Loaded snapshot with {} transactions, {} fixed costs, {} fixed incomes",
            snapshot.transactions.len(),
            snapshot.fixed_costs.len(),
            snapshot.fixed_incomes.len()
        );

        snapshot
    }

    /// Malformed JSON yields an empty snapshot rather than an error.
    pub fn from_json_str(json: &str) -> Self {
        match serde_json::from_str::<StoredLedger>(json) {
            Ok(raw) => Self::from_stored(raw),
            Err(e) => {
                warn!("Stored ledger is malformed, treating as empty: {}", e);
                Self::default()
            }
        }
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(Self::from_json_str(&contents))
    }
}

fn convert_fixed_values(values: Vec<Value>, direction: Direction) -> Vec<FixedItem> {
    values
        .into_iter()
        .filter_map(|value| {
            let converted = serde_json::from_value::<StoredFixedItem>(value)
                .map_err(PeriodEngineError::from)
                .and_then(|raw| convert_fixed_item(&raw, direction));
            match converted {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!("Dropping fixed {:?} record: {}", direction, e);
                    None
                }
            }
        })
        .collect()
}
