//! Optional memoisation for callers that re-request the same view repeatedly.
//!
//! The engine never caches on its own. Keys combine the request shape, a
//! content hash of the inputs and `now` truncated to the minute, so results
//! go stale at most one minute after the clock moves.

use crate::engine::Aggregator;
use crate::error::Result;
use crate::schema::{EngineOptions, FixedItem, Granularity, LedgerSnapshot, PeriodBucket, Transaction};
use chrono::{NaiveDateTime, Timelike};
use log::debug;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey {
    pub now_minute: NaiveDateTime,
    pub granularity: Granularity,
    pub year_to_date: bool,
    pub content_hash: String,
}

#[derive(Serialize)]
struct HashedContent<'a> {
    transactions: &'a [Transaction],
    fixed_costs: &'a [FixedItem],
    fixed_incomes: &'a [FixedItem],
    options: &'a EngineOptions,
}

/// Hex SHA-256 over the JSON form of the inputs.
pub fn content_hash(snapshot: &LedgerSnapshot, options: &EngineOptions) -> Result<String> {
    let bytes = serde_json::to_vec(&HashedContent {
        transactions: &snapshot.transactions,
        fixed_costs: &snapshot.fixed_costs,
        fixed_incomes: &snapshot.fixed_incomes,
        options,
    })?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    Ok(format!("{:x}", hasher.finalize()))
}

pub fn truncate_to_minute(now: NaiveDateTime) -> NaiveDateTime {
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

pub struct AggregationCache {
    options: EngineOptions,
    max_entries: usize,
    entries: BTreeMap<CacheKey, Vec<PeriodBucket>>,
}

impl AggregationCache {
    pub fn new(options: EngineOptions, max_entries: usize) -> Self {
        Self {
            options,
            max_entries: max_entries.max(1),
            entries: BTreeMap::new(),
        }
    }

    pub fn key_for(
        &self,
        snapshot: &LedgerSnapshot,
        granularity: Granularity,
        year_to_date: bool,
        now: NaiveDateTime,
    ) -> Result<CacheKey> {
        Ok(CacheKey {
            now_minute: truncate_to_minute(now),
            granularity,
            year_to_date,
            content_hash: content_hash(snapshot, &self.options)?,
        })
    }

    /// Cached buckets for the request, computing and storing them on a miss.
    pub fn get_or_aggregate(
        &mut self,
        snapshot: &LedgerSnapshot,
        granularity: Granularity,
        year_to_date: bool,
        now: NaiveDateTime,
    ) -> Result<Vec<PeriodBucket>> {
        let key = self.key_for(snapshot, granularity, year_to_date, now)?;

        if let Some(buckets) = self.entries.get(&key) {
            debug!("Aggregation cache hit for {:?} at {}", granularity, key.now_minute);
            return Ok(buckets.clone());
        }

        let buckets = Aggregator::new(self.options).aggregate(
            &snapshot.transactions,
            &snapshot.fixed_costs,
            &snapshot.fixed_incomes,
            granularity,
            year_to_date,
            now.date(),
        );

        while self.entries.len() >= self.max_entries {
            // Keys order by `now_minute` first, so this drops the stalest entry.
            if self.entries.pop_first().is_none() {
                break;
            }
        }
        self.entries.insert(key, buckets.clone());

        Ok(buckets)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
