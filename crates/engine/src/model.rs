use std::collections::HashMap;

use serde::Serialize;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// One data line as raw pipe-separated fields.
///
/// Fields are never parsed into typed values; NULL is the empty string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    fields: Vec<String>,
}

impl Record {
    pub fn new(fields: Vec<String>) -> Self {
        Self { fields }
    }

    /// Split a generator line into fields: trim, split on `|`, no quoting.
    ///
    /// Empty fields are preserved as empty strings. A blank line yields a
    /// single empty field, never a zero-field record.
    pub fn from_line(line: &str) -> Self {
        Self {
            fields: line.trim().split('|').map(str::to_string).collect(),
        }
    }

    pub fn get(&self, col: usize) -> Option<&str> {
        self.fields.get(col).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Sale index
// ---------------------------------------------------------------------------

/// Sales keyed by the domain's composite key.
///
/// One representation for every domain: unique-key domains keep bucket
/// length exactly 1 (last record wins on duplicate keys), the catalog
/// domain appends all order lines sharing an item_sk.
#[derive(Debug, Default)]
pub struct SaleIndex {
    buckets: HashMap<String, Vec<Record>>,
    records: u64,
}

impl SaleIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert for a unique-key domain: a duplicate key replaces the old record.
    pub fn insert_unique(&mut self, key: String, record: Record) {
        match self.buckets.insert(key, vec![record]) {
            Some(_) => {}
            None => self.records += 1,
        }
    }

    /// Insert for a multi-valued domain: append to the key's bucket.
    pub fn append(&mut self, key: String, record: Record) {
        self.buckets.entry(key).or_default().push(record);
        self.records += 1;
    }

    pub fn candidates(&self, key: &str) -> Option<&[Record]> {
        self.buckets.get(key).map(Vec::as_slice)
    }

    /// Total indexed records (sum of bucket lengths).
    pub fn record_count(&self) -> u64 {
        self.records
    }

    /// Distinct keys.
    pub fn key_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Match outcome
// ---------------------------------------------------------------------------

/// Classification of one return record. Feeds the aggregator; outcomes are
/// not retained per record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Sale found and every comparison passed (or the catalog existence
    /// fallback accepted the return).
    Matched,
    /// No sale under the return's key.
    NoSale,
    /// Sale found but a field comparison failed.
    FieldMismatch,
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-domain verification totals and derived rates.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerificationSummary {
    pub total_sales: u64,
    pub total_returns: u64,
    pub sales_with_returns: u64,
    pub avg_returns_per_sale: f64,
    pub pct_sales_with_returns: f64,
    pub successful_comparisons: u64,
    pub failed_comparisons: u64,
    pub skipped_returns: u64,
    pub pct_successful: f64,
    pub pct_failed: f64,
}
