use std::collections::HashMap;

use crate::model::VerificationSummary;
use crate::schema::FieldPair;

/// First-N diagnostic caps. Counters always increment; only the note
/// buffers are bounded.
pub const FAILURE_NOTE_CAP: usize = 5;
pub const FALLBACK_NOTE_CAP: usize = 3;

/// Borrowed view of a failed comparison. Formatted into a note only while
/// the failure cap has room.
#[derive(Debug, Clone, Copy)]
pub struct MismatchDetail<'a> {
    pub pair: &'a FieldPair,
    pub sale_value: &'a str,
    pub return_value: &'a str,
    pub nullable: bool,
}

/// Running totals for one domain's matching pass. Owned by the caller and
/// updated in place by the matcher.
#[derive(Debug, Default)]
pub struct ReturnStats {
    successful: u64,
    failed: u64,
    skipped: u64,
    returns_per_sale: HashMap<String, u64>,
    failure_notes: Vec<String>,
    fallback_notes: Vec<String>,
}

impl ReturnStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Success with per-sale attribution: marks the sale as having a
    /// verified return and bumps its return count.
    pub fn record_matched(&mut self, sale_key: &str) {
        self.successful += 1;
        *self.returns_per_sale.entry(sale_key.to_string()).or_insert(0) += 1;
    }

    /// Catalog existence fallback: success without per-sale attribution.
    pub fn record_existence_match(&mut self, item_key: &str, order: Option<&str>) {
        self.successful += 1;
        if self.fallback_notes.len() < FALLBACK_NOTE_CAP {
            self.fallback_notes.push(format!(
                "catalog return item_sk={item_key} order={} matched by item existence only",
                order.unwrap_or("(none)")
            ));
        }
    }

    pub fn record_no_sale(&mut self, key: &str) {
        self.failed += 1;
        if self.failure_notes.len() < FAILURE_NOTE_CAP {
            self.failure_notes.push(format!("return key {key}: no matching sale"));
        }
    }

    /// Failed comparison. `detail` is absent for bounds aborts, which fail
    /// without a note.
    pub fn record_mismatch(&mut self, key: &str, detail: Option<MismatchDetail<'_>>) {
        self.failed += 1;
        let Some(d) = detail else { return };
        if self.failure_notes.len() < FAILURE_NOTE_CAP {
            let suffix = if d.nullable { " (non-null mismatch)" } else { "" };
            self.failure_notes.push(format!(
                "key {key}: {}={} vs {}={}{suffix}",
                d.pair.sale.name, d.sale_value, d.pair.ret.name, d.return_value
            ));
        }
    }

    /// Malformed line: counted, never success or failure.
    pub fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    /// Derived summary. Zero denominators yield zero-valued rates.
    pub fn summarize(&self, total_sales: u64, total_returns: u64) -> VerificationSummary {
        let sales_with_returns = self.returns_per_sale.len() as u64;
        let attributed: u64 = self.returns_per_sale.values().sum();
        let avg_returns_per_sale = if sales_with_returns == 0 {
            0.0
        } else {
            attributed as f64 / sales_with_returns as f64
        };
        VerificationSummary {
            total_sales,
            total_returns,
            sales_with_returns,
            avg_returns_per_sale,
            pct_sales_with_returns: pct(sales_with_returns, total_sales),
            successful_comparisons: self.successful,
            failed_comparisons: self.failed,
            skipped_returns: self.skipped,
            pct_successful: pct(self.successful, total_returns),
            pct_failed: pct(self.failed, total_returns),
        }
    }

    /// Drain collected notes, failures first.
    pub fn into_notes(self) -> Vec<String> {
        let mut notes = self.failure_notes;
        notes.extend(self.fallback_notes);
        notes
    }
}

fn pct(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
