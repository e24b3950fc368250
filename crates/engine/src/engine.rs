use std::path::Path;

use serde::Serialize;

use crate::aggregate::ReturnStats;
use crate::error::VerifyError;
use crate::loader;
use crate::matcher;
use crate::model::{Record, SaleIndex, VerificationSummary};
use crate::schema::{Domain, Schema};

/// Per-domain verification result: summary plus capped diagnostic notes.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyReport {
    pub domain: Domain,
    pub summary: VerificationSummary,
    pub notes: Vec<String>,
}

/// Pure pass over pre-loaded data.
///
/// Deterministic for a given index and return order: running it twice
/// yields identical summaries.
pub fn verify_records(schema: &Schema, index: &SaleIndex, returns: &[Record]) -> VerifyReport {
    let mut stats = ReturnStats::new();
    matcher::match_returns(schema, index, returns, &mut stats);
    let summary = stats.summarize(index.record_count(), returns.len() as u64);
    VerifyReport {
        domain: schema.domain,
        summary,
        notes: stats.into_notes(),
    }
}

/// Load both files for `domain` under `data_dir` and verify.
///
/// Errors are domain-level: a missing or empty file fails this domain and
/// nothing else.
pub fn verify_domain(domain: Domain, data_dir: &Path) -> Result<VerifyReport, VerifyError> {
    let schema = Schema::for_domain(domain);
    let sales_path = loader::sales_path(data_dir, domain);
    let returns_path = loader::returns_path(data_dir, domain);

    let index = loader::load_sales(schema, &sales_path)?;
    if index.is_empty() {
        return Err(VerifyError::NoRecords(sales_path));
    }
    let returns = loader::load_returns(&returns_path)?;
    if returns.is_empty() {
        return Err(VerifyError::NoRecords(returns_path));
    }
    Ok(verify_records(schema, &index, &returns))
}
