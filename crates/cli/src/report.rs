//! Run reporting: the human console blocks and the JSON document.
//!
//! Progress, banners and diagnostic notes go to stderr; the per-domain
//! result blocks go to stdout unless `--json` claims stdout for the
//! machine-readable document.

use std::path::Path;

use serde::Serialize;

use genverify_engine::{Domain, VerificationSummary, VerifyReport};

use crate::generator::GenOutcome;

// ---------------------------------------------------------------------------
// JSON document
// ---------------------------------------------------------------------------

/// Top-level document emitted by `--json` / `--output`.
#[derive(Debug, Serialize)]
pub struct RunDocument {
    pub meta: RunMeta,
    pub domains: Vec<DomainDocument>,
}

#[derive(Debug, Serialize)]
pub struct RunMeta {
    pub tool_version: String,
    pub run_at: String,
    pub scale: u32,
    pub data_dir: String,
}

impl RunMeta {
    pub fn new(scale: u32, data_dir: &Path) -> Self {
        Self {
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            scale,
            data_dir: data_dir.display().to_string(),
        }
    }
}

/// Outcome of one domain within a run.
#[derive(Debug, Serialize)]
pub struct DomainDocument {
    pub domain: Domain,
    pub status: DomainStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation: Option<GenOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<VerificationSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    Pass,
    Fail,
    Error,
}

impl DomainDocument {
    pub fn completed(report: VerifyReport, generation: Option<GenOutcome>) -> Self {
        let status = if passed(&report.summary) { DomainStatus::Pass } else { DomainStatus::Fail };
        Self {
            domain: report.domain,
            status,
            generation,
            summary: Some(report.summary),
            notes: report.notes,
            error: None,
        }
    }

    pub fn errored(domain: Domain, generation: Option<GenOutcome>, message: String) -> Self {
        Self {
            domain,
            status: DomainStatus::Error,
            generation,
            summary: None,
            notes: Vec::new(),
            error: Some(message),
        }
    }
}

// ---------------------------------------------------------------------------
// Verdict + ratio policy
// ---------------------------------------------------------------------------

/// SUCCESS verdict rule: every return verified. Exact comparison is
/// intentional; successful/total * 100 is 100.0 precisely when the counts
/// are equal.
pub fn passed(summary: &VerificationSummary) -> bool {
    summary.pct_successful == 100.0
}

/// Returns-to-sales ratio as a percentage.
pub fn returns_ratio(summary: &VerificationSummary) -> f64 {
    if summary.total_sales == 0 {
        0.0
    } else {
        summary.total_returns as f64 / summary.total_sales as f64 * 100.0
    }
}

/// The generator targets a ratio near 10%; anything outside [9, 11) gets a
/// console warning.
pub fn ratio_outside_band(ratio: f64) -> bool {
    ratio < 9.0 || ratio >= 11.0
}

/// Format with thousands separators: 1234567 -> "1,234,567".
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Console output
// ---------------------------------------------------------------------------

/// Per-domain banner, on stderr with the rest of the progress output.
pub fn banner(domain: Domain) {
    eprintln!();
    eprintln!("{}", "=".repeat(60));
    eprintln!("Processing {}", domain.prefix().to_uppercase());
    eprintln!("{}", "=".repeat(60));
}

/// The KEY RESULTS / Secondary results blocks, on stdout.
pub fn print_domain(report: &VerifyReport, generation: &GenOutcome) {
    let summary = &report.summary;
    let ratio = returns_ratio(summary);
    let verdict = if passed(summary) { "SUCCESS" } else { "FAILED" };

    println!();
    println!("KEY RESULTS for {}:", report.domain.prefix());
    println!(
        "  Successful comparisons: {:.2}% ({})",
        summary.pct_successful,
        group_thousands(summary.successful_comparisons)
    );
    println!("  Returns/Sales ratio: {ratio:.2}%");
    println!("  Verdict: {verdict}");
    if ratio_outside_band(ratio) {
        println!(
            "  WARNING: returns/sales ratio {ratio:.2}% is outside expected range (9% - 11%)"
        );
    }
    println!();
    println!("Secondary results:");
    println!("  Total sales: {}", group_thousands(summary.total_sales));
    println!("  Total returns: {}", group_thousands(summary.total_returns));
    println!("  Sales with returns: {}", group_thousands(summary.sales_with_returns));
    println!("  Avg returns per sale: {:.2}", summary.avg_returns_per_sale);
    println!("  % of sales with returns: {:.2}%", summary.pct_sales_with_returns);
    println!(
        "  Failed comparisons: {} ({:.2}%)",
        group_thousands(summary.failed_comparisons),
        summary.pct_failed
    );
    if summary.skipped_returns > 0 {
        println!("  Skipped returns: {}", group_thousands(summary.skipped_returns));
    }
    if generation.reused {
        println!("  Data generation time: 0 sec, existing data files used");
    } else {
        println!("  Data generation time: {:.2} sec", generation.seconds);
    }
}

/// Diagnostic notes, on stderr; suppressed by `--quiet`.
pub fn print_notes(notes: &[String]) {
    for note in notes {
        eprintln!("  note: {note}");
    }
}

/// One-line run summary across domains, on stderr.
pub fn print_final(documents: &[DomainDocument]) {
    let count =
        |status: DomainStatus| documents.iter().filter(|d| d.status == status).count();
    eprintln!();
    eprintln!(
        "{} domain(s): {} passed, {} failed, {} errored",
        documents.len(),
        count(DomainStatus::Pass),
        count(DomainStatus::Fail),
        count(DomainStatus::Error)
    );
}
