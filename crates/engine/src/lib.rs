//! `genverify-engine`: referential-integrity verification for generated
//! sales/returns benchmark data.
//!
//! Pure engine crate: loads pipe-delimited flat files, matches every return
//! record against its originating sale by the domain's composite key, and
//! produces a serializable summary. No process spawning or report
//! formatting here.

pub mod aggregate;
pub mod engine;
pub mod error;
pub mod loader;
pub mod matcher;
pub mod model;
pub mod schema;

pub use engine::{verify_domain, verify_records, VerifyReport};
pub use error::VerifyError;
pub use model::{MatchOutcome, Record, SaleIndex, VerificationSummary};
pub use schema::{Domain, Schema};
