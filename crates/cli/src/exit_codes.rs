//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; CI scripts rely on them.
//!
//! # Exit Codes
//!
//! | Code | Domain       | Description                                      |
//! |------|--------------|--------------------------------------------------|
//! | 0    | Universal    | Success: every domain verified at 100%           |
//! | 1    | Universal    | General error (unspecified)                      |
//! | 2    | Universal    | CLI usage error (bad args)                       |
//! | 3    | Verification | At least one domain finished below a 100% verdict|
//! | 4    | Verification | At least one domain had missing or empty data    |
//! | 5    | Generation   | Generator missing, not executable, or failed     |
//!
//! A multi-domain run keeps going after a domain-level failure and exits
//! with the worst code it saw. Codes are ordered by severity, so worst
//! means numerically largest: 5 > 4 > 3 > 0.

use genverify_engine::VerifyError;

/// Success: every requested domain verified with a SUCCESS verdict.
pub const EXIT_SUCCESS: u8 = 0;

/// General error, unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error: bad arguments, unknown domain name on `schema`.
pub const EXIT_USAGE: u8 = 2;

/// At least one domain completed verification below 100% successful.
pub const EXIT_VERDICT_FAILED: u8 = 3;

/// At least one domain aborted: data file missing, unreadable or empty.
pub const EXIT_DATA_ERROR: u8 = 4;

/// Generation failed: unusable `--dbgen` path or nonzero generator exit.
pub const EXIT_GENERATION: u8 = 5;

/// Combine two run outcomes, keeping the more severe one.
pub fn worst(a: u8, b: u8) -> u8 {
    a.max(b)
}

/// Map an engine error to its exit code.
pub fn verify_exit_code(err: &VerifyError) -> u8 {
    match err {
        VerifyError::UnknownDomain(_) => EXIT_USAGE,
        VerifyError::FileNotFound(_) | VerifyError::NoRecords(_) | VerifyError::Io { .. } => {
            EXIT_DATA_ERROR
        }
    }
}
