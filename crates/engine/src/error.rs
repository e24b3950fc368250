use std::fmt;
use std::path::PathBuf;

#[derive(Debug)]
pub enum VerifyError {
    /// Domain name not present in the schema registry.
    UnknownDomain(String),
    /// Sales or returns file does not exist.
    FileNotFound(PathBuf),
    /// File exists but yielded zero usable records.
    NoRecords(PathBuf),
    /// Any other read failure (permissions, encoding, truncation).
    Io { path: PathBuf, message: String },
}

impl fmt::Display for VerifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownDomain(name) => {
                write!(f, "unknown domain '{name}' (expected catalog, store or web)")
            }
            Self::FileNotFound(path) => write!(f, "data file not found: {}", path.display()),
            Self::NoRecords(path) => write!(f, "no records in {}", path.display()),
            Self::Io { path, message } => write!(f, "{}: {message}", path.display()),
        }
    }
}

impl std::error::Error for VerifyError {}
