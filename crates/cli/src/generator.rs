//! Generator invocation: resolve the dsdgen-style executable and run it
//! once per domain table.

use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Instant;

use genverify_engine::{loader, Domain};

use crate::exit_codes::EXIT_GENERATION;
use crate::CliError;

/// Generation step result for one domain, carried into the JSON report.
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct GenOutcome {
    pub seconds: f64,
    pub reused: bool,
}

impl GenOutcome {
    pub fn reused() -> Self {
        Self { seconds: 0.0, reused: true }
    }
}

fn gen_err(msg: impl Into<String>) -> CliError {
    CliError { code: EXIT_GENERATION, message: msg.into(), hint: None }
}

/// True when both of the domain's data files are already present; the
/// generator run is skipped for such a domain.
pub fn data_files_exist(data_dir: &Path, domain: Domain) -> bool {
    loader::sales_path(data_dir, domain).exists() && loader::returns_path(data_dir, domain).exists()
}

/// Resolve the generator path. A bare name is taken from the current
/// directory, never from PATH; the result is absolute so it survives the
/// child process working-directory switch.
pub fn resolve_dbgen(dbgen: &Path) -> Result<PathBuf, CliError> {
    let resolved = if dbgen.is_relative() && dbgen.components().count() == 1 {
        Path::new(".").join(dbgen)
    } else {
        dbgen.to_path_buf()
    };
    let absolute = std::fs::canonicalize(&resolved)
        .map_err(|_| gen_err(format!("generator not found: {}", resolved.display())))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&absolute)
            .map_err(|e| gen_err(format!("{}: {e}", absolute.display())))?
            .permissions()
            .mode();
        if mode & 0o111 == 0 {
            return Err(gen_err(format!(
                "generator is not executable: {}",
                resolved.display()
            ))
            .with_hint(format!("chmod +x {}", resolved.display())));
        }
    }
    Ok(absolute)
}

/// The exact command line used for a domain, for console echo.
pub fn command_line(dbgen: &Path, domain: Domain, scale: u32) -> String {
    format!("{} -scale {scale} -table {}_sales", dbgen.display(), domain.prefix())
}

/// Run `{dbgen} -scale {n} -table {prefix}_sales` with the data directory
/// as working directory. One invocation emits both the sales and returns
/// files for the table.
pub fn generate(
    dbgen: &Path,
    data_dir: &Path,
    domain: Domain,
    scale: u32,
) -> Result<GenOutcome, CliError> {
    let table = format!("{}_sales", domain.prefix());
    let start = Instant::now();
    let status = Command::new(dbgen)
        .arg("-scale")
        .arg(scale.to_string())
        .arg("-table")
        .arg(&table)
        .current_dir(data_dir)
        .status()
        .map_err(|e| gen_err(format!("cannot run {}: {e}", dbgen.display())))?;
    let seconds = start.elapsed().as_secs_f64();
    if !status.success() {
        return Err(gen_err(format!("generator failed for table {table}: {status}")));
    }
    Ok(GenOutcome { seconds, reused: false })
}
