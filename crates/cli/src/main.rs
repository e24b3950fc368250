//! genverify: generate (optionally) and verify dsdgen-style sales/returns
//! data files for referential integrity.

mod exit_codes;
mod generator;
mod report;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use genverify_engine::schema::{FieldRef, MatchStrategy};
use genverify_engine::{verify_domain, Domain, Schema};

use exit_codes::{
    verify_exit_code, worst, EXIT_DATA_ERROR, EXIT_ERROR, EXIT_GENERATION, EXIT_SUCCESS,
    EXIT_USAGE, EXIT_VERDICT_FAILED,
};
use generator::GenOutcome;
use report::{DomainDocument, DomainStatus, RunDocument, RunMeta};

#[derive(Parser)]
#[command(name = "genverify")]
#[command(version)]
#[command(about = "Verify referential integrity of generated sales/returns data files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate data where missing, then verify each domain
    #[command(after_help = "\
Exit code 3 means a domain verified below 100%, 4 means missing or empty
data files, 5 means the generator could not be run. The worst code across
domains wins.

Examples:
  genverify run --dbgen ./dsdgen
  genverify run --domains store,web --data-dir /data/scale1
  genverify run --dbgen dsdgen_tpcd --scale 10 --json
  genverify run --json --output report.json")]
    Run {
        /// Domains to process, comma-separated (catalog, store, web)
        #[arg(long, default_value = "catalog,store,web")]
        domains: String,

        /// Generator executable; omit to verify pre-existing files only
        #[arg(long, env = "GENVERIFY_DBGEN")]
        dbgen: Option<PathBuf>,

        /// Scale factor passed to the generator
        #[arg(long, default_value_t = 1)]
        scale: u32,

        /// Directory holding the data files, and the generator's working
        /// directory
        #[arg(long, default_value = ".")]
        data_dir: PathBuf,

        /// Print the JSON report on stdout instead of the result blocks
        #[arg(long)]
        json: bool,

        /// Write the JSON report to a file
        #[arg(long)]
        output: Option<PathBuf>,

        /// Suppress per-return diagnostic notes on stderr
        #[arg(long, short = 'q')]
        quiet: bool,
    },

    /// Print the verification rules for one or all domains
    #[command(after_help = "\
Examples:
  genverify schema
  genverify schema catalog
  genverify schema web --json")]
    Schema {
        /// Domain to describe (all three when omitted)
        domain: Option<String>,

        /// Print the rules as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: message.into(), hint: None }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: message.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { domains, dbgen, scale, data_dir, json, output, quiet } => cmd_run(
            &domains,
            dbgen.as_deref(),
            scale,
            &data_dir,
            json,
            output.as_deref(),
            quiet,
        ),
        Commands::Schema { domain, json } => cmd_schema(domain.as_deref(), json),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

fn cmd_run(
    domains_arg: &str,
    dbgen: Option<&Path>,
    scale: u32,
    data_dir: &Path,
    json: bool,
    output: Option<&Path>,
    quiet: bool,
) -> Result<(), CliError> {
    let domains = parse_domains(domains_arg);
    if domains.is_empty() {
        return Err(CliError::usage(format!("no known domains in '{domains_arg}'"))
            .with_hint("expected a comma-separated subset of: catalog, store, web"));
    }

    // Validate the generator path before touching any domain.
    let dbgen = match dbgen {
        Some(path) => Some(generator::resolve_dbgen(path)?),
        None => None,
    };

    let meta = RunMeta::new(scale, data_dir);
    let mut documents: Vec<DomainDocument> = Vec::with_capacity(domains.len());
    let mut exit = EXIT_SUCCESS;

    for domain in domains {
        if !json {
            report::banner(domain);
        }
        let (document, code) = run_domain(domain, dbgen.as_deref(), scale, data_dir, json, quiet);
        exit = worst(exit, code);
        documents.push(document);
    }

    let document = RunDocument { meta, domains: documents };
    emit_json(&document, json, output)?;
    if !json {
        report::print_final(&document.domains);
    }

    match exit {
        EXIT_SUCCESS => Ok(()),
        code => Err(CliError { code, message: run_failure_message(code).into(), hint: None }),
    }
}

/// Lenient domain list parsing: unknown names are reported and skipped so a
/// typo does not abort the remaining domains.
fn parse_domains(arg: &str) -> Vec<Domain> {
    let mut domains = Vec::new();
    for name in arg.split(',') {
        let name = name.trim();
        if name.is_empty() {
            continue;
        }
        match name.parse::<Domain>() {
            Ok(domain) => domains.push(domain),
            Err(_) => eprintln!("skipping unknown domain '{name}'"),
        }
    }
    domains
}

/// Run one domain end to end. Failures are folded into the returned
/// document so later domains still run.
fn run_domain(
    domain: Domain,
    dbgen: Option<&Path>,
    scale: u32,
    data_dir: &Path,
    json: bool,
    quiet: bool,
) -> (DomainDocument, u8) {
    let generation = match generation_step(domain, dbgen, scale, data_dir) {
        Ok(outcome) => outcome,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = &err.hint {
                eprintln!("hint:  {hint}");
            }
            return (DomainDocument::errored(domain, None, err.message), err.code);
        }
    };

    eprintln!();
    eprintln!("Verifying {} integrity...", domain.prefix());
    match verify_domain(domain, data_dir) {
        Ok(verified) => {
            if !json {
                report::print_domain(&verified, &generation);
                if !quiet {
                    report::print_notes(&verified.notes);
                }
            }
            let document = DomainDocument::completed(verified, Some(generation));
            let code = match document.status {
                DomainStatus::Pass => EXIT_SUCCESS,
                _ => EXIT_VERDICT_FAILED,
            };
            (document, code)
        }
        Err(err) => {
            let code = verify_exit_code(&err);
            let message = err.to_string();
            eprintln!("error: {message}");
            (DomainDocument::errored(domain, Some(generation), message), code)
        }
    }
}

/// Reuse existing files when both are present; otherwise the generator is
/// mandatory for the domain.
fn generation_step(
    domain: Domain,
    dbgen: Option<&Path>,
    scale: u32,
    data_dir: &Path,
) -> Result<GenOutcome, CliError> {
    if generator::data_files_exist(data_dir, domain) {
        eprintln!("Using existing {} data files", domain.prefix());
        return Ok(GenOutcome::reused());
    }
    let Some(dbgen) = dbgen else {
        return Err(CliError {
            code: EXIT_DATA_ERROR,
            message: format!("no data files for {} and no --dbgen given", domain.prefix()),
            hint: Some("pass --dbgen <PATH> to generate them".into()),
        });
    };
    eprintln!(
        "Generating {} data with: {}",
        domain.prefix(),
        generator::command_line(dbgen, domain, scale)
    );
    generator::generate(dbgen, data_dir, domain, scale)
}

fn emit_json(document: &RunDocument, json: bool, output: Option<&Path>) -> Result<(), CliError> {
    if !json && output.is_none() {
        return Ok(());
    }
    let rendered = serde_json::to_string_pretty(document)
        .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
    if let Some(path) = output {
        std::fs::write(path, &rendered)
            .map_err(|e| CliError::io(format!("cannot write {}: {e}", path.display())))?;
        eprintln!("wrote {}", path.display());
    }
    if json {
        println!("{rendered}");
    }
    Ok(())
}

fn run_failure_message(code: u8) -> &'static str {
    match code {
        EXIT_GENERATION => "generation failed in at least one domain",
        EXIT_DATA_ERROR => "data loading failed in at least one domain",
        _ => "verification failed in at least one domain",
    }
}

// ---------------------------------------------------------------------------
// schema
// ---------------------------------------------------------------------------

fn cmd_schema(domain: Option<&str>, json: bool) -> Result<(), CliError> {
    let domains: Vec<Domain> = match domain {
        Some(name) => {
            let parsed = name
                .parse::<Domain>()
                .map_err(|e| CliError::usage(e.to_string()).with_hint("expected catalog, store or web"))?;
            vec![parsed]
        }
        None => Domain::ALL.to_vec(),
    };

    if json {
        let schemas: Vec<&Schema> = domains.iter().map(|d| Schema::for_domain(*d)).collect();
        let rendered = serde_json::to_string_pretty(&schemas)
            .map_err(|e| CliError::io(format!("JSON serialization error: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    for domain in domains {
        print_schema(Schema::for_domain(domain));
    }
    Ok(())
}

fn print_schema(schema: &Schema) {
    let labels = |parts: &[FieldRef]| {
        parts.iter().map(field_label).collect::<Vec<_>>().join(" + ")
    };

    println!("{}:", schema.domain.prefix());
    println!("  key: {} <- {}", labels(schema.key.sale_parts), labels(schema.key.return_parts));
    println!("  required:");
    for pair in schema.required {
        println!("    {} == {}", field_label(&pair.sale), field_label(&pair.ret));
    }
    if !schema.nullable.is_empty() {
        println!("  nullable (compared only when both sides are non-empty):");
        for pair in schema.nullable {
            println!("    {} == {}", field_label(&pair.sale), field_label(&pair.ret));
        }
    }
    match &schema.strategy {
        MatchStrategy::Direct { customer: Some(pair) } => {
            println!(
                "  strategy: direct lookup, customer check {} == {}",
                field_label(&pair.sale),
                field_label(&pair.ret)
            );
        }
        MatchStrategy::Direct { customer: None } => {
            println!("  strategy: direct lookup");
        }
        MatchStrategy::TwoTier { order } => {
            println!(
                "  strategy: order scan on {} == {}, then item existence",
                field_label(&order.sale),
                field_label(&order.ret)
            );
        }
    }
    println!();
}

fn field_label(field: &FieldRef) -> String {
    format!("{}[{}]", field.name, field.col)
}
