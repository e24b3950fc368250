use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use crate::error::VerifyError;
use crate::model::{Record, SaleIndex};
use crate::schema::{Domain, MatchStrategy, Schema};

pub fn sales_path(dir: &Path, domain: Domain) -> PathBuf {
    dir.join(format!("{}_sales.dat", domain.prefix()))
}

pub fn returns_path(dir: &Path, domain: Domain) -> PathBuf {
    dir.join(format!("{}_returns.dat", domain.prefix()))
}

fn open(path: &Path) -> Result<BufReader<File>, VerifyError> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            Err(VerifyError::FileNotFound(path.to_path_buf()))
        }
        Err(err) => Err(read_error(path, err)),
    }
}

fn read_error(path: &Path, err: io::Error) -> VerifyError {
    VerifyError::Io {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Load and index the sales file.
///
/// Lines too short to yield the domain key are skipped. Duplicate keys
/// follow the schema strategy: replace for unique-key domains, append for
/// the catalog item key.
pub fn load_sales(schema: &Schema, path: &Path) -> Result<SaleIndex, VerifyError> {
    let reader = open(path)?;
    let mut index = SaleIndex::new();
    for line in reader.lines() {
        let line = line.map_err(|err| read_error(path, err))?;
        let record = Record::from_line(&line);
        let Some(key) = schema.key.sale_key(&record) else {
            continue;
        };
        match schema.strategy {
            MatchStrategy::Direct { .. } => index.insert_unique(key, record),
            MatchStrategy::TwoTier { .. } => index.append(key, record),
        }
    }
    Ok(index)
}

/// Load every returns line, including ones the matcher will later skip as
/// malformed; they still count toward total returns.
pub fn load_returns(path: &Path) -> Result<Vec<Record>, VerifyError> {
    let reader = open(path)?;
    let mut records = Vec::new();
    for line in reader.lines() {
        let line = line.map_err(|err| read_error(path, err))?;
        records.push(Record::from_line(&line));
    }
    Ok(records)
}
