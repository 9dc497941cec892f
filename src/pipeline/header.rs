//! Header analysis: validates the header row against the required-field
//! policy and checks that every line has the header's field count.
//!
//! Analysis is a full pass over the input that runs before any output is
//! created, so a structurally broken list never produces a partial file.

use crate::constants::TAB;
use crate::error::{ListError, Result};
use crate::pipeline::record::strip_line_ending;
use crate::types::{HeaderField, HeaderMap};
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, info, instrument};

/// Outcome of a successful analysis pass.
#[derive(Debug, Clone)]
pub struct HeaderAnalysis {
    /// Header cells in file order, trimmed but otherwise as written
    pub columns: Vec<String>,
    pub headers: HeaderMap,
    /// Number of data lines after the header
    pub records: usize,
}

impl HeaderAnalysis {
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

#[instrument(skip_all, fields(path = %path.display()))]
pub fn analyze(path: &Path) -> Result<HeaderAnalysis> {
    if !path.exists() {
        return Err(ListError::InvalidInput(format!(
            "The given input file does not exist: {}",
            path.display()
        )));
    }
    if fs::metadata(path)?.len() == 0 {
        return Err(ListError::InvalidInput(format!(
            "The given input file is empty: {}",
            path.display()
        )));
    }

    let file = File::open(path)?;
    let analysis = analyze_reader(BufReader::new(file))?;
    info!(
        "Header accepted: {} columns, {} recognized, {} records",
        analysis.column_count(),
        analysis.headers.len(),
        analysis.records
    );
    Ok(analysis)
}

pub fn analyze_reader<R: BufRead>(reader: R) -> Result<HeaderAnalysis> {
    let mut lines = reader.lines();

    let header_line = match lines.next() {
        Some(line) => line?,
        None => {
            return Err(ListError::InvalidInput(
                "The input has no header row".to_string(),
            ))
        }
    };
    let header_line = strip_line_ending(&header_line);
    let columns: Vec<String> = header_line
        .split(TAB)
        .map(|column| column.trim().to_string())
        .collect();
    let headers = identify_headers(&columns)?;
    let expected = columns.len();

    let mut records = 0;
    for (offset, line) in lines.enumerate() {
        let line = line?;
        let fields = strip_line_ending(&line).matches(TAB).count() + 1;
        if fields != expected {
            return Err(ListError::MalformedRecord {
                // the header is line 1
                line: offset + 2,
                fields,
                expected,
            });
        }
        records += 1;
    }

    Ok(HeaderAnalysis {
        columns,
        headers,
        records,
    })
}

/// Required: Street1 and one of ZipCode, City + State, or CityStateZipCode.
pub fn identify_headers(columns: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (index, column) in columns.iter().enumerate() {
        if let Some(field) = HeaderField::from_column(column) {
            headers.insert(field, index);
        } else {
            debug!("Column '{}' is not sent for verification", column);
        }
    }

    if !headers.contains(HeaderField::Street1) {
        return Err(ListError::InvalidHeader(
            "You must include a \"Street1\" field in the header row".to_string(),
        ));
    }

    let has_zip = headers.contains(HeaderField::ZipCode);
    let has_lastline = headers.contains(HeaderField::LastLine);
    let has_city_state =
        headers.contains(HeaderField::City) && headers.contains(HeaderField::State);

    if has_zip || has_lastline || has_city_state {
        return Ok(headers);
    }

    Err(ListError::InvalidHeader(
        "At minimum, you must include \"Street1\" and at least one of the following \
         combinations: \"ZipCode\"; \"CityStateZipCode\"; \"City\", \"State\""
            .to_string(),
    ))
}
