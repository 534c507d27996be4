// ==============================================================================
// variant_table.rs - Delimited SNP Table Parser
// ==============================================================================
// Description: Parser for user-supplied SNP/allele tables
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Format: Delimited text with a header line (optionally gzip-compressed)
// Example:
//   SNP    effect_allele    beta
//   rs429358    C    0.12
//   rs7412    T    -0.08
// ==============================================================================

use csv::{ReaderBuilder, StringRecord};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::VariantRecord;

/// Allele cells treated as "no allele given"
const MISSING_ALLELE_TOKENS: &[&str] = &["", "NA", "N/A", "."];

/// Parsed input table
#[derive(Debug, Clone, PartialEq)]
pub struct VariantTable {
    /// Header fields in input order
    pub headers: Vec<String>,
    /// Index of the SNP identifier column
    pub snp_index: usize,
    /// Index of the allele column (None for single-column tables)
    pub allele_index: Option<usize>,
    /// Data rows in input order
    pub records: Vec<VariantRecord>,
}

/// Parser for delimited SNP tables
#[derive(Debug, Clone)]
pub struct VariantTableParser {
    /// Field delimiter (single byte)
    pub delimiter: u8,
    /// Requested SNP column header; None uses the first column
    pub snp_column: Option<String>,
    /// Requested allele column header; None uses the first other column
    pub allele_column: Option<String>,
}

/// Errors that can occur during SNP table parsing
#[derive(Error, Debug)]
pub enum VariantTableParseError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Missing header line")]
    MissingHeader,

    #[error("Invalid line format at line {line}: {details}")]
    InvalidFormat { line: usize, details: String },

    #[error("Missing SNP identifier at line {line}")]
    MissingVariantId { line: usize },

    #[error("File is empty or contains only a header")]
    EmptyFile,
}

impl Default for VariantTableParser {
    fn default() -> Self {
        Self::new(b'\t')
    }
}

impl VariantTableParser {
    /// Create a parser using default column selection
    pub fn new(delimiter: u8) -> Self {
        Self {
            delimiter,
            snp_column: None,
            allele_column: None,
        }
    }

    pub fn with_snp_column(mut self, column: impl Into<String>) -> Self {
        self.snp_column = Some(column.into());
        self
    }

    pub fn with_allele_column(mut self, column: impl Into<String>) -> Self {
        self.allele_column = Some(column.into());
        self
    }

    /// Parse a SNP table
    ///
    /// # Arguments
    /// * `path` - Path to the table (`.gz` files are decompressed)
    ///
    /// # Returns
    /// * `Ok(VariantTable)` - Header, resolved column indices and records
    /// * `Err(VariantTableParseError)` - Parse error
    ///
    /// Fully blank lines are skipped. Every other line must have the
    /// same number of fields as the header.
    pub fn parse(&self, path: impl AsRef<Path>) -> Result<VariantTable, VariantTableParseError> {
        let path = path.as_ref();
        let file = File::open(path)?;

        let is_gzip = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

        let source: Box<dyn Read> = if is_gzip {
            debug!("Reading gzip-compressed table: {:?}", path);
            Box::new(MultiGzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        self.parse_reader(source)
    }

    /// Parse a SNP table from any reader
    pub fn parse_reader<R: Read>(&self, mut source: R) -> Result<VariantTable, VariantTableParseError> {
        // Buffered whole so error line numbers can be taken from byte offsets;
        // csv positions do not count skipped blank lines
        let mut data = Vec::new();
        source.read_to_end(&mut data)?;

        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(data.as_slice());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
            return Err(VariantTableParseError::MissingHeader);
        }

        let snp_index = resolve_column(&headers, self.snp_column.as_deref(), None, "SNP")
            .ok_or(VariantTableParseError::MissingHeader)?;
        let allele_index = resolve_column(
            &headers,
            self.allele_column.as_deref(),
            Some(snp_index),
            "allele",
        );

        let mut records = Vec::new();
        let mut lines = LineCounter::new(&data);

        for (idx, result) in reader.records().enumerate() {
            let row = result?;
            // Header is line 1; fall back to counting rows if position is unknown
            let line = row
                .position()
                .map(|p| lines.line_at(p.byte() as usize))
                .unwrap_or(idx + 2);

            if row.iter().all(|f| f.trim().is_empty()) {
                continue;
            }

            records.push(self.parse_row(&row, line, headers.len(), snp_index, allele_index)?);
        }

        if records.is_empty() {
            return Err(VariantTableParseError::EmptyFile);
        }

        debug!(
            "Parsed {} rows (SNP column '{}', allele column {:?})",
            records.len(),
            headers[snp_index],
            allele_index.map(|i| headers[i].as_str())
        );

        Ok(VariantTable {
            headers,
            snp_index,
            allele_index,
            records,
        })
    }

    fn parse_row(
        &self,
        row: &StringRecord,
        line: usize,
        expected_fields: usize,
        snp_index: usize,
        allele_index: Option<usize>,
    ) -> Result<VariantRecord, VariantTableParseError> {
        if row.len() != expected_fields {
            return Err(VariantTableParseError::InvalidFormat {
                line,
                details: format!(
                    "Expected {} fields, found {}",
                    expected_fields,
                    row.len()
                ),
            });
        }

        // Echoed unchanged; only the lookup cells are trimmed
        let fields: Vec<String> = row.iter().map(str::to_string).collect();

        let variant_id = fields[snp_index].trim().to_string();
        if variant_id.is_empty() {
            return Err(VariantTableParseError::MissingVariantId { line });
        }

        let allele = allele_index
            .map(|i| fields[i].trim())
            .filter(|a| !MISSING_ALLELE_TOKENS.iter().any(|t| t.eq_ignore_ascii_case(a)))
            .map(str::to_string);

        Ok(VariantRecord {
            variant_id,
            allele,
            line,
            fields,
        })
    }
}

/// Maps record byte offsets to 1-based physical line numbers.
/// Offsets must be queried in increasing order.
///
/// A record's offset is taken before the blank lines csv skips, so any
/// line terminators at the offset are stepped over first.
struct LineCounter<'a> {
    data: &'a [u8],
    scanned: usize,
    newlines: usize,
}

impl<'a> LineCounter<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            scanned: 0,
            newlines: 0,
        }
    }

    fn line_at(&mut self, byte: usize) -> usize {
        let mut end = byte.min(self.data.len());
        while end < self.data.len() && matches!(self.data[end], b'\r' | b'\n') {
            end += 1;
        }
        if end > self.scanned {
            self.newlines += self.data[self.scanned..end]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            self.scanned = end;
        }
        self.newlines + 1
    }
}

/// Find a column by header name, falling back to the first column not
/// listed in `exclude`
fn resolve_column(
    headers: &[String],
    requested: Option<&str>,
    exclude: Option<usize>,
    label: &str,
) -> Option<usize> {
    let requested = requested.map(str::trim).filter(|r| !r.is_empty());

    if let Some(name) = requested {
        if let Some(idx) = headers.iter().position(|h| h == name) {
            return Some(idx);
        }
        warn!("{} column '{}' not found in header", label, name);
    }

    let fallback = (0..headers.len()).find(|i| Some(*i) != exclude);
    match fallback {
        Some(idx) => warn!("Defaulting to column '{}' as {} column", headers[idx], label),
        None => warn!("No {} column available", label),
    }
    fallback
}
