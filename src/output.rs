// ==============================================================================
// output.rs - Frequency Table Output
// ==============================================================================
// Description: Writes input rows augmented with ALFA frequency columns
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Columns: every input column, then per population
//   freq, count                        (single population)
//   freq_<accession>, count_<accession> (several populations)
// Unresolved values are written as -1.
// ==============================================================================

use csv::WriterBuilder;
use std::path::Path;
use thiserror::Error;
use tracing::info;

use crate::models::{Population, RowOutcome};
use crate::parsers::VariantTable;

/// Value written when a frequency could not be resolved
pub const MISSING_VALUE: &str = "-1";

/// Errors that can occur while writing the output table
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV writing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Expected {records} row outcomes, got {outcomes}")]
    OutcomeCountMismatch { records: usize, outcomes: usize },
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Column {
    Frequency(usize),
    Count(usize),
}

/// Delimited writer for augmented frequency tables
#[derive(Debug, Clone)]
pub struct FrequencyTableWriter {
    delimiter: u8,
}

impl Default for FrequencyTableWriter {
    fn default() -> Self {
        Self::new(b'\t')
    }
}

impl FrequencyTableWriter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Names of the appended columns, in output order
    pub fn column_names(populations: &[Population]) -> Vec<String> {
        if populations.len() == 1 {
            return vec!["freq".to_string(), "count".to_string()];
        }

        populations
            .iter()
            .flat_map(|p| {
                [
                    format!("freq_{}", p.accession()),
                    format!("count_{}", p.accession()),
                ]
            })
            .collect()
    }

    /// Write `table` with one outcome per record; an existing file is overwritten
    pub fn write(
        &self,
        path: impl AsRef<Path>,
        table: &VariantTable,
        outcomes: &[RowOutcome],
        populations: &[Population],
    ) -> Result<(), OutputError> {
        let path = path.as_ref();
        let writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)?;

        self.write_to(writer, table, outcomes, populations)?;

        info!("Wrote {} rows to {:?}", table.records.len(), path);
        Ok(())
    }

    /// Write to any csv writer
    pub fn write_to<W: std::io::Write>(
        &self,
        mut writer: csv::Writer<W>,
        table: &VariantTable,
        outcomes: &[RowOutcome],
        populations: &[Population],
    ) -> Result<(), OutputError> {
        if outcomes.len() != table.records.len() {
            return Err(OutputError::OutcomeCountMismatch {
                records: table.records.len(),
                outcomes: outcomes.len(),
            });
        }

        let (header, targets) = build_layout(&table.headers, populations);
        writer.write_record(&header)?;

        for (record, outcome) in table.records.iter().zip(outcomes) {
            let mut row = record.fields.clone();
            row.resize(header.len(), String::new());

            for (idx, column) in &targets {
                row[*idx] = format_value(outcome, populations, *column);
            }

            writer.write_record(&row)?;
        }

        writer.flush()?;
        Ok(())
    }
}

/// Output header plus the column index each frequency value lands in
fn build_layout(headers: &[String], populations: &[Population]) -> (Vec<String>, Vec<(usize, Column)>) {
    let mut header = headers.to_vec();
    let mut targets = Vec::new();

    let columns = (0..populations.len()).flat_map(|i| [Column::Frequency(i), Column::Count(i)]);
    let names = FrequencyTableWriter::column_names(populations);

    for (name, column) in names.into_iter().zip(columns) {
        let idx = match header.iter().position(|h| *h == name) {
            Some(existing) => existing,
            None => {
                header.push(name);
                header.len() - 1
            }
        };
        targets.push((idx, column));
    }

    (header, targets)
}

fn format_value(outcome: &RowOutcome, populations: &[Population], column: Column) -> String {
    let (pop_idx, is_frequency) = match column {
        Column::Frequency(i) => (i, true),
        Column::Count(i) => (i, false),
    };

    match outcome.get(&populations[pop_idx]) {
        Some(result) if is_frequency => result.frequency.to_string(),
        Some(result) => result.count.to_string(),
        None => MISSING_VALUE.to_string(),
    }
}
