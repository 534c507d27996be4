// ==============================================================================
// processor.rs - Core Frequency Lookup Pipeline
// ==============================================================================
// Description: Reads SNP table, queries ALFA per record, writes augmented table
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::client::{AlfaClient, FrequencySource};
use crate::config::LookupConfig;
use crate::frequency::extract;
use crate::models::{Population, RowOutcome, VariantRecord};
use crate::output::FrequencyTableWriter;
use crate::parsers::{VariantTable, VariantTableParser};

/// Outcome of a lookup run
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingReport {
    /// One outcome per input record, in input order
    pub outcomes: Vec<RowOutcome>,
    /// Records with at least one population resolved
    pub resolved: usize,
    /// Records skipped without a request (not an rsID)
    pub invalid: usize,
    /// Records whose request or extraction failed
    pub failed: usize,
    pub elapsed: Duration,
}

/// Sequential per-record frequency lookup
pub struct FrequencyProcessor<S> {
    source: S,
    organism: String,
    populations: Vec<Population>,
}

impl<S: FrequencySource> FrequencyProcessor<S> {
    pub fn new(source: S, organism: impl Into<String>, populations: Vec<Population>) -> Self {
        Self {
            source,
            organism: organism.into(),
            populations,
        }
    }

    /// Look up every record; one request per record, each awaited in turn
    pub async fn process(&self, table: &VariantTable) -> ProcessingReport {
        let started = Instant::now();
        info!(
            "Looking up {} records (organism {}, populations: {})",
            table.records.len(),
            self.organism,
            self.populations
                .iter()
                .map(|p| p.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let mut outcomes = Vec::with_capacity(table.records.len());
        let mut resolved = 0;
        let mut invalid = 0;
        let mut failed = 0;

        for record in &table.records {
            let outcome = match record.numeric_id() {
                Some(numeric_id) => self.lookup(record, numeric_id).await,
                None => {
                    warn!(
                        "Line {}: '{}' is not an rsID, skipping",
                        record.line, record.variant_id
                    );
                    invalid += 1;
                    outcomes.push(RowOutcome::Skipped);
                    continue;
                }
            };

            if outcome.is_resolved() {
                resolved += 1;
            } else {
                failed += 1;
            }
            outcomes.push(outcome);
        }

        let elapsed = started.elapsed();
        info!(
            "Lookup complete in {:.2}s: {} resolved, {} failed, {} invalid",
            elapsed.as_secs_f64(),
            resolved,
            failed,
            invalid
        );

        ProcessingReport {
            outcomes,
            resolved,
            invalid,
            failed,
            elapsed,
        }
    }

    async fn lookup(&self, record: &VariantRecord, numeric_id: &str) -> RowOutcome {
        let response = match self.source.fetch_frequency(numeric_id).await {
            Ok(response) => response,
            Err(e) => {
                warn!("Line {}: {}", record.line, e);
                return RowOutcome::Skipped;
            }
        };

        let mut results = BTreeMap::new();

        for population in &self.populations {
            match extract(&response, &self.organism, population, record.allele.as_deref()) {
                Ok(result) => {
                    debug!(
                        "{} {} in {}: {} ({}/{})",
                        record.variant_id,
                        result.allele,
                        population,
                        result.frequency,
                        result.count,
                        result.total
                    );
                    results.insert(population.accession().to_string(), result);
                }
                Err(e) => {
                    warn!("Line {}: {} for {}", record.line, e, record.variant_id);
                }
            }
        }

        if results.is_empty() {
            RowOutcome::Skipped
        } else {
            RowOutcome::Resolved(results)
        }
    }
}

/// Full run: parse input, look up every record, write output
pub async fn run_lookup(config: &LookupConfig) -> Result<ProcessingReport> {
    info!("Reading SNP table: {:?}", config.input);

    let mut parser = VariantTableParser::new(config.input_delimiter);
    parser.snp_column = config.snp_column.clone();
    parser.allele_column = config.allele_column.clone();

    let table = parser
        .parse(&config.input)
        .with_context(|| format!("Failed to parse input file {:?}", config.input))?;

    info!("Parsed {} records from {:?}", table.records.len(), config.input);

    let client = AlfaClient::new(config.client.clone())
        .context("Failed to create variation API client")?;

    let processor = FrequencyProcessor::new(client, config.organism.clone(), config.populations.clone());
    let report = processor.process(&table).await;

    FrequencyTableWriter::new(config.output_delimiter)
        .write(&config.output, &table, &report.outcomes, &config.populations)
        .with_context(|| format!("Failed to write output file {:?}", config.output))?;

    Ok(report)
}
