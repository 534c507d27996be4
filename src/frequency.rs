// ==============================================================================
// frequency.rs - ALFA Frequency Response Extraction
// ==============================================================================
// Description: Typed view of the RefSNP frequency payload and allele lookup
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================
// Payload shape (GET /refsnp/{id}/frequency):
//   {
//     "build_id": "20201027095038",
//     "results": {
//       "1@11794419": {
//         "ref": "T",
//         "counts": {
//           "PRJNA507278": {
//             "allele_counts": {
//               "SAMN10492695": { "T": 7446, "G": 2412 }
//             }
//           }
//         }
//       }
//     }
//   }
// ==============================================================================

use serde::Deserialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::models::{FrequencyResult, Population};

/// Allele counts keyed by allele
pub type AlleleCounts = BTreeMap<String, u64>;

/// Top-level frequency response
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrequencyResponse {
    #[serde(default)]
    pub build_id: Option<String>,

    /// Entries keyed by "<length>@<position>"
    #[serde(default)]
    pub results: Option<BTreeMap<String, FrequencyInterval>>,
}

/// Frequency data for one reference interval
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FrequencyInterval {
    #[serde(rename = "ref", default)]
    pub reference: Option<String>,

    /// Counts keyed by BioProject accession
    #[serde(default)]
    pub counts: BTreeMap<String, OrganismCounts>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct OrganismCounts {
    /// Counts keyed by BioSample accession
    #[serde(default)]
    pub allele_counts: BTreeMap<String, AlleleCounts>,
}

/// Errors raised when a response lacks the requested figures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FrequencyError {
    #[error("Response contains no frequency results")]
    MissingResults,

    #[error("Organism {0} not found in response")]
    UnknownOrganism(String),

    #[error("Population {population} not found for organism {organism}")]
    UnknownPopulation { organism: String, population: String },

    #[error("Allele '{allele}' not observed in population {population}")]
    AlleleNotObserved { allele: String, population: String },

    #[error("No allele counts recorded for population {0}")]
    NoCounts(String),
}

impl FrequencyResponse {
    /// First result interval (lowest key)
    pub fn first_interval(&self) -> Option<&FrequencyInterval> {
        self.results.as_ref().and_then(|results| results.values().next())
    }
}

/// Extract the frequency of `allele` in `population`
///
/// # Arguments
/// * `response` - Decoded frequency payload
/// * `organism` - BioProject accession (e.g., "PRJNA507278")
/// * `population` - ALFA population
/// * `allele` - Allele to look up (case-insensitive); None selects the
///   minor allele, i.e. the lowest count with ties broken by allele name
///
/// # Returns
/// * `Ok(FrequencyResult)` - frequency = count / total
/// * `Err(FrequencyError)` - Requested figures are absent
pub fn extract(
    response: &FrequencyResponse,
    organism: &str,
    population: &Population,
    allele: Option<&str>,
) -> Result<FrequencyResult, FrequencyError> {
    let interval = response
        .first_interval()
        .ok_or(FrequencyError::MissingResults)?;

    let organism_counts = interval
        .counts
        .get(organism)
        .ok_or_else(|| FrequencyError::UnknownOrganism(organism.to_string()))?;

    let counts = organism_counts
        .allele_counts
        .get(population.accession())
        .ok_or_else(|| FrequencyError::UnknownPopulation {
            organism: organism.to_string(),
            population: population.accession().to_string(),
        })?;

    let total: u64 = counts.values().sum();
    if total == 0 {
        return Err(FrequencyError::NoCounts(population.accession().to_string()));
    }

    let (allele, count) = match allele {
        Some(wanted) => counts
            .iter()
            .find(|(observed, _)| observed.eq_ignore_ascii_case(wanted))
            .map(|(observed, count)| (observed.clone(), *count))
            .ok_or_else(|| FrequencyError::AlleleNotObserved {
                allele: wanted.to_string(),
                population: population.accession().to_string(),
            })?,
        None => minor_allele(counts)
            .ok_or_else(|| FrequencyError::NoCounts(population.accession().to_string()))?,
    };

    Ok(FrequencyResult {
        population: population.accession().to_string(),
        allele,
        frequency: count as f64 / total as f64,
        count,
        total,
    })
}

fn minor_allele(counts: &AlleleCounts) -> Option<(String, u64)> {
    counts
        .iter()
        .min_by(|a, b| a.1.cmp(b.1).then_with(|| a.0.cmp(b.0)))
        .map(|(allele, count)| (allele.clone(), *count))
}
