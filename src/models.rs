// ==============================================================================
// models.rs - Variant and Frequency Data Models
// ==============================================================================
// Description: Data structures shared by the reader, extractor and writer
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ALFA BioProject accession for human allele frequencies
pub const DEFAULT_ORGANISM: &str = "PRJNA507278";

/// ALFA populations: (friendly name, BioSample accession)
pub const ALFA_POPULATIONS: &[(&str, &str)] = &[
    ("european", "SAMN10492695"),
    ("african_others", "SAMN10492696"),
    ("east_asian", "SAMN10492697"),
    ("african_american", "SAMN10492698"),
    ("latin_american_1", "SAMN10492699"),
    ("latin_american_2", "SAMN10492700"),
    ("other_asian", "SAMN10492701"),
    ("south_asian", "SAMN10492702"),
    ("african", "SAMN10492703"),
    ("asian", "SAMN10492704"),
    ("total", "SAMN10492705"),
    ("other", "SAMN11605645"),
];

/// One row of the input table
#[derive(Debug, Clone, PartialEq)]
pub struct VariantRecord {
    /// SNP identifier as written in the input (e.g., "rs12345")
    pub variant_id: String,

    /// Allele whose frequency is requested, None for minor allele
    pub allele: Option<String>,

    /// 1-based line number in the input file
    pub line: usize,

    /// All input fields, echoed to the output row
    pub fields: Vec<String>,
}

impl VariantRecord {
    /// Numeric part of an rsID ("rs12345" -> "12345")
    ///
    /// Returns None when the identifier is not an rsID, since the
    /// variation service only resolves RefSNP numbers.
    pub fn numeric_id(&self) -> Option<&str> {
        let id = self.variant_id.trim();
        let prefix = id.get(..2)?;
        if !prefix.eq_ignore_ascii_case("rs") {
            return None;
        }

        let digits = &id[2..];
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        Some(digits)
    }
}

/// Allele frequency for one population, extracted from an API response
#[derive(Debug, Clone, PartialEq)]
pub struct FrequencyResult {
    /// BioSample accession of the population
    pub population: String,

    /// Allele as spelled by the API
    pub allele: String,

    /// count / total (0.0 to 1.0)
    pub frequency: f64,

    /// Observed count of this allele
    pub count: u64,

    /// Sum of all allele counts for the population
    pub total: u64,
}

/// Result of looking up one input row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    /// Frequencies keyed by population accession; a population may be absent
    Resolved(BTreeMap<String, FrequencyResult>),

    /// No call made or no frequency could be extracted; the cause is logged
    Skipped,
}

impl RowOutcome {
    pub fn get(&self, population: &Population) -> Option<&FrequencyResult> {
        match self {
            RowOutcome::Resolved(results) => results.get(population.accession()),
            RowOutcome::Skipped => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, RowOutcome::Resolved(_))
    }
}

/// Errors that can occur when parsing a population filter
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PopulationParseError {
    #[error("Population must not be empty")]
    Empty,

    #[error("Unknown population '{0}' (expected a SAMN accession or an ALFA population name)")]
    Unknown(String),
}

/// ALFA population, stored as its BioSample accession
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Population(String);

impl Population {
    pub fn accession(&self) -> &str {
        &self.0
    }

    /// Friendly ALFA name, if the accession is a known ALFA population
    pub fn name(&self) -> Option<&'static str> {
        ALFA_POPULATIONS
            .iter()
            .find(|(_, accession)| *accession == self.0)
            .map(|(name, _)| *name)
    }

    pub fn european() -> Self {
        Population("SAMN10492695".to_string())
    }
}

impl Default for Population {
    fn default() -> Self {
        Self::european()
    }
}

impl FromStr for Population {
    type Err = PopulationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(PopulationParseError::Empty);
        }

        let key = trimmed.to_ascii_lowercase().replace(['-', ' '], "_");
        if let Some((_, accession)) = ALFA_POPULATIONS.iter().find(|(name, _)| *name == key) {
            return Ok(Population(accession.to_string()));
        }

        let is_accession = trimmed
            .get(..4)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("SAMN"))
            && trimmed.len() > 4
            && trimmed[4..].bytes().all(|b| b.is_ascii_digit());

        if is_accession {
            Ok(Population(trimmed.to_ascii_uppercase()))
        } else {
            Err(PopulationParseError::Unknown(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Population {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", self.0, name),
            None => write!(f, "{}", self.0),
        }
    }
}
