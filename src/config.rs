// ==============================================================================
// config.rs - Lookup Configuration
// ==============================================================================
// Description: Validated run settings and delimiter parsing
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use std::path::PathBuf;
use thiserror::Error;

use crate::client::ClientConfig;
use crate::models::{Population, DEFAULT_ORGANISM};

pub const DEFAULT_OUTPUT: &str = "alff_output.txt";

/// Errors in user-supplied settings
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid delimiter '{0}': expected a single ASCII character, an escape such as \\t, or one of tab, comma, space, semicolon, pipe")]
    InvalidDelimiter(String),

    #[error("At least one population is required")]
    NoPopulations,

    #[error("Organism accession must not be empty")]
    EmptyOrganism,
}

/// Parse a delimiter argument into a single byte
///
/// Accepts a literal character (`,`), shell-escaped forms (`\t`, `\\t`)
/// and the names tab, comma, space, semicolon and pipe.
pub fn parse_delimiter(raw: &str) -> Result<u8, ConfigError> {
    let invalid = || ConfigError::InvalidDelimiter(raw.escape_default().to_string());

    let named = match raw.to_ascii_lowercase().as_str() {
        "tab" | "\\t" | "\\\\t" => Some('\t'),
        "comma" => Some(','),
        "space" => Some(' '),
        "semicolon" => Some(';'),
        "pipe" | "\\|" => Some('|'),
        _ => None,
    };

    let delimiter = match named {
        Some(c) => c,
        None => {
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => c,
                _ => return Err(invalid()),
            }
        }
    };

    if !delimiter.is_ascii() || matches!(delimiter, '"' | '\n' | '\r') {
        return Err(invalid());
    }

    Ok(delimiter as u8)
}

/// Settings for one lookup run
#[derive(Debug, Clone, PartialEq)]
pub struct LookupConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub input_delimiter: u8,
    pub output_delimiter: u8,
    pub snp_column: Option<String>,
    pub allele_column: Option<String>,
    /// BioProject accession (e.g., "PRJNA507278")
    pub organism: String,
    /// Requested populations, deduplicated in input order
    pub populations: Vec<Population>,
    pub client: ClientConfig,
}

impl LookupConfig {
    /// Settings with defaults for everything but the input path
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: PathBuf::from(DEFAULT_OUTPUT),
            input_delimiter: b'\t',
            output_delimiter: b'\t',
            snp_column: None,
            allele_column: None,
            organism: DEFAULT_ORGANISM.to_string(),
            populations: vec![Population::european()],
            client: ClientConfig::default(),
        }
    }

    /// Normalize and check settings before a run
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        self.organism = self.organism.trim().to_string();
        if self.organism.is_empty() {
            return Err(ConfigError::EmptyOrganism);
        }

        let mut unique: Vec<Population> = Vec::with_capacity(self.populations.len());
        for population in self.populations {
            if !unique.contains(&population) {
                unique.push(population);
            }
        }
        if unique.is_empty() {
            return Err(ConfigError::NoPopulations);
        }
        self.populations = unique;

        self.snp_column = self.snp_column.filter(|c| !c.trim().is_empty());
        self.allele_column = self.allele_column.filter(|c| !c.trim().is_empty());

        Ok(self)
    }
}
