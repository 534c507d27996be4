// ==============================================================================
// main.rs - Allele Frequency Finder Entry Point
// ==============================================================================
// Description: Appends NCBI ALFA allele frequencies to a delimited SNP table
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use allele_freq_finder::client::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use allele_freq_finder::config::{parse_delimiter, LookupConfig, DEFAULT_OUTPUT};
use allele_freq_finder::models::{Population, DEFAULT_ORGANISM};
use allele_freq_finder::processor;

/// Append ALFA allele frequencies from the NCBI variation API
/// (https://api.ncbi.nlm.nih.gov/variation/v0) to a SNP table
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Full or relative path to input file (.gz is decompressed)
    #[arg(short, long)]
    input: PathBuf,

    /// Field separator for input file
    #[arg(long, default_value = "\\t", value_parser = parse_delimiter)]
    isep: u8,

    /// Output file path; an existing file is overwritten
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Field separator for output file
    #[arg(long, default_value = "\\t", value_parser = parse_delimiter)]
    osep: u8,

    /// Column header for SNP ids (defaults to the first column)
    #[arg(long)]
    snp_col: Option<String>,

    /// Column header for alleles (defaults to the first non-SNP column)
    #[arg(long)]
    allele_col: Option<String>,

    /// BioProject accession of the organism (PRJNA507278 is human ALFA)
    #[arg(long, env = "ALFF_ORGANISM", default_value = DEFAULT_ORGANISM)]
    organism: String,

    /// ALFA population(s): BioSample accession or name such as european, east_asian
    #[arg(
        short,
        long = "population",
        env = "ALFF_POPULATION",
        value_delimiter = ',',
        default_value = "european"
    )]
    populations: Vec<Population>,

    /// Request timeout in seconds
    #[arg(short, long, env = "ALFF_TIMEOUT", default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout: u64,

    /// Variation API base URL
    #[arg(long, env = "ALFF_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// Also write log messages to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> Result<LookupConfig> {
        let config = LookupConfig {
            input: self.input,
            output: self.output,
            input_delimiter: self.isep,
            output_delimiter: self.osep,
            snp_column: self.snp_col,
            allele_column: self.allele_col,
            organism: self.organism,
            populations: self.populations,
            client: ClientConfig {
                base_url: self.api_url,
                timeout: Duration::from_secs(self.timeout),
            },
        };

        Ok(config.validate()?)
    }
}

fn init_tracing(log_file: Option<&Path>) -> Result<()> {
    let file_layer = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create log file {:?}", path))?;
            Some(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "allele_freq_finder=info,alff=info".into()),
        )
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .with(file_layer)
        .init();

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(args.log_file.as_deref())?;

    info!("Allele Frequency Finder v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = args.into_config()?;
    let report = processor::run_lookup(&config).await?;

    info!(
        "Wrote {:?}: {} of {} records resolved ({} failed, {} invalid) in {:.2}s",
        config.output,
        report.resolved,
        report.outcomes.len(),
        report.failed,
        report.invalid,
        report.elapsed.as_secs_f64()
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    // Args read ALFF_* variables; tests touching the environment take this lock
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_cli_defaults() {
        let _env = ENV_LOCK.lock().unwrap();
        let args = Args::try_parse_from(["alff", "-i", "snps.tsv"]).unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.input, PathBuf::from("snps.tsv"));
        assert_eq!(config.output, PathBuf::from("alff_output.txt"));
        assert_eq!(config.input_delimiter, b'\t');
        assert_eq!(config.output_delimiter, b'\t');
        assert_eq!(config.populations, vec![Population::european()]);
    }

    #[test]
    fn test_cli_full() {
        let _env = ENV_LOCK.lock().unwrap();
        let args = Args::try_parse_from([
            "alff",
            "--input",
            "in.csv",
            "--isep",
            ",",
            "-o",
            "out.txt",
            "--osep",
            "comma",
            "--snp-col",
            "SNP",
            "--allele-col",
            "A1",
            "-p",
            "european,east_asian",
            "-p",
            "SAMN10492705",
            "--timeout",
            "30",
            "--api-url",
            "http://127.0.0.1:8080",
        ])
        .unwrap();
        let config = args.into_config().unwrap();

        assert_eq!(config.input_delimiter, b',');
        assert_eq!(config.output_delimiter, b',');
        assert_eq!(config.snp_column.as_deref(), Some("SNP"));
        assert_eq!(config.allele_column.as_deref(), Some("A1"));
        let accessions: Vec<&str> = config.populations.iter().map(|p| p.accession()).collect();
        assert_eq!(accessions, vec!["SAMN10492695", "SAMN10492697", "SAMN10492705"]);
        assert_eq!(config.client.timeout, Duration::from_secs(30));
        assert_eq!(config.client.base_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_cli_rejects_bad_values() {
        let _env = ENV_LOCK.lock().unwrap();
        assert!(Args::try_parse_from(["alff"]).is_err());
        assert!(Args::try_parse_from(["alff", "-i", "x", "--isep", ",,"]).is_err());
        assert!(Args::try_parse_from(["alff", "-i", "x", "-p", "martian"]).is_err());
    }

    #[test]
    fn test_cli_env_values() {
        let _env = ENV_LOCK.lock().unwrap();
        std::env::set_var("ALFF_TIMEOUT", "12");
        std::env::set_var("ALFF_POPULATION", "east_asian,total");

        let parsed = Args::try_parse_from(["alff", "-i", "x"]);

        std::env::remove_var("ALFF_TIMEOUT");
        std::env::remove_var("ALFF_POPULATION");

        let config = parsed.unwrap().into_config().unwrap();
        assert_eq!(config.client.timeout, Duration::from_secs(12));
        let accessions: Vec<&str> = config.populations.iter().map(|p| p.accession()).collect();
        assert_eq!(accessions, vec!["SAMN10492697", "SAMN10492705"]);
    }
}
