// ==============================================================================
// parsers/mod.rs - File parser modules
// ==============================================================================
// Description: Parsers for user-supplied SNP tables
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod variant_table;

pub use variant_table::{VariantTable, VariantTableParseError, VariantTableParser};
