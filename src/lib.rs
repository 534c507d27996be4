// ==============================================================================
// lib.rs - Allele Frequency Finder Library
// ==============================================================================
// Description: Library interface for ALFA allele frequency lookup modules
// Author: Matt Barham
// Created: 2026-10-19
// Modified: 2026-10-19
// Version: 1.0.0
// ==============================================================================

pub mod parsers;
pub mod models;
pub mod config;
pub mod client;
pub mod frequency;
pub mod processor;
pub mod output;

#[cfg(test)]
pub(crate) mod test_support;
