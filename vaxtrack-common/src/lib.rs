//! Common types and utilities shared across vaxtrack crates.
//!
//! This crate defines the vaccination record that flows from the sources to
//! the store, the shared error taxonomy, and the observability helpers. It is
//! kept dependency-light so every crate in the workspace can depend on it.
//!
//! # Overview
//!
//! - [`VaccinationRecord`]: one day of cumulative counts for one location
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`IngestError`] and [`Result`]: Shared error handling
//!
//! # Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use vaxtrack_common::VaccinationRecord;
//!
//! let record = VaccinationRecord {
//!     location: "Hong Kong".into(),
//!     date: NaiveDate::from_ymd_opt(2021, 3, 15).unwrap(),
//!     vaccine: "Pfizer/BioNTech, Sinovac".into(),
//!     source_url: "https://www.info.gov.hk/gia/general/202103/15/P1.htm".into(),
//!     total_vaccinations: 1000,
//!     people_vaccinated: 400,
//!     people_fully_vaccinated: 600,
//! };
//! assert_eq!(record.key(), ("Hong Kong", record.date));
//! ```
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod observability;

/// Cumulative vaccination counts for one location on one calendar day.
///
/// Field order is the column order of the persisted dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaccinationRecord {
    pub location: String,
    /// Serialized as ISO `YYYY-MM-DD`.
    pub date: NaiveDate,
    /// Comma-separated vaccine brand names.
    pub vaccine: String,
    pub source_url: String,
    pub total_vaccinations: u64,
    pub people_vaccinated: u64,
    pub people_fully_vaccinated: u64,
}

impl VaccinationRecord {
    /// The `(location, date)` pair a store keys this record by.
    pub fn key(&self) -> (&str, NaiveDate) {
        (self.location.as_str(), self.date)
    }
}

/// Error types used across the ingestion pipeline.
#[derive(thiserror::Error, Debug)]
pub enum IngestError {
    /// Fetch failure, non-success status, or timeout.
    #[error("Network error: {0}")]
    Network(String),

    /// An expected link or page element is absent.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A pattern did not match or produced an unparsable count.
    #[error("Extraction error: {0}")]
    Extraction(String),

    /// The extracted counts contradict each other.
    #[error("Consistency error: {0}")]
    Consistency(String),

    /// Configuration or command-line input was invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The record store failed to read or write.
    #[error("Store error: {0}")]
    Store(String),
}

/// Convenient alias for results that use [`IngestError`].
pub type Result<T> = std::result::Result<T, IngestError>;
