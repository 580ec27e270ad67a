//! Vaccination data sources used by vaxtrack.
//!
//! Each source turns a reference date into a complete [`VaccinationRecord`].
//! Currently only the government press-release pipeline is implemented
//! ([`press_release`]); its locator, link resolver, extractor, and enricher
//! are pure functions so they can be tested without the network.
use async_trait::async_trait;
use chrono::NaiveDate;
use vaxtrack_common::{IngestError, Result, VaccinationRecord};
use vaxtrack_http::HttpError;

pub mod press_release;

pub use press_release::PressReleaseSource;

#[async_trait]
pub trait VaccinationSource: Send + Sync {
    /// Identifier from configuration, used in logs.
    fn id(&self) -> &str;

    /// Location every record from this source is filed under.
    fn location(&self) -> &str;

    /// Build the record for `date`. Nothing is persisted.
    async fn fetch(&self, date: NaiveDate) -> Result<VaccinationRecord>;
}

pub(crate) fn http_to_ingest(e: HttpError) -> IngestError {
    IngestError::Network(format!("{e}"))
}
