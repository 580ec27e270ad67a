//! Daily government press-release bulletin.
//!
//! Flow for one date: fetch the day's index page, find the bulletin link,
//! fetch the bulletin, pull both counts from its prose, then attach the
//! source's constant metadata. HTML is parsed inside synchronous helpers so
//! no parsed document is held across an `.await`.
use async_trait::async_trait;
use chrono::NaiveDate;
use scraper::Html;
use std::time::Duration;
use vaxtrack_common::{IngestError, Result, VaccinationRecord};
use vaxtrack_http::{HttpClient, RequestOpts};

use crate::{VaccinationSource, http_to_ingest};

mod enrich;
mod extract;
mod locate;
mod resolve;

pub use enrich::{SourceMeta, enrich, fully_vaccinated};
pub use extract::{
    DoseCounts, clean_count, counts_from_text, extract_counts, parse_people_vaccinated,
    parse_total_vaccinations,
};
pub use locate::index_url;
pub use resolve::{LinkRule, resolve_release_link};

pub struct PressReleaseSource {
    id: String,
    origin: String,
    meta: SourceMeta,
    rule: LinkRule,
    http: HttpClient,
}

impl PressReleaseSource {
    /// `origin` is scheme and host without a trailing slash.
    pub fn new(
        id: impl Into<String>,
        origin: impl Into<String>,
        meta: SourceMeta,
        rule: LinkRule,
        timeout: Duration,
    ) -> Result<Self> {
        let origin = origin.into();
        let http = HttpClient::new(&origin)
            .map_err(|e| IngestError::Config(format!("invalid origin {origin:?}: {e}")))?
            .with_timeout(timeout);
        Ok(Self {
            id: id.into(),
            origin,
            meta,
            rule,
            http,
        })
    }

    /// Absolute URL of the bulletin published on `date`.
    pub async fn release_url(&self, date: NaiveDate) -> Result<String> {
        let index = index_url(&self.origin, date);
        tracing::debug!(source = %self.id, %date, url = %index, "source.index.fetch");
        let page = self.get(&index).await?;
        let url = link_from_index(&page, &self.rule, &self.origin)?;
        tracing::info!(source = %self.id, %date, url = %url, "source.release.resolved");
        Ok(url)
    }

    pub async fn fetch_record(&self, date: NaiveDate) -> Result<VaccinationRecord> {
        tracing::info!(source = %self.id, %date, "source.fetch.start");
        let url = self.release_url(date).await?;
        let page = self.get(&url).await?;
        let counts = counts_from_release(&page)?;
        tracing::debug!(
            source = %self.id,
            total_vaccinations = counts.total_vaccinations,
            people_vaccinated = counts.people_vaccinated,
            "source.counts.extracted"
        );
        let record = enrich(counts, &self.meta, date, url).inspect_err(|e| {
            tracing::warn!(source = %self.id, %date, error = %e, "source.record.inconsistent");
        })?;
        tracing::info!(
            source = %self.id,
            location = %record.location,
            %date,
            total_vaccinations = record.total_vaccinations,
            people_vaccinated = record.people_vaccinated,
            people_fully_vaccinated = record.people_fully_vaccinated,
            "source.record.built"
        );
        Ok(record)
    }

    async fn get(&self, url: &str) -> Result<String> {
        let opts = RequestOpts {
            allow_absolute: true,
            ..Default::default()
        };
        let page = self.http.get_text(url, opts).await.map_err(http_to_ingest)?;
        Ok(page.body)
    }
}

fn link_from_index(body: &str, rule: &LinkRule, origin: &str) -> Result<String> {
    let doc = Html::parse_document(body);
    resolve_release_link(&doc, rule, origin)
}

fn counts_from_release(body: &str) -> Result<DoseCounts> {
    let doc = Html::parse_document(body);
    extract_counts(&doc)
}

#[async_trait]
impl VaccinationSource for PressReleaseSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn location(&self) -> &str {
        &self.meta.location
    }

    async fn fetch(&self, date: NaiveDate) -> Result<VaccinationRecord> {
        self.fetch_record(date).await
    }
}
