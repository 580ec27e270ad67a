use anyhow::{Context, Result, bail};
use chrono::{DateTime, NaiveDate, Utc};
use std::time::Duration;
use vaxtrack_common::VaccinationRecord;
use vaxtrack_config::{SourceDetails, TimeZoneSpec, VaxtrackConfig};
use vaxtrack_sources::press_release::{LinkRule, SourceMeta};
use vaxtrack_sources::{PressReleaseSource, VaccinationSource};
use vaxtrack_store::{RecordStore, WriteOutcome};

/// Result of running one source.
#[derive(Debug)]
pub struct SourceRun {
    pub source_id: String,
    pub record: VaccinationRecord,
    /// `None` for dry runs.
    pub outcome: Option<WriteOutcome>,
}

/// Instantiate enabled sources, or only `only` when given.
pub fn build_sources(
    cfg: &VaxtrackConfig,
    only: Option<&str>,
) -> Result<Vec<Box<dyn VaccinationSource>>> {
    let timeout = Duration::from_secs(cfg.http.timeout_secs);
    let mut out: Vec<Box<dyn VaccinationSource>> = Vec::new();

    for spec in cfg
        .enabled_sources()
        .filter(|s| only.is_none_or(|id| s.id == id))
    {
        match &spec.details {
            SourceDetails::PressRelease { config } => {
                let source = PressReleaseSource::new(
                    spec.id.clone(),
                    config.origin.clone(),
                    SourceMeta {
                        location: config.location.clone(),
                        vaccine: config.vaccine.clone(),
                    },
                    LinkRule {
                        class: config.link_class.clone(),
                        marker: config.marker.clone(),
                    },
                    timeout,
                )
                .with_context(|| format!("building source {}", spec.id))?;
                out.push(Box::new(source));
            }
        }
    }

    if out.is_empty() {
        match only {
            Some(id) => bail!("no enabled source with id {id:?}"),
            None => bail!("no enabled sources configured"),
        }
    }
    Ok(out)
}

/// Date to ingest: the override if given, else yesterday in `tz`.
///
/// Dates after today in `tz` have no bulletin yet and are rejected.
pub fn reference_date(
    requested: Option<NaiveDate>,
    tz: TimeZoneSpec,
    now: DateTime<Utc>,
) -> Result<NaiveDate> {
    let today = tz.today(now);
    match requested {
        Some(date) if date > today => {
            bail!("date {date} is in the future (today is {today} in {tz})")
        }
        Some(date) => Ok(date),
        None => Ok(tz.yesterday(now)),
    }
}

/// Fetch every source in order and persist each record unless `store` is `None`.
///
/// The first failure aborts the run; records already written stay written.
pub async fn run(
    sources: &[Box<dyn VaccinationSource>],
    date: NaiveDate,
    store: Option<&dyn RecordStore>,
) -> Result<Vec<SourceRun>> {
    let mut runs = Vec::with_capacity(sources.len());
    for source in sources {
        let record = source
            .fetch(date)
            .await
            .with_context(|| format!("source {} failed for {date}", source.id()))?;

        let outcome = match store {
            Some(store) => Some(
                store
                    .increment(&record)
                    .with_context(|| format!("writing {} for {date}", source.location()))?,
            ),
            None => None,
        };

        runs.push(SourceRun {
            source_id: source.id().to_string(),
            record,
            outcome,
        });
    }
    Ok(runs)
}
