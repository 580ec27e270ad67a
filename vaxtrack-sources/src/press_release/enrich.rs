use chrono::NaiveDate;
use vaxtrack_common::{IngestError, Result, VaccinationRecord};

use super::extract::DoseCounts;

/// Constant metadata a source attaches to every record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMeta {
    pub location: String,
    pub vaccine: String,
}

/// Doses beyond the first, counted as completed regimens.
pub fn fully_vaccinated(counts: DoseCounts) -> Result<u64> {
    counts
        .total_vaccinations
        .checked_sub(counts.people_vaccinated)
        .ok_or_else(|| {
            IngestError::Consistency(format!(
                "people_vaccinated ({}) exceeds total_vaccinations ({})",
                counts.people_vaccinated, counts.total_vaccinations
            ))
        })
}

pub fn enrich(
    counts: DoseCounts,
    meta: &SourceMeta,
    date: NaiveDate,
    source_url: String,
) -> Result<VaccinationRecord> {
    Ok(VaccinationRecord {
        location: meta.location.clone(),
        date,
        vaccine: meta.vaccine.clone(),
        source_url,
        total_vaccinations: counts.total_vaccinations,
        people_vaccinated: counts.people_vaccinated,
        people_fully_vaccinated: fully_vaccinated(counts)?,
    })
}
