use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use vaxtrack_common::{IngestError, Result};

use super::resolve::visible_text;

static PRESS_RELEASE: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#pressrelease").expect("press release selector"));

static TOTAL_DOSES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"about ([\d\s]+) doses of COVID-19 vaccines have been administered")
        .expect("total doses pattern")
});

static FIRST_DOSE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Among them, about ([\d\s]+) persons (have )?received their first dose")
        .expect("first dose pattern")
});

/// The two counts a bulletin states directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DoseCounts {
    pub total_vaccinations: u64,
    pub people_vaccinated: u64,
}

/// Digits of `raw` as an integer; separators of any kind are dropped.
///
/// `None` when no digit is present or the value overflows `u64`.
pub fn clean_count(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Cumulative doses administered, e.g. from
/// `"about 1 234 567 doses of COVID-19 vaccines have been administered"`.
pub fn parse_total_vaccinations(text: &str) -> Option<u64> {
    capture_count(&TOTAL_DOSES, text)
}

/// People with a first dose, e.g. from
/// `"Among them, about 500 000 persons have received their first dose"`.
pub fn parse_people_vaccinated(text: &str) -> Option<u64> {
    capture_count(&FIRST_DOSE, text)
}

fn capture_count(re: &Regex, text: &str) -> Option<u64> {
    let caps = re.captures(text)?;
    clean_count(caps.get(1)?.as_str())
}

/// Both counts from the bulletin's prose; whitespace is normalised first.
pub fn counts_from_text(text: &str) -> Result<DoseCounts> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let total_vaccinations = parse_total_vaccinations(&text).ok_or_else(|| {
        IngestError::Extraction("total doses statement not found or unparsable".into())
    })?;
    let people_vaccinated = parse_people_vaccinated(&text).ok_or_else(|| {
        IngestError::Extraction("first dose statement not found or unparsable".into())
    })?;
    Ok(DoseCounts {
        total_vaccinations,
        people_vaccinated,
    })
}

/// Counts from the `#pressrelease` element of a bulletin page.
pub fn extract_counts(doc: &Html) -> Result<DoseCounts> {
    let body = doc
        .select(&PRESS_RELEASE)
        .next()
        .ok_or_else(|| IngestError::Extraction("element #pressrelease is missing".into()))?;
    counts_from_text(&visible_text(&body))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_with_space_separators() {
        let text = "about 1 234 567 doses of COVID-19 vaccines have been administered";
        assert_eq!(parse_total_vaccinations(text), Some(1_234_567));
    }

    #[test]
    fn first_dose_with_and_without_have() {
        assert_eq!(
            parse_people_vaccinated(
                "Among them, about 500 000 persons have received their first dose"
            ),
            Some(500_000)
        );
        assert_eq!(
            parse_people_vaccinated("Among them, about 4 200 persons received their first dose"),
            Some(4_200)
        );
    }

    #[test]
    fn clean_count_edge_cases() {
        assert_eq!(clean_count(" 12 345 "), Some(12_345));
        assert_eq!(clean_count("   "), None);
        assert_eq!(clean_count("99999999999999999999999"), None);
    }

    #[test]
    fn counts_from_wrapped_prose() {
        let text = "As at 8pm yesterday, about 402\u{a0}300 doses of COVID-19\n vaccines have been \
                    administered for members of the public. Among them, about 250 100 persons \
                    have received their first dose.";
        let counts = counts_from_text(text).unwrap();
        assert_eq!(counts.total_vaccinations, 402_300);
        assert_eq!(counts.people_vaccinated, 250_100);
    }

    #[test]
    fn missing_statement_is_extraction_error() {
        let err = counts_from_text("about 10 doses of COVID-19 vaccines have been administered")
            .unwrap_err();
        assert!(matches!(err, IngestError::Extraction(_)), "{err:?}");
    }

    #[test]
    fn missing_element_is_extraction_error() {
        let doc = Html::parse_document("<div id=\"content\">nothing here</div>");
        let err = extract_counts(&doc).unwrap_err();
        assert!(matches!(err, IngestError::Extraction(_)), "{err:?}");
    }

    #[test]
    fn reads_only_the_press_release_element() {
        let doc = Html::parse_document(
            r#"<html><body>
            <div id="sidebar">about 1 doses of COVID-19 vaccines have been administered</div>
            <div id="pressrelease"><p>Up to 8pm, about 1 000 doses of COVID-19 vaccines have been
            administered.</p><p>Among them, about 800 persons received their first dose.</p></div>
            </body></html>"#,
        );
        let counts = extract_counts(&doc).unwrap();
        assert_eq!(
            counts,
            DoseCounts {
                total_vaccinations: 1_000,
                people_vaccinated: 800
            }
        );
    }
}
