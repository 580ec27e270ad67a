use scraper::{CaseSensitivity, ElementRef, Html, Selector};
use std::sync::LazyLock;
use vaxtrack_common::{IngestError, Result};

static ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a").expect("anchor selector"));

/// Which index entry points at the vaccination bulletin.
#[derive(Debug, Clone)]
pub struct LinkRule {
    /// Class the anchor must carry (matched case-sensitively).
    pub class: String,
    /// Phrase the anchor's visible text must contain.
    pub marker: String,
}

/// Absolute URL of the first matching anchor: `origin` followed by its `href`.
pub fn resolve_release_link(doc: &Html, rule: &LinkRule, origin: &str) -> Result<String> {
    let anchor = doc
        .select(&ANCHOR)
        .filter(|a| a.value().has_class(&rule.class, CaseSensitivity::CaseSensitive))
        .find(|a| visible_text(a).contains(&rule.marker))
        .ok_or_else(|| {
            IngestError::NotFound(format!(
                "no a.{} link containing {:?} on the index page",
                rule.class, rule.marker
            ))
        })?;

    let href = anchor.value().attr("href").ok_or_else(|| {
        IngestError::NotFound(format!("link {:?} has no href", visible_text(&anchor)))
    })?;

    Ok(format!("{origin}{href}"))
}

/// Concatenated text of `el` with whitespace runs collapsed to one space.
pub(crate) fn visible_text(el: &ElementRef<'_>) -> String {
    let raw: String = el.text().collect();
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule() -> LinkRule {
        LinkRule {
            class: "NEW".into(),
            marker: "COVID-19 Vaccination Programme".into(),
        }
    }

    const INDEX: &str = r#"
        <ul>
          <li><a class="NEW" href="/gia/general/202103/15/P2021031500401.htm">Tender results of Government Bonds</a></li>
          <li><a href="/gia/general/202103/15/P2021031500500.htm">Update on COVID-19 Vaccination Programme (archived)</a></li>
          <li><a class="NEW" href="/gia/general/202103/15/P2021031500693.htm">Update on
              COVID-19   Vaccination Programme</a></li>
          <li><a class="NEW" href="/gia/general/202103/15/P2021031500999.htm">COVID-19 Vaccination Programme briefing</a></li>
        </ul>"#;

    #[test]
    fn picks_first_new_anchor_with_marker() {
        let doc = Html::parse_document(INDEX);
        let url = resolve_release_link(&doc, &rule(), "https://www.info.gov.hk").unwrap();
        assert_eq!(
            url,
            "https://www.info.gov.hk/gia/general/202103/15/P2021031500693.htm"
        );
    }

    #[test]
    fn missing_marker_is_not_found() {
        let doc = Html::parse_document(
            r#"<a class="NEW" href="/gia/general/202103/15/P1.htm">Weather report</a>"#,
        );
        let err = resolve_release_link(&doc, &rule(), "https://www.info.gov.hk").unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)), "{err:?}");
    }

    #[test]
    fn anchor_without_href_is_not_found() {
        let doc = Html::parse_document(r#"<a class="NEW">COVID-19 Vaccination Programme</a>"#);
        let err = resolve_release_link(&doc, &rule(), "https://www.info.gov.hk").unwrap_err();
        assert!(matches!(err, IngestError::NotFound(_)), "{err:?}");
    }

    #[test]
    fn class_token_among_several_matches() {
        let doc = Html::parse_document(
            r#"<a class="item NEW" href="/x.htm">COVID-19 Vaccination Programme</a>"#,
        );
        let url = resolve_release_link(&doc, &rule(), "http://localhost").unwrap();
        assert_eq!(url, "http://localhost/x.htm");
    }

    #[test]
    fn href_is_appended_verbatim() {
        let doc = Html::parse_document(
            r#"<a class="NEW" href="/gia/x.htm?lang=en ">COVID-19 Vaccination Programme</a>"#,
        );
        let url = resolve_release_link(&doc, &rule(), "https://www.info.gov.hk").unwrap();
        assert_eq!(url, "https://www.info.gov.hk/gia/x.htm?lang=en ");
    }
}
