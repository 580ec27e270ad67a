#![allow(dead_code)]

use std::time::Duration;

use vaxtrack_sources::PressReleaseSource;
use vaxtrack_sources::press_release::{LinkRule, SourceMeta};
use wiremock::MockServer;

pub const RELEASE_PATH: &str = "/gia/general/202103/15/P2021031500693.htm";

pub fn index_page(release_href: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
<div id="contentBody">
  <ul>
    <li><a class="NEW" href="/gia/general/202103/15/P2021031500401.htm">Exchange Fund Bills tender results</a></li>
    <li><a class="NEW" href="{release_href}">Update on COVID-19 Vaccination Programme</a></li>
    <li><a href="/gia/general/202103/15/P2021031500300.htm">Speech by CE</a></li>
  </ul>
</div>
</body></html>"#
    )
}

pub fn release_page(total: &str, first_dose: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html><body>
<span id="PRHeadlineSpan">Update on COVID-19 Vaccination Programme</span>
<div id="pressrelease">
  The Government today (March 15) said that as at 8pm yesterday, about {total} doses of
  COVID-19 vaccines have been administered for members of the public.<br/><br/>
  Among them, about {first_dose} persons have received their first dose.
</div>
</body></html>"#
    )
}

pub fn source_for(server: &MockServer) -> PressReleaseSource {
    PressReleaseSource::new(
        "hong_kong",
        server.uri(),
        SourceMeta {
            location: "Hong Kong".into(),
            vaccine: "Pfizer/BioNTech, Sinovac".into(),
        },
        LinkRule {
            class: "NEW".into(),
            marker: "COVID-19 Vaccination Programme".into(),
        },
        Duration::from_secs(5),
    )
    .expect("source builds")
}
