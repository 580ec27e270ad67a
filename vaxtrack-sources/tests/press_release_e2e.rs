mod common;

use chrono::NaiveDate;
use vaxtrack_common::IngestError;
use vaxtrack_sources::VaccinationSource;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{RELEASE_PATH, index_page, release_page, source_for};

fn march_15() -> NaiveDate {
    NaiveDate::from_ymd_opt(2021, 3, 15).unwrap()
}

async fn mount_html(server: &MockServer, at: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/html; charset=utf-8")
                .set_body_string(body),
        )
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn builds_record_from_index_and_release() {
    let server = MockServer::start().await;
    mount_html(&server, "/gia/general/202103/15.htm", index_page(RELEASE_PATH)).await;
    mount_html(&server, RELEASE_PATH, release_page("1 234 567", "500 000")).await;

    let source = source_for(&server);
    let record = source.fetch(march_15()).await.unwrap();

    assert_eq!(record.location, "Hong Kong");
    assert_eq!(record.date, march_15());
    assert_eq!(record.vaccine, "Pfizer/BioNTech, Sinovac");
    assert_eq!(record.source_url, format!("{}{}", server.uri(), RELEASE_PATH));
    assert_eq!(record.total_vaccinations, 1_234_567);
    assert_eq!(record.people_vaccinated, 500_000);
    assert_eq!(record.people_fully_vaccinated, 734_567);
}

#[tokio::test]
async fn release_url_is_origin_plus_href() {
    let server = MockServer::start().await;
    mount_html(&server, "/gia/general/202103/15.htm", index_page(RELEASE_PATH)).await;

    let url = source_for(&server).release_url(march_15()).await.unwrap();
    assert_eq!(url, format!("{}{}", server.uri(), RELEASE_PATH));
}

#[tokio::test]
async fn index_without_bulletin_is_not_found() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/gia/general/202103/15.htm",
        r#"<html><body><a class="NEW" href="/x.htm">Weather</a></body></html>"#.to_string(),
    )
    .await;

    let err = source_for(&server).fetch(march_15()).await.unwrap_err();
    assert!(matches!(err, IngestError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn inconsistent_counts_are_rejected() {
    let server = MockServer::start().await;
    mount_html(&server, "/gia/general/202103/15.htm", index_page(RELEASE_PATH)).await;
    mount_html(&server, RELEASE_PATH, release_page("300", "400")).await;

    let err = source_for(&server).fetch(march_15()).await.unwrap_err();
    assert!(matches!(err, IngestError::Consistency(_)), "{err:?}");
}

#[tokio::test]
async fn reworded_release_is_extraction_error() {
    let server = MockServer::start().await;
    mount_html(&server, "/gia/general/202103/15.htm", index_page(RELEASE_PATH)).await;
    mount_html(
        &server,
        RELEASE_PATH,
        r#"<div id="pressrelease">Vaccination figures will be published tomorrow.</div>"#
            .to_string(),
    )
    .await;

    let err = source_for(&server).fetch(march_15()).await.unwrap_err();
    assert!(matches!(err, IngestError::Extraction(_)), "{err:?}");
}

#[tokio::test]
async fn missing_index_page_is_network_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = source_for(&server).fetch(march_15()).await.unwrap_err();
    assert!(matches!(err, IngestError::Network(_)), "{err:?}");
}
