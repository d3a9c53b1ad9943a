//! Error budgets and retry behaviour over real HTTP

use crate::common::{
    create_test_config, detail_page, detail_path, listing_page, listing_path, mount_document,
    mount_page,
};
use putusan_harvest::config::TemplateConfig;
use putusan_harvest::crawler::{HttpFetcher, PaginationCrawler};
use putusan_harvest::extract::SiteTemplate;
use putusan_harvest::state::CrawlState;
use putusan_harvest::{run_harvest, HarvestError, RunOptions};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_listing_recovers_after_three_503s() {
    let server = MockServer::start().await;

    // Mocks are matched in mount order; the 503s stop matching after three hits
    Mock::given(method("GET"))
        .and(path(listing_path("pa-a", 1)))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(3)
        .expect(3)
        .mount(&server)
        .await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a", "b"], false)).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&server.uri(), dir.path(), &["pa-a"]);
    config.crawler.max_consecutive_errors = 5;

    let fetcher = HttpFetcher::from_config(&config.http).unwrap();
    let template = SiteTemplate::from_config(&TemplateConfig::default()).unwrap();
    let crawler = PaginationCrawler::new(
        &fetcher,
        &template,
        &config.site,
        &config.crawler,
        config.http.page_timeout(),
    );

    let source = config.sources().remove(0);
    let crawl = crawler.crawl(&source).await;

    assert_eq!(crawl.state, CrawlState::Done);
    assert_eq!(crawl.pages_fetched, 1);
    assert_eq!(crawl.consecutive_failures, 0);
    assert_eq!(
        crawl.links,
        vec![
            format!("{}{}", server.uri(), detail_path("a")),
            format!("{}{}", server.uri(), detail_path("b"))
        ]
    );
}

#[tokio::test]
async fn test_abandoned_source_leaves_next_source_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path(listing_path("pa-down", 1)))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    mount_page(&server, &listing_path("pa-up", 1), listing_page(&["u"], false)).await;
    let detail = detail_page("1/Pdt.G/2019/PA.Up", Some("/files/u.pdf"));
    mount_page(&server, &detail_path("u"), detail).await;
    mount_document(&server, "/files/u.pdf").await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-down", "pa-up"]);

    let report = run_harvest(config, RunOptions::default()).await.unwrap();

    assert_eq!(report.crawl.sources, 2);
    assert_eq!(report.crawl.sources_abandoned, vec!["pa-down".to_string()]);
    assert_eq!(report.crawl.records, 1);
    assert_eq!(report.ok, 1);
}

#[tokio::test]
async fn test_failed_detail_page_skips_only_that_record() {
    let server = MockServer::start().await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a", "broken", "c"], false)).await;
    mount_page(&server, &detail_path("a"), detail_page("1/Pdt.G/2019/PA.A", None)).await;
    mount_page(&server, &detail_path("c"), detail_page("3/Pdt.G/2019/PA.A", None)).await;

    Mock::given(method("GET"))
        .and(path(detail_path("broken")))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-a"]);

    let options = RunOptions {
        crawl_only: true,
        ..RunOptions::default()
    };
    let report = run_harvest(config, options).await.unwrap();

    assert_eq!(report.crawl.links, 3);
    assert_eq!(report.crawl.records, 2);
    assert_eq!(report.crawl.detail_failures, 1);
    assert!(report.log_path.is_none());
}

#[tokio::test]
async fn test_document_retried_on_server_error() {
    let server = MockServer::start().await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a"], false)).await;
    let detail = detail_page("1/Pdt.G/2019/PA.A", Some("/files/1.pdf"));
    mount_page(&server, &detail_path("a"), detail).await;

    Mock::given(method("GET"))
        .and(path("/files/1.pdf"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_document(&server, "/files/1.pdf").await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-a"]);

    let report = run_harvest(config, RunOptions::default()).await.unwrap();

    assert_eq!(report.ok, 1);
    assert!(dir.path().join("pdf").join("1_Pdt~G_2019_PA~A.pdf").is_file());
    assert!(!dir.path().join("pdf").join("1_Pdt~G_2019_PA~A.pdf.part").exists());
}

#[tokio::test]
async fn test_unwritable_archive_stops_run() {
    let server = MockServer::start().await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a"], false)).await;
    let detail = detail_page("1/Pdt.G/2019/PA.A", Some("/files/1.pdf"));
    mount_page(&server, &detail_path("a"), detail).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-a"]);
    std::fs::write(&config.output.archive_dir, b"").unwrap();

    let result = run_harvest(config, RunOptions::default()).await;

    assert!(matches!(result, Err(HarvestError::Archive { .. })));
    // The checkpoint was written before the download stage failed
    assert!(dir.path().join("csv").join("records_putus_2019.csv").is_file());
}

#[tokio::test]
async fn test_decision_listed_twice_is_downloaded_once() {
    let server = MockServer::start().await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a"], true)).await;
    mount_page(&server, &listing_path("pa-a", 2), listing_page(&["a"], false)).await;
    let detail = detail_page("1/Pdt.G/2019/PA.A", Some("/files/1.pdf"));
    mount_page(&server, &detail_path("a"), detail).await;
    Mock::given(method("GET"))
        .and(path("/files/1.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"%PDF-1.4".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-a"]);

    let report = run_harvest(config, RunOptions::default()).await.unwrap();

    assert_eq!(report.crawl.records, 2);
    assert_eq!((report.ok, report.failed, report.skipped), (1, 0, 1));
}
