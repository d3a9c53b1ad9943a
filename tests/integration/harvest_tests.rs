//! End-to-end harvest runs against a mock court directory

use crate::common::{
    create_test_config, detail_page, detail_path, listing_page, listing_path, mount_document,
    mount_page, request_count,
};
use putusan_harvest::config::load_config_with_hash;
use putusan_harvest::state::FieldValue;
use putusan_harvest::storage::{CheckpointStore, CsvCheckpoint};
use putusan_harvest::{run_harvest, RunOptions};
use std::io::Write;
use wiremock::MockServer;

/// Mounts a two-page listing with five decisions for `source`
///
/// Decisions 1-3 have documents, 4 links to a missing document and 5 has no
/// document link at all.
async fn mount_two_page_source(server: &MockServer, source: &str) {
    mount_page(server, &listing_path(source, 1), listing_page(&["a", "b", "c"], true)).await;
    mount_page(server, &listing_path(source, 2), listing_page(&["d", "e"], false)).await;

    for (name, n) in [("a", 1), ("b", 2), ("c", 3), ("d", 4)] {
        let number = format!("{}/Pdt.G/2019/PA.Sby", n);
        let href = format!("/files/{}.pdf", n);
        mount_page(server, &detail_path(name), detail_page(&number, Some(&href))).await;
    }
    mount_page(server, &detail_path("e"), detail_page("5/Pdt.G/2019/PA.Sby", None)).await;

    for n in 1..=3 {
        mount_document(server, &format!("/files/{}.pdf", n)).await;
    }
}

#[tokio::test]
async fn test_full_harvest_two_page_listing() {
    let server = MockServer::start().await;
    mount_two_page_source(&server, "pa-surabaya").await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-surabaya"]);
    let checkpoint_path = config.checkpoint_path();

    let report = run_harvest(config, RunOptions::default())
        .await
        .expect("Harvest failed");

    // Crawl stage
    assert_eq!(report.crawl.pages, 2);
    assert_eq!(report.crawl.links, 5);
    assert_eq!(report.crawl.records, 5);
    assert!(report.crawl.sources_abandoned.is_empty());

    // Checkpoint keeps discovery order
    let records = CsvCheckpoint::new(&checkpoint_path).load().unwrap();
    let numbers: Vec<&str> = records
        .iter()
        .map(|r| r.field("case_number").as_text().unwrap())
        .collect();
    assert_eq!(
        numbers,
        vec![
            "1/Pdt.G/2019/PA.Sby",
            "2/Pdt.G/2019/PA.Sby",
            "3/Pdt.G/2019/PA.Sby",
            "4/Pdt.G/2019/PA.Sby",
            "5/Pdt.G/2019/PA.Sby"
        ]
    );
    assert_eq!(records[0].source, "pa-surabaya");
    assert_eq!(records[0].category, "putus");
    assert_eq!(records[0].year, 2019);
    assert_eq!(
        records[0].document_url,
        FieldValue::Text(format!("{}/files/1.pdf", server.uri()))
    );
    assert_eq!(records[4].document_url, FieldValue::NotFound);
    assert_eq!(records[0].field("issuing_body").as_text(), Some("PA SURABAYA"));
    assert_eq!(records[0].field("registration_date"), &FieldValue::NotFound);

    // Download stage
    assert_eq!((report.ok, report.failed, report.skipped), (3, 1, 1));
    let archive = dir.path().join("pdf");
    for n in 1..=3 {
        let file = archive.join(format!("{}_Pdt~G_2019_PA~Sby.pdf", n));
        let body = std::fs::read_to_string(&file).unwrap();
        assert_eq!(body, format!("%PDF-1.4 /files/{}.pdf", n));
    }
    assert!(!archive.join("4_Pdt~G_2019_PA~Sby.pdf").exists());

    // Run log has one line per record plus header and summary
    let log = std::fs::read_to_string(report.log_path.unwrap()).unwrap();
    let entries: Vec<&str> = log.lines().filter(|l| !l.starts_with('#')).collect();
    assert_eq!(entries.len(), 5);
    assert!(entries
        .iter()
        .any(|l| l.contains("\tFAILED\t4/Pdt.G/2019/PA.Sby\tHTTP 404")));
    assert!(entries
        .iter()
        .any(|l| l.contains("\tSKIPPED\t5/Pdt.G/2019/PA.Sby\tinvalid url")));
    assert!(log.contains("# total=5 ok=3 failed=1 skipped=1"));
}

#[tokio::test]
async fn test_rerun_uses_checkpoint_and_archive() {
    let server = MockServer::start().await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a", "b"], false)).await;
    let detail_1 = detail_page("1/Pdt.P/2019/PA.A", Some("/files/1.pdf"));
    mount_page(&server, &detail_path("a"), detail_1).await;
    let detail_2 = detail_page("2/Pdt.P/2019/PA.A", Some("/files/2.pdf"));
    mount_page(&server, &detail_path("b"), detail_2).await;
    mount_document(&server, "/files/1.pdf").await;
    mount_document(&server, "/files/2.pdf").await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&server.uri(), dir.path(), &["pa-a"]);

    let first = run_harvest(config.clone(), RunOptions::default()).await.unwrap();
    assert_eq!(first.ok, 2);
    let requests_after_first = request_count(&server).await;
    assert_eq!(requests_after_first, 5);

    let second = run_harvest(config, RunOptions::default()).await.unwrap();

    assert_eq!(request_count(&server).await, requests_after_first);
    assert!(second.crawl.from_checkpoint);
    assert_eq!(second.crawl.records, 2);
    assert_eq!((second.ok, second.failed, second.skipped), (0, 0, 2));
}

#[tokio::test]
async fn test_config_file_drives_run() {
    let server = MockServer::start().await;
    mount_page(&server, &listing_path("pa-a", 1), listing_page(&["a"], false)).await;
    let detail_9 = detail_page("9/Pdt.G/2019/PA.A", Some("/files/9.pdf"));
    mount_page(&server, &detail_path("a"), detail_9).await;
    mount_document(&server, "/files/9.pdf").await;

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().display().to_string().replace('\\', "/");
    let toml = format!(
        r#"
[run]
sources = ["pa-a"]
category = "putus"
year = 2019
directory = "perdata-agama"

[site]
listing-url-template = "{uri}/direktori/{{source}}/{{directory}}/{{category}}/{{year}}/page/{{page}}.html"

[crawler]
retry-delay = {{ min-ms = 0, max-ms = 0 }}
page-delay = {{ min-ms = 0, max-ms = 0 }}
detail-delay = {{ min-ms = 0, max-ms = 0 }}

[output]
checkpoint-dir = "{root}/csv"
checkpoint-format = "sqlite"
archive-dir = "{root}/pdf"
log-dir = "{root}/logs"
"#,
        uri = server.uri(),
        root = root
    );
    let config_path = dir.path().join("harvest.toml");
    std::fs::File::create(&config_path)
        .unwrap()
        .write_all(toml.as_bytes())
        .unwrap();

    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let options = RunOptions {
        config_hash: hash.clone(),
        ..RunOptions::default()
    };
    let report = run_harvest(config, options).await.unwrap();

    assert_eq!(report.ok, 1);
    assert!(report.checkpoint_path.ends_with("records_putus_2019.db"));
    assert!(dir.path().join("pdf").join("9_Pdt~G_2019_PA~A.pdf").is_file());

    let log = std::fs::read_to_string(report.log_path.unwrap()).unwrap();
    assert!(log.contains(&format!("# config {}", hash)));
}
