//! Shared fixtures for the integration tests

use putusan_harvest::config::{
    Config, CrawlerConfig, DelayRange, DownloadConfig, HttpConfig, OutputConfig, RunConfig,
    SiteConfig, TemplateConfig,
};
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a configuration pointed at the mock server, with no delays
pub fn create_test_config(server_uri: &str, dir: &Path, sources: &[&str]) -> Config {
    Config {
        run: RunConfig {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            category: "putus".to_string(),
            year: 2019,
            directory: "perdata-agama".to_string(),
        },
        site: SiteConfig {
            listing_url_template: format!(
                "{}/direktori/{{source}}/{{directory}}/{{category}}/{{year}}/page/{{page}}.html",
                server_uri
            ),
        },
        http: HttpConfig::default(),
        crawler: CrawlerConfig {
            max_consecutive_errors: 3,
            retry_delay: DelayRange::ZERO,
            page_delay: DelayRange::ZERO,
            detail_delay: DelayRange::ZERO,
        },
        download: DownloadConfig {
            workers: 4,
            max_retries: 1,
            backoff_factor_ms: 0,
            max_consecutive_failures: 100,
        },
        output: OutputConfig {
            checkpoint_dir: dir.join("csv"),
            checkpoint_format: Default::default(),
            archive_dir: dir.join("pdf"),
            log_dir: dir.join("logs"),
        },
        template: TemplateConfig::default(),
    }
}

/// Path of a listing page as the test template renders it
pub fn listing_path(source: &str, page: u32) -> String {
    format!(
        "/direktori/{}/perdata-agama/putus/2019/page/{}.html",
        source, page
    )
}

pub fn detail_path(name: &str) -> String {
    format!("/putusan/{}.html", name)
}

/// A listing page with relative detail links
pub fn listing_page(names: &[&str], has_next: bool) -> String {
    let mut html = String::from("<html><body><div class=\"list\">");
    for name in names {
        html.push_str(&format!(
            r#"<div class="entry-c"><strong><a href="{}">Putusan {}</a></strong></div>"#,
            detail_path(name),
            name
        ));
    }
    html.push_str("</div>");
    if has_next {
        html.push_str(
            r#"<ul class="pagination"><li><a rel="next" href="next.html">Next</a></li></ul>"#,
        );
    }
    html.push_str("</body></html>");
    html
}

/// A detail page in the court directory's layout
pub fn detail_page(number: &str, document_href: Option<&str>) -> String {
    let link = document_href
        .map(|href| format!(r#"<p><a href="{}">{}.pdf</a></p>"#, href, number))
        .unwrap_or_default();
    format!(
        r#"<html><body><table>
        <tr><td>Nomor</td><td>{}</td></tr>
        <tr><td>Klasifikasi</td><td>Perdata Agama</td></tr>
        <tr><td>Kata Kunci</td><td>Cerai Gugat</td></tr>
        <tr><td>Lembaga Peradilan</td><td>PA SURABAYA</td></tr>
        </table>{}</body></html>"#,
        number, link
    )
}

pub async fn mount_page(server: &MockServer, page_path: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page_path.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

pub async fn mount_document(server: &MockServer, document_path: &str) {
    Mock::given(method("GET"))
        .and(path(document_path.to_string()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(format!("%PDF-1.4 {}", document_path).into_bytes())
                .insert_header("content-type", "application/pdf"),
        )
        .mount(server)
        .await;
}

/// Number of requests the mock server has seen so far
pub async fn request_count(server: &MockServer) -> usize {
    server
        .received_requests()
        .await
        .map(|requests| requests.len())
        .unwrap_or(0)
}
