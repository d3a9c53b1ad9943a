//! Test doubles shared by the crawler unit tests

use crate::config::{
    Config, CrawlerConfig, DelayRange, DownloadConfig, HttpConfig, OutputConfig, RunConfig,
    SiteConfig, TemplateConfig,
};
use crate::crawler::{FetchResult, PageFetcher};
use crate::download::{DocumentFetcher, DownloadError};
use crate::state::Source;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

pub const BASE: &str = "https://putusan.test";

/// Replays scripted responses per URL
///
/// Each URL answers from its queue first, then with its repeating response,
/// then with `Fatal(404)`.
#[derive(Default)]
pub struct ScriptedFetcher {
    queued: Mutex<HashMap<String, VecDeque<FetchResult>>>,
    repeating: HashMap<String, FetchResult>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, url: &str, results: Vec<FetchResult>) -> Self {
        self.queued
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .extend(results);
        self
    }

    pub fn always(mut self, url: &str, result: FetchResult) -> Self {
        self.repeating.insert(url.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> FetchResult {
        self.calls.lock().unwrap().push(url.to_string());

        if let Some(result) = self
            .queued
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
        {
            return result;
        }

        self.repeating
            .get(url)
            .cloned()
            .unwrap_or(FetchResult::Fatal(404))
    }
}

pub fn source(id: &str) -> Source {
    Source {
        id: id.to_string(),
        category: "regis".to_string(),
        year: 2018,
        directory: "perdata-agama".to_string(),
    }
}

pub fn listing_url(source: &str, page: u32) -> String {
    format!("{}/index/{}/page/{}.html", BASE, source, page)
}

pub fn detail_url(name: &str) -> String {
    format!("{}/putusan/{}.html", BASE, name)
}

/// A listing page in the default template's markup
pub fn listing_html(links: &[String], next: bool) -> String {
    let mut html = String::from("<html><body>");
    for link in links {
        html.push_str(&format!(
            r#"<div class="entry-c"><strong><a href="{}">Putusan</a></strong></div>"#,
            link
        ));
    }
    if next {
        html.push_str(r#"<ul class="pagination"><li><a rel="next" href="next">Next</a></li></ul>"#);
    }
    html.push_str("</body></html>");
    html
}

/// A detail page in the default template's markup
pub fn detail_html(number: &str, document: Option<&str>) -> String {
    let link = document
        .map(|href| format!(r#"<a href="{}">{}.pdf</a>"#, href, number))
        .unwrap_or_default();
    format!(
        "<html><body><table>\
         <tr><td>Nomor</td><td>{}</td></tr>\
         <tr><td>Klasifikasi</td><td>Perdata Agama</td></tr>\
         </table>{}</body></html>",
        number, link
    )
}

/// Configuration with every politeness delay disabled
pub fn test_config(dir: &Path, sources: &[&str]) -> Config {
    Config {
        run: RunConfig {
            sources: sources.iter().map(|s| s.to_string()).collect(),
            category: "regis".to_string(),
            year: 2018,
            directory: "perdata-agama".to_string(),
        },
        site: SiteConfig {
            listing_url_template: format!("{}/index/{{source}}/page/{{page}}.html", BASE),
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
            max_retries: 0,
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

/// Serves a small PDF body for every URL and records the requests
#[derive(Default)]
pub struct StaticDocuments {
    calls: Mutex<Vec<String>>,
}

impl StaticDocuments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DocumentFetcher for StaticDocuments {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        self.calls.lock().unwrap().push(url.to_string());
        Ok(b"%PDF-1.4 test".to_vec())
    }
}
