// src/ingest/http.rs

//! Paged JSON build feed over HTTP
//!
//! The feed answers `GET <url>?cursor=<cursor>` with a page of the form
//! `{"records": [...], "next": "<cursor>"}`; a missing or null `next` marks
//! the end of the feed.

use super::source::{BuildBatch, BuildRecord, BuildSource};
use crate::error::{Error, Result};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Default timeout for HTTP requests (30 seconds)
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Default attempts per page
pub const DEFAULT_RETRIES: u32 = 3;

/// Base retry delay, multiplied by the attempt number
const RETRY_DELAY: Duration = Duration::from_millis(1000);

/// One page of the feed; records are decoded one by one
#[derive(Debug, Deserialize)]
struct FeedPage {
    records: Vec<serde_json::Value>,
    #[serde(default)]
    next: Option<String>,
}

/// Build records fetched page by page from an HTTP endpoint
pub struct HttpFeedSource {
    name: String,
    url: String,
    client: Client,
    max_retries: u32,
    retry_delay: Duration,
}

impl HttpFeedSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::InitError(format!("Failed to create HTTP client: {e}")))?;

        let url = url.into();
        Ok(Self {
            name: url.clone(),
            url,
            client,
            max_retries: DEFAULT_RETRIES,
            retry_delay: RETRY_DELAY,
        })
    }

    /// Store this feed's cursor under `name` instead of its URL
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries.max(1);
        self
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    fn fetch_once(&self, cursor: Option<&str>) -> std::result::Result<FeedPage, Attempt> {
        let mut request = self.client.get(&self.url);
        if let Some(cursor) = cursor {
            request = request.query(&[("cursor", cursor)]);
        }

        let response = request
            .send()
            .map_err(|e| Attempt::Retry(format!("Failed to fetch {}: {}", self.url, e)))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(Attempt::Retry(format!("HTTP {} from {}", status, self.url)));
        }
        if !status.is_success() {
            return Err(Attempt::Fatal(Error::SourceUnavailable(format!(
                "HTTP {} from {}",
                status, self.url
            ))));
        }

        response.json::<FeedPage>().map_err(|e| {
            Attempt::Fatal(Error::ParseError(format!(
                "Invalid feed page from {}: {}",
                self.url, e
            )))
        })
    }
}

/// Outcome of one failed request
enum Attempt {
    Retry(String),
    Fatal(Error),
}

impl BuildSource for HttpFeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, cursor: Option<&str>) -> Result<BuildBatch> {
        debug!("Fetching feed page {:?} from {}", cursor, self.url);

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.fetch_once(cursor) {
                // The last page keeps its own cursor so the next run re-polls it
                Ok(page) => {
                    let mut records = Vec::with_capacity(page.records.len());
                    let mut undecodable = 0;
                    for value in page.records {
                        match serde_json::from_value::<BuildRecord>(value) {
                            Ok(record) => records.push(record),
                            Err(e) => {
                                warn!("Skipping invalid build record from {}: {}", self.url, e);
                                undecodable += 1;
                            }
                        }
                    }
                    return Ok(BuildBatch {
                        records,
                        undecodable,
                        exhausted: page.next.is_none(),
                        next_cursor: page.next.or_else(|| cursor.map(str::to_string)),
                    });
                }
                Err(Attempt::Fatal(e)) => return Err(e),
                Err(Attempt::Retry(reason)) => {
                    if attempt >= self.max_retries {
                        return Err(Error::SourceUnavailable(format!(
                            "{} (after {} attempts)",
                            reason, attempt
                        )));
                    }
                    warn!("Feed fetch attempt {} failed: {}, retrying...", attempt, reason);
                    std::thread::sleep(self.retry_delay * attempt);
                }
            }
        }
    }
}
