//! Best-effort lookup of a linked page's title, used to name likes.

use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, warn};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);
const USER_AGENT: &str = concat!("micropub-bridge/", env!("CARGO_PKG_VERSION"));

/// Fetches a human-readable title for a URL.
#[async_trait]
pub trait TitleFetcher: Send + Sync {
    /// `Ok(None)` when the page has no recognizable title.
    async fn fetch_title(&self, url: &str) -> Result<Option<String>>;
}

/// Look up a title, logging and discarding any failure.
pub async fn fetch_linked_title(fetcher: &dyn TitleFetcher, url: &str) -> Option<String> {
    match fetcher.fetch_title(url).await {
        Ok(title) => {
            debug!(url, found = title.is_some(), "fetched linked title");
            title
        }
        Err(error) => {
            warn!(url, error = %format!("{error:#}"), "could not fetch linked title");
            None
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpTitleFetcher {
    client: reqwest::Client,
}

impl HttpTitleFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TitleFetcher for HttpTitleFetcher {
    async fn fetch_title(&self, url: &str) -> Result<Option<String>> {
        let url = url::Url::parse(url).with_context(|| format!("invalid url: {url}"))?;
        let body = self
            .client
            .get(url.clone())
            .send()
            .await
            .with_context(|| format!("request failed for {url}"))?
            .error_for_status()
            .with_context(|| format!("unexpected status for {url}"))?
            .text()
            .await
            .with_context(|| format!("failed to read body of {url}"))?;
        Ok(extract_title(&body))
    }
}

/// Never finds a title. For offline use and tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopTitleFetcher;

#[async_trait]
impl TitleFetcher for NoopTitleFetcher {
    async fn fetch_title(&self, _url: &str) -> Result<Option<String>> {
        Ok(None)
    }
}

struct TitlePatterns {
    og_title: Regex,
    og_title_reversed: Regex,
    title: Regex,
    h1: Regex,
    tag: Regex,
    entity: Regex,
}

fn build_title_patterns() -> Option<TitlePatterns> {
    Some(TitlePatterns {
        og_title: Regex::new(
            r#"(?is)<meta\s[^>]*property\s*=\s*["']og:title["'][^>]*content\s*=\s*"([^"]*)""#,
        )
        .ok()?,
        og_title_reversed: Regex::new(
            r#"(?is)<meta\s[^>]*content\s*=\s*"([^"]*)"[^>]*property\s*=\s*["']og:title["']"#,
        )
        .ok()?,
        title: Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?,
        h1: Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").ok()?,
        tag: Regex::new(r"<[^>]*>").ok()?,
        entity: Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[a-zA-Z]+);").ok()?,
    })
}

fn title_patterns() -> Option<&'static TitlePatterns> {
    static PATTERNS: OnceLock<Option<TitlePatterns>> = OnceLock::new();
    PATTERNS.get_or_init(build_title_patterns).as_ref()
}

fn decode_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
        return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
    }
    if let Some(decimal) = entity.strip_prefix('#') {
        return decimal.parse().ok().and_then(char::from_u32);
    }
    Some(match entity {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => ' ',
        "mdash" => '\u{2014}',
        "ndash" => '\u{2013}',
        "hellip" => '\u{2026}',
        _ => return None,
    })
}

fn clean_text(raw: &str, patterns: &TitlePatterns) -> String {
    let stripped = patterns.tag.replace_all(raw, "");
    let decoded = patterns.entity.replace_all(&stripped, |caps: &regex::Captures<'_>| {
        decode_entity(&caps[1]).map_or_else(|| caps[0].to_string(), String::from)
    });
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Pick the best title in an HTML document: `og:title`, then `<title>`,
/// then the first `<h1>`.
pub fn extract_title(html: &str) -> Option<String> {
    let patterns = title_patterns()?;
    [
        &patterns.og_title,
        &patterns.og_title_reversed,
        &patterns.title,
        &patterns.h1,
    ]
    .into_iter()
    .filter_map(|pattern| pattern.captures(html))
    .map(|caps| clean_text(&caps[1], patterns))
    .find(|title| !title.is_empty())
}
