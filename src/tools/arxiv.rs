// SPDX-License-Identifier: MIT

//! arXiv export API client

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::SearchTool;
use crate::error::ScholarError;

const ARXIV_API_URL: &str = "https://export.arxiv.org/api/query";

/// Query parameters for the arXiv export API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxivParams {
    /// Number of results to fetch
    pub top_k_results: usize,
    /// Queries longer than this are truncated before sending
    pub max_query_length: usize,
}

impl Default for ArxivParams {
    fn default() -> Self {
        Self {
            top_k_results: 3,
            max_query_length: 300,
        }
    }
}

/// One paper entry from an arXiv Atom feed
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArxivEntry {
    pub title: String,
    pub summary: String,
    pub link: String,
    pub published: String,
}

/// Fetches paper metadata from arXiv
pub struct ArxivTool {
    client: Client,
    params: ArxivParams,
}

impl ArxivTool {
    pub fn new(params: ArxivParams) -> Self {
        Self {
            client: Client::new(),
            params,
        }
    }

    /// Parse an Atom feed into paper entries
    fn parse_feed(feed: &str) -> Vec<ArxivEntry> {
        extract_all(feed, "entry")
            .into_iter()
            .map(|entry| ArxivEntry {
                title: extract_one(entry, "title"),
                summary: extract_one(entry, "summary"),
                link: extract_one(entry, "id"),
                published: extract_one(entry, "published"),
            })
            .collect()
    }
}

impl Default for ArxivTool {
    fn default() -> Self {
        Self::new(ArxivParams::default())
    }
}

#[async_trait]
impl SearchTool for ArxivTool {
    fn name(&self) -> &str {
        "arxiv_search"
    }

    async fn search(&self, query: &str) -> Result<Value, ScholarError> {
        let query: String = query.chars().take(self.params.max_query_length).collect();

        let mut url = reqwest::Url::parse(ARXIV_API_URL)?;
        url.query_pairs_mut()
            .append_pair("search_query", &format!("all:{}", query))
            .append_pair("start", "0")
            .append_pair("max_results", &self.params.top_k_results.to_string());

        log::info!("arXiv query: {}", query);

        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            let text = resp.text().await?;
            return Err(ScholarError::api("arxiv", text));
        }

        let feed = resp.text().await?;
        let entries = Self::parse_feed(&feed);
        log::info!("arXiv returned {} entries", entries.len());

        Ok(serde_json::json!({ "query": query, "entries": entries }))
    }
}

/// Collect the inner text of every `<tag>...</tag>` occurrence
fn extract_all<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    let open = format!("<{}>", tag);
    let close = format!("</{}>", tag);
    let mut out = Vec::new();
    let mut rest = xml;
    while let Some(start) = rest.find(&open) {
        let body = &rest[start + open.len()..];
        let Some(end) = body.find(&close) else { break };
        out.push(&body[..end]);
        rest = &body[end + close.len()..];
    }
    out
}

/// Inner text of the first `<tag>...</tag>` occurrence, whitespace-collapsed
fn extract_one(xml: &str, tag: &str) -> String {
    let text = extract_all(xml, tag).first().copied().unwrap_or("");
    unescape(text)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
