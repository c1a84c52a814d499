use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::api_types::{extract_hits, RawHit};
use crate::config::PipelineConfig;
use crate::error::LookupFailure;
use crate::limiter::CallLimiter;
use crate::models::{BackgroundSnippet, Topic};
use crate::similarity::normalized_title;

/// Query phrasings, one per lookup. Lookups beyond the list page through the
/// same phrasings.
pub const QUERY_TEMPLATES: &[&str] = &["{} 新闻 背景", "{} 最新进展", "{} 起因", "{}"];

const MAX_TITLE_CHARS: usize = 100;

/// Black-box background search. `page` is 0-based.
#[async_trait(?Send)]
pub trait SearchFetcher {
    async fn search(&self, query: &str, page: usize) -> Result<Vec<RawHit>, LookupFailure>;
}

/// The phrasing and page used by lookup number `index`.
pub fn lookup_plan(label: &str, index: usize) -> (String, usize) {
    let template = QUERY_TEMPLATES[index % QUERY_TEMPLATES.len()];
    (template.replace("{}", label), index / QUERY_TEMPLATES.len())
}

pub struct Collector {
    fetcher: Option<Arc<dyn SearchFetcher>>,
    limiter: CallLimiter,
    lookup_timeout: Duration,
}

impl Collector {
    /// `fetcher = None` disables background search; every topic then gets an
    /// empty snippet list.
    pub fn new(fetcher: Option<Arc<dyn SearchFetcher>>, limiter: CallLimiter, lookup_timeout: Duration) -> Self {
        Self {
            fetcher,
            limiter,
            lookup_timeout,
        }
    }

    pub fn from_config(fetcher: Option<Arc<dyn SearchFetcher>>, cfg: &PipelineConfig) -> Self {
        let fetcher = if cfg.enable_background_search { fetcher } else { None };
        Self::new(
            fetcher,
            CallLimiter::new("search", cfg.max_concurrent_searches),
            cfg.lookup_timeout(),
        )
    }

    pub fn limiter(&self) -> &CallLimiter {
        &self.limiter
    }

    async fn lookup(&self, fetcher: &dyn SearchFetcher, query: &str, page: usize) -> Result<Vec<RawHit>, LookupFailure> {
        self.limiter
            .run(async {
                match tokio::time::timeout(self.lookup_timeout, fetcher.search(query, page)).await {
                    Ok(res) => res,
                    Err(_) => Err(LookupFailure::Timeout(self.lookup_timeout)),
                }
            })
            .await
    }

    /// Gather background snippets for one topic. Never fails: a lookup that
    /// errors or times out contributes no hits.
    pub async fn collect(&self, topic: &Topic, max_snippets: usize, max_lookups: usize) -> Vec<BackgroundSnippet> {
        let Some(fetcher) = self.fetcher.as_deref() else {
            debug!("Background search disabled - topic={}", topic.label);
            return Vec::new();
        };
        if max_snippets == 0 || max_lookups == 0 {
            return Vec::new();
        }

        let start = std::time::Instant::now();
        let plans: Vec<(String, usize)> = (0..max_lookups).map(|i| lookup_plan(&topic.label, i)).collect();

        let lookups = plans.iter().map(|(query, page)| self.lookup(fetcher, query, *page));
        // join_all returns results in lookup order regardless of completion order
        let results = futures::future::join_all(lookups).await;

        let mut failed = 0usize;
        let mut per_lookup = Vec::with_capacity(results.len());
        for ((query, page), res) in plans.iter().zip(results) {
            match res {
                Ok(hits) => {
                    debug!("Lookup ok - query={}, page={}, hits={}", query, page, hits.len());
                    per_lookup.push(hits);
                }
                Err(e) => {
                    warn!("Lookup failed - query={}, page={}: {}", query, page, e);
                    failed += 1;
                }
            }
        }

        let snippets = reduce_hits(per_lookup, max_snippets);
        info!(
            "Background collected - topic={}, duration={:.2}s, lookups={}, failed={}, snippets={}",
            topic.label,
            start.elapsed().as_secs_f32(),
            plans.len(),
            failed,
            snippets.len()
        );
        snippets
    }
}

fn source_hint(hit: &RawHit) -> String {
    if let Some(s) = hit.source.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        return s.to_string();
    }
    hit.url
        .as_deref()
        .and_then(|u| Url::parse(u).ok())
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Flatten hits lookup by lookup, keep the first hit per normalized title,
/// stop at `max_snippets`.
pub fn reduce_hits(per_lookup: Vec<Vec<RawHit>>, max_snippets: usize) -> Vec<BackgroundSnippet> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();
    for hit in per_lookup.into_iter().flatten() {
        if out.len() >= max_snippets {
            break;
        }
        let key = normalized_title(&hit.title);
        if key.is_empty() || !seen.insert(key) {
            continue;
        }
        out.push(BackgroundSnippet {
            title: hit.title.trim().chars().take(MAX_TITLE_CHARS).collect(),
            source_hint: source_hint(&hit),
            position: out.len() + 1,
        });
    }
    out
}

/// Search collaborator speaking a JSON search API:
/// `GET <endpoint>?q=<query>&page=<n>[&key=<key>]`.
pub struct HttpSearchFetcher {
    client: Client,
    endpoint: Url,
    api_key: Option<String>,
}

impl HttpSearchFetcher {
    pub fn new(client: Client, endpoint: &str, api_key: Option<String>) -> anyhow::Result<Self> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| anyhow::anyhow!("invalid search endpoint {}: {}", endpoint, e))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }

    fn request_url(&self, query: &str, page: usize) -> Url {
        let mut url = self.endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", query);
            pairs.append_pair("page", &page.to_string());
            if let Some(key) = &self.api_key {
                pairs.append_pair("key", key);
            }
        }
        url
    }
}

#[async_trait(?Send)]
impl SearchFetcher for HttpSearchFetcher {
    async fn search(&self, query: &str, page: usize) -> Result<Vec<RawHit>, LookupFailure> {
        let resp = self
            .client
            .get(self.request_url(query, page))
            .send()
            .await
            .map_err(|e| LookupFailure::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LookupFailure::Status(status.as_u16()));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| LookupFailure::Parse(e.to_string()))?;
        extract_hits(&body).ok_or_else(|| LookupFailure::Parse("no hit list in response".to_string()))
    }
}
