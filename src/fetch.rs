use std::path::Path;

use anyhow::{Context, Result};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::api_types::{number_field, string_field, FEED_LABEL_KEYS, FEED_LIST_PATHS, FEED_POPULARITY_KEYS};
use crate::error::SourceFormatError;
use crate::models::Topic;

/// Fetch the raw hot-list payload. The body is returned as-is; shape checks
/// happen in [`normalize`].
pub async fn fetch_hot_feed(client: &Client, url: &str, key: &str, count: usize) -> Result<Value> {
    let start = std::time::Instant::now();
    debug!("Fetching hot list - url={}, count={}", url, count);

    let resp = client
        .get(url)
        .query(&[("key", key), ("num", &count.to_string())])
        .send()
        .await
        .with_context(|| format!("Request failed for {}", url))?;

    let resp = resp
        .error_for_status()
        .with_context(|| format!("HTTP error for {}", url))?;

    let body: Value = resp
        .json()
        .await
        .with_context(|| format!("Decoding JSON for {}", url))?;

    info!(
        "Hot list fetch completed - duration={:.2}s",
        start.elapsed().as_secs_f32()
    );
    Ok(body)
}

/// Load a previously saved hot-list payload.
pub fn load_feed_file(path: &Path) -> Result<Value> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Reading feed file {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Decoding feed file {}", path.display()))
}

fn entry_list(raw: &Value) -> Option<&Vec<Value>> {
    if let Value::Array(items) = raw {
        return Some(items);
    }
    FEED_LIST_PATHS.iter().find_map(|path| {
        path.iter()
            .try_fold(raw, |v, key| v.get(*key))
            .and_then(Value::as_array)
    })
}

/// Turn a raw hot-list payload into at most `limit` topics in source order.
///
/// Entries without a usable label are dropped and the survivors are ranked
/// 1..n. A payload whose provider `code` is not 200, or that has no entry
/// list at all, is a [`SourceFormatError`]; an empty list is not.
pub fn normalize(raw: &Value, limit: usize) -> Result<Vec<Topic>, SourceFormatError> {
    if let Some(code) = raw.get("code").and_then(Value::as_i64) {
        if code != 200 {
            let msg = raw
                .get("msg")
                .and_then(Value::as_str)
                .unwrap_or("unknown error")
                .to_string();
            return Err(SourceFormatError::Provider { code, msg });
        }
    }

    let entries = entry_list(raw).ok_or_else(|| SourceFormatError::NoEntryList {
        looked_for: FEED_LIST_PATHS
            .iter()
            .map(|p| p.join("."))
            .collect::<Vec<_>>()
            .join(", "),
    })?;

    let mut topics = Vec::with_capacity(limit.min(entries.len()));
    let mut dropped = 0usize;
    for entry in entries {
        if topics.len() >= limit {
            break;
        }
        let Some(label) = string_field(entry, FEED_LABEL_KEYS) else {
            dropped += 1;
            continue;
        };
        let popularity = number_field(entry, FEED_POPULARITY_KEYS).unwrap_or(0.0);
        let rank = (topics.len() + 1) as u32;
        match Topic::new(rank, &label, popularity) {
            Some(t) => topics.push(t),
            None => dropped += 1,
        }
    }

    if dropped > 0 {
        warn!("Feed normalization - dropped={} entries without a usable label", dropped);
    }
    debug!(
        "Feed normalization - entries={}, topics={}, limit={}",
        entries.len(),
        topics.len(),
        limit
    );
    Ok(topics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_object_is_a_format_error() {
        assert!(matches!(
            normalize(&json!({}), 10),
            Err(SourceFormatError::NoEntryList { .. })
        ));
    }

    #[test]
    fn provider_error_code_is_a_format_error() {
        let raw = json!({"code": 230, "msg": "key error"});
        match normalize(&raw, 10) {
            Err(SourceFormatError::Provider { code, msg }) => {
                assert_eq!(code, 230);
                assert_eq!(msg, "key error");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn empty_list_is_not_an_error() {
        let raw = json!({"code": 200, "result": {"list": []}});
        assert!(normalize(&raw, 10).unwrap().is_empty());
    }

    #[test]
    fn keeps_order_drops_unlabeled_and_truncates() {
        let raw = json!({"code": 200, "result": {"list": [
            {"hotword": "第一", "hotwordnum": " 300"},
            {"hotword": "  ", "hotwordnum": "250"},
            {"hotWord": "第二", "hotScore": 200},
            {"hotwordnum": "150"},
            {"word": "第三"},
            {"hotword": "第四", "hotwordnum": "50"}
        ]}});
        let topics = normalize(&raw, 3).unwrap();
        let labels: Vec<&str> = topics.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["第一", "第二", "第三"]);
        let ranks: Vec<u32> = topics.iter().map(|t| t.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(topics[0].popularity_score, 300.0);
        assert_eq!(topics[2].popularity_score, 0.0);
    }

    #[test]
    fn short_list_is_not_padded() {
        let raw = json!([{"label": "only"}]);
        assert_eq!(normalize(&raw, 10).unwrap().len(), 1);
    }

    #[test]
    fn nested_data_list_is_recognized() {
        let raw = json!({"data": {"list": [{"title": "x", "heat": 12.5}]}});
        let topics = normalize(&raw, 5).unwrap();
        assert_eq!(topics[0].popularity_score, 12.5);
    }
}
