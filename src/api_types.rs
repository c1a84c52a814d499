use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Keys that may hold the entry list of a hot-list payload, searched in order.
pub const FEED_LIST_PATHS: &[&[&str]] = &[
    &["result", "list"],
    &["data", "list"],
    &["list"],
    &["data"],
    &["result"],
    &["items"],
];

pub const FEED_LABEL_KEYS: &[&str] = &["hotword", "hotWord", "word", "label", "title", "name", "keyword"];

pub const FEED_POPULARITY_KEYS: &[&str] = &["hotScore", "hot_score", "hotwordnum", "hotValue", "num", "score", "heat"];

/// Keys that may hold the hit array of a search response, searched in order.
pub const SEARCH_HIT_KEYS: &[&str] = &["results", "items", "organic", "organic_results", "data", "news"];

/// One raw search hit as returned by the search collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHit {
    pub title: String,
    #[serde(default, alias = "link")]
    pub url: Option<String>,
    #[serde(default, alias = "site")]
    pub source: Option<String>,
}

/// First string field among `keys`, trimmed, if non-empty.
pub fn string_field(entry: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| entry.get(*k))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First numeric field among `keys`. Numeric strings (the hot-list API sends
/// `" 1234567"`) are accepted.
pub fn number_field(entry: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|k| entry.get(*k)).find_map(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

/// Pull hits out of a search response body. Entries without a string
/// `title` are skipped.
pub fn extract_hits(body: &Value) -> Option<Vec<RawHit>> {
    let list = match body {
        Value::Array(items) => items,
        _ => SEARCH_HIT_KEYS
            .iter()
            .find_map(|k| body.get(*k).and_then(Value::as_array))?,
    };
    Some(
        list.iter()
            .filter_map(|item| serde_json::from_value::<RawHit>(item.clone()).ok())
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn number_field_accepts_padded_strings() {
        let e = json!({"hotwordnum": " 987654"});
        assert_eq!(number_field(&e, FEED_POPULARITY_KEYS), Some(987654.0));
        assert_eq!(number_field(&json!({"num": "n/a"}), FEED_POPULARITY_KEYS), None);
    }

    #[test]
    fn string_field_skips_blank_candidates() {
        let e = json!({"hotword": "  ", "word": "热搜"});
        assert_eq!(string_field(&e, FEED_LABEL_KEYS), Some("热搜".to_string()));
    }

    #[test]
    fn extract_hits_reads_known_keys() {
        let body = json!({"organic": [
            {"title": "A headline", "link": "https://news.example.com/a"},
            {"snippet": "no title"},
            {"title": "B headline", "site": "Example"}
        ]});
        let hits = extract_hits(&body).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].url.as_deref(), Some("https://news.example.com/a"));
        assert_eq!(hits[1].source.as_deref(), Some("Example"));
        assert!(extract_hits(&json!({"unrelated": 1})).is_none());
    }
}
