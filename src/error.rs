use thiserror::Error;

/// The ranking payload had no recognizable entry list. Fatal to the run.
#[derive(Debug, Error)]
pub enum SourceFormatError {
    #[error("feed payload has no recognizable entry list (looked for {looked_for})")]
    NoEntryList { looked_for: String },
    #[error("feed provider returned code {code}: {msg}")]
    Provider { code: i64, msg: String },
}

/// One background lookup failed. Absorbed by the collector.
#[derive(Debug, Error)]
pub enum LookupFailure {
    #[error("lookup timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("search request failed: {0}")]
    Transport(String),
    #[error("search returned HTTP {0}")]
    Status(u16),
    #[error("could not parse search response: {0}")]
    Parse(String),
}

/// The model-backed strategy did not produce a usable concept for one topic.
#[derive(Debug, Error)]
pub enum PrimaryAnalysisFailure {
    #[error("primary strategy disabled")]
    Disabled,
    #[error("model call timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("model call failed: {0}")]
    Model(String),
    #[error("model response is not a JSON object: {0}")]
    NotJson(String),
    #[error("model response failed validation: {0}")]
    Schema(String),
}

/// The fallback formula produced an out-of-range sub-score.
#[derive(Debug, Error)]
#[error("fallback score `{field}` = {value} is outside [0, {max}]")]
pub struct ScoreValidationError {
    pub field: &'static str,
    pub value: f64,
    pub max: f64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("`{0}` must be at least 1")]
    ZeroLimit(&'static str),
    #[error("`{0}` must be a positive number of seconds")]
    ZeroTimeout(&'static str),
    #[error("could not read pipeline config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("could not parse pipeline config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
