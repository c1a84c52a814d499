use std::sync::Arc;

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use serde_json::Value;
use tracing::{debug, error, info};

use crate::analysis::Analyzer;
use crate::collect::{Collector, SearchFetcher};
use crate::config::PipelineConfig;
use crate::error::ScoreValidationError;
use crate::fetch::normalize;
use crate::llm::ModelClient;
use crate::models::{AnalysisResult, BackgroundSnippet, Topic};
use crate::scoring::{rank, summarize, RunSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Collecting,
    AnalyzingPrimary,
    AnalyzingFallback,
    Scored,
}

/// Lifecycle of one topic. Each [`TopicJob::step`] moves exactly one stage
/// forward; `Scored` is terminal.
#[derive(Debug)]
pub enum TopicJob {
    Collecting {
        topic: Topic,
    },
    AnalyzingPrimary {
        topic: Topic,
        snippets: Vec<BackgroundSnippet>,
    },
    AnalyzingFallback {
        topic: Topic,
        snippets: Vec<BackgroundSnippet>,
        /// Why the model strategy was not used; `None` if it was disabled.
        reason: Option<String>,
    },
    Scored(AnalysisResult),
}

impl TopicJob {
    pub fn new(topic: Topic) -> Self {
        TopicJob::Collecting { topic }
    }

    pub fn stage(&self) -> Stage {
        match self {
            TopicJob::Collecting { .. } => Stage::Collecting,
            TopicJob::AnalyzingPrimary { .. } => Stage::AnalyzingPrimary,
            TopicJob::AnalyzingFallback { .. } => Stage::AnalyzingFallback,
            TopicJob::Scored(_) => Stage::Scored,
        }
    }

    pub async fn step(self, pipeline: &Pipeline) -> Result<TopicJob, ScoreValidationError> {
        let next = match self {
            TopicJob::Collecting { topic } => {
                let snippets = pipeline
                    .collector
                    .collect(
                        &topic,
                        pipeline.cfg.max_snippets_per_topic,
                        pipeline.cfg.max_concurrent_lookups_per_topic,
                    )
                    .await;
                if pipeline.analyzer.primary_enabled() {
                    TopicJob::AnalyzingPrimary { topic, snippets }
                } else {
                    TopicJob::AnalyzingFallback {
                        topic,
                        snippets,
                        reason: None,
                    }
                }
            }
            TopicJob::AnalyzingPrimary { topic, snippets } => {
                match pipeline.analyzer.primary(&topic, &snippets).await {
                    Ok(concept) => TopicJob::Scored(AnalysisResult::new(topic, snippets, concept, None)),
                    Err(e) => TopicJob::AnalyzingFallback {
                        topic,
                        snippets,
                        reason: Some(e.to_string()),
                    },
                }
            }
            TopicJob::AnalyzingFallback { topic, snippets, reason } => {
                let concept = pipeline.analyzer.fallback(&topic, &snippets)?;
                TopicJob::Scored(AnalysisResult::new(topic, snippets, concept, reason))
            }
            scored @ TopicJob::Scored(_) => scored,
        };
        debug!("Topic job advanced - stage={:?}", next.stage());
        Ok(next)
    }

    /// Step until `Scored`.
    pub async fn drive(mut self, pipeline: &Pipeline) -> Result<AnalysisResult, ScoreValidationError> {
        loop {
            self = match self {
                TopicJob::Scored(result) => return Ok(result),
                job => job.step(pipeline).await?,
            };
        }
    }
}

/// Ranked results plus their summary; what a run hands to the report writer.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub ranked: Vec<AnalysisResult>,
    pub summary: RunSummary,
}

/// Read-only configuration plus the two bounded collaborators shared by
/// every topic of a run.
pub struct Pipeline {
    cfg: PipelineConfig,
    collector: Collector,
    analyzer: Analyzer,
}

impl Pipeline {
    pub fn new(cfg: PipelineConfig, search: Option<Arc<dyn SearchFetcher>>, model: Option<Arc<dyn ModelClient>>) -> Self {
        let collector = Collector::from_config(search, &cfg);
        let analyzer = Analyzer::from_config(model, &cfg);
        Self::with_parts(cfg, collector, analyzer)
    }

    pub fn with_parts(cfg: PipelineConfig, collector: Collector, analyzer: Analyzer) -> Self {
        Self {
            cfg,
            collector,
            analyzer,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    pub fn collector(&self) -> &Collector {
        &self.collector
    }

    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Analyze every topic with at most `max_in_flight_topics` in progress.
    /// Results come back in input order.
    pub async fn analyze_topics(&self, topics: Vec<Topic>) -> Result<Vec<AnalysisResult>, ScoreValidationError> {
        let start = std::time::Instant::now();
        let total = topics.len();
        info!(
            "Topic analysis starting - topics={}, max_in_flight={}, primary_enabled={}",
            total,
            self.cfg.max_in_flight_topics,
            self.analyzer.primary_enabled()
        );

        let results: Vec<Result<AnalysisResult, ScoreValidationError>> = stream::iter(topics)
            .map(|topic| TopicJob::new(topic).drive(self))
            .buffered(self.cfg.max_in_flight_topics.max(1))
            .collect()
            .await;
        let results = results.into_iter().collect::<Result<Vec<_>, _>>()?;

        info!(
            "Topic analysis completed - duration={:.2}s, topics={}, peak_model_calls={}, peak_searches={}",
            start.elapsed().as_secs_f32(),
            results.len(),
            self.analyzer.limiter().peak(),
            self.collector.limiter().peak()
        );
        Ok(results)
    }

    /// Normalize the raw feed, analyze every topic, rank. Fails before any
    /// topic work if the feed is unrecognizable.
    pub async fn run(&self, raw_feed: &Value) -> Result<RunOutput> {
        let pipeline_start = std::time::Instant::now();

        let topics = normalize(raw_feed, self.cfg.topic_limit).map_err(|e| {
            error!("Hot-list feed rejected: {}", e);
            e
        })?;
        info!("Topics normalized - count={}, limit={}", topics.len(), self.cfg.topic_limit);

        let results = self.analyze_topics(topics).await.map_err(|e| {
            error!("Rule-based scoring produced an invalid score, aborting run: {}", e);
            e
        })?;

        let ranked = rank(&results);
        let summary = summarize(&ranked);

        info!(
            "Run summary - analyzed={}, excellent={}, good={}, average={}, primary={}, fallback={}",
            summary.analyzed, summary.excellent, summary.good, summary.average, summary.primary, summary.fallback
        );
        for (i, top) in summary.top.iter().enumerate() {
            info!(
                "Top {} - {} | {} | total={:.1} | {}",
                i + 1,
                top.label,
                top.name,
                top.total,
                top.source_strategy
            );
        }
        info!(
            "Pipeline completed - total_duration={:.2}s",
            pipeline_start.elapsed().as_secs_f32()
        );

        Ok(RunOutput { ranked, summary })
    }
}

/// Run the pipeline and persist its report under `<output_dir>/<ymd>/`.
/// Nothing is written if the run fails.
pub async fn run_report(
    pipeline: &Pipeline,
    raw_feed: &Value,
    output_dir: &std::path::Path,
    ymd: &str,
    generated_at: &str,
) -> Result<crate::report::ReportPaths> {
    let output = pipeline.run(raw_feed).await?;
    let paths = crate::report::write_report(output_dir, ymd, &output, generated_at)
        .with_context(|| format!("writing report under {}", output_dir.display()))?;
    info!(
        "Report written - json={}, markdown={}",
        paths.json.display(),
        paths.markdown.display()
    );
    Ok(paths)
}
