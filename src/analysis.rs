use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::budget::prompt_titles;
use crate::config::PipelineConfig;
use crate::error::{PrimaryAnalysisFailure, ScoreValidationError};
use crate::fallback;
use crate::limiter::CallLimiter;
use crate::llm::ModelClient;
use crate::models::{AnalysisOutcome, BackgroundSnippet, MarketPotential, ProductConcept, SourceStrategy, Topic};
use crate::out_models::{parse_concept_response, ConceptResponse};
use crate::prompts::{user_product_analysis, TITLE_BLOCK_TOKENS};
use crate::scoring::ScoreSet;
use crate::theme::Theme;

/// Produces one [`ProductConcept`] per topic, model first, rules second.
pub struct Analyzer {
    model: Option<Arc<dyn ModelClient>>,
    limiter: CallLimiter,
    timeout: Duration,
    retries: usize,
}

impl Analyzer {
    /// `model = None` means only the rule-based strategy runs.
    pub fn new(model: Option<Arc<dyn ModelClient>>, limiter: CallLimiter, timeout: Duration, retries: usize) -> Self {
        Self {
            model,
            limiter,
            timeout,
            retries: retries.min(1),
        }
    }

    pub fn from_config(model: Option<Arc<dyn ModelClient>>, cfg: &PipelineConfig) -> Self {
        let model = if cfg.enable_primary_strategy { model } else { None };
        Self::new(
            model,
            CallLimiter::new("model", cfg.max_concurrent_model_calls),
            cfg.model_call_timeout(),
            cfg.model_retries(),
        )
    }

    pub fn primary_enabled(&self) -> bool {
        self.model.is_some()
    }

    pub fn limiter(&self) -> &CallLimiter {
        &self.limiter
    }

    async fn call_model(&self, model: &dyn ModelClient, prompt: &str) -> Result<String, PrimaryAnalysisFailure> {
        self.limiter
            .run(async {
                match tokio::time::timeout(self.timeout, model.complete(prompt)).await {
                    Ok(Ok(answer)) => Ok(answer),
                    Ok(Err(e)) => Err(PrimaryAnalysisFailure::Model(format!("{:#}", e))),
                    Err(_) => Err(PrimaryAnalysisFailure::Timeout(self.timeout)),
                }
            })
            .await
    }

    /// Model-backed strategy. Any transport, timeout, parse or validation
    /// problem is an error; there is at most one extra attempt.
    pub async fn primary(&self, topic: &Topic, snippets: &[BackgroundSnippet]) -> Result<ProductConcept, PrimaryAnalysisFailure> {
        let Some(model) = self.model.as_deref() else {
            return Err(PrimaryAnalysisFailure::Disabled);
        };

        let titles = prompt_titles(snippets, TITLE_BLOCK_TOKENS);
        let prompt = user_product_analysis(&topic.label, &titles);
        debug!(
            "Primary analysis - topic={}, titles={}, prompt_length={} chars",
            topic.label,
            titles.len(),
            prompt.len()
        );

        let attempts = 1 + self.retries;
        let mut last_err = PrimaryAnalysisFailure::Disabled;
        for attempt in 1..=attempts {
            let parsed = match self.call_model(model, &prompt).await {
                Ok(answer) => parse_concept_response(&answer),
                Err(e) => Err(e),
            };
            match parsed {
                Ok(resp) => {
                    let concept = concept_from_response(topic, snippets, resp);
                    info!(
                        "Primary analysis completed - topic={}, name={}, total={:.1}, attempt={}/{}",
                        topic.label, concept.name, concept.scores.total, attempt, attempts
                    );
                    return Ok(concept);
                }
                Err(e) => {
                    warn!(
                        "Primary analysis attempt failed - topic={}, attempt={}/{}: {}",
                        topic.label, attempt, attempts, e
                    );
                    last_err = e;
                }
            }
        }
        Err(last_err)
    }

    /// Rule-based strategy.
    pub fn fallback(&self, topic: &Topic, snippets: &[BackgroundSnippet]) -> Result<ProductConcept, ScoreValidationError> {
        fallback::analyze(topic, snippets)
    }

    /// Primary if it succeeds, otherwise fallback. Only a defective fallback
    /// formula makes this fail.
    pub async fn analyze(&self, topic: &Topic, snippets: &[BackgroundSnippet]) -> Result<AnalysisOutcome, ScoreValidationError> {
        match self.primary(topic, snippets).await {
            Ok(concept) => Ok(AnalysisOutcome::Primary(concept)),
            Err(e) => {
                debug!("Falling back - topic={}: {}", topic.label, e);
                self.fallback(topic, snippets).map(AnalysisOutcome::Fallback)
            }
        }
    }
}

fn concept_from_response(topic: &Topic, snippets: &[BackgroundSnippet], resp: ConceptResponse) -> ProductConcept {
    let timeline = resp
        .event_timeline
        .unwrap_or_else(|| fallback::timeline(&topic.label, Theme::classify(&topic.label), snippets));
    ProductConcept {
        name: resp.name,
        core_features: resp.core_features,
        pain_points: resp.market_pain_points,
        target_users: resp.target_users,
        innovation_points: resp.innovation_points,
        market_potential: MarketPotential {
            market_size: resp.market_potential.market_size,
            growth_stage: resp.market_potential.growth_stage,
            competitive_advantage: resp.market_potential.competitive_advantage,
            revenue_model: resp.market_potential.revenue_model,
        },
        scores: ScoreSet::new(resp.scores),
        timeline,
        source_strategy: SourceStrategy::Primary,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::Mutex;

    const ANSWER: &str = r#"{
        "name": "官宣雷达",
        "core_features": ["恋情官宣提醒", "粉丝情绪看板"],
        "market_pain_points": ["消息真假难辨"],
        "target_users": "追星族",
        "innovation_points": ["情绪识别"],
        "market_potential": {"market_size": "千万级粉丝", "growth_stage": "成长期",
                             "competitive_advantage": "速度快", "revenue_model": "会员"},
        "scores": {"innovation": 45, "pain_point": 20, "potential": 12,
                   "social": 9, "practicality": 7, "feasibility": 8},
        "event_timeline": "工作室发文官宣，粉丝送上祝福。"
    }"#;

    /// Replies from a script, one entry per call; the last entry repeats.
    struct ScriptedModel {
        replies: Vec<Result<String, String>>,
        prompts: Mutex<Vec<String>>,
        delay: Duration,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<&str, &str>>) -> Self {
            Self {
                replies: replies
                    .into_iter()
                    .map(|r| r.map(str::to_string).map_err(str::to_string))
                    .collect(),
                prompts: Mutex::new(Vec::new()),
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait(?Send)]
    impl ModelClient for ScriptedModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            let n = {
                let mut p = self.prompts.lock().unwrap();
                p.push(prompt.to_string());
                p.len()
            };
            tokio::time::sleep(self.delay).await;
            let reply = self.replies[(n - 1).min(self.replies.len() - 1)].clone();
            reply.map_err(|e| anyhow!(e))
        }
    }

    fn topic() -> Topic {
        Topic::new(1, "某明星官宣", 987654.0).unwrap()
    }

    fn analyzer(model: Arc<ScriptedModel>, retries: usize, timeout: Duration) -> Analyzer {
        Analyzer::new(Some(model), CallLimiter::new("model", 1), timeout, retries)
    }

    #[tokio::test]
    async fn primary_success_is_clamped_and_marked() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ANSWER)]));
        let a = analyzer(model.clone(), 1, Duration::from_secs(1));
        let outcome = a.analyze(&topic(), &[]).await.unwrap();
        assert_eq!(outcome.strategy(), SourceStrategy::Primary);
        let c = outcome.into_concept();
        assert_eq!(c.source_strategy, SourceStrategy::Primary);
        assert_eq!(c.scores.innovation, 30.0);
        assert!((c.scores.total - 86.0).abs() < 1e-9);
        assert_eq!(c.timeline, "工作室发文官宣，粉丝送上祝福。");
        assert_eq!(model.calls(), 1);
        assert!(model.prompts.lock().unwrap()[0].contains("某明星官宣"));
    }

    #[tokio::test]
    async fn non_json_falls_back_without_error() {
        let model = Arc::new(ScriptedModel::new(vec![Ok("抱歉，我无法完成这个请求。")]));
        let a = analyzer(model.clone(), 0, Duration::from_secs(1));
        let outcome = a.analyze(&topic(), &[]).await.unwrap();
        assert_eq!(outcome.strategy(), SourceStrategy::Fallback);
        assert_eq!(outcome.into_concept().source_strategy, SourceStrategy::Fallback);
        assert_eq!(model.calls(), 1);
    }

    #[tokio::test]
    async fn retries_once_then_succeeds() {
        let model = Arc::new(ScriptedModel::new(vec![Err("connection reset"), Ok(ANSWER)]));
        let a = analyzer(model.clone(), 1, Duration::from_secs(1));
        let outcome = a.analyze(&topic(), &[]).await.unwrap();
        assert_eq!(outcome.strategy(), SourceStrategy::Primary);
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn at_most_one_retry() {
        let model = Arc::new(ScriptedModel::new(vec![Err("down")]));
        let a = Analyzer::new(Some(model.clone()), CallLimiter::new("model", 1), Duration::from_secs(1), 5);
        let err = a.primary(&topic(), &[]).await.unwrap_err();
        assert!(matches!(err, PrimaryAnalysisFailure::Model(_)));
        assert_eq!(model.calls(), 2);
    }

    #[tokio::test]
    async fn timeout_falls_back() {
        let mut model = ScriptedModel::new(vec![Ok(ANSWER)]);
        model.delay = Duration::from_millis(200);
        let a = analyzer(Arc::new(model), 0, Duration::from_millis(10));
        assert!(matches!(
            a.primary(&topic(), &[]).await,
            Err(PrimaryAnalysisFailure::Timeout(_))
        ));
        let outcome = a.analyze(&topic(), &[]).await.unwrap();
        assert_eq!(outcome.strategy(), SourceStrategy::Fallback);
        assert_eq!(a.limiter().in_flight(), 0);
    }

    #[tokio::test]
    async fn disabled_primary_never_calls_model() {
        let model = Arc::new(ScriptedModel::new(vec![Ok(ANSWER)]));
        let cfg = PipelineConfig {
            enable_primary_strategy: false,
            ..PipelineConfig::default()
        };
        let a = Analyzer::from_config(Some(model.clone()), &cfg);
        assert!(!a.primary_enabled());
        let outcome = a.analyze(&topic(), &[]).await.unwrap();
        assert_eq!(outcome.strategy(), SourceStrategy::Fallback);
        assert_eq!(model.calls(), 0);
    }

    #[tokio::test]
    async fn missing_timeline_is_derived() {
        let answer = ANSWER.replace(",\n        \"event_timeline\": \"工作室发文官宣，粉丝送上祝福。\"", "");
        let model = Arc::new(ScriptedModel::new(vec![Ok(answer.as_str())]));
        let a = analyzer(model, 0, Duration::from_secs(1));
        let c = a.primary(&topic(), &[]).await.unwrap();
        assert!(c.timeline.contains("某明星官宣"));
    }
}
