use serde::{Deserialize, Serialize};
use xxhash_rust::xxh3::xxh3_64;

use crate::scoring::ScoreSet;

/// One ranked trending item from the hot list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub rank: u32,            // 1-based, unique per run
    pub label: String,        // trimmed, never empty
    pub popularity_score: f64, // >= 0.0
}

impl Topic {
    /// Returns `None` for a zero rank or a blank label. Negative or non-finite
    /// popularity is floored to zero.
    pub fn new(rank: u32, label: &str, popularity_score: f64) -> Option<Self> {
        let label = label.trim();
        if rank == 0 || label.is_empty() {
            return None;
        }
        let popularity_score = if popularity_score.is_finite() && popularity_score > 0.0 {
            popularity_score
        } else {
            0.0
        };
        Some(Self {
            rank,
            label: label.to_string(),
            popularity_score,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackgroundSnippet {
    pub title: String,
    pub source_hint: String,
    pub position: usize, // 1-based, retrieval order
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceStrategy {
    Primary,
    Fallback,
}

impl std::fmt::Display for SourceStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceStrategy::Primary => write!(f, "primary"),
            SourceStrategy::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketPotential {
    pub market_size: String,
    pub growth_stage: String,
    pub competitive_advantage: String,
    pub revenue_model: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductConcept {
    pub name: String,
    pub core_features: Vec<String>,      // <= 5
    pub pain_points: Vec<String>,        // <= 5
    pub target_users: String,
    pub innovation_points: Vec<String>,  // <= 5
    pub market_potential: MarketPotential,
    pub scores: ScoreSet,
    pub timeline: String,
    pub source_strategy: SourceStrategy,
}

/// Which strategy produced a concept. Both variants carry the same schema.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Primary(ProductConcept),
    Fallback(ProductConcept),
}

impl AnalysisOutcome {
    pub fn strategy(&self) -> SourceStrategy {
        match self {
            AnalysisOutcome::Primary(_) => SourceStrategy::Primary,
            AnalysisOutcome::Fallback(_) => SourceStrategy::Fallback,
        }
    }

    pub fn into_concept(self) -> ProductConcept {
        match self {
            AnalysisOutcome::Primary(c) | AnalysisOutcome::Fallback(c) => c,
        }
    }
}

/// One finished unit of work: the topic, its background and its concept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub id: String,
    pub topic: Topic,
    pub snippets: Vec<BackgroundSnippet>,
    pub concept: ProductConcept,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_failure: Option<String>,
}

impl AnalysisResult {
    pub fn new(
        topic: Topic,
        snippets: Vec<BackgroundSnippet>,
        concept: ProductConcept,
        primary_failure: Option<String>,
    ) -> Self {
        Self {
            id: make_result_id(&topic),
            topic,
            snippets,
            concept,
            primary_failure,
        }
    }
}

fn make_result_id(topic: &Topic) -> String {
    format!("{:016x}", xxh3_64(format!("{}|{}", topic.rank, topic.label).as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_rejects_blank_label_and_zero_rank() {
        assert!(Topic::new(1, "   ", 10.0).is_none());
        assert!(Topic::new(0, "话题", 10.0).is_none());
    }

    #[test]
    fn topic_floors_bad_popularity() {
        assert_eq!(Topic::new(1, "a", -5.0).unwrap().popularity_score, 0.0);
        assert_eq!(Topic::new(1, "a", f64::NAN).unwrap().popularity_score, 0.0);
        assert_eq!(Topic::new(2, " b ", 42.0).unwrap().label, "b");
    }

    #[test]
    fn result_id_is_stable() {
        let t = Topic::new(3, "某话题", 1.0).unwrap();
        assert_eq!(make_result_id(&t), make_result_id(&t.clone()));
        let other = Topic::new(4, "某话题", 1.0).unwrap();
        assert_ne!(make_result_id(&t), make_result_id(&other));
    }
}
