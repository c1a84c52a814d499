use serde::{Deserialize, Serialize};

use crate::error::ScoreValidationError;
use crate::models::{AnalysisResult, SourceStrategy};

pub const INNOVATION_MAX: f64 = 30.0;
pub const PAIN_POINT_MAX: f64 = 25.0;
pub const POTENTIAL_MAX: f64 = 15.0;
pub const SOCIAL_MAX: f64 = 10.0;
pub const PRACTICALITY_MAX: f64 = 10.0;
pub const FEASIBILITY_MAX: f64 = 10.0;

/// The six rubric inputs before clamping, as supplied by either strategy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SubScores {
    pub innovation: f64,
    pub pain_point: f64,
    pub potential: f64,
    pub social: f64,
    pub practicality: f64,
    pub feasibility: f64,
}

impl SubScores {
    fn fields(&self) -> [(&'static str, f64, f64); 6] {
        [
            ("innovation", self.innovation, INNOVATION_MAX),
            ("pain_point", self.pain_point, PAIN_POINT_MAX),
            ("potential", self.potential, POTENTIAL_MAX),
            ("social", self.social, SOCIAL_MAX),
            ("practicality", self.practicality, PRACTICALITY_MAX),
            ("feasibility", self.feasibility, FEASIBILITY_MAX),
        ]
    }
}

/// Clamped rubric plus derived aggregates. Deserializing recomputes the
/// derived fields from the parts; a supplied `total` is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "SubScores")]
pub struct ScoreSet {
    pub innovation: f64,
    pub pain_point: f64,
    pub potential: f64,
    pub social: f64,
    pub practicality: f64,
    pub feasibility: f64,
    pub interest_score: f64,
    pub utility_score: f64,
    pub total: f64,
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn clamp_part(x: f64, max: f64) -> f64 {
    if !x.is_finite() {
        return 0.0;
    }
    round1(x.clamp(0.0, max))
}

impl ScoreSet {
    /// Clamp every part into its range, then derive the aggregates.
    pub fn new(raw: SubScores) -> Self {
        let innovation = clamp_part(raw.innovation, INNOVATION_MAX);
        let pain_point = clamp_part(raw.pain_point, PAIN_POINT_MAX);
        let potential = clamp_part(raw.potential, POTENTIAL_MAX);
        let social = clamp_part(raw.social, SOCIAL_MAX);
        let practicality = clamp_part(raw.practicality, PRACTICALITY_MAX);
        let feasibility = clamp_part(raw.feasibility, FEASIBILITY_MAX);

        let interest_score = round1(innovation + pain_point + potential + social);
        let utility_score = round1(practicality + feasibility);

        Self {
            innovation,
            pain_point,
            potential,
            social,
            practicality,
            feasibility,
            interest_score,
            utility_score,
            total: round1(interest_score + utility_score),
        }
    }

    /// Like [`ScoreSet::new`] but refuses any part that would need clamping.
    pub fn checked(raw: SubScores) -> Result<Self, ScoreValidationError> {
        for (field, value, max) in raw.fields() {
            if !value.is_finite() || !(0.0..=max).contains(&value) {
                return Err(ScoreValidationError { field, value, max });
            }
        }
        Ok(Self::new(raw))
    }

    pub fn parts(&self) -> SubScores {
        SubScores {
            innovation: self.innovation,
            pain_point: self.pain_point,
            potential: self.potential,
            social: self.social,
            practicality: self.practicality,
            feasibility: self.feasibility,
        }
    }

    /// Re-run clamp-then-derive. Idempotent.
    pub fn normalized(&self) -> Self {
        Self::new(self.parts())
    }
}

impl From<SubScores> for ScoreSet {
    fn from(raw: SubScores) -> Self {
        ScoreSet::new(raw)
    }
}

/// Order results by descending total. Equal totals keep their input order.
/// The inputs are left untouched; each returned entry has its scores
/// re-normalized.
pub fn rank(results: &[AnalysisResult]) -> Vec<AnalysisResult> {
    let mut ranked: Vec<AnalysisResult> = results
        .iter()
        .cloned()
        .map(|mut r| {
            r.concept.scores = r.concept.scores.normalized();
            r
        })
        .collect();
    ranked.sort_by(|a, b| b.concept.scores.total.total_cmp(&a.concept.scores.total));
    ranked
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Excellent,
    Good,
    Average,
}

impl Tier {
    pub fn of(total: f64) -> Self {
        if total >= 80.0 {
            Tier::Excellent
        } else if total >= 60.0 {
            Tier::Good
        } else {
            Tier::Average
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopEntry {
    pub label: String,
    pub name: String,
    pub total: f64,
    pub source_strategy: SourceStrategy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub analyzed: usize,
    pub excellent: usize,
    pub good: usize,
    pub average: usize,
    pub primary: usize,
    pub fallback: usize,
    pub top: Vec<TopEntry>,
}

/// Tier counts and the three best entries. Expects `ranked` in rank order.
pub fn summarize(ranked: &[AnalysisResult]) -> RunSummary {
    let mut s = RunSummary {
        analyzed: ranked.len(),
        ..RunSummary::default()
    };
    for r in ranked {
        match Tier::of(r.concept.scores.total) {
            Tier::Excellent => s.excellent += 1,
            Tier::Good => s.good += 1,
            Tier::Average => s.average += 1,
        }
        match r.concept.source_strategy {
            SourceStrategy::Primary => s.primary += 1,
            SourceStrategy::Fallback => s.fallback += 1,
        }
    }
    s.top = ranked
        .iter()
        .take(3)
        .map(|r| TopEntry {
            label: r.topic.label.clone(),
            name: r.concept.name.clone(),
            total: r.concept.scores.total,
            source_strategy: r.concept.source_strategy,
        })
        .collect();
    s
}
