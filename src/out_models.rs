use serde::Deserialize;

use crate::error::PrimaryAnalysisFailure;
use crate::scoring::SubScores;

pub const MAX_LIST_ITEMS: usize = 5;

/// The JSON object the model is asked to return. Every field except
/// `event_timeline` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct ConceptResponse {
    pub name: String,
    pub core_features: Vec<String>,
    pub market_pain_points: Vec<String>,
    pub target_users: String,
    pub innovation_points: Vec<String>,
    pub market_potential: MarketPotentialResponse,
    pub scores: SubScores,
    #[serde(default)]
    pub event_timeline: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketPotentialResponse {
    pub market_size: String,
    pub growth_stage: String,
    pub competitive_advantage: String,
    pub revenue_model: String,
}

/// Remove one wrapping Markdown code fence, if present.
fn strip_code_fence(raw: &str) -> &str {
    let t = raw.trim();
    let Some(rest) = t.strip_prefix("```") else {
        return t;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return t;
    };
    // drop the language tag line (```json)
    match inner.find('\n') {
        Some(nl) if inner[..nl].trim().chars().all(|c| c.is_ascii_alphanumeric()) => inner[nl + 1..].trim(),
        _ => inner.trim(),
    }
}

fn clean_list(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(MAX_LIST_ITEMS)
        .collect()
}

fn require(field: &str, value: &str) -> Result<String, PrimaryAnalysisFailure> {
    let v = value.trim();
    if v.is_empty() {
        return Err(PrimaryAnalysisFailure::Schema(format!("`{}` is blank", field)));
    }
    Ok(v.to_string())
}

/// Parse and validate a model answer. The result is either fully well-formed
/// or an error; nothing is partially accepted.
pub fn parse_concept_response(raw: &str) -> Result<ConceptResponse, PrimaryAnalysisFailure> {
    let body = strip_code_fence(raw);
    if !body.starts_with('{') || !body.ends_with('}') {
        let preview: String = body.chars().take(80).collect();
        return Err(PrimaryAnalysisFailure::NotJson(format!("unexpected text: {:?}", preview)));
    }

    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| PrimaryAnalysisFailure::NotJson(e.to_string()))?;
    let parsed: ConceptResponse =
        serde_json::from_value(value).map_err(|e| PrimaryAnalysisFailure::Schema(e.to_string()))?;

    let mp = &parsed.market_potential;
    let validated = ConceptResponse {
        name: require("name", &parsed.name)?,
        target_users: require("target_users", &parsed.target_users)?,
        market_potential: MarketPotentialResponse {
            market_size: require("market_size", &mp.market_size)?,
            growth_stage: require("growth_stage", &mp.growth_stage)?,
            competitive_advantage: require("competitive_advantage", &mp.competitive_advantage)?,
            revenue_model: require("revenue_model", &mp.revenue_model)?,
        },
        core_features: clean_list(parsed.core_features),
        market_pain_points: clean_list(parsed.market_pain_points),
        innovation_points: clean_list(parsed.innovation_points),
        scores: parsed.scores,
        event_timeline: parsed
            .event_timeline
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty()),
    };

    if validated.core_features.is_empty() {
        return Err(PrimaryAnalysisFailure::Schema("`core_features` is empty".to_string()));
    }
    Ok(validated)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{
        "name": "官宣追踪器",
        "core_features": ["动态推送", " ", "粉丝社区", "a", "b", "c", "d"],
        "market_pain_points": ["信息分散"],
        "target_users": "年轻粉丝",
        "innovation_points": ["实时"],
        "market_potential": {"market_size": "大", "growth_stage": "成长期",
                             "competitive_advantage": "速度", "revenue_model": "会员"},
        "scores": {"innovation": 25, "pain_point": 20, "potential": 12,
                   "social": 9, "practicality": 7, "feasibility": 8}
    }"#;

    #[test]
    fn accepts_valid_and_trims_lists() {
        let r = parse_concept_response(VALID).unwrap();
        assert_eq!(r.core_features, vec!["动态推送", "粉丝社区", "a", "b", "c"]);
        assert!(r.event_timeline.is_none());
    }

    #[test]
    fn accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert!(parse_concept_response(&fenced).is_ok());
    }

    #[test]
    fn rejects_prose() {
        assert!(matches!(
            parse_concept_response("Sure! Here is the analysis you asked for."),
            Err(PrimaryAnalysisFailure::NotJson(_))
        ));
        let wrapped = format!("Here you go: {}", VALID);
        assert!(matches!(
            parse_concept_response(&wrapped),
            Err(PrimaryAnalysisFailure::NotJson(_))
        ));
    }

    #[test]
    fn rejects_missing_field() {
        let missing = VALID.replace("\"target_users\": \"年轻粉丝\",", "");
        assert!(matches!(
            parse_concept_response(&missing),
            Err(PrimaryAnalysisFailure::Schema(_))
        ));
    }

    #[test]
    fn rejects_non_numeric_score() {
        let bad = VALID.replace("\"social\": 9", "\"social\": \"high\"");
        assert!(matches!(
            parse_concept_response(&bad),
            Err(PrimaryAnalysisFailure::Schema(_))
        ));
    }

    #[test]
    fn rejects_blank_name() {
        let bad = VALID.replace("\"官宣追踪器\"", "\"  \"");
        assert!(matches!(
            parse_concept_response(&bad),
            Err(PrimaryAnalysisFailure::Schema(_))
        ));
    }
}
