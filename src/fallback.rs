//! Rule-based analysis. Pure and total: the same topic and snippets always
//! give the same concept, built only from cheap local signals.
//!
//! Sub-score formula (each signal in [0, 1]):
//!
//! | part         | base | span | mix                                        |
//! |--------------|------|------|--------------------------------------------|
//! | innovation   | 15   | 15   | 0.5·diversity + 0.3·brevity + 0.2·(1−heat) |
//! | pain_point   | 15   | 10   | 0.6·heat + 0.4·coverage                    |
//! | potential    | 10   | 5    | heat                                       |
//! | social       | 5    | 5    | 0.7·heat + 0.3·brevity                     |
//! | practicality | 5    | 5    | 0.5·coverage + 0.5·diversity               |
//! | feasibility  | 5    | 5    | 0.6·brevity + 0.4·coverage                 |

use crate::budget::MAX_PROMPT_TITLES;
use crate::error::ScoreValidationError;
use crate::models::{BackgroundSnippet, MarketPotential, ProductConcept, SourceStrategy, Topic};
use crate::scoring::{ScoreSet, SubScores};
use crate::similarity::{lexical_diversity, strip_site_suffix};
use crate::theme::Theme;

/// Popularity at which `heat` saturates (10^7).
const HEAT_SATURATION_LOG10: f64 = 7.0;
const IDEAL_LABEL_CHARS: std::ops::RangeInclusive<usize> = 4..=12;
const NAME_LABEL_CHARS: usize = 6;

/// `base + span * mix`. Weight sums can round slightly above 1.0, so `mix`
/// is clamped.
fn blend(base: f64, span: f64, mix: f64) -> f64 {
    base + span * mix.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signals {
    pub heat: f64,
    pub coverage: f64,
    pub diversity: f64,
    pub brevity: f64,
}

impl Signals {
    pub fn of(topic: &Topic, snippets: &[BackgroundSnippet]) -> Self {
        let heat = ((topic.popularity_score.max(0.0) + 1.0).log10() / HEAT_SATURATION_LOG10).clamp(0.0, 1.0);
        let coverage = snippets.len().min(MAX_PROMPT_TITLES) as f64 / MAX_PROMPT_TITLES as f64;
        let titles: Vec<&str> = snippets.iter().map(|s| s.title.as_str()).collect();
        let diversity = lexical_diversity(&titles);

        let len = topic.label.chars().count();
        let brevity = if IDEAL_LABEL_CHARS.contains(&len) {
            1.0
        } else if len < *IDEAL_LABEL_CHARS.start() {
            len as f64 / *IDEAL_LABEL_CHARS.start() as f64
        } else {
            (1.0 - (len - IDEAL_LABEL_CHARS.end()) as f64 / 20.0).max(0.0)
        };

        Self {
            heat,
            coverage,
            diversity,
            brevity,
        }
    }

    pub fn sub_scores(&self) -> SubScores {
        let Signals {
            heat,
            coverage,
            diversity,
            brevity,
        } = *self;
        SubScores {
            innovation: blend(15.0, 15.0, 0.5 * diversity + 0.3 * brevity + 0.2 * (1.0 - heat)),
            pain_point: blend(15.0, 10.0, 0.6 * heat + 0.4 * coverage),
            potential: blend(10.0, 5.0, heat),
            social: blend(5.0, 5.0, 0.7 * heat + 0.3 * brevity),
            practicality: blend(5.0, 5.0, 0.5 * coverage + 0.5 * diversity),
            feasibility: blend(5.0, 5.0, 0.6 * brevity + 0.4 * coverage),
        }
    }
}

fn growth_stage(heat: f64) -> &'static str {
    if heat >= 0.7 {
        "快速成长期"
    } else if heat >= 0.4 {
        "成长期"
    } else {
        "萌芽期"
    }
}

/// Snippet titles usable in a narrative: site suffix removed, 8..60 chars.
fn narrative_titles(snippets: &[BackgroundSnippet]) -> Vec<String> {
    snippets
        .iter()
        .take(MAX_PROMPT_TITLES)
        .map(|s| strip_site_suffix(&s.title).to_string())
        .filter(|t| (8..60).contains(&t.chars().count()))
        .collect()
}

fn head(s: &str, n: usize) -> String {
    s.chars().take(n).collect()
}

/// Short event narrative. Built from background titles when at least two
/// usable ones exist, otherwise from the topic's theme.
pub fn timeline(label: &str, theme: Theme, snippets: &[BackgroundSnippet]) -> String {
    let titles = narrative_titles(snippets);
    if titles.len() >= 2 {
        let last = titles.len() - 1;
        let mut parts = vec![
            format!("'{}'引发关注", label),
            format!("起初{}", head(&titles[0], 30)),
            format!("随后{}", head(&titles[1], 30)),
        ];
        if last >= 2 {
            parts.push(format!("最新进展：{}", head(&titles[last], 25)));
        } else {
            parts.push("目前讨论仍在持续".to_string());
        }
        return parts.join("。") + "。";
    }
    theme.profile().timeline.replace("{}", label)
}

/// Run the rule-based strategy. Errors only if the formula yields an
/// out-of-range score, which would be a defect here rather than bad input.
pub fn analyze(topic: &Topic, snippets: &[BackgroundSnippet]) -> Result<ProductConcept, ScoreValidationError> {
    let signals = Signals::of(topic, snippets);
    let scores = ScoreSet::checked(signals.sub_scores())?;

    let label = topic.label.as_str();
    let theme = Theme::classify(label);
    let profile = theme.profile();

    let mut core_features = vec![format!("实时追踪 - 第一时间推送'{}'的最新动态", label)];
    core_features.extend(profile.features.iter().map(|f| f.to_string()));
    core_features.push("智能推荐 - 根据关注偏好推送相关内容".to_string());

    let mut pain_points = vec![format!("关于'{}'的信息分散在多个平台", label)];
    pain_points.extend(profile.pain_points.iter().map(|p| p.to_string()));
    pain_points.push("缺少个性化的内容筛选".to_string());

    let innovation_points = vec![
        format!("首个聚焦'{}'场景的专业分析工具", label),
        "AI识别关键信息，过滤噪音内容".to_string(),
        "实时追踪与历史回溯结合".to_string(),
        "用户参与共建内容".to_string(),
    ];

    Ok(ProductConcept {
        name: format!("「{}」{}", head(label, NAME_LABEL_CHARS), profile.name_suffix),
        core_features,
        pain_points,
        target_users: profile.target_users.replace("{}", label),
        innovation_points,
        market_potential: MarketPotential {
            market_size: format!("围绕'{}'的{}细分市场", label, profile.display),
            growth_stage: growth_stage(signals.heat).to_string(),
            competitive_advantage: format!("深耕{}场景，形成内容与数据壁垒", profile.display),
            revenue_model: profile.revenue_model.to_string(),
        },
        scores,
        timeline: timeline(label, theme, snippets),
        source_strategy: SourceStrategy::Fallback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::out_models::MAX_LIST_ITEMS;
    use crate::scoring::{
        FEASIBILITY_MAX, INNOVATION_MAX, PAIN_POINT_MAX, POTENTIAL_MAX, PRACTICALITY_MAX, SOCIAL_MAX,
    };

    fn snip(title: &str, position: usize) -> BackgroundSnippet {
        BackgroundSnippet {
            title: title.to_string(),
            source_hint: "unknown".to_string(),
            position,
        }
    }

    fn assert_in_range(s: &ScoreSet) {
        assert!((0.0..=INNOVATION_MAX).contains(&s.innovation));
        assert!((0.0..=PAIN_POINT_MAX).contains(&s.pain_point));
        assert!((0.0..=POTENTIAL_MAX).contains(&s.potential));
        assert!((0.0..=SOCIAL_MAX).contains(&s.social));
        assert!((0.0..=PRACTICALITY_MAX).contains(&s.practicality));
        assert!((0.0..=FEASIBILITY_MAX).contains(&s.feasibility));
        assert!((0.0..=100.0).contains(&s.total));
        assert!((s.total - (s.interest_score + s.utility_score)).abs() < 1e-9);
    }

    fn assert_no_blank_fields(c: &ProductConcept) {
        assert!(!c.name.trim().is_empty());
        assert!(!c.target_users.trim().is_empty());
        assert!(!c.timeline.trim().is_empty());
        let mp = &c.market_potential;
        for f in [&mp.market_size, &mp.growth_stage, &mp.competitive_advantage, &mp.revenue_model] {
            assert!(!f.trim().is_empty());
        }
        for list in [&c.core_features, &c.pain_points, &c.innovation_points] {
            assert!((1..=MAX_LIST_ITEMS).contains(&list.len()));
            assert!(list.iter().all(|s| !s.trim().is_empty()));
        }
    }

    #[test]
    fn forced_fallback_scenario() {
        let topic = Topic::new(1, "某明星官宣", 987654.0).unwrap();
        let c = analyze(&topic, &[]).unwrap();
        assert_eq!(c.source_strategy, SourceStrategy::Fallback);
        assert_in_range(&c.scores);
        assert_no_blank_fields(&c);
        assert_eq!(c.name, "「某明星官宣」追星日历");
    }

    #[test]
    fn is_deterministic() {
        let topic = Topic::new(4, "胖东来羽绒服进价", 123456.0).unwrap();
        let snippets = vec![snip("胖东来回应羽绒服定价争议_新浪财经", 1), snip("羽绒服进价曝光引发热议", 2)];
        let a = analyze(&topic, &snippets).unwrap();
        let b = analyze(&topic.clone(), &snippets.clone()).unwrap();
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn extreme_signals_stay_in_range() {
        let long_label = "超".repeat(200);
        let many: Vec<_> = (0..40).map(|i| snip(&format!("完全不同的标题编号{i}"), i + 1)).collect();
        let cases = [
            (Topic::new(1, "a", 0.0).unwrap(), Vec::new()),
            (Topic::new(2, &long_label, f64::MAX).unwrap(), many.clone()),
            (Topic::new(3, "中等长度话题", 1e12).unwrap(), many),
            (Topic::new(4, "x", 1.0).unwrap(), vec![snip("同 同 同 同", 1)]),
        ];
        for (topic, snippets) in cases {
            let c = analyze(&topic, &snippets).unwrap();
            assert_in_range(&c.scores);
            assert_no_blank_fields(&c);
        }
    }

    #[test]
    fn signals_move_scores() {
        let quiet = Topic::new(1, "冷门话题测试", 10.0).unwrap();
        let hot = Topic::new(1, "冷门话题测试", 5_000_000.0).unwrap();
        let q = Signals::of(&quiet, &[]).sub_scores();
        let h = Signals::of(&hot, &[]).sub_scores();
        assert!(h.potential > q.potential);
        assert!(h.social > q.social);
    }

    #[test]
    fn narrative_keeps_segmented_headlines() {
        let snippets = vec![
            snip("张三公司_回应产品质量争议_新浪新闻", 1),
            snip("张三公司_发布致歉声明并召回_网易新闻", 2),
        ];
        assert_eq!(
            narrative_titles(&snippets),
            vec!["张三公司_回应产品质量争议", "张三公司_发布致歉声明并召回"]
        );
        let t = timeline("张三公司", Theme::General, &snippets);
        assert!(t.contains("起初张三公司_回应产品质量争议"));
    }

    #[test]
    fn timeline_uses_titles_when_available() {
        let snippets = vec![
            snip("某明星工作室发布官方声明_娱乐频道", 1),
            snip("网友热议某明星官宣恋情细节", 2),
            snip("品牌方连夜更换代言海报引关注", 3),
        ];
        let t = timeline("某明星官宣", Theme::Entertainment, &snippets);
        assert!(t.starts_with("'某明星官宣'引发关注。起初某明星工作室发布官方声明"));
        assert!(t.contains("最新进展：品牌方连夜更换代言海报引关注"));

        let t = timeline("某明星官宣", Theme::Entertainment, &[]);
        assert!(t.contains("娱乐热点"));
    }
}
