// src/render.rs
use crate::models::{AnalysisResult, SourceStrategy};
use crate::orchestrator::RunOutput;
use crate::scoring::Tier;

fn tier_label(t: Tier) -> &'static str {
    match t {
        Tier::Excellent => "优秀",
        Tier::Good => "良好",
        Tier::Average => "一般",
    }
}

fn strategy_label(s: SourceStrategy) -> &'static str {
    match s {
        SourceStrategy::Primary => "AI 分析",
        SourceStrategy::Fallback => "规则分析",
    }
}

fn push_list(md: &mut String, title: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    md.push_str(&format!("**{}**\n", title));
    for item in items {
        md.push_str(&format!("- {}\n", item));
    }
    md.push('\n');
}

pub fn render_result_markdown(position: usize, r: &AnalysisResult) -> String {
    let c = &r.concept;
    let s = &c.scores;
    let mut md = String::new();

    md.push_str(&format!("## {}. 🔥 {} · {:.1} 分\n\n", position, r.topic.label, s.total));
    md.push_str(&format!(
        "热搜第 {} 位 · 热度 {:.0} · {} · {}\n\n",
        r.topic.rank,
        r.topic.popularity_score,
        tier_label(Tier::of(s.total)),
        strategy_label(c.source_strategy)
    ));

    md.push_str(&format!("**产品名称**：{}\n\n", c.name));
    md.push_str(&format!("**目标用户**：{}\n\n", c.target_users));

    push_list(&mut md, "核心功能", &c.core_features);
    push_list(&mut md, "市场痛点", &c.pain_points);
    push_list(&mut md, "创新点", &c.innovation_points);

    let mp = &c.market_potential;
    md.push_str("**市场潜力**\n");
    md.push_str(&format!("- 市场规模：{}\n", mp.market_size));
    md.push_str(&format!("- 发展阶段：{}\n", mp.growth_stage));
    md.push_str(&format!("- 竞争优势：{}\n", mp.competitive_advantage));
    md.push_str(&format!("- 盈利模式：{}\n\n", mp.revenue_model));

    md.push_str("**评分详情**\n\n");
    md.push_str("| 创新性 | 痛点 | 潜力 | 社交 | 实用性 | 可行性 | 有趣度 | 有用度 | 综合 |\n");
    md.push_str("|---|---|---|---|---|---|---|---|---|\n");
    md.push_str(&format!(
        "| {:.1}/30 | {:.1}/25 | {:.1}/15 | {:.1}/10 | {:.1}/10 | {:.1}/10 | {:.1}/80 | {:.1}/20 | {:.1} |\n\n",
        s.innovation,
        s.pain_point,
        s.potential,
        s.social,
        s.practicality,
        s.feasibility,
        s.interest_score,
        s.utility_score,
        s.total
    ));

    md.push_str(&format!("**事件脉络**：{}\n\n", c.timeline.trim()));

    if !r.snippets.is_empty() {
        md.push_str("**背景资料**\n");
        for sn in &r.snippets {
            md.push_str(&format!("{}. {} ({})\n", sn.position, sn.title, sn.source_hint));
        }
        md.push('\n');
    }

    md
}

/// Full report: header with tier statistics, then one section per topic in
/// ranked order.
pub fn render_report_markdown(out: &RunOutput, generated_at: &str) -> String {
    let sm = &out.summary;
    let mut md = String::new();
    md.push_str("# 热搜产品创意分析\n\n");
    md.push_str(&format!("生成时间：{}\n\n", generated_at));

    md.push_str("| 分析热点 | 优秀 (≥80) | 良好 (60-80) | 一般 (<60) | AI 分析 | 规则分析 |\n");
    md.push_str("|---|---|---|---|---|---|\n");
    md.push_str(&format!(
        "| {} | {} | {} | {} | {} | {} |\n\n",
        sm.analyzed, sm.excellent, sm.good, sm.average, sm.primary, sm.fallback
    ));

    if !sm.top.is_empty() {
        md.push_str("## 🌟 TOP 3\n");
        for (i, t) in sm.top.iter().enumerate() {
            md.push_str(&format!("{}. **{}** · {} ({:.1} 分)\n", i + 1, t.name, t.label, t.total));
        }
        md.push('\n');
    }

    if out.ranked.is_empty() {
        md.push_str("_本次没有可分析的热点。_\n");
        return md;
    }

    for (i, r) in out.ranked.iter().enumerate() {
        md.push_str(&render_result_markdown(i + 1, r));
    }

    md.push_str("---\n本报告由 AI 与规则分析自动生成，仅供参考。\n");
    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback;
    use crate::models::{BackgroundSnippet, Topic};
    use crate::scoring::{rank, summarize};

    fn output() -> RunOutput {
        let results: Vec<AnalysisResult> = [("某明星官宣", 987654.0), ("世界之外", 1200.0)]
            .iter()
            .enumerate()
            .map(|(i, (label, pop))| {
                let topic = Topic::new(i as u32 + 1, label, *pop).unwrap();
                let snippets = vec![BackgroundSnippet {
                    title: format!("{}最新消息", label),
                    source_hint: "news.example.com".to_string(),
                    position: 1,
                }];
                let concept = fallback::analyze(&topic, &snippets).unwrap();
                AnalysisResult::new(topic, snippets, concept, None)
            })
            .collect();
        let ranked = rank(&results);
        let summary = summarize(&ranked);
        RunOutput { ranked, summary }
    }

    #[test]
    fn report_has_header_and_sections_in_rank_order() {
        let out = output();
        let md = render_report_markdown(&out, "2026-10-15 09:00");
        assert!(md.starts_with("# 热搜产品创意分析"));
        assert!(md.contains("| 2 |"));
        assert!(md.contains("规则分析"));
        let first = md.find(&format!("## 1. 🔥 {}", out.ranked[0].topic.label)).unwrap();
        let second = md.find(&format!("## 2. 🔥 {}", out.ranked[1].topic.label)).unwrap();
        assert!(first < second);
        assert!(md.contains("news.example.com"));
        assert!(md.contains(&format!("1. **{}** · {}", out.summary.top[0].name, out.summary.top[0].label)));
        assert!(!md.contains('—'));
    }

    #[test]
    fn empty_run_still_renders() {
        let out = RunOutput {
            ranked: Vec::new(),
            summary: summarize(&[]),
        };
        let md = render_report_markdown(&out, "now");
        assert!(md.contains("没有可分析的热点"));
    }
}
