use crate::budget::{truncate_chars, MAX_LABEL_CHARS};

/// Token allowance for the background-title block of the analysis prompt.
pub const TITLE_BLOCK_TOKENS: usize = 400;

pub fn user_product_analysis(label: &str, titles: &[String]) -> String {
    let background = if titles.is_empty() {
        "（暂无搜索结果，请基于话题名称本身进行分析）".to_string()
    } else {
        titles
            .iter()
            .enumerate()
            .map(|(i, t)| format!("{}. {}", i + 1, t))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(r#"你是资深的产品创新专家和市场分析师。请基于下面的微博热搜话题构思一个产品创意。

## 热搜话题
{label}

## 相关新闻/讨论
{background}

请只返回一个JSON对象，不要任何其他文字或解释，结构如下：
{{
  "name": "产品名称（不超过15字）",
  "core_features": ["核心功能 - 简要描述", "...最多5条"],
  "market_pain_points": ["用户痛点", "...最多5条"],
  "target_users": "目标用户描述（50字内）",
  "innovation_points": ["创新点", "...最多5条"],
  "market_potential": {{
    "market_size": "市场规模",
    "growth_stage": "增长阶段",
    "competitive_advantage": "竞争优势",
    "revenue_model": "商业模式"
  }},
  "scores": {{
    "innovation": 0-30,
    "pain_point": 0-25,
    "potential": 0-15,
    "social": 0-10,
    "practicality": 0-10,
    "feasibility": 0-10
  }},
  "event_timeline": "事件脉络（50-100字，可选）"
}}

评分标准：
- innovation: 概念新颖程度
- pain_point: 是否抓住真实痛点
- potential: 用户基数和增长空间
- social: 传播性和社交裂变潜力
- practicality: 解决实际问题的能力
- feasibility: 技术实现的可行性

CONSTRAINTS:
- 针对具体话题定制分析，提取话题中的品牌、数字、事件等关键信息。
- 分数必须是数字。"#, label = truncate_chars(label, MAX_LABEL_CHARS), background = background)
}
