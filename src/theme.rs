//! Keyword-based topic classification used by the rule-based strategy to
//! pick domain-appropriate wording.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Ecommerce,
    Entertainment,
    Gaming,
    Tech,
    SocialNews,
    Auto,
    International,
    Festival,
    General,
}

/// Checked in order; the first theme with a matching keyword wins.
const KEYWORDS: &[(Theme, &[&str])] = &[
    (Theme::Ecommerce, &["胖东来", "京东", "淘宝", "天猫", "价格", "商品", "购物", "优惠", "羽绒服", "好物"]),
    (Theme::Entertainment, &["轧戏", "演员", "电影", "电视剧", "综艺", "明星", "官宣", "歌手", "演唱会"]),
    (Theme::Gaming, &["世界之外", "第五人格", "游戏", "开大", "王者", "原神", "英雄联盟"]),
    (Theme::Tech, &["手机", "华为", "小米", "苹果", "芯片", "AI", "新品", "发布", "大模型"]),
    (Theme::SocialNews, &["火灾", "事故", "晕倒", "离职", "被封", "争议", "回应", "通报"]),
    (Theme::Auto, &["汽车", "长城", "特斯拉", "比亚迪", "新车", "车型", "发布会"]),
    (Theme::International, &["韩国", "日本", "美国", "全球", "国际", "欧洲"]),
    (Theme::Festival, &["新年", "春节", "双11", "618", "中秋", "国庆"]),
];

pub struct ThemeProfile {
    pub display: &'static str,
    pub name_suffix: &'static str,
    pub features: [&'static str; 3],
    pub pain_points: [&'static str; 3],
    /// `{}` is replaced by the topic label.
    pub target_users: &'static str,
    /// `{}` is replaced by the topic label.
    pub timeline: &'static str,
    pub revenue_model: &'static str,
}

impl Theme {
    pub fn classify(label: &str) -> Theme {
        // exact keyword match beats substring match
        if let Some((theme, _)) = KEYWORDS.iter().find(|(_, kws)| kws.contains(&label)) {
            return *theme;
        }
        KEYWORDS
            .iter()
            .find(|(_, kws)| kws.iter().any(|kw| label.contains(kw)))
            .map(|(theme, _)| *theme)
            .unwrap_or(Theme::General)
    }

    pub fn profile(self) -> &'static ThemeProfile {
        match self {
            Theme::Ecommerce => &ECOMMERCE,
            Theme::Entertainment => &ENTERTAINMENT,
            Theme::Gaming => &GAMING,
            Theme::Tech => &TECH,
            Theme::SocialNews => &SOCIAL_NEWS,
            Theme::Auto => &AUTO,
            Theme::International => &INTERNATIONAL,
            Theme::Festival => &FESTIVAL,
            Theme::General => &GENERAL,
        }
    }
}

static ECOMMERCE: ThemeProfile = ThemeProfile {
    display: "电商零售",
    name_suffix: "比价助手",
    features: ["全网比价 - 同款商品跨平台价格一键对比", "降价提醒 - 关注商品跌价即时通知", "口碑摘要 - 从用户评价中提炼真实质量反馈"],
    pain_points: ["同款商品各平台价格不透明", "优惠规则复杂，难算到手价", "评价真假难辨"],
    target_users: "关注'{}'的网购用户，追求性价比，下单前习惯比价",
    timeline: "'{}'引发热议，网友围绕定价是否合理展开讨论，相关品牌备受关注，话题持续发酵。",
    revenue_model: "导购佣金+会员增值服务",
};

static ENTERTAINMENT: ThemeProfile = ThemeProfile {
    display: "娱乐影视",
    name_suffix: "追星日历",
    features: ["行程追踪 - 汇总艺人活动与作品档期", "剧情解读 - 角色关系与关键情节梳理", "同好社区 - 粉丝实时讨论与应援组织"],
    pain_points: ["娱乐资讯真假混杂", "行程与档期信息分散", "粉丝互动缺少专属空间"],
    target_users: "关注'{}'的追剧追星用户，乐于讨论与分享",
    timeline: "'{}'成为娱乐热点，粉丝与网友热烈讨论，社交媒体热度持续攀升。",
    revenue_model: "会员订阅+周边电商",
};

static GAMING: ThemeProfile = ThemeProfile {
    display: "游戏",
    name_suffix: "攻略社区",
    features: ["攻略库 - 精选玩法攻略与隐藏技巧", "版本解读 - 更新改动与强度变化速览", "组队匹配 - 快速找到合适队友"],
    pain_points: ["攻略质量参差不齐", "版本变动快，信息滞后", "找队友效率低"],
    target_users: "'{}'的新老玩家，希望提升技巧、结识队友",
    timeline: "'{}'在游戏圈引发热议，玩家讨论玩法与更新内容，社区活跃度明显提升。",
    revenue_model: "广告+会员+赛事合作",
};

static TECH: ThemeProfile = ThemeProfile {
    display: "科技数码",
    name_suffix: "评测平台",
    features: ["评测汇总 - 聚合专业评测与购买建议", "参数对比 - 与竞品逐项对比", "真实反馈 - 收集用户长期使用体验"],
    pain_points: ["参数繁多难以比较", "评测立场不一", "首发信息获取不及时"],
    target_users: "对'{}'感兴趣的科技爱好者，购买前习惯做功课",
    timeline: "'{}'引发广泛关注，产品亮点成为讨论焦点，消费者期待更多细节披露。",
    revenue_model: "导购佣金+品牌合作",
};

static SOCIAL_NEWS: ThemeProfile = ThemeProfile {
    display: "社会热点",
    name_suffix: "事件追踪",
    features: ["时间线还原 - 梳理事件关键节点", "多方观点 - 汇集不同立场的报道", "进展提醒 - 有新通报时即时推送"],
    pain_points: ["事件信息碎片化", "传闻与事实混杂", "后续进展难以持续跟踪"],
    target_users: "关注'{}'的公众，希望了解事实与各方观点",
    timeline: "'{}'事件持续发酵，涉事方与相关部门陆续回应，公众关注后续进展。",
    revenue_model: "会员订阅+机构数据服务",
};

static AUTO: ThemeProfile = ThemeProfile {
    display: "汽车",
    name_suffix: "选车助手",
    features: ["车型对比 - 同级竞品全方位对比", "车主口碑 - 长期用车真实反馈", "成本测算 - 保险油耗保养全周期计算"],
    pain_points: ["配置版本多，选择困难", "优惠信息不透明", "用车成本难以估算"],
    target_users: "正在选车、关注'{}'的消费者",
    timeline: "'{}'引发车圈关注，消费者关注产品性能与价格，期待更多细节公布。",
    revenue_model: "线索分成+广告",
};

static INTERNATIONAL: ThemeProfile = ThemeProfile {
    display: "国际",
    name_suffix: "全球资讯",
    features: ["多语资讯 - 聚合各国媒体报道", "背景科普 - 历史与地缘背景解读", "影响分析 - 评估对各领域的潜在影响"],
    pain_points: ["外媒信息获取门槛高", "缺少背景知识难以理解", "观点单一"],
    target_users: "关注'{}'的国际新闻读者，希望获得多角度报道",
    timeline: "'{}'受到国际舆论关注，各方表态不一，事件走向仍待观察。",
    revenue_model: "会员订阅+专题付费",
};

static FESTIVAL: ThemeProfile = ThemeProfile {
    display: "节日活动",
    name_suffix: "活动攻略",
    features: ["活动汇总 - 各平台活动规则一览", "省钱计算 - 最优凑单方案推荐", "节点提醒 - 重要时间倒计时"],
    pain_points: ["活动规则复杂", "优惠叠加难计算", "容易错过关键时间点"],
    target_users: "参与'{}'相关活动、希望拿到最大优惠的用户",
    timeline: "'{}'相关活动开启，各平台推出优惠，用户积极参与。",
    revenue_model: "导购佣金+品牌投放",
};

static GENERAL: ThemeProfile = ThemeProfile {
    display: "综合资讯",
    name_suffix: "智能助手",
    features: ["个性化定制 - 按兴趣筛选展示内容", "社交分享 - 一键分享到各大平台", "数据看板 - 热度趋势直观呈现"],
    pain_points: ["相关信息分散在多个平台", "缺乏专业深度分析", "信息过载，难以筛选"],
    target_users: "关注'{}'话题的用户群体，希望获取深度信息与专业分析",
    timeline: "'{}'话题引发广泛讨论，网友从不同角度表达观点，热度持续走高。",
    revenue_model: "会员+增值服务+精准广告",
};
