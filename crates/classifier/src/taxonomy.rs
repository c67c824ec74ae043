//! Topic taxonomy: each topic carries bilingual keyword lists matched as case-insensitive substrings.

use companion_core::Topic;

/// Keywords that assign one topic.
#[derive(Debug, Clone)]
pub struct TopicRule {
    pub topic: Topic,
    /// Lowercased keywords; matched as substrings of the lowercased text.
    pub keywords: Vec<String>,
}

impl TopicRule {
    pub fn new<I, S>(topic: Topic, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            topic,
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Returns true if `lowered` (already lowercased) contains any keyword.
    pub fn matches(&self, lowered: &str) -> bool {
        self.keywords.iter().any(|k| lowered.contains(k.as_str()))
    }
}

const SAFETY_RISK_EN: &[&str] = &[
    "suicide",
    "suicidal",
    "kill myself",
    "end my life",
    "want to die",
    "self-harm",
    "self harm",
    "hurt myself",
    "cut myself",
    "overdose",
    "no reason to live",
];
const SAFETY_RISK_ZH: &[&str] = &[
    "自杀", "想死", "不想活", "轻生", "自残", "伤害自己", "结束生命", "活不下去",
];

const AFFECT_EN: &[&str] = &[
    "anxious",
    "anxiety",
    "sad",
    "depressed",
    "depression",
    "lonely",
    "angry",
    "scared",
    "afraid",
    "stressed",
    "hopeless",
    "overwhelmed",
    "panic",
    "upset",
    "happy",
    "crying",
];
const AFFECT_ZH: &[&str] = &[
    "焦虑", "难过", "伤心", "抑郁", "孤独", "生气", "害怕", "压力", "绝望", "崩溃", "痛苦", "开心",
    "哭",
];

const RELATIONSHIPS_EN: &[&str] = &[
    "friend",
    "family",
    "partner",
    "boyfriend",
    "girlfriend",
    "husband",
    "wife",
    "breakup",
    "broke up",
    "divorce",
    "parents",
    "relationship",
];
const RELATIONSHIPS_ZH: &[&str] = &[
    "朋友", "家人", "男朋友", "女朋友", "老公", "老婆", "分手", "离婚", "父母", "妈妈", "爸爸", "恋爱",
];

const WORK_EN: &[&str] = &[
    "work",
    "job",
    "boss",
    "career",
    "office",
    "colleague",
    "coworker",
    "deadline",
    "salary",
    "interview",
    "promotion",
    "fired",
];
const WORK_ZH: &[&str] = &[
    "工作", "老板", "同事", "加班", "职业", "面试", "辞职", "工资", "升职", "上班",
];

const HEALTH_EN: &[&str] = &[
    "sleep",
    "insomnia",
    "tired",
    "exercise",
    "pain",
    "doctor",
    "sick",
    "headache",
    "diet",
    "medication",
];
const HEALTH_ZH: &[&str] = &[
    "睡眠", "失眠", "睡不着", "累", "运动", "疼", "医生", "生病", "头疼", "吃药",
];

/// Built-in taxonomy in [`Topic::ALL`] order.
pub fn default_taxonomy() -> Vec<TopicRule> {
    let pairs: [(Topic, &[&str], &[&str]); 5] = [
        (Topic::SafetyRisk, SAFETY_RISK_EN, SAFETY_RISK_ZH),
        (Topic::Affect, AFFECT_EN, AFFECT_ZH),
        (Topic::Relationships, RELATIONSHIPS_EN, RELATIONSHIPS_ZH),
        (Topic::Work, WORK_EN, WORK_ZH),
        (Topic::Health, HEALTH_EN, HEALTH_ZH),
    ];
    pairs
        .into_iter()
        .map(|(topic, en, zh)| TopicRule::new(topic, en.iter().chain(zh.iter())))
        .collect()
}
