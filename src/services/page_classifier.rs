//! 页面边界分类 - 业务能力层
//!
//! 只根据单页文本（和文档类型）判断这一页是新题、新小问、另解、续页还是跳过，
//! 不修改任何状态。状态推进见 [`crate::services::segmentation`]。
//!
//! ## 规则顺序
//!
//! 跳过判断优先于一切；之后按 [`ClassifierConfig::rules`] 的顺序逐条评估，
//! 第一条在窗口内任意位置命中的规则胜出（不是"全规则最左匹配"）：
//!
//! 1. [`BoundaryRule::Subpart`]：`7(a)`
//! 2. [`BoundaryRule::LabeledQuestion`]：`Question 7`
//! 3. [`BoundaryRule::AlternativeMethod`]：`Alternative method for Question 7`（仅评分标准）
//! 4. [`BoundaryRule::BareNumber`]：行首 `7 Find ...`、`7 (a)`，或独占一行的 `7`
//!    后接大写开头的题干；最容易误判，单位标注（`20 N`）和页码行不算
//!
//! 都不命中则为 [`ClassificationVerdict::Continuation`]。

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::models::DocVariant;
use crate::services::segmentation::SegmentationState;

static SUBPART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})\(([a-z])\)").expect("valid subpart regex"));

static LABELED_QUESTION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bQuestion\s*(\d{1,2})\b").expect("valid labeled question regex")
});

static ALTERNATIVE_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Alternative\s+method\s+for\s+Question\s*(\d{1,2})\b")
        .expect("valid alternative method regex")
});

/// 行首数字，后面跟 `(字母)`、空白加单词，或者独占一行
static BARE_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(\d{1,2})(?:\s*\(([a-z])\)|\s+([A-Za-z]+)|\s*$)")
        .expect("valid bare number regex")
});

static LEADING_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z]+)").expect("valid leading word regex"));

/// 图中常见的单位标注（`20 N`、`5 m`、`12 cm`），不是题目开头
const UNIT_SYMBOLS: &[&str] = &[
    "N", "kN", "m", "cm", "mm", "km", "kg", "g", "s", "ms", "J", "kJ", "W", "kW", "h", "min",
    "rad", "Nm",
];

/// 页脚版权行
const FOOTER_PREFIX: &str = "UCLES";

const ALTERNATIVE_PREFIX: [&str; 3] = ["alternative", "method", "for"];

/// 单页的分类结论，每页恰好一个
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClassificationVerdict {
    NewQuestion(u32),
    NewSubpart(u32, char),
    /// 评分标准中某题的另一种解法，延续已有题目而不是新边界
    AlternativeMethod(u32),
    Continuation,
    /// 空白页或附加页
    Skip,
}

impl std::fmt::Display for ClassificationVerdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClassificationVerdict::NewQuestion(n) => write!(f, "新题 {}", n),
            ClassificationVerdict::NewSubpart(n, l) => write!(f, "新小问 {}({})", n, l),
            ClassificationVerdict::AlternativeMethod(n) => write!(f, "另解 {}", n),
            ClassificationVerdict::Continuation => write!(f, "续页"),
            ClassificationVerdict::Skip => write!(f, "跳过"),
        }
    }
}

/// 行首裸数字（没有字母、没有 `Question` 标签）在已有小问时的处理方式
///
/// 不同版本的脚本给出过两种答案，这里两种都保留，由配置选择。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BareNumberPolicy {
    /// 总是开启新题（试题卷脚本的行为）
    NewQuestion,
    /// 当前有小问时视为续页（评分标准脚本的行为）
    ContinueActiveSubpart,
}

impl BareNumberPolicy {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "new_question" => Some(BareNumberPolicy::NewQuestion),
            "continue_subpart" | "continue_active_subpart" => {
                Some(BareNumberPolicy::ContinueActiveSubpart)
            }
            _ => None,
        }
    }
}

/// 边界匹配规则
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BoundaryRule {
    Subpart,
    LabeledQuestion,
    AlternativeMethod,
    BareNumber,
}

impl BoundaryRule {
    /// 默认优先级
    pub const PRIORITY: [BoundaryRule; 4] = [
        BoundaryRule::Subpart,
        BoundaryRule::LabeledQuestion,
        BoundaryRule::AlternativeMethod,
        BoundaryRule::BareNumber,
    ];

    pub fn name(self) -> &'static str {
        match self {
            BoundaryRule::Subpart => "subpart",
            BoundaryRule::LabeledQuestion => "labeled_question",
            BoundaryRule::AlternativeMethod => "alternative_method",
            BoundaryRule::BareNumber => "bare_number",
        }
    }

    pub fn applies_to(self, variant: DocVariant) -> bool {
        match self {
            BoundaryRule::AlternativeMethod => variant == DocVariant::MarkScheme,
            _ => true,
        }
    }

    fn evaluate(
        self,
        window: &PageWindow<'_>,
        policy: BareNumberPolicy,
        prior: &SegmentationState,
    ) -> Option<ClassificationVerdict> {
        match self {
            BoundaryRule::Subpart => SUBPART.captures_iter(&window.joined).find_map(|caps| {
                let number = positive(&caps[1])?;
                let letter = caps[2].chars().next()?;
                Some(ClassificationVerdict::NewSubpart(number, letter))
            }),
            BoundaryRule::LabeledQuestion => {
                LABELED_QUESTION
                    .captures_iter(&window.joined)
                    .find_map(|caps| {
                        let whole = caps.get(0)?;
                        let before = window.joined[..whole.start()].to_lowercase();
                        let tail: Vec<&str> = before.split_whitespace().rev().take(3).collect();
                        if tail.iter().rev().eq(ALTERNATIVE_PREFIX.iter()) {
                            return None;
                        }
                        positive(&caps[1]).map(ClassificationVerdict::NewQuestion)
                    })
            }
            BoundaryRule::AlternativeMethod => ALTERNATIVE_METHOD
                .captures_iter(&window.joined)
                .find_map(|caps| positive(&caps[1]).map(ClassificationVerdict::AlternativeMethod)),
            BoundaryRule::BareNumber => window.lines.iter().enumerate().find_map(|(i, line)| {
                let caps = BARE_NUMBER.captures(line)?;
                let number = positive(&caps[1])?;
                if let Some(letter) = caps.get(2).and_then(|m| m.as_str().chars().next()) {
                    return Some(ClassificationVerdict::NewSubpart(number, letter));
                }
                let opens_question = match caps.get(3) {
                    Some(word) => !is_unit_symbol(word.as_str()),
                    // 题号被抽成单独一行：下一行必须像题干开头
                    None => window.next_text_line(i).is_some_and(starts_question_text),
                };
                if !opens_question {
                    return None;
                }
                match policy {
                    BareNumberPolicy::ContinueActiveSubpart if prior.current_subpart().is_some() => {
                        Some(ClassificationVerdict::Continuation)
                    }
                    _ => Some(ClassificationVerdict::NewQuestion(number)),
                }
            }),
        }
    }
}

fn is_unit_symbol(word: &str) -> bool {
    UNIT_SYMBOLS.contains(&word)
}

/// 大写字母开头，且不是页脚或单位
fn starts_question_text(line: &str) -> bool {
    if line.starts_with(FOOTER_PREFIX) || !line.starts_with(|c: char| c.is_ascii_uppercase()) {
        return false;
    }
    LEADING_WORD
        .captures(line)
        .is_some_and(|caps| !is_unit_symbol(&caps[1]))
}

/// 题号必须是正整数
fn positive(digits: &str) -> Option<u32> {
    digits.parse::<u32>().ok().filter(|n| *n > 0)
}

/// 分类器配置
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// 规则按顺序评估
    pub rules: Vec<BoundaryRule>,
    /// 出现即跳过整页的短语（区分大小写）
    pub skip_markers: Vec<String>,
    pub qp_window_lines: usize,
    pub ms_window_lines: usize,
    pub bare_number_policy: BareNumberPolicy,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            rules: BoundaryRule::PRIORITY.to_vec(),
            skip_markers: vec!["BLANK PAGE".to_string(), "Additional page".to_string()],
            qp_window_lines: 10,
            ms_window_lines: 20,
            bare_number_policy: BareNumberPolicy::NewQuestion,
        }
    }
}

/// 页面开头若干行构成的检查窗口
struct PageWindow<'a> {
    lines: Vec<&'a str>,
    joined: String,
}

impl<'a> PageWindow<'a> {
    fn new(text: &'a str, line_count: usize) -> Self {
        let lines: Vec<&str> = text.lines().take(line_count).collect();
        let joined = lines.join(" ");
        Self { lines, joined }
    }

    /// 第 `index` 行之后第一个非空行（仍在窗口内）
    fn next_text_line(&self, index: usize) -> Option<&'a str> {
        self.lines
            .iter()
            .skip(index + 1)
            .map(|line| line.trim())
            .find(|line| !line.is_empty())
    }
}

/// 分类结果，附带命中的规则（用于日志）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub verdict: ClassificationVerdict,
    pub rule: Option<BoundaryRule>,
}

/// 页面分类器
#[derive(Debug, Clone, Default)]
pub struct PageClassifier {
    config: ClassifierConfig,
}

impl PageClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// 对单页做出分类结论
    pub fn classify(
        &self,
        page_text: &str,
        variant: DocVariant,
        prior: &SegmentationState,
    ) -> ClassificationVerdict {
        self.classify_detailed(page_text, variant, prior).verdict
    }

    /// 同 [`classify`](Self::classify)，额外返回命中的规则
    pub fn classify_detailed(
        &self,
        page_text: &str,
        variant: DocVariant,
        prior: &SegmentationState,
    ) -> Classification {
        if self.is_skip_page(page_text) {
            return Classification {
                verdict: ClassificationVerdict::Skip,
                rule: None,
            };
        }

        let window = PageWindow::new(page_text, self.window_lines(variant));

        self.config
            .rules
            .iter()
            .filter(|rule| rule.applies_to(variant))
            .find_map(|rule| {
                rule.evaluate(&window, self.config.bare_number_policy, prior)
                    .map(|verdict| Classification {
                        verdict,
                        rule: Some(*rule),
                    })
            })
            .unwrap_or(Classification {
                verdict: ClassificationVerdict::Continuation,
                rule: None,
            })
    }

    /// 页面是否带有空白页/附加页标记
    pub fn is_skip_page(&self, page_text: &str) -> bool {
        self.config
            .skip_markers
            .iter()
            .any(|marker| page_text.contains(marker.as_str()))
    }

    fn window_lines(&self, variant: DocVariant) -> usize {
        match variant {
            DocVariant::QuestionPaper => self.config.qp_window_lines,
            DocVariant::MarkScheme => self.config.ms_window_lines,
        }
    }
}
