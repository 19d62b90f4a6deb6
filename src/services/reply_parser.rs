//! 生成式回复解析 - 业务能力层
//!
//! 讲解服务按固定格式回复：
//!
//! ```text
//! difficulty = <Easy | Medium | Hard>
//! topic = <主题名>
//! ai_explanation = <逐步讲解，可以跨多行直到结尾>
//! ```
//!
//! 缺少任意一行都是可恢复错误：跳过该记录，继续下一条。

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::error::ReplyError;
use crate::models::{Difficulty, ExplanationReply};
use crate::utils::logging::truncate_text;

static DIFFICULTY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?im)^[ \t]*difficulty[ \t]*=[ \t]*(.*)$").expect("valid difficulty regex")
});

static TOPIC_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*topic[ \t]*=[ \t]*(.*)$").expect("valid topic regex"));

static EXPLANATION_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?ims)^[ \t]*ai_explanation[ \t]*=[ \t]*(.*)\z").expect("valid explanation regex")
});

/// 取出某个键的非空值
fn field<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|value| !value.is_empty())
}

/// 解析一条回复
pub fn parse_reply(text: &str) -> Result<ExplanationReply, ReplyError> {
    debug!("解析回复: {}", truncate_text(text, 80));

    let difficulty = field(&DIFFICULTY_LINE, text);
    let topic = field(&TOPIC_LINE, text);
    let explanation = field(&EXPLANATION_BLOCK, text);

    let missing: Vec<&'static str> = [
        ("difficulty", difficulty.is_none()),
        ("topic", topic.is_none()),
        ("ai_explanation", explanation.is_none()),
    ]
    .into_iter()
    .filter_map(|(name, absent)| absent.then_some(name))
    .collect();

    match (difficulty, topic, explanation) {
        (Some(difficulty), Some(topic), Some(explanation)) => {
            let difficulty =
                Difficulty::from_name(difficulty).ok_or_else(|| ReplyError::InvalidDifficulty {
                    value: difficulty.to_string(),
                })?;
            Ok(ExplanationReply {
                difficulty,
                topic: topic.to_string(),
                explanation: explanation.to_string(),
            })
        }
        _ => Err(ReplyError::IncompleteReply { missing }),
    }
}
