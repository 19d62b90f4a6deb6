//! 讲解回填 - 业务能力层
//!
//! 把讲解服务的原始回复解析后挂到对应记录上。某条回复不完整只跳过那一条，
//! 统计通过显式的 [`EnrichmentSummary`] 累加器返回，不使用任何全局计数。

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ReplyError;
use crate::models::{QuestionKey, QuestionRecord, ReplyEntry};
use crate::services::reply_parser::parse_reply;

/// 被跳过的一条回复
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedReply {
    pub question: String,
    pub reason: String,
}

/// 回填统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentSummary {
    pub applied: usize,
    /// 回复不完整或难度无效
    pub skipped: Vec<SkippedReply>,
    /// 题号无法解析或找不到对应记录
    pub unmatched: Vec<String>,
}

impl EnrichmentSummary {
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty() && self.unmatched.is_empty()
    }

    fn skip(mut self, question: &str, error: &ReplyError) -> Self {
        warn!("⚠️ 题目 {} 的回复无法使用，跳过: {}", question, error);
        self.skipped.push(SkippedReply {
            question: question.to_string(),
            reason: error.to_string(),
        });
        self
    }

    fn unmatched(mut self, question: &str) -> Self {
        warn!("⚠️ 回复对应的题目 {} 不存在，跳过", question);
        self.unmatched.push(question.to_string());
        self
    }
}

/// 依次解析回复并回填到记录上
pub fn apply_replies(records: &mut [QuestionRecord], replies: &[ReplyEntry]) -> EnrichmentSummary {
    let summary = replies
        .iter()
        .fold(EnrichmentSummary::default(), |mut summary, entry| {
            let Ok(key) = entry.question.parse::<QuestionKey>() else {
                return summary.unmatched(&entry.question);
            };
            let Some(record) = records.iter_mut().find(|record| record.key == key) else {
                return summary.unmatched(&entry.question);
            };

            match parse_reply(&entry.text) {
                Ok(reply) => {
                    record.explanation = Some(reply);
                    summary.applied += 1;
                    summary
                }
                Err(e) => summary.skip(&entry.question, &e),
            }
        });

    if !replies.is_empty() {
        info!(
            "✓ 讲解回填完成: 成功 {}/{}，跳过 {}，未匹配 {}",
            summary.applied,
            replies.len(),
            summary.skipped.len(),
            summary.unmatched.len()
        );
    }

    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Difficulty, DocVariant};
    use crate::services::identity_parser;

    fn records() -> Vec<QuestionRecord> {
        let identity = identity_parser::parse("9709_s23_qp_12.pdf").unwrap();
        vec![
            QuestionRecord::new(&identity, DocVariant::QuestionPaper, QuestionKey::subpart(1, 'a'), vec![]),
            QuestionRecord::new(&identity, DocVariant::QuestionPaper, QuestionKey::question(2), vec![]),
        ]
    }

    fn entry(question: &str, text: &str) -> ReplyEntry {
        ReplyEntry {
            question: question.to_string(),
            text: text.to_string(),
        }
    }

    #[test]
    fn test_complete_replies_are_attached() {
        let mut records = records();
        let summary = apply_replies(
            &mut records,
            &[entry("1(a)", "difficulty = Easy\ntopic = Quadratics\nai_explanation = Complete the square.")],
        );
        assert_eq!(summary.applied, 1);
        assert!(summary.is_clean());
        let explanation = records[0].explanation.as_ref().unwrap();
        assert_eq!(explanation.difficulty, Difficulty::Easy);
        assert_eq!(explanation.topic, "Quadratics");
        assert!(records[1].explanation.is_none());
    }

    #[test]
    fn test_incomplete_reply_skips_only_that_record() {
        let mut records = records();
        let summary = apply_replies(
            &mut records,
            &[
                entry("1(a)", "difficulty = Easy\nai_explanation = No topic line."),
                entry("2", "difficulty = Hard\ntopic = Series\nai_explanation = Use the sum formula."),
            ],
        );
        assert_eq!(summary.applied, 1);
        assert_eq!(summary.skipped.len(), 1);
        assert_eq!(summary.skipped[0].question, "1(a)");
        assert!(records[0].explanation.is_none());
        assert!(records[1].explanation.is_some());
    }

    #[test]
    fn test_unknown_questions_are_unmatched() {
        let mut records = records();
        let summary = apply_replies(
            &mut records,
            &[entry("9", "difficulty = Easy"), entry("question one", "x")],
        );
        assert_eq!(summary.applied, 0);
        assert_eq!(summary.unmatched, vec!["9".to_string(), "question one".to_string()]);
    }
}
