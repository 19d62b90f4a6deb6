use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::component::{Component, DocVariant, Session};
use super::exam_identity::ExamIdentity;

/// 渲染后的页面图片句柄（路径或 URL，对本引擎不透明）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageHandle(pub String);

impl ImageHandle {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 单页输入：外部渲染器提供的文本和图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 从 0 开始的页序号
    pub index: usize,
    /// 抽取出的纯文本
    #[serde(default)]
    pub text: String,
    pub image: ImageHandle,
}

impl Page {
    pub fn new(index: usize, text: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            image: ImageHandle::new(image),
        }
    }
}

/// 题号 + 可选小问字母
///
/// 裸题号 `7` 和 `7(a)` 是两个不同的键，各自产生一条记录。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct QuestionKey {
    pub number: u32,
    pub sub_part: Option<char>,
}

impl QuestionKey {
    pub fn question(number: u32) -> Self {
        Self {
            number,
            sub_part: None,
        }
    }

    pub fn subpart(number: u32, letter: char) -> Self {
        Self {
            number,
            sub_part: Some(letter),
        }
    }

    /// 文件名中使用的形式，例如 `7a`
    pub fn slug(&self) -> String {
        match self.sub_part {
            Some(letter) => format!("{}{}", self.number, letter),
            None => self.number.to_string(),
        }
    }
}

impl std::fmt::Display for QuestionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.sub_part {
            Some(letter) => write!(f, "{}({})", self.number, letter),
            None => write!(f, "{}", self.number),
        }
    }
}

/// 题号文本无法解析
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("无效的题号: {0}")]
pub struct InvalidQuestionKey(pub String);

impl std::str::FromStr for QuestionKey {
    type Err = InvalidQuestionKey;

    /// 接受 `7`、`7(a)` 和 `7a`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidQuestionKey(s.to_string());
        let trimmed = s.trim();
        let digits_end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        let number: u32 = trimmed[..digits_end].parse().map_err(|_| invalid())?;
        if number == 0 {
            return Err(invalid());
        }

        let rest = trimmed[digits_end..]
            .trim_start_matches('(')
            .trim_end_matches(')');
        let mut letters = rest.chars();
        match (letters.next(), letters.next()) {
            (None, _) => Ok(QuestionKey::question(number)),
            (Some(letter), None) if letter.is_ascii_lowercase() => {
                Ok(QuestionKey::subpart(number, letter))
            }
            _ => Err(invalid()),
        }
    }
}

/// 已命名的页面图片
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageImage {
    pub page_index: usize,
    /// 派生出的目标文件名，字典序即页序
    pub file_name: String,
    pub source: ImageHandle,
}

/// 难度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

/// 生成式服务回复中解析出的讲解信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExplanationReply {
    pub difficulty: Difficulty,
    pub topic: String,
    pub explanation: String,
}

/// 输出记录：交给外部持久化协作者
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub key: QuestionKey,
    /// 题号文本，例如 `7` 或 `7(a)`
    pub question_number: String,
    pub subject_code: String,
    pub session: Session,
    pub paper_year: String,
    pub component: Component,
    pub paper_variant: String,
    pub doc_variant: DocVariant,
    pub images: Vec<PageImage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<ExplanationReply>,
}

impl QuestionRecord {
    pub fn new(
        identity: &ExamIdentity,
        doc_variant: DocVariant,
        key: QuestionKey,
        images: Vec<PageImage>,
    ) -> Self {
        Self {
            key,
            question_number: key.to_string(),
            subject_code: identity.subject_code.clone(),
            session: identity.session,
            paper_year: identity.year.clone(),
            component: identity.component,
            paper_variant: identity.paper_variant.clone(),
            doc_variant,
            images,
            explanation: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_and_lettered_keys_are_distinct() {
        let bare = QuestionKey::question(7);
        let lettered = QuestionKey::subpart(7, 'a');
        assert_ne!(bare, lettered);
        assert!(bare < lettered);
        assert_eq!(bare.to_string(), "7");
        assert_eq!(lettered.to_string(), "7(a)");
        assert_eq!(lettered.slug(), "7a");
    }

    #[test]
    fn test_question_key_from_str() {
        assert_eq!("7".parse::<QuestionKey>(), Ok(QuestionKey::question(7)));
        assert_eq!("7(a)".parse::<QuestionKey>(), Ok(QuestionKey::subpart(7, 'a')));
        assert_eq!(" 12b ".parse::<QuestionKey>(), Ok(QuestionKey::subpart(12, 'b')));
        assert!("0".parse::<QuestionKey>().is_err());
        assert!("(a)".parse::<QuestionKey>().is_err());
        assert!("7(ab)".parse::<QuestionKey>().is_err());
        assert!("7(A)".parse::<QuestionKey>().is_err());
    }

    #[test]
    fn test_invalid_key_is_a_std_error() {
        let err = "(a)".parse::<QuestionKey>().unwrap_err();
        assert_eq!(err.to_string(), "无效的题号: (a)");
        let boxed: Box<dyn std::error::Error> = Box::new(err);
        assert!(boxed.source().is_none());
    }

    #[test]
    fn test_difficulty_from_name_is_case_insensitive() {
        assert_eq!(Difficulty::from_name("medium"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_name(" HARD "), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_name("Trivial"), None);
    }
}
