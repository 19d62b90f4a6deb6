use serde::{Deserialize, Serialize};

use super::component::{Component, DocVariant, Session};

/// 由文件名解析出的考试身份
///
/// 每份文档解析一次，此后只读。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamIdentity {
    /// 科目代码，例如 `9709`
    pub subject_code: String,
    pub session: Session,
    /// 四位年份，例如 `2023`
    pub year: String,
    pub component: Component,
    /// 卷别（变体）数字，文件名中没有时为空
    pub paper_variant: String,
    /// 文件名中的 `qp` / `ms` 标记
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_marker: Option<DocVariant>,
}

impl ExamIdentity {
    /// 是否有任何字段落到了 `Unknown`，需要人工排查
    pub fn has_unknown_fields(&self) -> bool {
        self.session.is_unknown() || self.component.is_unknown()
    }
}

impl std::fmt::Display for ExamIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}_{}_{}",
            self.subject_code, self.component, self.session, self.year
        )?;
        if !self.paper_variant.is_empty() {
            write!(f, " (卷 {})", self.paper_variant)?;
        }
        Ok(())
    }
}
