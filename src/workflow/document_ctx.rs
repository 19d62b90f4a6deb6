//! 文档处理上下文
//!
//! 封装"我正在处理第几份文档、哪个文件"这一信息

use std::fmt::Display;

/// 文档处理上下文
#[derive(Debug, Clone)]
pub struct DocumentCtx {
    /// 文档索引（仅用于日志显示，从 1 开始）
    pub paper_index: usize,

    /// 原始 PDF 文件名
    pub file_name: String,
}

impl DocumentCtx {
    pub fn new(paper_index: usize, file_name: impl Into<String>) -> Self {
        Self {
            paper_index,
            file_name: file_name.into(),
        }
    }
}

impl Display for DocumentCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[试卷 {} {}]", self.paper_index, self.file_name)
    }
}
