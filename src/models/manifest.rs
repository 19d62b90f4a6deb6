use serde::{Deserialize, Serialize};

use super::component::DocVariant;
use super::question::Page;

/// 外部渲染器为一份 PDF 写出的页面清单
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageManifest {
    /// 原始 PDF 文件名，例如 `9709_s23_qp_12.pdf`
    pub file_name: String,
    /// 文档类型，缺省时由文件名中的 `qp` / `ms` 标记推断
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_variant: Option<DocVariant>,
    #[serde(default)]
    pub pages: Vec<Page>,
    /// 讲解服务已返回的原始回复（可选），按题号对应记录
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<ReplyEntry>,
    #[serde(skip_serializing, skip_deserializing)]
    pub file_path: Option<String>,
}

/// 一条原始回复
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyEntry {
    /// 题号文本，例如 `7` 或 `7(a)`
    pub question: String,
    pub text: String,
}

impl PageManifest {
    pub fn with_file_path(mut self, file_path: String) -> Self {
        self.file_path = Some(file_path);
        self
    }

    /// 用于输出报告的文件名主干
    pub fn file_stem(&self) -> String {
        std::path::Path::new(&self.file_name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.file_name.clone())
    }
}
