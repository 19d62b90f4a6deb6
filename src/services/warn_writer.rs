//! 诊断写入服务 - 业务能力层
//!
//! 只负责把需要人工排查的情况追加写入 warn.txt，不关心流程

use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::services::enrichment::EnrichmentSummary;
use crate::services::record_assembler::UnassignedDiagnostic;

/// 诊断写入服务
///
/// 职责：
/// - 记录未归属任何题目的页
/// - 记录无法使用的讲解回复
/// - 记录身份解析失败的文档
pub struct WarnWriter {
    warn_file_path: String,
}

impl WarnWriter {
    /// 使用默认文件 warn.txt
    pub fn new() -> Self {
        Self {
            warn_file_path: "warn.txt".to_string(),
        }
    }

    /// 使用自定义文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            warn_file_path: path.into(),
        }
    }

    pub fn path(&self) -> &str {
        &self.warn_file_path
    }

    /// 写入未归属页
    pub async fn write_unassigned(
        &self,
        file_name: &str,
        diagnostic: &UnassignedDiagnostic,
    ) -> AppResult<()> {
        let warn_msg = format!(
            "文档 {} | 未归属页: {:?} | 可能漏掉了第一个题目边界\n",
            file_name,
            diagnostic.page_indexes()
        );
        self.append(&warn_msg).await
    }

    /// 写入被跳过或未匹配的讲解回复
    pub async fn write_enrichment(
        &self,
        file_name: &str,
        summary: &EnrichmentSummary,
    ) -> AppResult<()> {
        let mut warn_msg = String::new();
        for skipped in &summary.skipped {
            warn_msg.push_str(&format!(
                "文档 {} | 题目 {} | 回复跳过: {}\n",
                file_name, skipped.question, skipped.reason
            ));
        }
        for question in &summary.unmatched {
            warn_msg.push_str(&format!(
                "文档 {} | 题目 {} | 回复没有对应记录\n",
                file_name, question
            ));
        }
        if warn_msg.is_empty() {
            return Ok(());
        }
        self.append(&warn_msg).await
    }

    /// 写入无法处理的文档
    pub async fn write_rejected(&self, file_name: &str, reason: &str) -> AppResult<()> {
        self.append(&format!("文档 {} | 未处理: {}\n", file_name, reason))
            .await
    }

    async fn append(&self, warn_msg: &str) -> AppResult<()> {
        debug!("写入诊断: {}", warn_msg.trim_end());

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.warn_file_path)
            .await
            .map_err(|e| AppError::file_write_failed(&self.warn_file_path, e))?;

        file.write_all(warn_msg.as_bytes())
            .await
            .map_err(|e| AppError::file_write_failed(&self.warn_file_path, e))?;

        Ok(())
    }
}

impl Default for WarnWriter {
    fn default() -> Self {
        Self::new()
    }
}
