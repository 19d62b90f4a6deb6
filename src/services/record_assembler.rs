//! 记录组装 - 业务能力层
//!
//! 把分段终态和考试身份折叠成交给持久化的 [`QuestionRecord`] 列表。
//! 未归属页不会中断组装，而是作为数据质量诊断随报告一起返回。

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::models::{DocVariant, ExamIdentity, PageImage, QuestionRecord};
use crate::services::segmentation::{ImageNamer, PageTrace, SegmentationOutcome};

/// 第一个边界之前出现的页
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnassignedDiagnostic {
    pub pages: Vec<PageImage>,
}

impl UnassignedDiagnostic {
    pub fn page_indexes(&self) -> Vec<usize> {
        self.pages.iter().map(|p| p.page_index).collect()
    }
}

/// 单文档统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyStats {
    pub total_pages: usize,
    pub skipped_pages: usize,
    pub unassigned_pages: usize,
    pub records: usize,
}

/// 单文档的完整输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssemblyReport {
    pub identity: ExamIdentity,
    pub doc_variant: DocVariant,
    pub records: Vec<QuestionRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unassigned: Option<UnassignedDiagnostic>,
    pub stats: AssemblyStats,
    pub trace: Vec<PageTrace>,
}

impl AssemblyReport {
    /// 是否有需要人工排查的问题
    pub fn has_warnings(&self) -> bool {
        self.unassigned.is_some() || self.identity.has_unknown_fields()
    }
}

/// 记录组装器
#[derive(Debug, Clone)]
pub struct RecordAssembler {
    image_extension: String,
}

impl RecordAssembler {
    pub fn new(image_extension: impl Into<String>) -> Self {
        Self {
            image_extension: image_extension.into(),
        }
    }

    /// 每个键一条记录，按首次出现顺序
    pub fn assemble(
        &self,
        identity: &ExamIdentity,
        doc_variant: DocVariant,
        outcome: SegmentationOutcome,
    ) -> AssemblyReport {
        let namer = ImageNamer::new(identity, &self.image_extension);
        let skipped_pages = outcome.skipped_pages();
        let total_pages = outcome.trace.len();

        let records: Vec<QuestionRecord> = outcome
            .accumulated
            .into_iter()
            .map(|(key, pages)| {
                let page_count = pages.len();
                let images = pages
                    .into_iter()
                    .enumerate()
                    .map(|(continuation_index, page)| PageImage {
                        page_index: page.page_index,
                        file_name: namer.file_name(&key, continuation_index, page_count),
                        source: page.image,
                    })
                    .collect();
                QuestionRecord::new(identity, doc_variant, key, images)
            })
            .collect();

        let unassigned_pages = outcome.unassigned.len();
        let unassigned = if outcome.unassigned.is_empty() {
            None
        } else {
            let pages: Vec<PageImage> = outcome
                .unassigned
                .into_iter()
                .enumerate()
                .map(|(position, page)| PageImage {
                    page_index: page.page_index,
                    file_name: namer.unassigned_file_name(position, unassigned_pages),
                    source: page.image,
                })
                .collect();
            let diagnostic = UnassignedDiagnostic { pages };
            warn!(
                "⚠️ {}: {} 页出现在第一个题目边界之前，未归属任何题目 (页: {:?})",
                identity,
                unassigned_pages,
                diagnostic.page_indexes()
            );
            Some(diagnostic)
        };

        let stats = AssemblyStats {
            total_pages,
            skipped_pages,
            unassigned_pages,
            records: records.len(),
        };

        AssemblyReport {
            identity: identity.clone(),
            doc_variant,
            records,
            unassigned,
            stats,
            trace: outcome.trace,
        }
    }
}

impl Default for RecordAssembler {
    fn default() -> Self {
        Self::new("png")
    }
}
