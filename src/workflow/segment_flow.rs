//! 文档分段流程 - 流程层
//!
//! 核心职责：定义"一份文档"的完整处理流程
//!
//! 流程顺序：
//! 1. 文件名 → 考试身份（失败则整份文档放弃，不处理任何页）
//! 2. 逐页分类 + 推进状态机（严格按页序）
//! 3. 组装记录
//! 4. 回填讲解回复（若清单中带有）
//! 5. 诊断写入 warn.txt

use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppResult, IdentityError};
use crate::models::{DocVariant, ExamIdentity, PageManifest};
use crate::services::enrichment::{apply_replies, EnrichmentSummary};
use crate::services::identity_parser;
use crate::services::page_classifier::PageClassifier;
use crate::services::record_assembler::{AssemblyReport, RecordAssembler};
use crate::services::segmentation::Segmenter;
use crate::services::warn_writer::WarnWriter;
use crate::workflow::document_ctx::DocumentCtx;

/// 文档处理结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessResult {
    /// 分段完成，无诊断
    Segmented,
    /// 分段完成，但有未归属页、`Unknown` 字段或被跳过的回复
    SegmentedWithWarnings,
}

/// 一份文档的最终输出
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentedDocument {
    #[serde(flatten)]
    pub report: AssemblyReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enrichment: Option<EnrichmentSummary>,
}

impl SegmentedDocument {
    pub fn result(&self) -> ProcessResult {
        let enrichment_clean = self
            .enrichment
            .as_ref()
            .map_or(true, EnrichmentSummary::is_clean);
        if self.report.has_warnings() || !enrichment_clean {
            ProcessResult::SegmentedWithWarnings
        } else {
            ProcessResult::Segmented
        }
    }
}

/// 文档分段流程
///
/// - 编排单份文档的处理顺序
/// - 文档之间不共享任何可变状态
/// - 只依赖业务能力（services）
pub struct SegmentFlow {
    classifier: PageClassifier,
    assembler: RecordAssembler,
    warn_writer: WarnWriter,
    qp_leading_pages: usize,
    ms_leading_pages: usize,
    verbose_logging: bool,
}

impl SegmentFlow {
    /// 创建新的文档分段流程
    pub fn new(config: &Config) -> Self {
        Self {
            classifier: PageClassifier::new(config.classifier_config()),
            assembler: RecordAssembler::new(config.image_extension.clone()),
            warn_writer: WarnWriter::with_path(config.warn_file.clone()),
            qp_leading_pages: config.leading_pages(DocVariant::QuestionPaper),
            ms_leading_pages: config.leading_pages(DocVariant::MarkScheme),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 纯计算部分：不做任何 I/O
    pub fn segment_document(&self, manifest: PageManifest) -> Result<SegmentedDocument, IdentityError> {
        let identity = identity_parser::parse(&manifest.file_name)?;
        let variant = resolve_variant(&manifest, &identity);

        let leading_pages = match variant {
            DocVariant::QuestionPaper => self.qp_leading_pages,
            DocVariant::MarkScheme => self.ms_leading_pages,
        };
        let outcome =
            Segmenter::new(self.classifier.clone(), leading_pages).run(variant, manifest.pages);
        let mut report = self.assembler.assemble(&identity, variant, outcome);

        let enrichment = if manifest.replies.is_empty() {
            None
        } else {
            Some(apply_replies(&mut report.records, &manifest.replies))
        };

        Ok(SegmentedDocument { report, enrichment })
    }

    pub async fn run(&self, manifest: PageManifest, ctx: &DocumentCtx) -> AppResult<SegmentedDocument> {
        info!("{} 📄 开始分段，共 {} 页", ctx, manifest.pages.len());

        let document = match self.segment_document(manifest) {
            Ok(document) => document,
            Err(e) => {
                error!("{} ❌ 文件名无法解析，整份文档放弃: {}", ctx, e);
                self.warn_writer
                    .write_rejected(&ctx.file_name, &e.to_string())
                    .await?;
                return Err(e.into());
            }
        };

        let report = &document.report;
        info!(
            "{} 考试身份: {} | 类型: {}",
            ctx, report.identity, report.doc_variant
        );
        if report.identity.has_unknown_fields() {
            warn!("{} ⚠️ 考试身份中有无法识别的代码，请人工排查", ctx);
        }

        if let Some(unassigned) = &report.unassigned {
            self.warn_writer
                .write_unassigned(&ctx.file_name, unassigned)
                .await?;
            warn!("{} ⚠️ 已写入 {}: 未归属页", ctx, self.warn_writer.path());
        }

        if let Some(summary) = &document.enrichment {
            if !summary.is_clean() {
                self.warn_writer
                    .write_enrichment(&ctx.file_name, summary)
                    .await?;
            }
        }

        if self.verbose_logging {
            self.log_records(ctx, report);
        }

        info!(
            "{} ✓ 分段完成: {} 条记录 | 跳过 {} 页 | 未归属 {} 页",
            ctx, report.stats.records, report.stats.skipped_pages, report.stats.unassigned_pages
        );

        Ok(document)
    }

    // ========== 日志辅助方法 ==========

    fn log_records(&self, ctx: &DocumentCtx, report: &AssemblyReport) {
        for record in &report.records {
            let pages: Vec<usize> = record.images.iter().map(|i| i.page_index).collect();
            info!(
                "{}   题目 {} → {} 张图片 (页: {:?})",
                ctx,
                record.question_number,
                record.images.len(),
                pages
            );
        }
    }
}

/// 清单里写明的类型优先，否则用文件名标记，都没有时按试题卷处理
fn resolve_variant(manifest: &PageManifest, identity: &ExamIdentity) -> DocVariant {
    match (manifest.doc_variant, identity.doc_marker) {
        (Some(declared), Some(marker)) if declared != marker => {
            warn!(
                "{}: 清单声明为 {}，但文件名标记为 {}，以清单为准",
                manifest.file_name, declared, marker
            );
            declared
        }
        (Some(declared), _) => declared,
        (None, Some(marker)) => marker,
        (None, None) => DocVariant::QuestionPaper,
    }
}
