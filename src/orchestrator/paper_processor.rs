//! 单个文档处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **流程调度**：为一份页面清单运行 `SegmentFlow`
//! 2. **报告输出**：把分段结果写成 `<output_folder>/<文件名主干>.json`
//! 3. **统计输出**：记录记录数、跳过页和未归属页

use crate::config::Config;
use crate::error::{AppError, AppResult, FileError};
use crate::models::PageManifest;
use crate::workflow::{DocumentCtx, ProcessResult, SegmentFlow, SegmentedDocument};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{info, warn};

/// 处理单个文档
///
/// # 参数
/// - `manifest`: 页面清单
/// - `paper_index`: 文档索引（用于日志）
/// - `config`: 配置
///
/// # 返回
/// 返回处理结果；文件名无法解析等错误由调用方计入失败
pub async fn process_paper(
    manifest: PageManifest,
    paper_index: usize,
    config: &Config,
) -> Result<ProcessResult> {
    let ctx = DocumentCtx::new(paper_index, manifest.file_name.clone());
    let stem = manifest.file_stem();
    log_paper_start(&ctx, &manifest);

    // 每份文档一个独立的流程对象，状态不跨文档
    let flow = SegmentFlow::new(config);
    let document = flow
        .run(manifest, &ctx)
        .await
        .with_context(|| format!("{} 分段失败", ctx))?;

    let report_path = write_report(&config.output_folder, &stem, &document).await?;
    info!("{} 💾 报告已写入: {}", ctx, report_path.display());

    let result = document.result();
    log_paper_complete(&ctx, &document, result);

    Ok(result)
}

/// 写出 JSON 分段报告，返回报告路径
pub async fn write_report(
    output_folder: &str,
    stem: &str,
    document: &SegmentedDocument,
) -> AppResult<PathBuf> {
    fs::create_dir_all(output_folder)
        .await
        .map_err(|e| AppError::file_write_failed(output_folder, e))?;

    let report_path = Path::new(output_folder).join(format!("{}.json", stem));
    let path_display = report_path.display().to_string();

    let json = serde_json::to_string_pretty(document).map_err(|source| {
        FileError::ReportSerializeFailed {
            path: path_display.clone(),
            source,
        }
    })?;

    fs::write(&report_path, json)
        .await
        .map_err(|e| AppError::file_write_failed(&path_display, e))?;

    Ok(report_path)
}

// ========== 日志辅助函数 ==========

fn log_paper_start(ctx: &DocumentCtx, manifest: &PageManifest) {
    info!("{} 开始处理", ctx);
    if let Some(path) = manifest.file_path.as_deref() {
        info!("{} 清单: {}", ctx, path);
    }
    info!("{} 页数: {}", ctx, manifest.pages.len());
}

fn log_paper_complete(ctx: &DocumentCtx, document: &SegmentedDocument, result: ProcessResult) {
    let stats = &document.report.stats;
    info!(
        "{} 页面统计: 总计 {}, 跳过 {}, 未归属 {}, 记录 {}",
        ctx, stats.total_pages, stats.skipped_pages, stats.unassigned_pages, stats.records
    );
    match result {
        ProcessResult::Segmented => info!("\n{} ✅ 文档处理完成\n", ctx),
        ProcessResult::SegmentedWithWarnings => {
            warn!("\n{} ⚠️ 文档处理完成，但有需要人工排查的问题\n", ctx)
        }
    }
}
