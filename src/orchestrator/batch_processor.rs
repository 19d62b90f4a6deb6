//! 批量文档处理器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责批量文档的处理。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：校验配置、写日志头
//! 2. **批量加载**：扫描并加载所有页面清单（`Vec<PageManifest>`）
//! 3. **并发控制**：使用 Semaphore 限制并发数量
//! 4. **分批处理**：将文档分批次处理，每批完成后再开始下一批
//! 5. **全局统计**：汇总所有文档的处理结果
//!
//! 文档之间没有共享的可变状态，一份文档失败不影响同批其他文档。

use crate::config::Config;
use crate::models::PageManifest;
use crate::orchestrator::paper_processor;
use crate::utils::logging;
use crate::workflow::ProcessResult;
use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

/// 应用主结构
pub struct App {
    config: Config,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置无效")?;

        // 初始化日志文件
        logging::init_log_file(&config.output_log_file)
            .with_context(|| format!("无法创建日志文件: {}", config.output_log_file))?;

        logging::log_startup(
            config.max_concurrent_papers,
            &config.manifest_folder,
            &config.output_folder,
        );

        Ok(Self { config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<ProcessingStats> {
        let all_papers = self.load_papers().await?;

        if all_papers.is_empty() {
            warn!("⚠️ 没有找到待处理的TOML清单，程序结束");
            return Ok(ProcessingStats::default());
        }

        let total_papers = all_papers.len();
        logging::log_papers_loaded(total_papers, self.config.max_concurrent_papers);

        let stats = self.process_all_papers(all_papers).await?;

        logging::print_final_stats(
            stats.success,
            stats.with_warnings,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
            &self.config.warn_file,
        );

        Ok(stats)
    }

    /// 加载页面清单
    async fn load_papers(&self) -> Result<Vec<PageManifest>> {
        info!("\n📁 正在扫描待处理的页面清单...");
        let manifests = crate::models::load_all_manifests(&self.config.manifest_folder).await?;
        Ok(manifests)
    }

    /// 处理所有文档
    async fn process_all_papers(&self, all_papers: Vec<PageManifest>) -> Result<ProcessingStats> {
        let batch_size = self.config.max_concurrent_papers;
        let semaphore = Arc::new(Semaphore::new(batch_size));
        let total_papers = all_papers.len();
        let total_batches = total_papers.div_ceil(batch_size);
        let mut stats = ProcessingStats {
            total: total_papers,
            ..Default::default()
        };

        let mut remaining = all_papers.into_iter();
        for batch_num in 1..=total_batches {
            let batch_start = (batch_num - 1) * batch_size;
            let batch_papers: Vec<PageManifest> = remaining.by_ref().take(batch_size).collect();
            let batch_end = batch_start + batch_papers.len();

            logging::log_batch_start(
                batch_num,
                total_batches,
                (batch_start + 1, batch_end),
                total_papers,
            );

            let batch_result = self
                .process_batch(batch_papers, batch_start, semaphore.clone())
                .await?;

            logging::log_batch_complete(
                batch_num,
                batch_result.success,
                batch_result.success + batch_result.failed,
            );
            stats.absorb(&batch_result);
        }

        Ok(stats)
    }

    /// 处理单个批次
    async fn process_batch(
        &self,
        batch_papers: Vec<PageManifest>,
        batch_start: usize,
        semaphore: Arc<Semaphore>,
    ) -> Result<BatchResult> {
        let mut batch_handles = Vec::with_capacity(batch_papers.len());
        let mut paper_indexes = Vec::with_capacity(batch_papers.len());

        for (idx, manifest) in batch_papers.into_iter().enumerate() {
            let paper_index = batch_start + idx + 1;
            let permit = semaphore.clone().acquire_owned().await?;
            let config = self.config.clone();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                paper_processor::process_paper(manifest, paper_index, &config).await
            });
            paper_indexes.push(paper_index);
            batch_handles.push(handle);
        }

        // 等待本批所有任务完成
        let mut result = BatchResult::default();
        for (paper_index, joined) in paper_indexes.into_iter().zip(join_all(batch_handles).await) {
            match joined {
                Ok(Ok(ProcessResult::Segmented)) => result.success += 1,
                Ok(Ok(ProcessResult::SegmentedWithWarnings)) => {
                    result.success += 1;
                    result.with_warnings += 1;
                }
                Ok(Err(e)) => {
                    error!("[试卷 {}] ❌ 处理过程中发生错误: {:#}", paper_index, e);
                    result.failed += 1;
                }
                Err(e) => {
                    error!("[试卷 {}] 任务执行失败: {}", paper_index, e);
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

/// 处理统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ProcessingStats {
    pub success: usize,
    pub with_warnings: usize,
    pub failed: usize,
    pub total: usize,
}

impl ProcessingStats {
    fn absorb(&mut self, batch: &BatchResult) {
        self.success += batch.success;
        self.with_warnings += batch.with_warnings;
        self.failed += batch.failed;
    }
}

/// 批次处理结果
#[derive(Debug, Default)]
struct BatchResult {
    success: usize,
    with_warnings: usize,
    failed: usize,
}
