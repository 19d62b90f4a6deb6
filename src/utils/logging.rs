use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化、格式化和输出的辅助函数
use std::fs;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化 tracing 订阅者
///
/// 优先使用 `RUST_LOG`，否则按 `verbose` 选择 debug / info。
/// 重复调用不会报错（测试里会多次初始化）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

const HEAVY_RULE: &str = "════════════════════════════════════════════════════════════";
const LIGHT_RULE: &str = "────────────────────────────────────────────────────────────";

fn now() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// 写入运行日志文件头（覆盖旧内容）
pub fn init_log_file(log_file_path: &str) -> Result<()> {
    fs::write(
        log_file_path,
        format!("{HEAVY_RULE}\n试卷分段日志 - {}\n{HEAVY_RULE}\n\n", now()),
    )?;
    Ok(())
}

pub fn log_startup(max_concurrent: usize, manifest_folder: &str, output_folder: &str) {
    info!("{HEAVY_RULE}");
    info!("🚀 程序启动 - 多文档并发分段模式");
    info!("📊 并发上限: {} | 📁 {} → {}", max_concurrent, manifest_folder, output_folder);
    info!("{HEAVY_RULE}");
}

/// 清单加载完成
pub fn log_papers_loaded(total: usize, batch_size: usize) {
    info!(
        "✓ 共 {} 份待分段文档，每批 {} 份，一批结束后再开始下一批\n",
        total, batch_size
    );
}

/// 批次开始，`range` 为本批文档编号（从 1 开始，含两端）
pub fn log_batch_start(batch_num: usize, total_batches: usize, range: (usize, usize), total: usize) {
    info!("\n{HEAVY_RULE}");
    info!(
        "📦 第 {}/{} 批 | 文档 {}-{} / 共 {} 份",
        batch_num, total_batches, range.0, range.1, total
    );
    info!("{HEAVY_RULE}");
}

pub fn log_batch_complete(batch_num: usize, success: usize, total: usize) {
    info!("\n{LIGHT_RULE}");
    info!("✓ 第 {} 批结束: {}/{} 份分段成功", batch_num, success, total);
    info!("{LIGHT_RULE}");
}

/// 全部批次结束后的汇总
///
/// `success` 包含带诊断的文档，`with_warnings` 是其中需要人工排查的部分
pub fn print_final_stats(
    success: usize,
    with_warnings: usize,
    failed: usize,
    total: usize,
    log_file_path: &str,
    warn_file_path: &str,
) {
    info!("\n{HEAVY_RULE}");
    info!("📊 分段汇总 ({})", now());
    info!("✅ 成功 {}/{} | ⚠️ 待排查 {} | ❌ 失败 {}", success, total, with_warnings, failed);
    info!("{HEAVY_RULE}");
    info!("日志: {}", log_file_path);
    if with_warnings > 0 || failed > 0 {
        info!("诊断: {}", warn_file_path);
    }
}

/// 按字符数截断，超出部分以 `...` 结尾
pub fn truncate_text(text: &str, max_len: usize) -> String {
    match text.char_indices().nth(max_len) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text_counts_chars() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("难度中等的代数题", 4), "难度中等...");
        assert_eq!(truncate_text("", 3), "");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}
