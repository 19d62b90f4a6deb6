use anyhow::Result;
use exam_paper_segmenter::utils::logging;
use exam_paper_segmenter::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let stats = App::initialize(config).await?.run().await?;
    if stats.failed > 0 {
        tracing::warn!("⚠️ 有 {} 份文档未能处理", stats.failed);
    }

    Ok(())
}
