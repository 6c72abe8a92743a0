use anyhow::Result;
use exam_session::utils::logging;
use exam_session::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置（默认值 ← 配置文件 ← 环境变量）
    let config = Config::load();

    // 初始化并运行应用
    App::initialize(config).await?.run().await?;

    Ok(())
}
