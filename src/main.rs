use anyhow::Result;
use cotacao_bot::{logger, App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    let log_file = logger::init(&config.logging)?;

    // 初始化并运行应用
    let _outcome = App::initialize(config, Some(log_file)).await?.run().await?;

    Ok(())
}
