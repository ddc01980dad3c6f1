use std::path::Path;

use anyhow::Result;

use quiz_generation::app::App;
use quiz_generation::config::Config;
use quiz_generation::utils::logging;

/// 配置文件路径（存在时优先于环境变量）
const CONFIG_FILE: &str = "config.toml";

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init()?;

    // 加载配置
    let config = if Path::new(CONFIG_FILE).exists() {
        Config::from_file(CONFIG_FILE)?
    } else {
        Config::from_env()
    };

    // 初始化并运行应用
    App::initialize(config)?.run().await?;

    Ok(())
}
