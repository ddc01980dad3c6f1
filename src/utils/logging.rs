use anyhow::Result;
/// 日志工具模块
///
/// 提供日志初始化和输出的辅助函数
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 初始化日志订阅器
///
/// 默认级别 info，可通过 RUST_LOG 环境变量覆盖。
/// 重复调用是安全的（测试中多个用例都会调用）。
pub fn init() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
    Ok(())
}

/// 记录程序启动信息
pub fn log_startup(model_name: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 测验内容生成预览模式");
    info!("🤖 使用模型: {}", model_name);
    info!(
        "启动时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
}

/// 打印本次运行的最终统计信息
///
/// # 参数
/// - `material_id`: 材料 id
/// - `question_count`: 最终可用题目数
pub fn print_final_stats(material_id: u64, question_count: usize) {
    info!("\n{}", "=".repeat(60));
    info!("📊 处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("📘 材料: {}", material_id);
    info!("✅ 可用题目: {} 道", question_count);
    info!("{}", "=".repeat(60));
}

/// 截断长文本用于日志显示
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("短文本", 80), "短文本");
        let long = "一".repeat(100);
        let truncated = truncate_text(&long, 80);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 83);
    }
}
