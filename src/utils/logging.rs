//! 日志工具模块
//!
//! 提供日志格式化和输出的辅助函数

use std::path::Path;

use tracing::info;

use crate::config::Config;
use crate::models::{RunResult, Verdict};

/// 记录程序启动信息
pub fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 Iniciando o Bot de Cotações de Moedas...");
    info!("📄 输入文件: {}", config.input_path().display());
    info!("💾 输出文件: {}", config.output_path().display());
    info!("🌐 浏览器模式: {:?}", config.browser.mode);
    match &config.maestro.task_id {
        Some(task_id) if config.maestro.is_configured() => {
            info!("📡 Tarefa Maestro ID: {}", task_id)
        }
        _ => info!("📡 未连接编排服务，仅记录本地日志"),
    }
    info!("{}", "=".repeat(60));
}

/// 记录表格加载信息
pub fn log_table_loaded(total: usize) {
    info!("✓ 找到 {} 个待查询的货币", total);
    info!("💡 逐行串行查询\n");
}

/// 打印最终统计信息
///
/// # 参数
/// - `result`: 运行统计
/// - `verdict`: 整体结论
/// - `log_file_path`: 日志文件路径
pub fn print_final_stats(result: &RunResult, verdict: Verdict, log_file_path: Option<&Path>) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", result.processed, result.total);
    info!("❌ 失败: {}", result.failed);
    info!("🏁 状态: {}", verdict);
    info!("{}", "=".repeat(60));
    if let Some(path) = log_file_path {
        info!("\n日志已保存至: {}", path.display());
    }
}
