//! 日志初始化
//!
//! 同时输出到终端和本次运行的日志文件 `<dir>/<prefix>_<YYYYmmdd_HHMMSS>.log`

use std::fs::{self, File};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// 初始化全局日志，返回日志文件路径
///
/// `RUST_LOG` 存在时优先于配置中的级别
pub fn init(config: &LoggingConfig) -> Result<PathBuf> {
    fs::create_dir_all(&config.dir)
        .with_context(|| format!("无法创建日志目录: {}", config.dir.display()))?;

    let log_path = config.dir.join(format!(
        "{}_{}.log",
        config.file_prefix,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    ));
    let log_file = File::create(&log_path)
        .with_context(|| format!("无法创建日志文件: {}", log_path.display()))?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .context("日志级别无效")?;

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .with(
            fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(log_file)),
        )
        .try_init()
        .context("日志系统已经初始化")?;

    Ok(log_path)
}
