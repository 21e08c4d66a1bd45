use std::path::PathBuf;

use chromiumoxide::{Browser, BrowserConfig, Handler};
use tempfile::TempDir;
use tracing::{debug, error, info};

use crate::config::BrowserSettings;
use crate::error::BrowserError;

/// 启动无头浏览器
///
/// 使用匿名配置（无自动化标记、固定窗口大小、pt-BR 语言）。
/// 未指定用户数据目录时创建临时目录，返回的 `TempDir` 必须活到浏览器关闭
pub async fn launch_headless_browser(
    settings: &BrowserSettings,
) -> Result<(Browser, Handler, Option<TempDir>), BrowserError> {
    info!("🚀 启动无头浏览器...");

    let (user_data_dir, temp_profile): (PathBuf, Option<TempDir>) = match &settings.user_data_dir {
        Some(dir) => (dir.clone(), None),
        None => {
            let temp = TempDir::new().map_err(|e| {
                BrowserError::ConfigurationFailed(format!("无法创建临时用户目录: {}", e))
            })?;
            (temp.path().to_path_buf(), Some(temp))
        }
    };
    debug!("用户数据目录: {}", user_data_dir.display());

    let mut builder = BrowserConfig::builder()
        .new_headless_mode()
        .no_sandbox()
        .window_size(settings.window_width, settings.window_height)
        .user_data_dir(&user_data_dir)
        .args(anonymous_args(settings));

    if let Some(executable) = &settings.chrome_executable {
        builder = builder.chrome_executable(executable);
    }

    let config = builder.build().map_err(|e| {
        error!("配置无头浏览器失败: {}", e);
        BrowserError::ConfigurationFailed(e)
    })?;

    let (browser, handler) = Browser::launch(config).await.map_err(|source| {
        error!("启动无头浏览器失败: {}", source);
        BrowserError::LaunchFailed { source }
    })?;
    debug!("无头浏览器启动成功");

    Ok((browser, handler, temp_profile))
}

/// 降低被识别为自动化程序的启动参数
fn anonymous_args(settings: &BrowserSettings) -> Vec<String> {
    vec![
        "--disable-dev-shm-usage".to_string(),
        "--disable-blink-features=AutomationControlled".to_string(),
        "--disable-infobars".to_string(),
        "--disable-gpu".to_string(),
        format!("--lang={}", settings.lang),
        format!("--user-agent={}", settings.user_agent),
    ]
}
