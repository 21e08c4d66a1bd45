use chromiumoxide::{Browser, Handler};
use tracing::{error, info};

use crate::error::BrowserError;

/// 连接到已打开调试端口的浏览器
pub async fn connect_to_browser(port: u16) -> Result<(Browser, Handler), BrowserError> {
    let browser_url = format!("http://localhost:{}", port);
    info!("正在连接到浏览器: {}", browser_url);

    let (browser, handler) = Browser::connect(&browser_url).await.map_err(|source| {
        error!("连接浏览器失败: {}", source);
        BrowserError::ConnectionFailed { port, source }
    })?;

    info!("✓ 浏览器连接成功");
    Ok((browser, handler))
}
