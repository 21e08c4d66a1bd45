pub mod connection;
pub mod headless;

use std::time::Duration;

use chromiumoxide::{Browser, Handler};
use futures::StreamExt;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::config::{BrowserMode, BrowserSettings};
use crate::error::BrowserError;
use crate::infrastructure::BrowserPage;

pub use connection::connect_to_browser;
pub use headless::launch_headless_browser;

/// 浏览器会话
///
/// 持有 Browser、唯一的页面和事件处理任务，运行结束时必须调用 `close`
pub struct BrowserSession {
    browser: Browser,
    page: BrowserPage,
    mode: BrowserMode,
    handler_task: JoinHandle<()>,
    _temp_profile: Option<TempDir>,
}

impl BrowserSession {
    /// 按配置启动或连接浏览器，并创建一个空白页面
    pub async fn open(
        settings: &BrowserSettings,
        element_timeout: Duration,
    ) -> Result<Self, BrowserError> {
        let (browser, handler, temp_profile) = match settings.mode {
            BrowserMode::Headless => launch_headless_browser(settings).await?,
            BrowserMode::Connect => {
                let (browser, handler) = connect_to_browser(settings.debug_port).await?;
                (browser, handler, None)
            }
        };

        let handler_task = spawn_handler(handler);

        // 添加短暂延迟以等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        let page = browser.new_page("about:blank").await.map_err(|source| {
            error!("创建空白页面失败: {}", source);
            BrowserError::PageCreationFailed { source }
        })?;
        debug!("空白页面已创建");

        Ok(Self {
            browser,
            page: BrowserPage::new(page, element_timeout),
            mode: settings.mode,
            handler_task,
            _temp_profile: temp_profile,
        })
    }

    pub fn page(&self) -> &BrowserPage {
        &self.page
    }

    /// 关闭会话
    ///
    /// headless 模式关闭整个浏览器进程；connect 模式只关闭本程序创建的页面
    pub async fn close(mut self) {
        match self.mode {
            BrowserMode::Headless => {
                if let Err(e) = self.browser.close().await {
                    warn!("⚠️ 关闭浏览器失败: {}", e);
                }
                if let Err(e) = self.browser.wait().await {
                    warn!("⚠️ 等待浏览器进程退出失败: {}", e);
                }
            }
            BrowserMode::Connect => {
                if let Err(e) = self.page.page().clone().close().await {
                    warn!("⚠️ 关闭页面失败: {}", e);
                }
            }
        }
        self.handler_task.abort();
        info!("✓ 浏览器会话已关闭");
    }
}

/// 在后台处理浏览器事件
fn spawn_handler(mut handler: Handler) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(h) = handler.next().await {
            if h.is_err() {
                break;
            }
        }
    })
}
