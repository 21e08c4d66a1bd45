//! 页面驱动 - 基础设施层
//!
//! 持有唯一的 page 资源，只暴露"导航 / 搜索 / 读文本 / 截图"的能力

use std::path::Path;
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::element::Element;
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide::Page;
use serde_json::Value as JsonValue;
use tokio::time::{sleep, Instant};
use tracing::debug;

/// 查找元素时的轮询间隔
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// 提交前在当前文档上留下的标记，新文档加载后标记消失
const STALE_MARKER: &str = "__cotacaoStaleDocument";

/// 页面能力
///
/// 查询服务只依赖这个 trait，测试中可以用固定结果的实现替换浏览器
#[async_trait]
pub trait QuotePage: Send + Sync {
    /// 打开指定 URL
    async fn goto(&self, url: &str) -> Result<()>;

    /// 清空搜索框，输入查询语句并回车，等待新的结果页加载完成
    async fn submit_search(&self, input_selector: &str, query: &str) -> Result<()>;

    /// 读取元素的文本（已去除首尾空白）
    async fn text_of(&self, selector: &str) -> Result<String>;

    /// 保存当前页面截图
    async fn screenshot(&self, path: &Path) -> Result<()>;
}

/// 基于 chromiumoxide 的页面驱动
///
/// 职责：
/// - 持有唯一的 Page 资源
/// - 不认识货币 / 表格
/// - 不处理业务流程
pub struct BrowserPage {
    page: Page,
    element_timeout: Duration,
}

impl BrowserPage {
    pub fn new(page: Page, element_timeout: Duration) -> Self {
        Self {
            page,
            element_timeout,
        }
    }

    /// 获取 page 的引用（用于其他操作）
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// 执行 JS 代码并返回 JSON 结果
    pub async fn eval(&self, js_code: impl Into<String>) -> Result<JsonValue> {
        let result = self.page.evaluate(js_code.into()).await?;
        let json_value = result.into_value()?;
        Ok(json_value)
    }

    /// 等待回车触发的导航替换掉旧文档并加载完成
    ///
    /// 旧结果页仍处于 loaded 状态时 `wait_for_navigation` 会立即返回，
    /// 所以先确认标记已经消失，再等待新文档加载
    async fn wait_for_new_document(&self) -> Result<()> {
        let deadline = Instant::now() + self.element_timeout;
        let probe = format!("window.{} === true", STALE_MARKER);
        loop {
            // 导航进行中执行上下文会被销毁，求值失败视为尚未就绪
            let stale = self.eval(probe.as_str()).await;
            if is_new_document(&stale) {
                break;
            }
            if Instant::now() >= deadline {
                return Err(anyhow!(
                    "提交查询后页面未跳转 ({:?} 超时)",
                    self.element_timeout
                ));
            }
            sleep(POLL_INTERVAL).await;
        }

        self.page
            .wait_for_navigation()
            .await
            .context("等待搜索结果页加载失败")?;
        Ok(())
    }

    /// 在超时时间内轮询查找元素
    async fn wait_for_element(&self, selector: &str) -> Result<Element> {
        let deadline = Instant::now() + self.element_timeout;
        loop {
            match self.page.find_element(selector).await {
                Ok(element) => return Ok(element),
                Err(e) if Instant::now() >= deadline => {
                    return Err(anyhow!(
                        "元素未找到 ({:?} 超时): {} - {}",
                        self.element_timeout,
                        selector,
                        e
                    ));
                }
                Err(_) => sleep(POLL_INTERVAL).await,
            }
        }
    }
}

/// 标记求值为 `false` 说明当前已是新文档
fn is_new_document(stale: &Result<JsonValue>) -> bool {
    matches!(stale, Ok(JsonValue::Bool(false)))
}

#[async_trait]
impl QuotePage for BrowserPage {
    async fn goto(&self, url: &str) -> Result<()> {
        debug!("导航到: {}", url);
        self.page
            .goto(url)
            .await
            .with_context(|| format!("导航到 {} 失败", url))?;
        Ok(())
    }

    async fn submit_search(&self, input_selector: &str, query: &str) -> Result<()> {
        let input = self.wait_for_element(input_selector).await?;

        // 结果页上的搜索框保留了上一次的查询
        let clear_js = format!(
            "(() => {{ window.{marker} = true; const el = document.querySelector({sel}); if (el) {{ el.value = ''; }} return true; }})()",
            marker = STALE_MARKER,
            sel = serde_json::to_string(input_selector)?
        );
        self.eval(clear_js).await?;

        input.click().await?;
        input.type_str(query).await?;
        input.press_key("Enter").await?;
        debug!("已提交查询: {}", query);

        self.wait_for_new_document().await
    }

    async fn text_of(&self, selector: &str) -> Result<String> {
        let element = self.wait_for_element(selector).await?;
        let text = element
            .inner_text()
            .await?
            .ok_or_else(|| anyhow!("元素没有文本: {}", selector))?;
        Ok(text.trim().to_string())
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .full_page(true)
            .build();
        self.page
            .save_screenshot(params, path)
            .await
            .with_context(|| format!("截图保存失败: {}", path.display()))?;
        Ok(())
    }
}
