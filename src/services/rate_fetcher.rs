//! 汇率查询服务 - 业务能力层
//!
//! 只负责"查一个货币"的能力，不关心表格和批处理

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::SearchConfig;
use crate::error::FetchError;
use crate::infrastructure::QuotePage;
use crate::models::Quote;
use crate::services::reporter::Reporter;
use crate::utils::screenshot;

/// 查询一个货币的汇率和日期
///
/// 批处理只依赖这个 trait
#[async_trait]
pub trait FetchRate: Send + Sync {
    async fn fetch_rate(&self, currency: &str) -> Result<Quote, FetchError>;
}

/// 通过搜索引擎结果页查询汇率
///
/// 职责：
/// - 提交查询语句并读取两个固定位置的文本
/// - 失败时截图并作为附件上传，然后返回 `FetchError`
/// - 不重试，不缓存
pub struct RateFetcher<'a, P: ?Sized, R: ?Sized> {
    page: &'a P,
    reporter: &'a R,
    search: SearchConfig,
    screenshot_dir: PathBuf,
}

impl<'a, P, R> RateFetcher<'a, P, R>
where
    P: QuotePage + ?Sized,
    R: Reporter + ?Sized,
{
    pub fn new(
        page: &'a P,
        reporter: &'a R,
        search: SearchConfig,
        screenshot_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            page,
            reporter,
            search,
            screenshot_dir: screenshot_dir.into(),
        }
    }

    /// 搜索并读取结果，不处理失败
    async fn search_quote(&self, currency: &str) -> Result<Quote> {
        let query = self.search.render_query(currency);
        debug!("查询语句: {}", query);

        self.page
            .submit_search(&self.search.input_selector, &query)
            .await?;

        let rate = self.page.text_of(&self.search.rate_selector).await?;
        let as_of_date = self.page.text_of(&self.search.date_selector).await?;

        if rate.is_empty() {
            return Err(anyhow!("汇率文本为空"));
        }
        if as_of_date.is_empty() {
            return Err(anyhow!("日期文本为空"));
        }

        Ok(Quote::new(rate, as_of_date))
    }

    /// 截图并作为附件上传
    async fn attach_screenshot(&self, currency: &str) {
        let label = format!("Erro_{}", currency);
        match screenshot::capture(self.page, &self.screenshot_dir, &label).await {
            Ok(path) => {
                self.reporter
                    .post_artifact(&format!("Erro - {}", currency), &path)
                    .await;
            }
            Err(e) => warn!("⚠️ 截图失败 ({}): {}", currency, e),
        }
    }
}

#[async_trait]
impl<'a, P, R> FetchRate for RateFetcher<'a, P, R>
where
    P: QuotePage + ?Sized,
    R: Reporter + ?Sized,
{
    async fn fetch_rate(&self, currency: &str) -> Result<Quote, FetchError> {
        match self.search_quote(currency).await {
            Ok(quote) => Ok(quote),
            Err(e) => {
                error!("查询 {} 失败: {}", currency, e);
                self.attach_screenshot(currency).await;
                Err(FetchError::new(currency, e))
            }
        }
    }
}
