//! 测试替身：固定结果的页面、查询服务和记录所有上报的 Reporter
#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use cotacao_bot::config::SearchConfig;
use cotacao_bot::services::{Alert, TaskSummary};
use cotacao_bot::{FetchError, FetchRate, Quote, QuotePage, Reporter};
use serde_json::Value as JsonValue;

/// 上报事件
#[derive(Debug, Clone)]
pub enum Event {
    Alert(Alert),
    LogEntry { label: String, values: JsonValue },
    Artifact { name: String, path: PathBuf },
    Error { message: String, screenshot: Option<PathBuf> },
    Finish(TaskSummary),
}

/// 记录所有上报的 Reporter
#[derive(Default)]
pub struct RecordingReporter {
    events: Mutex<Vec<Event>>,
}

impl RecordingReporter {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn artifacts(&self) -> Vec<(String, PathBuf)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Artifact { name, path } => Some((name, path)),
                _ => None,
            })
            .collect()
    }

    pub fn log_entries(&self) -> Vec<JsonValue> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::LogEntry { values, .. } => Some(values),
                _ => None,
            })
            .collect()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Alert(alert) => Some(alert),
                _ => None,
            })
            .collect()
    }

    pub fn finish(&self) -> Option<TaskSummary> {
        self.events().into_iter().find_map(|e| match e {
            Event::Finish(summary) => Some(summary),
            _ => None,
        })
    }

    fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn alert(&self, alert: Alert) {
        self.push(Event::Alert(alert));
    }

    async fn new_log_entry(&self, activity_label: &str, values: JsonValue) {
        self.push(Event::LogEntry {
            label: activity_label.to_string(),
            values,
        });
    }

    async fn post_artifact(&self, name: &str, path: &Path) {
        self.push(Event::Artifact {
            name: name.to_string(),
            path: path.to_path_buf(),
        });
    }

    async fn report_error(&self, message: &str, screenshot: Option<&Path>) {
        self.push(Event::Error {
            message: message.to_string(),
            screenshot: screenshot.map(Path::to_path_buf),
        });
    }

    async fn finish_task(&self, summary: &TaskSummary) {
        self.push(Event::Finish(summary.clone()));
    }
}

/// 模拟搜索结果页
///
/// 查询语句包含 `failing` 中的货币时读取文本失败，其余返回固定的汇率和日期
pub struct StubPage {
    rate: String,
    date: String,
    failing: Vec<String>,
    search: SearchConfig,
    last_query: Mutex<Option<String>>,
    pub visited: Mutex<Vec<String>>,
    pub queries: Mutex<Vec<String>>,
    pub screenshots: Mutex<Vec<PathBuf>>,
}

impl StubPage {
    pub fn new(rate: &str, date: &str) -> Self {
        Self {
            rate: rate.to_string(),
            date: date.to_string(),
            failing: Vec::new(),
            search: SearchConfig::default(),
            last_query: Mutex::new(None),
            visited: Mutex::new(Vec::new()),
            queries: Mutex::new(Vec::new()),
            screenshots: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_for(mut self, currency: &str) -> Self {
        self.failing.push(currency.to_string());
        self
    }

    pub fn screenshots(&self) -> Vec<PathBuf> {
        self.screenshots.lock().unwrap().clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuotePage for StubPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        Ok(())
    }

    async fn submit_search(&self, input_selector: &str, query: &str) -> Result<()> {
        assert_eq!(input_selector, self.search.input_selector);
        self.queries.lock().unwrap().push(query.to_string());
        *self.last_query.lock().unwrap() = Some(query.to_string());
        Ok(())
    }

    async fn text_of(&self, selector: &str) -> Result<String> {
        let query = self.last_query.lock().unwrap().clone().unwrap_or_default();
        if self.failing.iter().any(|c| query.contains(c.as_str())) {
            return Err(anyhow!("元素未找到: {}", selector));
        }
        if selector == self.search.rate_selector {
            Ok(self.rate.clone())
        } else if selector == self.search.date_selector {
            Ok(self.date.clone())
        } else {
            Err(anyhow!("未知选择器: {}", selector))
        }
    }

    async fn screenshot(&self, path: &Path) -> Result<()> {
        std::fs::write(path, b"\x89PNG")?;
        self.screenshots.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// 按货币返回固定结果的查询服务
#[derive(Default)]
pub struct StubFetcher {
    quotes: HashMap<String, Quote>,
    pub calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn with_quote(mut self, currency: &str, rate: &str, date: &str) -> Self {
        self.quotes
            .insert(currency.to_string(), Quote::new(rate, date));
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl FetchRate for StubFetcher {
    async fn fetch_rate(&self, currency: &str) -> Result<Quote, FetchError> {
        self.calls.lock().unwrap().push(currency.to_string());
        self.quotes
            .get(currency)
            .cloned()
            .ok_or_else(|| FetchError::new(currency, anyhow!("sem cotação para {}", currency)))
    }
}
