//! 上报服务 - 业务能力层
//!
//! 只负责"把进度告诉编排服务"的能力。上报失败不影响流程，实现方自行记录日志

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value as JsonValue;
use tracing::{error, info, warn};

use crate::models::{RunResult, Verdict};

/// 告警级别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertType {
    Info,
    Warn,
    Error,
}

/// 告警（标题 + 消息）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: String,
    pub message: String,
    pub alert_type: AlertType,
}

impl Alert {
    pub fn new(alert_type: AlertType, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            alert_type,
        }
    }

    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertType::Info, title, message)
    }

    pub fn warn(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertType::Warn, title, message)
    }

    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(AlertType::Error, title, message)
    }
}

/// 任务结束时上报的汇总
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub verdict: Verdict,
    pub message: String,
    pub result: RunResult,
}

/// 编排服务的上报能力
#[async_trait]
pub trait Reporter: Send + Sync {
    /// 生命周期告警
    async fn alert(&self, alert: Alert);

    /// 结构化日志（每个成功的货币一条）
    async fn new_log_entry(&self, activity_label: &str, values: JsonValue);

    /// 上传文件（截图或输出表格）
    async fn post_artifact(&self, name: &str, path: &Path);

    /// 错误报告，可附带截图
    async fn report_error(&self, message: &str, screenshot: Option<&Path>);

    /// 结束任务并上报统计
    async fn finish_task(&self, summary: &TaskSummary);
}

/// 未连接编排服务时使用，所有上报只写日志
#[derive(Debug, Default, Clone, Copy)]
pub struct LogReporter;

#[async_trait]
impl Reporter for LogReporter {
    async fn alert(&self, alert: Alert) {
        match alert.alert_type {
            AlertType::Info => info!("📣 [{}] {}", alert.title, alert.message),
            AlertType::Warn => warn!("📣 [{}] {}", alert.title, alert.message),
            AlertType::Error => error!("📣 [{}] {}", alert.title, alert.message),
        }
    }

    async fn new_log_entry(&self, activity_label: &str, values: JsonValue) {
        info!("📝 {}: {}", activity_label, values);
    }

    async fn post_artifact(&self, name: &str, path: &Path) {
        info!("📎 附件 '{}': {}", name, path.display());
    }

    async fn report_error(&self, message: &str, screenshot: Option<&Path>) {
        match screenshot {
            Some(path) => error!("❌ {} (截图: {})", message, path.display()),
            None => error!("❌ {}", message),
        }
    }

    async fn finish_task(&self, summary: &TaskSummary) {
        info!(
            "🏁 任务结束: {} - {} (总数 {}, 成功 {}, 失败 {})",
            summary.verdict,
            summary.message,
            summary.result.total,
            summary.result.processed,
            summary.result.failed
        );
    }
}
