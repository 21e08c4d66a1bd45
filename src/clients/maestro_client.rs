//! 编排服务（Maestro）API 客户端
//!
//! 封装所有与编排服务相关的调用逻辑。调用失败只记录警告，不影响流程

use std::path::Path;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::config::MaestroConfig;
use crate::services::reporter::{Alert, Reporter, TaskSummary};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CreatedResponse {
    id: JsonValue,
}

/// 编排服务客户端
pub struct MaestroClient {
    http: Client,
    server: String,
    login: String,
    key: String,
    task_id: String,
    token: OnceCell<String>,
}

impl MaestroClient {
    /// 创建新的编排服务客户端
    ///
    /// 未配置服务器地址或任务 ID 时返回 `None`
    pub fn new(config: &MaestroConfig) -> Option<Self> {
        if !config.is_configured() {
            return None;
        }
        let server = config.server.as_deref()?.trim_end_matches('/').to_string();
        Some(Self {
            http: Client::new(),
            server,
            login: config.login.clone(),
            key: config.key.clone(),
            task_id: config.task_id.clone()?,
            token: OnceCell::new(),
        })
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v2/{}", self.server, path)
    }

    /// 登录并缓存访问令牌
    async fn token(&self) -> Result<&str> {
        let token = self
            .token
            .get_or_try_init(|| async {
                debug!("正在登录编排服务: {}", self.server);
                let response: LoginResponse = self
                    .http
                    .post(self.url("workspace/login"))
                    .json(&json!({ "login": self.login, "key": self.key }))
                    .send()
                    .await
                    .context("编排服务登录请求失败")?
                    .error_for_status()
                    .context("编排服务登录被拒绝")?
                    .json()
                    .await
                    .context("无法解析登录响应")?;
                Ok::<_, anyhow::Error>(response.access_token)
            })
            .await?;
        Ok(token.as_str())
    }

    /// 发送带认证头的 JSON 请求
    async fn post_json(&self, path: &str, body: &JsonValue) -> Result<JsonValue> {
        let token = self.token().await?;
        debug!("POST {} Payload: {}", path, body);

        let response = self
            .http
            .post(self.url(path))
            .header("token", token)
            .header("organization", &self.login)
            .json(body)
            .send()
            .await
            .with_context(|| format!("API请求失败 ({})", path))?
            .error_for_status()
            .with_context(|| format!("API返回错误响应 ({})", path))?;

        let text = response.text().await?;
        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(JsonValue::String(text)))
    }

    /// 上传文件
    async fn upload_file(&self, path: &str, file: &Path) -> Result<()> {
        let token = self.token().await?;
        let bytes = tokio::fs::read(file)
            .await
            .with_context(|| format!("无法读取文件: {}", file.display()))?;
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "artifact".to_string());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        self.http
            .post(self.url(path))
            .header("token", token)
            .header("organization", &self.login)
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("文件上传失败 ({})", path))?
            .error_for_status()
            .with_context(|| format!("文件上传被拒绝 ({})", path))?;
        Ok(())
    }

    async fn try_alert(&self, alert: &Alert) -> Result<()> {
        let body = json!({
            "taskId": self.task_id,
            "title": alert.title,
            "message": alert.message,
            "type": alert.alert_type,
        });
        self.post_json("alerts", &body).await?;
        Ok(())
    }

    async fn try_log_entry(&self, activity_label: &str, values: &JsonValue) -> Result<()> {
        let body = json!({ "values": values });
        self.post_json(&format!("log/{}/entry", activity_label), &body)
            .await?;
        Ok(())
    }

    async fn try_post_artifact(&self, name: &str, file: &Path) -> Result<()> {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let body = json!({
            "taskId": self.task_id,
            "name": name,
            "filename": file_name,
        });
        let created: CreatedResponse = serde_json::from_value(self.post_json("artifact", &body).await?)
            .context("无法解析附件创建响应")?;
        let id = id_to_string(&created.id)?;
        self.upload_file(&format!("artifact/{}/file", id), file).await
    }

    async fn try_report_error(&self, message: &str, screenshot: Option<&Path>) -> Result<()> {
        let body = json!({
            "taskId": self.task_id,
            "type": "RunError",
            "message": message,
            "language": "RUST",
        });
        let created: CreatedResponse = serde_json::from_value(self.post_json("error", &body).await?)
            .context("无法解析错误报告响应")?;
        if let Some(file) = screenshot {
            let id = id_to_string(&created.id)?;
            self.upload_file(&format!("error/{}/screenshot", id), file)
                .await?;
        }
        Ok(())
    }

    async fn try_finish_task(&self, summary: &TaskSummary) -> Result<()> {
        let body = json!({
            "state": "FINISHED",
            "finishStatus": summary.verdict,
            "finishMessage": summary.message,
            "totalItems": summary.result.total,
            "processedItems": summary.result.processed,
            "failedItems": summary.result.failed,
        });
        self.post_json(&format!("task/{}", self.task_id), &body)
            .await?;
        Ok(())
    }
}

fn id_to_string(id: &JsonValue) -> Result<String> {
    match id {
        JsonValue::String(s) => Ok(s.clone()),
        JsonValue::Number(n) => Ok(n.to_string()),
        other => Err(anyhow!("无效的 ID: {}", other)),
    }
}

#[async_trait]
impl Reporter for MaestroClient {
    async fn alert(&self, alert: Alert) {
        if let Err(e) = self.try_alert(&alert).await {
            warn!("⚠️ 告警上报失败 [{}]: {:#}", alert.title, e);
        }
    }

    async fn new_log_entry(&self, activity_label: &str, values: JsonValue) {
        if let Err(e) = self.try_log_entry(activity_label, &values).await {
            warn!("⚠️ 日志上报失败 ({}): {:#}", activity_label, e);
        }
    }

    async fn post_artifact(&self, name: &str, path: &Path) {
        if let Err(e) = self.try_post_artifact(name, path).await {
            warn!("⚠️ 附件上传失败 ({}): {:#}", name, e);
        }
    }

    async fn report_error(&self, message: &str, screenshot: Option<&Path>) {
        if let Err(e) = self.try_report_error(message, screenshot).await {
            warn!("⚠️ 错误报告失败: {:#}", e);
        }
    }

    async fn finish_task(&self, summary: &TaskSummary) {
        if let Err(e) = self.try_finish_task(summary).await {
            warn!("⚠️ 任务结束上报失败: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_server_and_task() {
        assert!(MaestroClient::new(&MaestroConfig::default()).is_none());

        let config = MaestroConfig {
            server: Some("https://maestro.example/".to_string()),
            login: "bot".to_string(),
            key: "secret".to_string(),
            task_id: Some("42".to_string()),
        };
        let client = MaestroClient::new(&config).unwrap();
        assert_eq!(client.task_id(), "42");
        assert_eq!(client.url("alerts"), "https://maestro.example/api/v2/alerts");
    }

    #[test]
    fn test_id_to_string() {
        assert_eq!(id_to_string(&json!(7)).unwrap(), "7");
        assert_eq!(id_to_string(&json!("abc")).unwrap(), "abc");
        assert!(id_to_string(&JsonValue::Null).is_err());
    }
}
