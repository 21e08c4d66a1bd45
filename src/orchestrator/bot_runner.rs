//! 运行编排器 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责一次完整运行的调度和资源管理。
//!
//! ## 流程
//!
//! ```text
//! 加载表格 → 打开搜索页 → 逐行查询 → 写出表格 → 上传附件 → 结束任务
//! ```
//!
//! - 加载失败：截图、上报错误，直接以 FAILED 结束（统计全为 0）
//! - 有任意一行失败：FAILED，否则 SUCCESS
//! - 浏览器会话在所有退出路径上都会关闭

use std::path::PathBuf;

use anyhow::Result;
use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::browser::BrowserSession;
use crate::clients::MaestroClient;
use crate::config::Config;
use crate::error::{AppResult, LoadError};
use crate::infrastructure::QuotePage;
use crate::models::{load_table, RunOutcome, Verdict};
use crate::orchestrator::batch_processor::process_rows;
use crate::services::{Alert, AlertType, LogReporter, RateFetcher, Reporter, TableWriter, TaskSummary};
use crate::utils::logging::{log_startup, log_table_loaded, print_final_stats};
use crate::utils::screenshot;

/// 输出表格的附件名称
pub const OUTPUT_ARTIFACT_NAME: &str = "Cotações atualizadas";

/// 应用主结构
pub struct App {
    config: Config,
    session: BrowserSession,
    reporter: Box<dyn Reporter>,
    log_file: Option<PathBuf>,
}

impl App {
    /// 初始化应用：校验配置、打开浏览器、选择上报方式
    pub async fn initialize(config: Config, log_file: Option<PathBuf>) -> AppResult<Self> {
        log_startup(&config);
        config.csv_delimiter_byte()?;

        let session =
            BrowserSession::open(&config.browser, config.search.element_timeout()).await?;

        let reporter: Box<dyn Reporter> = match MaestroClient::new(&config.maestro) {
            Some(client) => Box::new(client),
            None => Box::new(LogReporter),
        };

        Ok(Self {
            config,
            session,
            reporter,
            log_file,
        })
    }

    /// 运行应用主逻辑，结束后关闭浏览器
    pub async fn run(self) -> Result<RunOutcome> {
        let outcome = run_pipeline(&self.config, self.session.page(), self.reporter.as_ref()).await;

        self.session.close().await;

        print_final_stats(&outcome.result(), outcome.verdict(), self.log_file.as_deref());
        Ok(outcome)
    }
}

/// 执行一次完整运行
///
/// 不持有浏览器，只依赖页面能力和上报能力，便于用替身测试
pub async fn run_pipeline<P, R>(config: &Config, page: &P, reporter: &R) -> RunOutcome
where
    P: QuotePage + ?Sized,
    R: Reporter + ?Sized,
{
    reporter
        .alert(Alert::info(
            "Iniciando o processo",
            "Carregando dados do arquivo CSV...",
        ))
        .await;

    // ========== 加载表格 ==========
    let input_path = config.input_path();
    let loaded = config
        .csv_delimiter_byte()
        .map_err(|e| LoadError::Format {
            path: input_path.clone(),
            reason: e.to_string(),
        })
        .and_then(|delimiter| Ok((load_table(&input_path, delimiter)?, delimiter)));
    let (mut table, delimiter) = match loaded {
        Ok(loaded) => loaded,
        Err(error) => return handle_load_failure(config, page, reporter, error).await,
    };
    log_table_loaded(table.len());

    reporter
        .alert(Alert::info(
            "Arquivo carregado",
            format!("{} moedas carregadas de {}.", table.len(), input_path.display()),
        ))
        .await;

    // ========== 打开搜索页 ==========
    // 导航失败时继续，每一行会各自失败并截图
    if let Err(e) = page.goto(&config.search.url).await {
        error!("❌ 无法打开搜索页 {}: {:#}", config.search.url, e);
    }
    sleep(config.search.settle_delay()).await;

    reporter
        .alert(Alert::info(
            "Iniciando busca",
            "Consultando cotações de moedas...",
        ))
        .await;

    // ========== 逐行查询 ==========
    let fetcher = RateFetcher::new(
        page,
        reporter,
        config.search.clone(),
        config.screenshot_dir.clone(),
    );
    let report = process_rows(&fetcher, &mut table, reporter).await;
    let result = report.result;

    // ========== 写出表格 ==========
    let output_path = config.output_path();
    let outcome = match TableWriter::new(delimiter).write(&table, &output_path) {
        Ok(Some(path)) => {
            reporter.post_artifact(OUTPUT_ARTIFACT_NAME, &path).await;
            RunOutcome::from_result(result)
        }
        Ok(None) => RunOutcome::from_result(result),
        Err(error) => {
            error!("❌ {}", error);
            reporter.report_error(&error.to_string(), None).await;
            reporter
                .alert(Alert::error("Erro ao salvar arquivo", error.to_string()))
                .await;
            RunOutcome::WriteFailure { result, error }
        }
    };

    finish(reporter, &outcome).await;
    outcome
}

/// 加载失败：截图、上报，并以 FAILED 结束任务
async fn handle_load_failure<P, R>(
    config: &Config,
    page: &P,
    reporter: &R,
    error: LoadError,
) -> RunOutcome
where
    P: QuotePage + ?Sized,
    R: Reporter + ?Sized,
{
    error!("❌ {}", error);

    let screenshot = match screenshot::capture(page, &config.screenshot_dir, "Erro_carregamento").await
    {
        Ok(path) => Some(path),
        Err(e) => {
            warn!("⚠️ 截图失败: {:#}", e);
            None
        }
    };

    reporter
        .report_error(&error.to_string(), screenshot.as_deref())
        .await;
    reporter
        .alert(Alert::error(error.alert_title(), error.to_string()))
        .await;

    let outcome = RunOutcome::LoadFailure { error };
    finish(reporter, &outcome).await;
    outcome
}

/// 最终告警和任务结束上报
async fn finish<R>(reporter: &R, outcome: &RunOutcome)
where
    R: Reporter + ?Sized,
{
    let verdict = outcome.verdict();
    let message = outcome.message();

    let alert_type = match verdict {
        Verdict::Success => AlertType::Info,
        Verdict::Failed => AlertType::Warn,
    };
    reporter
        .alert(Alert::new(alert_type, "Processo finalizado", message.clone()))
        .await;

    reporter
        .finish_task(&TaskSummary {
            verdict,
            message,
            result: outcome.result(),
        })
        .await;

    info!("Bot finalizado com status: {}", verdict);
}
