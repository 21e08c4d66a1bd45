//! 批处理器 - 编排层
//!
//! ## 职责
//!
//! 按输入顺序逐行查询汇率，把结果写回表格并统计成功/失败。
//!
//! ## 规则
//!
//! 1. 货币名称为空：计为失败，不查询
//! 2. 查询成功：填充该行，上报一条结构化日志
//! 3. 查询失败：计为失败，该行保持为空，继续下一行
//!
//! 一行失败不会中止整批。所有查询共享同一个页面，所以严格串行

use serde_json::json;
use tracing::{error, info, warn};

use crate::models::{RowOutcome, RunResult, Table};
use crate::services::{Alert, FetchRate, Reporter};
use crate::workflow::RowCtx;

/// 结构化日志的活动标签
pub const ACTIVITY_LABEL: &str = "Consulta-Cotacao";

/// 批处理结果
#[derive(Debug)]
pub struct BatchReport {
    pub result: RunResult,
    /// 与表格行一一对应
    pub outcomes: Vec<RowOutcome>,
}

/// 处理整张表格
///
/// # 参数
/// - `fetcher`: 汇率查询能力
/// - `table`: 货币表格（原地填充）
/// - `reporter`: 上报能力
pub async fn process_rows<F, R>(fetcher: &F, table: &mut Table, reporter: &R) -> BatchReport
where
    F: FetchRate + ?Sized,
    R: Reporter + ?Sized,
{
    let total = table.len();
    let mut result = RunResult {
        total,
        ..Default::default()
    };
    let mut outcomes = Vec::with_capacity(total);

    for (index, row) in table.rows_mut().iter_mut().enumerate() {
        let ctx = RowCtx::new(index, total);

        let Some(currency) = row.currency().map(str::to_string) else {
            warn!("{} ⚠️ registro incompleto, moeda ausente", ctx);
            result.failed += 1;
            outcomes.push(RowOutcome::MissingCurrency);
            continue;
        };

        info!("{} 🔍 Processando moeda: {}", ctx, currency);

        match fetcher.fetch_rate(&currency).await {
            Ok(quote) => {
                row.fill(&quote);
                result.processed += 1;
                info!(
                    "{} ✓ {} = {} ({})",
                    ctx, currency, quote.rate, quote.as_of_date
                );

                reporter
                    .new_log_entry(
                        ACTIVITY_LABEL,
                        json!({
                            "moeda": currency,
                            "cotacao": quote.rate,
                            "data": quote.as_of_date,
                        }),
                    )
                    .await;
                outcomes.push(RowOutcome::Fetched(quote));
            }
            Err(e) => {
                error!("{} ❌ Falha ao processar {}: {}", ctx, currency, e);
                result.failed += 1;

                reporter
                    .alert(Alert::error(
                        format!("Falha na Moeda: {}", currency),
                        format!("Falha ao buscar cotação: {}", e),
                    ))
                    .await;
                outcomes.push(RowOutcome::FetchFailure(e));
            }
        }
    }

    BatchReport { result, outcomes }
}
