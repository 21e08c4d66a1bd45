use std::fmt;

use serde::Serialize;

use crate::error::{FetchError, LoadError, WriteError};
use crate::models::table::Quote;

/// 一次运行的统计
///
/// 满足 `processed + failed <= total`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunResult {
    /// 加载时的行数
    pub total: usize,
    /// 成功填充的行数
    pub processed: usize,
    /// 查询失败或缺少货币名称的行数
    pub failed: usize,
}

/// 整体结论
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Success,
    Failed,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Success => write!(f, "SUCCESS"),
            Verdict::Failed => write!(f, "FAILED"),
        }
    }
}

/// 单行的处理结果
#[derive(Debug)]
pub enum RowOutcome {
    /// 查询成功，已写入行
    Fetched(Quote),
    /// 货币名称为空，没有查询
    MissingCurrency,
    /// 查询失败（已截图）
    FetchFailure(FetchError),
}

impl RowOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RowOutcome::Fetched(_))
    }
}

/// 一次运行的最终结果
#[derive(Debug)]
pub enum RunOutcome {
    /// 输入加载失败，整次运行中止
    LoadFailure { error: LoadError },
    /// 所有行都成功（包括空表）
    Completed { result: RunResult },
    /// 至少一行失败
    PartialSuccess { result: RunResult },
    /// 处理完成但输出文件写入失败
    WriteFailure { result: RunResult, error: WriteError },
}

impl RunOutcome {
    /// 根据批处理统计得出结果
    pub fn from_result(result: RunResult) -> Self {
        if result.failed == 0 {
            RunOutcome::Completed { result }
        } else {
            RunOutcome::PartialSuccess { result }
        }
    }

    /// 统计信息，加载失败时全部为 0
    pub fn result(&self) -> RunResult {
        match self {
            RunOutcome::LoadFailure { .. } => RunResult::default(),
            RunOutcome::Completed { result }
            | RunOutcome::PartialSuccess { result }
            | RunOutcome::WriteFailure { result, .. } => *result,
        }
    }

    pub fn verdict(&self) -> Verdict {
        match self {
            RunOutcome::Completed { .. } => Verdict::Success,
            _ => Verdict::Failed,
        }
    }

    /// 最终状态消息
    pub fn message(&self) -> String {
        match self {
            RunOutcome::LoadFailure { error } => error.to_string(),
            RunOutcome::Completed { .. } => "Bot finalizado com sucesso.".to_string(),
            RunOutcome::PartialSuccess { result } => {
                format!("Bot finalizado com {} falhas.", result.failed)
            }
            RunOutcome::WriteFailure { error, .. } => {
                format!("Bot finalizado, mas o arquivo não foi salvo: {}", error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_verdict_from_failures() {
        let ok = RunOutcome::from_result(RunResult {
            total: 2,
            processed: 2,
            failed: 0,
        });
        assert_eq!(ok.verdict(), Verdict::Success);
        assert_eq!(ok.message(), "Bot finalizado com sucesso.");

        let partial = RunOutcome::from_result(RunResult {
            total: 2,
            processed: 1,
            failed: 1,
        });
        assert_eq!(partial.verdict(), Verdict::Failed);
        assert_eq!(partial.message(), "Bot finalizado com 1 falhas.");
    }

    #[test]
    fn test_empty_run_is_success() {
        let outcome = RunOutcome::from_result(RunResult::default());
        assert_eq!(outcome.verdict(), Verdict::Success);
    }

    #[test]
    fn test_load_failure_has_zero_counts() {
        let outcome = RunOutcome::LoadFailure {
            error: LoadError::NotFound {
                path: PathBuf::from("moedas.csv"),
            },
        };
        assert_eq!(outcome.verdict(), Verdict::Failed);
        assert_eq!(outcome.result(), RunResult::default());
    }

    #[test]
    fn test_verdict_serializes_uppercase() {
        assert_eq!(
            serde_json::to_string(&Verdict::Success).unwrap(),
            "\"SUCCESS\""
        );
    }
}
