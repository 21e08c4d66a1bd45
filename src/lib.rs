//! # Cotação Bot
//!
//! 在搜索引擎中查询每种货币的汇率，并把结果写回表格的自动化机器人
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `browser/` - 启动或连接浏览器，持有会话
//! - `infrastructure/` - `BrowserPage` 是唯一的 page owner，只暴露页面能力
//!
//! ### ② 业务能力层（Services / Clients）
//! - `RateFetcher` - 查询一个货币的汇率和日期，失败时截图
//! - `TableWriter` - 写出 CSV 表格
//! - `Reporter` - 向编排服务上报（`MaestroClient` / `LogReporter`）
//!
//! ### ③ 流程层（Workflow）
//! - `RowCtx` - 当前处理的是哪一行
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 逐行处理表格
//! - `orchestrator/bot_runner` - 一次完整运行的调度
//!
//! ## 模块结构

pub mod browser;
pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult, FetchError, LoadError, WriteError};
pub use infrastructure::{BrowserPage, QuotePage};
pub use models::{CurrencyRow, Quote, RowOutcome, RunOutcome, RunResult, Table, Verdict};
pub use orchestrator::{process_rows, run_pipeline, App};
pub use services::{FetchRate, RateFetcher, Reporter};
pub use workflow::RowCtx;
