//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `bot_runner` - 运行编排器
//! - 管理应用生命周期（初始化、运行、关闭浏览器）
//! - 加载表格、写出表格、上传附件
//! - 生命周期告警和最终状态上报
//!
//! ### `batch_processor` - 批处理器
//! - 逐行调用查询服务（严格串行）
//! - 填充表格并统计成功/失败
//!
//! ## 层次关系
//!
//! ```text
//! bot_runner (处理一次运行)
//!     ↓
//! batch_processor (处理 Table)
//!     ↓
//! services (能力层：fetch / write / report)
//!     ↓
//! infrastructure (基础设施：BrowserPage)
//! ```

pub mod batch_processor;
pub mod bot_runner;

pub use batch_processor::{process_rows, BatchReport, ACTIVITY_LABEL};
pub use bot_runner::{run_pipeline, App, OUTPUT_ARTIFACT_NAME};
