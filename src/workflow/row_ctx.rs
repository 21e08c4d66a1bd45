//! 行处理上下文
//!
//! 封装"我正在处理表格的第几行"这一信息

use std::fmt::Display;

/// 行处理上下文
#[derive(Debug, Clone, Copy)]
pub struct RowCtx {
    /// 行索引（从 0 开始，与表格位置一致）
    pub row_index: usize,

    /// 表格总行数（仅用于日志显示）
    pub total: usize,
}

impl RowCtx {
    pub fn new(row_index: usize, total: usize) -> Self {
        Self { row_index, total }
    }
}

impl Display for RowCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[Linha {}/{}]", self.row_index + 1, self.total)
    }
}
