//! 表格写入服务 - 业务能力层
//!
//! 只负责"把表格写成 CSV"能力，不关心流程

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::WriteError;
use crate::models::Table;

/// 表格写入服务
pub struct TableWriter {
    delimiter: u8,
}

impl TableWriter {
    pub fn new(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// 写入表格
    ///
    /// # 返回
    /// - `Ok(Some(path))`: 已写入（覆盖已有文件）
    /// - `Ok(None)`: 表格为空，没有生成文件
    pub fn write(&self, table: &Table, path: &Path) -> Result<Option<PathBuf>, WriteError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| WriteError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        if table.is_empty() {
            warn!("⚠️ 表格为空，不写入文件: {}", path.display());
            return Ok(None);
        }

        let csv_err = |source| WriteError::Csv {
            path: path.to_path_buf(),
            source,
        };

        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_path(path)
            .map_err(csv_err)?;
        for row in table.rows() {
            writer.serialize(row).map_err(csv_err)?;
        }
        writer.flush().map_err(|source| WriteError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        info!("✓ 文件已保存: {} ({} 行)", path.display(), table.len());
        Ok(Some(path.to_path_buf()))
    }
}

impl Default for TableWriter {
    fn default() -> Self {
        Self::new(b',')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{load_table, Quote};
    use tempfile::TempDir;

    #[test]
    fn test_empty_table_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("saida").join("moedas_atualizadas.csv");

        let written = TableWriter::default().write(&Table::default(), &path).unwrap();
        assert!(written.is_none());
        assert!(!path.exists());
        assert!(path.parent().unwrap().is_dir());
    }

    #[test]
    fn test_write_rows_in_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("out.csv");

        let mut table = Table::from_currencies(["dólar", "", "euro"]);
        table.rows_mut()[0].fill(&Quote::new("5,00", "11 de junho de 2025"));

        let written = TableWriter::default().write(&table, &path).unwrap();
        assert_eq!(written.as_deref(), Some(path.as_path()));

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "Moeda,Cotação,Data");
        assert_eq!(lines[1], "dólar,\"5,00\",11 de junho de 2025");
        assert_eq!(lines[2], ",,");
        assert_eq!(lines[3], "euro,,");
        assert_eq!(lines.len(), 4);

        let reloaded = load_table(&path, b',').unwrap();
        assert_eq!(reloaded, table);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "lixo antigo\n").unwrap();

        let table = Table::from_currencies(["iene"]);
        TableWriter::default().write(&table, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(!content.contains("lixo"));
        assert!(content.contains("iene"));
    }
}
