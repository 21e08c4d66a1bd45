use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::error::LoadError;
use crate::models::table::{CurrencyRow, Table, COL_CURRENCY, COL_DATE, COL_RATE};

/// 从 CSV 文件加载货币表格
///
/// - 文件不存在 → `LoadError::NotFound`
/// - 缺少 `Moeda` 列、某行字段多于表头或内容无法解析 → `LoadError::Format`
/// - 其他 I/O 错误 → `LoadError::Io`
///
/// 字段少于表头的行，缺失的单元格按空值处理。
/// 只有表头没有数据行时返回空表格
pub fn load_table(path: &Path, delimiter: u8) -> Result<Table, LoadError> {
    let file = File::open(path).map_err(|source| match source.kind() {
        ErrorKind::NotFound => LoadError::NotFound {
            path: path.to_path_buf(),
        },
        _ => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| classify(path, e))?
        .iter()
        .map(normalize_header)
        .collect::<Vec<_>>();
    debug!("CSV 表头: {:?}", headers);

    let column = |name: &str| headers.iter().position(|h| h == name);
    let currency_idx = column(COL_CURRENCY).ok_or_else(|| LoadError::Format {
        path: path.to_path_buf(),
        reason: format!("Coluna '{}' não encontrada no CSV.", COL_CURRENCY),
    })?;
    let rate_idx = column(COL_RATE);
    let date_idx = column(COL_DATE);

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| classify(path, e))?;
        if record.len() > headers.len() {
            let line = record.position().map_or(0, |p| p.line());
            return Err(LoadError::Format {
                path: path.to_path_buf(),
                reason: format!(
                    "linha {}: {} campos, mas o cabeçalho tem {}",
                    line,
                    record.len(),
                    headers.len()
                ),
            });
        }
        let cell = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .unwrap_or_default()
                .to_string()
        };

        let mut row = CurrencyRow::new(cell(Some(currency_idx)));
        row.rate = cell(rate_idx);
        row.as_of_date = cell(date_idx);
        rows.push(row);
    }

    info!("✓ {} registros carregados de {}", rows.len(), path.display());
    Ok(Table::new(rows))
}

/// 去掉 BOM 和首尾空白
fn normalize_header(header: &str) -> String {
    header.trim_start_matches('\u{feff}').trim().to_string()
}

fn classify(path: &Path, err: csv::Error) -> LoadError {
    let reason = err.to_string();
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LoadError::Io {
            path: path.to_path_buf(),
            source,
        },
        _ => LoadError::Format {
            path: path.to_path_buf(),
            reason,
        },
    }
}
