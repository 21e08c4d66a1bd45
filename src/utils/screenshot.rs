//! 错误截图工具
//!
//! 文件名格式: `screenshot_<标签>_<YYYYmmdd_HHMMSS>.png`

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;

use crate::infrastructure::QuotePage;

/// 生成截图文件路径
///
/// # 参数
/// - `dir`: 截图目录
/// - `label`: 标签（如 `Erro_dólar`），文件名中不允许的字符会被替换为 `_`
pub fn screenshot_path(dir: &Path, label: &str) -> PathBuf {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    dir.join(format!("screenshot_{}_{}.png", sanitize_label(label), timestamp))
}

/// 截取当前页面并返回文件路径
pub async fn capture<P>(page: &P, dir: &Path, label: &str) -> Result<PathBuf>
where
    P: QuotePage + ?Sized,
{
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("无法创建截图目录: {}", dir.display()))?;

    let path = screenshot_path(dir, label);
    page.screenshot(&path).await?;
    info!("📸 截图已保存: {}", path.display());
    Ok(path)
}

fn sanitize_label(label: &str) -> String {
    static INVALID: OnceLock<Regex> = OnceLock::new();
    let re = INVALID.get_or_init(|| {
        Regex::new(r#"[\\/:*?"<>|\s]+"#).expect("截图标签正则表达式无效")
    });
    re.replace_all(label.trim(), "_").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screenshot_path_format() {
        let path = screenshot_path(Path::new("resources"), "Erro_dólar");
        let name = path.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("screenshot_Erro_dólar_"));
        assert!(name.ends_with(".png"));
        assert_eq!(path.parent(), Some(Path::new("resources")));
    }

    #[test]
    fn test_sanitize_label() {
        assert_eq!(sanitize_label("Erro_libra esterlina"), "Erro_libra_esterlina");
        assert_eq!(sanitize_label("a/b:c"), "a_b_c");
    }
}
