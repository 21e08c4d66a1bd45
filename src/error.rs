use std::path::PathBuf;

use thiserror::Error;

/// 应用程序启动阶段的错误类型
///
/// 运行期间的错误由各组件自己的类型表达，汇总在 `RunOutcome` 中
#[derive(Debug, Error)]
pub enum AppError {
    /// 浏览器相关错误
    #[error("浏览器错误: {0}")]
    Browser(#[from] BrowserError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 输入表格加载错误
#[derive(Debug, Error)]
pub enum LoadError {
    /// 文件不存在
    #[error("Arquivo '{}' não encontrado.", .path.display())]
    NotFound { path: PathBuf },
    /// 缺少必需列，或者无法解析为表格
    #[error("Erro ao ler '{}': {reason}", .path.display())]
    Format { path: PathBuf, reason: String },
    /// 其他 I/O 错误
    #[error("Erro inesperado ao ler '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    /// 上报给编排服务时使用的告警标题
    pub fn alert_title(&self) -> &'static str {
        match self {
            LoadError::NotFound { .. } => "Arquivo CSV não encontrado",
            LoadError::Format { .. } => "Erro de leitura CSV",
            LoadError::Io { .. } => "Erro inesperado",
        }
    }
}

/// 单个货币的查询失败
///
/// 返回之前总是已经截图并上传
#[derive(Debug, Error)]
#[error("Erro ao buscar cotação da moeda {currency}: {source}")]
pub struct FetchError {
    pub currency: String,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl FetchError {
    pub fn new(currency: impl Into<String>, source: anyhow::Error) -> Self {
        Self {
            currency: currency.into(),
            source: source.into(),
        }
    }
}

/// 输出表格写入错误
#[derive(Debug, Error)]
pub enum WriteError {
    /// 创建目录或文件失败
    #[error("写入文件失败 ({}): {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// CSV 序列化失败
    #[error("CSV 写入失败 ({}): {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 浏览器相关错误
#[derive(Debug, Error)]
pub enum BrowserError {
    /// 连接浏览器失败
    #[error("无法连接到浏览器 (端口: {port}): {source}")]
    ConnectionFailed {
        port: u16,
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 启动浏览器失败
    #[error("启动浏览器失败: {source}")]
    LaunchFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
    /// 浏览器配置失败
    #[error("浏览器配置失败: {0}")]
    ConfigurationFailed(String),
    /// 创建页面失败
    #[error("创建页面失败: {source}")]
    PageCreationFailed {
        #[source]
        source: chromiumoxide::error::CdpError,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 读取配置文件失败
    #[error("无法读取配置文件 ({}): {source}", .path.display())]
    FileReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({}): {source}", .path.display())]
    TomlParseFailed {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// 分隔符必须是单字节 ASCII 字符
    #[error("CSV 分隔符无效: '{0}'")]
    InvalidDelimiter(char),
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_keeps_currency_and_cause() {
        let err = FetchError::new("euro", anyhow::anyhow!("元素未找到"));
        assert_eq!(err.currency, "euro");
        let text = err.to_string();
        assert!(text.contains("euro"));
        assert!(text.contains("元素未找到"));
    }

    #[test]
    fn test_load_error_alert_titles() {
        let not_found = LoadError::NotFound {
            path: PathBuf::from("resources/moedas.csv"),
        };
        assert_eq!(not_found.alert_title(), "Arquivo CSV não encontrado");
        assert!(not_found.to_string().contains("moedas.csv"));

        let format = LoadError::Format {
            path: PathBuf::from("x.csv"),
            reason: "Coluna 'Moeda' não encontrada".to_string(),
        };
        assert_eq!(format.alert_title(), "Erro de leitura CSV");
    }
}
