use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// 默认配置文件名（位于工作目录）
const DEFAULT_CONFIG_FILE: &str = "bot.toml";

/// 程序配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 资源目录，相对路径的输入/输出文件都基于此目录
    pub resources_dir: PathBuf,
    /// 输入 CSV 文件
    pub input_file: PathBuf,
    /// 输出 CSV 文件，未设置时使用 `<输入文件名>_atualizadas.csv`
    pub output_file: Option<PathBuf>,
    /// CSV 分隔符
    pub csv_delimiter: char,
    /// 错误截图存放目录
    pub screenshot_dir: PathBuf,
    pub search: SearchConfig,
    pub browser: BrowserSettings,
    pub maestro: MaestroConfig,
    pub logging: LoggingConfig,
}

/// 搜索页面配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// 搜索引擎首页
    pub url: String,
    /// 查询模板，`{moeda}` 会被替换为货币名称
    pub query_template: String,
    pub input_selector: String,
    pub rate_selector: String,
    pub date_selector: String,
    /// 页面加载后的等待时间（毫秒）
    pub settle_ms: u64,
    /// 查找元素的超时时间（毫秒）
    pub element_timeout_ms: u64,
}

/// 浏览器启动方式
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserMode {
    /// 启动新的无头浏览器
    Headless,
    /// 连接到已经打开调试端口的浏览器
    Connect,
}

impl FromStr for BrowserMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "headless" => Ok(BrowserMode::Headless),
            "connect" => Ok(BrowserMode::Connect),
            other => Err(format!("未知的浏览器模式: {}", other)),
        }
    }
}

/// 浏览器配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BrowserSettings {
    pub mode: BrowserMode,
    /// 浏览器调试端口（connect 模式）
    pub debug_port: u16,
    /// Chrome 可执行文件路径，未设置时由 chromiumoxide 自动查找
    pub chrome_executable: Option<PathBuf>,
    pub window_width: u32,
    pub window_height: u32,
    pub lang: String,
    pub user_agent: String,
    /// 用户数据目录，未设置时每次运行创建临时目录
    pub user_data_dir: Option<PathBuf>,
}

/// 编排服务（Maestro）配置
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MaestroConfig {
    pub server: Option<String>,
    pub login: String,
    pub key: String,
    pub task_id: Option<String>,
}

impl MaestroConfig {
    /// 服务器地址和任务 ID 都存在时才连接编排服务
    pub fn is_configured(&self) -> bool {
        self.server.as_deref().is_some_and(|s| !s.trim().is_empty()) && self.task_id.is_some()
    }
}

/// 日志配置
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志目录
    pub dir: PathBuf,
    /// 日志文件名前缀
    pub file_prefix: String,
    /// 默认日志级别，`RUST_LOG` 优先
    pub level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            resources_dir: PathBuf::from("resources"),
            input_file: PathBuf::from("moedas.csv"),
            output_file: None,
            csv_delimiter: ',',
            screenshot_dir: PathBuf::from("resources"),
            search: SearchConfig::default(),
            browser: BrowserSettings::default(),
            maestro: MaestroConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            url: "https://www.google.com".to_string(),
            query_template: "Cotação do {moeda} hoje".to_string(),
            input_selector: "#APjFqb".to_string(),
            rate_selector: "#knowledge-currency__updatable-data-column > div.b1hJbf > \
                            div.dDoNo.ikb4Bb.gsrt.GDBPqd > span.DFlfde.SwHCTb"
                .to_string(),
            date_selector:
                "#knowledge-currency__updatable-data-column > div.k0Rg6d.hqAUc > span:nth-child(1)"
                    .to_string(),
            settle_ms: 2000,
            element_timeout_ms: 10_000,
        }
    }
}

impl SearchConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn element_timeout(&self) -> Duration {
        Duration::from_millis(self.element_timeout_ms)
    }

    /// 生成某个货币的查询语句
    pub fn render_query(&self, currency: &str) -> String {
        self.query_template.replace("{moeda}", currency)
    }
}

impl Default for BrowserSettings {
    fn default() -> Self {
        Self {
            mode: BrowserMode::Headless,
            debug_port: 2001,
            chrome_executable: None,
            window_width: 1920,
            window_height: 1080,
            lang: "pt-BR".to_string(),
            user_agent: "Chrome/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/115.0.0.0 Safari/537.36"
                .to_string(),
            user_data_dir: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_prefix: "bot_cotacao".to_string(),
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// 加载配置：默认值 -> TOML 文件 -> 环境变量
    ///
    /// 配置文件路径取自 `BOT_CONFIG`，未设置时尝试工作目录下的 `bot.toml`
    pub fn load() -> Result<Self, ConfigError> {
        let explicit = std::env::var("BOT_CONFIG").ok().map(PathBuf::from);
        let mut config = match explicit {
            Some(path) => Self::from_file(&path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.csv_delimiter_byte()?;
        Ok(config)
    }

    /// 从 TOML 文件读取配置，缺失的字段使用默认值
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            ConfigError::FileReadFailed {
                path: path.to_path_buf(),
                source,
            }
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_path_buf(),
            source,
        })
    }

    /// 用环境变量覆盖配置
    ///
    /// `lookup` 按变量名返回取值，测试中可以传入固定的表
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RESOURCES_DIR") {
            self.resources_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("INPUT_FILE") {
            self.input_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("OUTPUT_FILE") {
            self.output_file = Some(PathBuf::from(v));
        }
        if let Some(v) = parse_var(&lookup, "CSV_DELIMITER", "char")? {
            self.csv_delimiter = v;
        }
        if let Some(v) = lookup("SCREENSHOT_DIR") {
            self.screenshot_dir = PathBuf::from(v);
        }

        if let Some(v) = lookup("SEARCH_URL") {
            self.search.url = v;
        }
        if let Some(v) = lookup("QUERY_TEMPLATE") {
            self.search.query_template = v;
        }
        if let Some(v) = parse_var(&lookup, "PAGE_SETTLE_MS", "u64")? {
            self.search.settle_ms = v;
        }
        if let Some(v) = parse_var(&lookup, "ELEMENT_TIMEOUT_MS", "u64")? {
            self.search.element_timeout_ms = v;
        }

        if let Some(v) = parse_var(&lookup, "BROWSER_MODE", "headless|connect")? {
            self.browser.mode = v;
        }
        if let Some(v) = parse_var(&lookup, "BROWSER_DEBUG_PORT", "u16")? {
            self.browser.debug_port = v;
        }
        if let Some(v) = lookup("CHROME_EXECUTABLE") {
            self.browser.chrome_executable = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("USER_DATA_DIR") {
            self.browser.user_data_dir = Some(PathBuf::from(v));
        }

        if let Some(v) = lookup("MAESTRO_SERVER") {
            self.maestro.server = Some(v);
        }
        if let Some(v) = lookup("MAESTRO_LOGIN") {
            self.maestro.login = v;
        }
        if let Some(v) = lookup("MAESTRO_KEY") {
            self.maestro.key = v;
        }
        if let Some(v) = lookup("MAESTRO_TASK_ID") {
            self.maestro.task_id = Some(v);
        }

        if let Some(v) = lookup("LOG_DIR") {
            self.logging.dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            self.logging.level = v;
        }

        Ok(())
    }

    /// 输入文件的完整路径
    pub fn input_path(&self) -> PathBuf {
        self.resolve(&self.input_file)
    }

    /// 输出文件的完整路径
    pub fn output_path(&self) -> PathBuf {
        match &self.output_file {
            Some(file) => self.resolve(file),
            None => {
                let stem = self
                    .input_file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "moedas".to_string());
                self.resources_dir.join(format!("{}_atualizadas.csv", stem))
            }
        }
    }

    /// CSV 读写使用的单字节分隔符
    pub fn csv_delimiter_byte(&self) -> Result<u8, ConfigError> {
        u8::try_from(self.csv_delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or(ConfigError::InvalidDelimiter(self.csv_delimiter))
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        if file.is_absolute() {
            file.to_path_buf()
        } else {
            self.resources_dir.join(file)
        }
    }
}

fn parse_var<T, F>(lookup: &F, var_name: &str, expected_type: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var_name) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::EnvVarParseFailed {
                var_name: var_name.to_string(),
                value,
                expected_type: expected_type.to_string(),
            }),
    }
}
