use serde::{Deserialize, Serialize};

/// 默认配置文件路径
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// 静态配置（从 TOML 加载，启动时使用）
///
/// - server: 监听地址、对外短链前缀、请求超时
/// - database: 数据库连接与重试
/// - codes: 短码长度与生成重试上限
/// - events: 实时点击推送
/// - qr: 二维码输出
/// - cors: 浏览器前端跨域
/// - logging: 日志
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StaticConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub codes: CodeConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl StaticConfig {
    /// 从默认路径的 TOML 文件和环境变量加载配置
    pub fn load() -> Self {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    /// 从指定 TOML 文件和环境变量加载配置
    ///
    /// 优先级：ENV > config.toml > 默认值
    /// ENV 前缀：LP，分隔符：__
    /// 示例：LP__SERVER__PORT=9999
    pub fn load_from(path: &str) -> Self {
        use config::{Config, Environment, File};

        let builder = Config::builder()
            // 1. 从 TOML 文件加载（可选）
            .add_source(File::with_name(path).required(false))
            // 2. 从环境变量覆盖，前缀 LP，分隔符 __
            .add_source(
                Environment::with_prefix("LP")
                    .separator("__")
                    .try_parsing(true),
            );

        match builder.build() {
            Ok(settings) => match settings.try_deserialize::<StaticConfig>() {
                Ok(config) => {
                    if std::path::Path::new(path).exists() {
                        eprintln!("[INFO] Configuration loaded from: {}", path);
                    }
                    config
                }
                Err(e) => {
                    eprintln!("[ERROR] Failed to deserialize config: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("[ERROR] Failed to build config: {}", e);
                Self::default()
            }
        }
    }

    /// 生成示例 TOML 配置文件
    pub fn generate_sample_config() -> String {
        let sample_config = Self::default();
        toml::to_string_pretty(&sample_config)
            .unwrap_or_else(|e| format!("Error generating sample config: {}", e))
    }

    /// 保存配置到 TOML 文件
    pub fn save_to_file<P: AsRef<std::path::Path>>(
        &self,
        path: P,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let content = toml::to_string_pretty(self)?;

        if let Some(parent) = path.as_ref().parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_server_host")]
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default = "default_cpu_count")]
    pub cpu_count: usize,
    /// 对外短链前缀，例如 `https://sho.rt`；为空时使用 `http://{host}:{port}`
    #[serde(default)]
    pub public_base_url: Option<String>,
    /// 单个请求的处理上限（毫秒）
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl ServerConfig {
    /// Base URL that short codes are appended to, without a trailing slash
    pub fn base_url(&self) -> String {
        match self.public_base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.trim_end_matches('/').to_string(),
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// 数据库连接配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_database_url")]
    pub database_url: String,
    #[serde(default = "default_database_pool_size")]
    pub pool_size: u32,
    #[serde(default = "default_database_timeout")]
    pub timeout: u64,
    #[serde(default = "default_retry_count")]
    pub retry_count: u32,
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    #[serde(default = "default_retry_max_delay_ms")]
    pub retry_max_delay_ms: u64,
}

/// 短码生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodeConfig {
    #[serde(default = "default_code_length")]
    pub length: usize,
    /// 短码冲突时的最大尝试次数
    #[serde(default = "default_code_max_attempts")]
    pub max_attempts: u32,
}

/// 实时点击推送配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsConfig {
    /// 每个订阅者的缓冲事件数，溢出时丢弃最旧的事件
    #[serde(default = "default_events_buffer")]
    pub buffer: usize,
    #[serde(default = "default_events_keepalive_secs")]
    pub keepalive_secs: u64,
}

/// 二维码配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QrConfig {
    #[serde(default = "default_qr_enabled")]
    pub enabled: bool,
    #[serde(default = "default_qr_min_dimension")]
    pub min_dimension: u32,
}

/// CORS 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,
    #[serde(default = "default_cors_allowed_origins")]
    pub allowed_origins: Vec<String>,
    #[serde(default = "default_cors_max_age")]
    pub max_age: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
    #[serde(default = "default_log_file")]
    pub file: Option<String>,
    #[serde(default = "default_max_backups")]
    pub max_backups: u32,
    #[serde(default = "default_enable_rotation")]
    pub enable_rotation: bool,
}

// ============================================================
// Default value functions for static config
// ============================================================

fn default_server_host() -> String {
    "127.0.0.1".to_string()
}

fn default_server_port() -> u16 {
    5000
}

fn default_cpu_count() -> usize {
    num_cpus::get()
}

fn default_request_timeout_ms() -> u64 {
    5000
}

fn default_database_url() -> String {
    "sqlite://linkpulse.db?mode=rwc".to_string()
}

fn default_database_pool_size() -> u32 {
    10
}

fn default_database_timeout() -> u64 {
    30
}

fn default_retry_count() -> u32 {
    3
}

fn default_retry_base_delay_ms() -> u64 {
    100
}

fn default_retry_max_delay_ms() -> u64 {
    2000
}

fn default_code_length() -> usize {
    8
}

fn default_code_max_attempts() -> u32 {
    5
}

fn default_events_buffer() -> usize {
    256
}

fn default_events_keepalive_secs() -> u64 {
    15
}

fn default_qr_enabled() -> bool {
    true
}

fn default_qr_min_dimension() -> u32 {
    200
}

fn default_cors_enabled() -> bool {
    true
}

fn default_cors_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_cors_max_age() -> u64 {
    3600
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_file() -> Option<String> {
    None
}

fn default_max_backups() -> u32 {
    5
}

fn default_enable_rotation() -> bool {
    true
}

// ============================================================
// Default implementations
// ============================================================

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_server_host(),
            port: default_server_port(),
            cpu_count: default_cpu_count(),
            public_base_url: None,
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            pool_size: default_database_pool_size(),
            timeout: default_database_timeout(),
            retry_count: default_retry_count(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            retry_max_delay_ms: default_retry_max_delay_ms(),
        }
    }
}

impl Default for CodeConfig {
    fn default() -> Self {
        Self {
            length: default_code_length(),
            max_attempts: default_code_max_attempts(),
        }
    }
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            buffer: default_events_buffer(),
            keepalive_secs: default_events_keepalive_secs(),
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            enabled: default_qr_enabled(),
            min_dimension: default_qr_min_dimension(),
        }
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: default_cors_allowed_origins(),
            max_age: default_cors_max_age(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: default_log_file(),
            max_backups: default_max_backups(),
            enable_rotation: default_enable_rotation(),
        }
    }
}
