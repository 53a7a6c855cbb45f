use std::fmt;

use serde::Serialize;
use strum::{AsRefStr, Display};

/// Stable, caller-visible error kinds.
///
/// Every [`LinkpulseError`] maps onto exactly one of these; the HTTP layer
/// serializes the kind as the `code` field of error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, AsRefStr, Display)]
pub enum ErrorKind {
    InvalidInput,
    NotFound,
    AlreadyExists,
    CodeSpaceExhausted,
    GeneratorUnavailable,
    Timeout,
    ServerError,
}

#[derive(Debug, Clone)]
pub enum LinkpulseError {
    InvalidInput(String),
    NotFound(String),
    AlreadyExists(String),
    CodeSpaceExhausted(String),
    GeneratorUnavailable(String),
    Timeout(String),
    ServerError(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    FileOperation(String),
    Serialization(String),
    QrRender(String),
}

impl LinkpulseError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            LinkpulseError::InvalidInput(_) => "E001",
            LinkpulseError::NotFound(_) => "E002",
            LinkpulseError::AlreadyExists(_) => "E003",
            LinkpulseError::CodeSpaceExhausted(_) => "E004",
            LinkpulseError::GeneratorUnavailable(_) => "E005",
            LinkpulseError::Timeout(_) => "E006",
            LinkpulseError::ServerError(_) => "E007",
            LinkpulseError::DatabaseConfig(_) => "E008",
            LinkpulseError::DatabaseConnection(_) => "E009",
            LinkpulseError::DatabaseOperation(_) => "E010",
            LinkpulseError::FileOperation(_) => "E011",
            LinkpulseError::Serialization(_) => "E012",
            LinkpulseError::QrRender(_) => "E013",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkpulseError::InvalidInput(_) => "Invalid Input",
            LinkpulseError::NotFound(_) => "Resource Not Found",
            LinkpulseError::AlreadyExists(_) => "Already Exists",
            LinkpulseError::CodeSpaceExhausted(_) => "Code Space Exhausted",
            LinkpulseError::GeneratorUnavailable(_) => "Code Generator Unavailable",
            LinkpulseError::Timeout(_) => "Timeout",
            LinkpulseError::ServerError(_) => "Server Error",
            LinkpulseError::DatabaseConfig(_) => "Database Configuration Error",
            LinkpulseError::DatabaseConnection(_) => "Database Connection Error",
            LinkpulseError::DatabaseOperation(_) => "Database Operation Error",
            LinkpulseError::FileOperation(_) => "File Operation Error",
            LinkpulseError::Serialization(_) => "Serialization Error",
            LinkpulseError::QrRender(_) => "QR Render Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            LinkpulseError::InvalidInput(msg)
            | LinkpulseError::NotFound(msg)
            | LinkpulseError::AlreadyExists(msg)
            | LinkpulseError::CodeSpaceExhausted(msg)
            | LinkpulseError::GeneratorUnavailable(msg)
            | LinkpulseError::Timeout(msg)
            | LinkpulseError::ServerError(msg)
            | LinkpulseError::DatabaseConfig(msg)
            | LinkpulseError::DatabaseConnection(msg)
            | LinkpulseError::DatabaseOperation(msg)
            | LinkpulseError::FileOperation(msg)
            | LinkpulseError::Serialization(msg)
            | LinkpulseError::QrRender(msg) => msg,
        }
    }

    /// Caller-visible kind. Infrastructure failures all collapse to
    /// `ServerError`.
    pub fn kind(&self) -> ErrorKind {
        match self {
            LinkpulseError::InvalidInput(_) => ErrorKind::InvalidInput,
            LinkpulseError::NotFound(_) => ErrorKind::NotFound,
            LinkpulseError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            LinkpulseError::CodeSpaceExhausted(_) => ErrorKind::CodeSpaceExhausted,
            LinkpulseError::GeneratorUnavailable(_) => ErrorKind::GeneratorUnavailable,
            LinkpulseError::Timeout(_) => ErrorKind::Timeout,
            LinkpulseError::ServerError(_)
            | LinkpulseError::DatabaseConfig(_)
            | LinkpulseError::DatabaseConnection(_)
            | LinkpulseError::DatabaseOperation(_)
            | LinkpulseError::FileOperation(_)
            | LinkpulseError::Serialization(_)
            | LinkpulseError::QrRender(_) => ErrorKind::ServerError,
        }
    }

    /// 格式化为彩色输出（用于启动失败时的终端输出）
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    /// 格式化为简洁输出
    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkpulseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkpulseError {}

// 便捷的构造函数
impl LinkpulseError {
    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::InvalidInput(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::NotFound(msg.into())
    }

    pub fn already_exists<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::AlreadyExists(msg.into())
    }

    pub fn code_space_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::CodeSpaceExhausted(msg.into())
    }

    pub fn generator_unavailable<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::GeneratorUnavailable(msg.into())
    }

    pub fn timeout<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Timeout(msg.into())
    }

    pub fn server_error<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::ServerError(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::DatabaseOperation(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::FileOperation(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::Serialization(msg.into())
    }

    pub fn qr_render<T: Into<String>>(msg: T) -> Self {
        LinkpulseError::QrRender(msg.into())
    }
}

// 为常见的错误类型实现 From trait
impl From<sea_orm::DbErr> for LinkpulseError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkpulseError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkpulseError {
    fn from(err: std::io::Error) -> Self {
        LinkpulseError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkpulseError {
    fn from(err: serde_json::Error) -> Self {
        LinkpulseError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkpulseError>;
