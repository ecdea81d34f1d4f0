use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromoError {
    Storage(String),
    Serialization(String),
    Validation(String),
    NotFound(String),
    Fetch(String),
    Config(String),
    FileOperation(String),
}

impl PromoError {
    /// 获取错误代码
    pub fn code(&self) -> &'static str {
        match self {
            PromoError::Storage(_) => "E001",
            PromoError::Serialization(_) => "E002",
            PromoError::Validation(_) => "E003",
            PromoError::NotFound(_) => "E004",
            PromoError::Fetch(_) => "E005",
            PromoError::Config(_) => "E006",
            PromoError::FileOperation(_) => "E007",
        }
    }

    /// 获取错误类型名称
    pub fn error_type(&self) -> &'static str {
        match self {
            PromoError::Storage(_) => "Storage Error",
            PromoError::Serialization(_) => "Serialization Error",
            PromoError::Validation(_) => "Validation Error",
            PromoError::NotFound(_) => "Resource Not Found",
            PromoError::Fetch(_) => "Fetch Error",
            PromoError::Config(_) => "Configuration Error",
            PromoError::FileOperation(_) => "File Operation Error",
        }
    }

    /// 获取错误详情
    pub fn message(&self) -> &str {
        match self {
            PromoError::Storage(msg) => msg,
            PromoError::Serialization(msg) => msg,
            PromoError::Validation(msg) => msg,
            PromoError::NotFound(msg) => msg,
            PromoError::Fetch(msg) => msg,
            PromoError::Config(msg) => msg,
            PromoError::FileOperation(msg) => msg,
        }
    }

    /// 格式化为彩色输出（用于 CLI 错误提示）
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

impl fmt::Display for PromoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for PromoError {}

// 便捷的构造函数
impl PromoError {
    pub fn storage<T: Into<String>>(msg: T) -> Self {
        PromoError::Storage(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        PromoError::Serialization(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        PromoError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        PromoError::NotFound(msg.into())
    }

    pub fn fetch<T: Into<String>>(msg: T) -> Self {
        PromoError::Fetch(msg.into())
    }

    pub fn config<T: Into<String>>(msg: T) -> Self {
        PromoError::Config(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        PromoError::FileOperation(msg.into())
    }
}

impl From<std::io::Error> for PromoError {
    fn from(err: std::io::Error) -> Self {
        PromoError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for PromoError {
    fn from(err: serde_json::Error) -> Self {
        PromoError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PromoError>;
