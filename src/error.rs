//! 错误处理模块
//! 定义了应用级别与后端操作级别的错误类型

use thiserror::Error;

/// 后端操作错误
#[derive(Debug, Error)]
pub enum StoreError {
    /// 阶段截止时间已过（属于正常的阶段结束竞争，不计入错误）
    #[error("context deadline exceeded")]
    DeadlineExceeded,
    /// 读取到的值与预期不一致
    #[error("unexpected value for {key}: expected {expected:?}, got {actual:?}")]
    UnexpectedValue {
        key: String,
        expected: String,
        actual: String,
    },
    /// SQLite 错误
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// 连接池错误
    #[error("connection pool error: {0}")]
    Pool(String),
    /// 其他后端错误
    #[error("backend error: {0}")]
    Backend(String),
}

impl StoreError {
    /// 是否为截止时间导致的取消
    #[inline]
    pub fn is_deadline(&self) -> bool {
        matches!(self, StoreError::DeadlineExceeded)
    }
}

/// 应用主错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 运行时创建错误
    #[error("Runtime create error: {0}")]
    RuntimeCreate(String),
    /// 配置错误
    #[error("Configuration error: {0}")]
    Config(String),
    /// 后端错误
    #[error("{context}: {source}")]
    Store {
        context: String,
        #[source]
        source: StoreError,
    },
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, AppError>;

/// 错误上下文扩展trait
pub trait ErrorContext<T> {
    /// 添加上下文信息
    fn with_context(self, context: &str) -> Result<T>;
}

impl<T> ErrorContext<T> for Result<T> {
    fn with_context(self, context: &str) -> Result<T> {
        self.map_err(|e| match e {
            AppError::RuntimeCreate(msg) => AppError::RuntimeCreate(format!("{}: {}", context, msg)),
            AppError::Config(msg) => AppError::Config(format!("{}: {}", context, msg)),
            AppError::Store { context: inner, source } => AppError::Store {
                context: format!("{}: {}", context, inner),
                source,
            },
        })
    }
}

impl<T> ErrorContext<T> for std::result::Result<T, StoreError> {
    fn with_context(self, context: &str) -> Result<T> {
        self.map_err(|source| AppError::Store {
            context: context.to_owned(),
            source,
        })
    }
}
