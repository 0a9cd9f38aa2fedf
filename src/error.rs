//! 错误类型定义
//!
//! - 探测、绑定与字段访问等外部边界统一返回 `Result`
//! - 只有注册中心与分发层会把错误转成日志并继续，分类/改写/清洗均为全函数

use thiserror::Error;

/// 拦截层错误类型
#[derive(Debug, Error)]
pub enum InterceptError {
    /// 候选类在当前运行时中不存在
    #[error("Target class not found: {class}")]
    TargetAbsent { class: String },

    /// 拦截机制拒绝了绑定
    #[error("Failed to bind {class}#{method}: {reason}")]
    BindFailed {
        class: String,
        method: String,
        reason: String,
    },

    /// 参数槽位缺失或类型不符
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// 命名字段读写失败
    #[error("Field access failed for `{field}`: {reason}")]
    FieldAccess { field: String, reason: String },

    /// 配置读取或解析失败
    #[error("Invalid configuration at {path}: {reason}")]
    Config { path: String, reason: String },

    /// 其他错误
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl InterceptError {
    pub fn shape<T: Into<String>>(message: T) -> Self {
        InterceptError::ShapeMismatch(message.into())
    }

    pub fn field<F: Into<String>, R: std::fmt::Display>(field: F, reason: R) -> Self {
        InterceptError::FieldAccess {
            field: field.into(),
            reason: reason.to_string(),
        }
    }

    /// 目标缺失属于预期情况，不需要告警
    pub fn is_absent(&self) -> bool {
        matches!(self, InterceptError::TargetAbsent { .. })
    }
}

/// 拦截层结果类型
pub type Result<T> = std::result::Result<T, InterceptError>;
