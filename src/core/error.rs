//! 错误分类与传播策略
//!
//! 三组：ValidationError（结构校验失败）、GenerationError（单次 Oracle 往返失败）、
//! TurnError（编排协议层面的终止性失败）。校验/生成错误一律不就地恢复，整个回合
//! 中止并以单一错误呈现给调用方；命令执行失败不是错误（进入 ExecutionOutcome 的
//! stderr），文件读取失败降级为空内容。

use thiserror::Error;

use crate::schema::{Kind, PrimitiveKind};

/// 结构校验失败：仅类型/结构层面，不含取值范围、长度、枚举成员检查
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Response must be an object")]
    NotAnObject,

    #[error("Missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Field '{field}' must be of type {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: Kind,
        actual: &'static str,
    },

    #[error("Field '{0}' must be an array")]
    NotAnArray(String),

    #[error("Array item {index} in '{field}' must be of type {expected}, got {actual}")]
    ArrayItemTypeMismatch {
        field: String,
        index: usize,
        expected: PrimitiveKind,
        actual: &'static str,
    },
}

/// 单次结构化生成失败：无重试，直接上抛给编排层
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("Query is required")]
    EmptyQuery,

    #[error("Schema is required")]
    MissingSchema,

    #[error("Oracle unavailable: {0}")]
    OracleUnavailable(String),

    #[error("No response content received from oracle")]
    OracleEmptyResponse,

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// 回合协议的终止性失败：生成失败或文件写回失败（写失败是致命的，读失败不是）
#[derive(Error, Debug)]
pub enum TurnError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("File write failed: {0}")]
    FileWriteFailed(String),

    #[error("Path escape attempt: {0}")]
    PathEscape(String),
}
