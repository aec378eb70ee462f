//! 生成层：Prompt 组装与单次 Oracle 往返编排

pub mod client;
pub mod prompt;

pub use client::GenerationClient;
pub use prompt::compose;
