//! Mason - Schema 约束的 LLM 开发助手内核
//!
//! 围绕一个不可靠的自由文本协作者（Oracle）构建可靠契约：声明式响应 Schema、
//! 严格的结构校验（畸形输出一律拒绝）、以及把规划/代码生成/执行/评审串成
//! 多阶段回合的编排循环。状态（历史账本、沙箱树、当前目录）显式穿过每次调用，
//! 内核不持有跨回合会话状态。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量 MASON__*）
//! - **core**: 错误分类、历史账本、回合状态机、能力定义、回合编排
//! - **exec**: 命令分类（连续 vs 一次性）与 Shell 执行协作者
//! - **generate**: Prompt 组装与单次 Oracle 往返（解码 + 校验，无重试）
//! - **llm**: Oracle 抽象与实现（OpenAI 兼容 / Scripted）
//! - **observability**: 结构化日志初始化
//! - **sandbox**: 沙箱文件系统（目录树枚举、读降级、写回）
//! - **schema**: 响应形状声明与结构校验器

pub mod config;
pub mod core;
pub mod exec;
pub mod generate;
pub mod llm;
pub mod observability;
pub mod sandbox;
pub mod schema;
