//! Oracle 抽象
//!
//! 所有后端（OpenAI 兼容 / Scripted）实现 Oracle：complete(prompt, sampling) -> 原始文本。
//! Oracle 被视为偶尔出错但不值得在本层自动重查的外部函数：调用边界不保证任何结构
//! 正确性，解码与校验在 GenerationClient 中强制进行。

use async_trait::async_trait;

use crate::config::LlmSection;
use crate::core::GenerationError;

/// 采样配置：固定模型身份与低随机性温度（偏确定而非创造）
#[derive(Debug, Clone)]
pub struct SamplingProfile {
    pub model: String,
    pub temperature: f32,
}

impl SamplingProfile {
    pub fn from_config(cfg: &LlmSection) -> Self {
        Self {
            model: cfg.model.clone(),
            temperature: cfg.temperature,
        }
    }
}

/// Oracle trait：单次补全，失败为 OracleUnavailable / OracleEmptyResponse
#[async_trait]
pub trait Oracle: Send + Sync {
    async fn complete(
        &self,
        prompt: &str,
        sampling: &SamplingProfile,
    ) -> Result<String, GenerationError>;
}
