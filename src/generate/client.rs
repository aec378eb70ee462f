//! GenerationClient：一次 Oracle 往返的编排
//!
//! 组装 prompt -> 调用 Oracle（带截止时间）-> 解码 -> 校验 -> 返回或失败。
//! 无重试：单次 Oracle 失败、解码失败或校验失败对本次调用即是终止性的，
//! 立即上抛给编排层；是否重新发起由更高层的调用方决定。

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};

use crate::core::GenerationError;
use crate::generate::prompt::compose;
use crate::llm::{Oracle, SamplingProfile};
use crate::schema::{validate, GenerationResult, SchemaModel};

/// 结构化生成客户端：持有 Oracle 句柄、固定采样配置与单次请求截止时间
pub struct GenerationClient {
    oracle: Arc<dyn Oracle>,
    sampling: SamplingProfile,
    request_timeout: Duration,
}

impl GenerationClient {
    pub fn new(oracle: Arc<dyn Oracle>, sampling: SamplingProfile, request_timeout_secs: u64) -> Self {
        Self {
            oracle,
            sampling,
            request_timeout: Duration::from_secs(request_timeout_secs),
        }
    }

    /// 生成一个符合 schema 的结构化响应
    pub async fn generate(
        &self,
        query: &str,
        schema: &SchemaModel,
        context: &Map<String, Value>,
    ) -> Result<GenerationResult, GenerationError> {
        if query.trim().is_empty() {
            return Err(GenerationError::EmptyQuery);
        }
        if schema.is_empty() {
            return Err(GenerationError::MissingSchema);
        }

        let prompt = compose(query, schema, context);

        let raw = tokio::time::timeout(
            self.request_timeout,
            self.oracle.complete(&prompt, &self.sampling),
        )
        .await
        .map_err(|_| {
            GenerationError::OracleUnavailable(format!(
                "request timed out after {}s",
                self.request_timeout.as_secs()
            ))
        })??;

        if raw.trim().is_empty() {
            return Err(GenerationError::OracleEmptyResponse);
        }

        let value: Value = serde_json::from_str(raw.trim())
            .map_err(|e| GenerationError::DecodeError(e.to_string()))?;

        let result = validate(&value, schema)?;
        tracing::debug!(fields = result.fields().len(), "structured response accepted");
        Ok(result)
    }
}
