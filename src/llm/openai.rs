//! OpenAI 兼容 Oracle
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；请求 JSON 对象
//! 响应格式并带固定低随机性温度。整条 prompt 作为单条 system 消息发送。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    CreateChatCompletionRequestArgs, ResponseFormat,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::core::GenerationError;
use crate::llm::{Oracle, SamplingProfile};

/// OpenAI 兼容 Oracle：持有 Client，模型与温度由 SamplingProfile 决定
pub struct OpenAiOracle {
    client: Client<OpenAIConfig>,
}

impl OpenAiOracle {
    pub fn new(base_url: Option<&str>, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
        }
    }
}

#[async_trait]
impl Oracle for OpenAiOracle {
    async fn complete(
        &self,
        prompt: &str,
        sampling: &SamplingProfile,
    ) -> Result<String, GenerationError> {
        let message = ChatCompletionRequestMessage::System(
            ChatCompletionRequestSystemMessageArgs::default()
                .content(prompt.to_string())
                .build()
                .map_err(|e| GenerationError::OracleUnavailable(e.to_string()))?,
        );

        let request = CreateChatCompletionRequestArgs::default()
            .model(&sampling.model)
            .temperature(sampling.temperature)
            .response_format(ResponseFormat::JsonObject)
            .messages(vec![message])
            .build()
            .map_err(|e| GenerationError::OracleUnavailable(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e| GenerationError::OracleUnavailable(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(GenerationError::OracleEmptyResponse);
        }

        Ok(content)
    }
}
