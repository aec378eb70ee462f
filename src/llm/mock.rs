//! 脚本化 Oracle（用于测试，无需 API）
//!
//! 按入队顺序依次返回预置回复，便于本地跑通多步回合协议；脚本耗尽时
//! 返回 OracleEmptyResponse。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::GenerationError;
use crate::llm::{Oracle, SamplingProfile};

/// 脚本化 Oracle：FIFO 预置回复队列
#[derive(Debug, Default)]
pub struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
    /// 记录收到的 prompt，供断言 prompt 组装内容
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(replies: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn push(&self, reply: impl Into<String>) {
        self.replies.lock().unwrap().push_back(reply.into());
    }

    pub fn seen_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl Oracle for ScriptedOracle {
    async fn complete(
        &self,
        prompt: &str,
        _sampling: &SamplingProfile,
    ) -> Result<String, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or(GenerationError::OracleEmptyResponse)
    }
}
