//! LLM 层：Oracle 抽象与实现（OpenAI 兼容 / Scripted）

pub mod mock;
pub mod openai;
pub mod traits;

pub use mock::ScriptedOracle;
pub use openai::OpenAiOracle;
pub use traits::{Oracle, SamplingProfile};
