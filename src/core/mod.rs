//! 核心编排层：错误分类、历史账本、回合状态机、能力定义、回合协议

pub mod capability;
pub mod error;
pub mod history;
pub mod orchestrator;
pub mod state;

pub use capability::CapabilitySchemas;
pub use error::{GenerationError, TurnError, ValidationError};
pub use history::{EntryKind, EntryPayload, HistoryEntry, HistoryLedger};
pub use orchestrator::{TaskOrchestrator, TurnOutcome};
pub use state::{derive_next_step, NextStep, TurnState};
