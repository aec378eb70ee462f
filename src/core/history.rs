//! 历史账本：回合记录的有序追加序列
//!
//! 账本归调用方所有，按引用穿过每次编排调用；本层不持久化。作为 Oracle 上下文
//! 使用前截断到最近 N 条以控制 prompt 体积，最旧的先被丢弃。

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::exec::ExecutionOutcome;
use crate::schema::GenerationResult;

/// 记录类别：对应六种产生账本条目的步骤（awareness 仅用于展示，不入账）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Plan,
    Code,
    Execution,
    Review,
    FileReview,
    FileEnhance,
}

/// 条目载荷：生成结果或执行结果
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EntryPayload {
    Generated(GenerationResult),
    Executed(ExecutionOutcome),
}

/// 单条回合记录
#[derive(Debug, Clone, Serialize)]
pub struct HistoryEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub data: EntryPayload,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn generated(kind: EntryKind, result: GenerationResult) -> Self {
        Self {
            kind,
            data: EntryPayload::Generated(result),
            timestamp: Utc::now(),
        }
    }

    pub fn executed(outcome: ExecutionOutcome) -> Self {
        Self {
            kind: EntryKind::Execution,
            data: EntryPayload::Executed(outcome),
            timestamp: Utc::now(),
        }
    }
}

/// 历史账本：回合内只追加
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct HistoryLedger {
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: HistoryEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 最近 n 条的视图（不修改账本）
    pub fn recent(&self, n: usize) -> &[HistoryEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }

    /// 截断到最近 n 条，最旧的先被丢弃
    pub fn truncate_to_recent(&mut self, n: usize) {
        if self.entries.len() > n {
            self.entries.drain(..self.entries.len() - n);
        }
    }
}
