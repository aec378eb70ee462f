//! 回合编排器：多阶段回合协议
//!
//! 每个能力是 (query, context) 的纯函数，经 GenerationClient 独立校验；状态
//! （账本、沙箱树、当前目录）全部显式输入/输出，本层不持有会话状态。回合内
//! 严格串行：每次 Oracle/协作者调用等待完成后才开始下一次。协议中任何一步的
//! 生成失败都会中止整个回合，调用方只会看到一个错误，没有部分结果。

use std::path::Path;

use serde_json::{json, Map, Value};

use crate::core::capability::CapabilitySchemas;
use crate::core::history::{EntryKind, HistoryEntry, HistoryLedger};
use crate::core::state::{derive_next_step, NextStep, TurnState};
use crate::core::{GenerationError, TurnError};
use crate::exec::{CommandRunner, ExecutionOutcome};
use crate::generate::GenerationClient;
use crate::sandbox::{SandboxFs, SandboxTree};
use crate::schema::GenerationResult;

/// 一次回合协议的产出：下一步建议、终态、新鲜的沙箱树
///
/// 账本由调用方持有并以可变引用穿过协议，这里不重复返回。
#[derive(Debug)]
pub struct TurnOutcome {
    pub next: NextStep,
    pub state: TurnState,
    pub tree: SandboxTree,
    /// 文件树感知结果，仅供展示（不入账本，不影响控制流）
    pub awareness: Option<GenerationResult>,
}

impl TurnOutcome {
    fn from_next(next: NextStep, tree: SandboxTree, awareness: Option<GenerationResult>) -> Self {
        Self {
            state: next.state(),
            next,
            tree,
            awareness,
        }
    }

    pub fn suggested_command(&self) -> Option<&str> {
        self.next.command()
    }
}

/// 回合编排器：六个能力原语 + 三类回合协议
pub struct TaskOrchestrator {
    client: GenerationClient,
    schemas: CapabilitySchemas,
    history_limit: usize,
}

impl TaskOrchestrator {
    pub fn new(client: GenerationClient, history_limit: usize) -> Self {
        Self {
            client,
            schemas: CapabilitySchemas::new(),
            history_limit,
        }
    }

    /// 上下文底座：截断后的账本 + 沙箱树 + 当前目录
    fn base_context(
        &self,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Map<String, Value> {
        let mut ctx = Map::new();
        ctx.insert("history".to_string(), json!(ledger.recent(self.history_limit)));
        ctx.insert("sandbox_structure".to_string(), json!(tree));
        ctx.insert(
            "current_dir".to_string(),
            json!(current_dir.display().to_string()),
        );
        ctx
    }

    // ---- 能力原语 ----

    /// 规划：从请求 + 沙箱现状生成 thoughts / steps / file_tree / 首条命令
    pub async fn plan(
        &self,
        query: &str,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = format!(
            "Plan and structure an app based on this request: {}. Current directory: {}. \
             Our project folder structure: {}. Build this project inside the sandbox folder \
             and provide non-interactive terminal commands (avoid nano/vim).",
            query,
            current_dir.display(),
            json!(tree)
        );
        let ctx = self.base_context(ledger, tree, current_dir);
        self.client.generate(&prompt, &self.schemas.plan, &ctx).await
    }

    /// 文件树感知：当前位置摘要，仅供展示
    pub async fn tree_awareness(
        &self,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = format!(
            "Provide awareness of the current directory in the file tree and the file tree \
             structure. Current directory: {}. Current file tree structure: {}.",
            current_dir.display(),
            json!(tree)
        );
        let ctx = self.base_context(ledger, tree, current_dir);
        self.client
            .generate(&prompt, &self.schemas.awareness, &ctx)
            .await
    }

    /// 代码片段：为一条终端命令生成完整代码
    pub async fn code_snippet(
        &self,
        command: &str,
        plan: &GenerationResult,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = format!("Generate a code snippet for the terminal command: {}.", command);
        let mut ctx = self.base_context(ledger, tree, current_dir);
        ctx.insert("plan".to_string(), plan.to_value());
        self.client
            .generate(&prompt, &self.schemas.codegen, &ctx)
            .await
    }

    /// 评审：审视上一步结果并给出受审后的下一条命令
    pub async fn review_step(
        &self,
        instruction: &str,
        outcome: &ExecutionOutcome,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = format!(
            "{} Suggest the next non-interactive step (avoid nano/vim) or flag for manual \
             action. Current directory you are in: {}. Step requires manual run: {}.",
            instruction,
            current_dir.display(),
            outcome.requires_manual_run
        );
        let mut ctx = self.base_context(ledger, tree, current_dir);
        ctx.insert("command".to_string(), json!(outcome.command));
        ctx.insert("output".to_string(), json!(outcome.stdout));
        ctx.insert("error".to_string(), json!(outcome.stderr));
        ctx.insert(
            "requires_manual_run".to_string(),
            json!(outcome.requires_manual_run),
        );
        self.client
            .generate(&prompt, &self.schemas.review, &ctx)
            .await
    }

    /// 文件评审
    pub async fn file_review_step(
        &self,
        path: &str,
        content: &str,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = format!(
            "Review the content of this file: {}. Current content: {}. Current directory: {}.",
            path,
            content,
            current_dir.display()
        );
        let mut ctx = self.base_context(ledger, tree, current_dir);
        ctx.insert("file_path".to_string(), json!(path));
        ctx.insert("file_content".to_string(), json!(content));
        self.client
            .generate(&prompt, &self.schemas.file_review, &ctx)
            .await
    }

    /// 文件增强：返回增强点与更新后的完整代码
    pub async fn file_enhance_step(
        &self,
        path: &str,
        content: &str,
        ledger: &HistoryLedger,
        tree: &SandboxTree,
        current_dir: &Path,
    ) -> Result<GenerationResult, GenerationError> {
        let prompt = format!(
            "Enhance the content of this file: {}. Current content: {}. Current directory: {}. \
             Provide the updated code and next steps.",
            path,
            content,
            current_dir.display()
        );
        let mut ctx = self.base_context(ledger, tree, current_dir);
        ctx.insert("file_path".to_string(), json!(path));
        ctx.insert("file_content".to_string(), json!(content));
        self.client
            .generate(&prompt, &self.schemas.file_enhance, &ctx)
            .await
    }

    // ---- 回合协议 ----

    /// 开始回合：规划 -> 树感知 -> 首条命令的代码片段 -> 规划自评审
    ///
    /// Plan / Code / Review 依调用顺序入账；awareness 仅供展示。规划评审把
    /// "Planning phase" 当作无 stdout/stderr 的伪命令，计划本身经账本上下文可见。
    pub async fn start_turn(
        &self,
        query: &str,
        fs: &SandboxFs,
        ledger: &mut HistoryLedger,
        current_dir: &Path,
    ) -> Result<TurnOutcome, TurnError> {
        let tree = fs.list_tree();
        tracing::info!(state = ?TurnState::Planning, query = %query, "turn started");

        let plan = self.plan(query, ledger, &tree, current_dir).await?;
        ledger.push(HistoryEntry::generated(EntryKind::Plan, plan.clone()));

        let awareness = self.tree_awareness(ledger, &tree, current_dir).await?;

        let first_command = plan.str_field("next_terminal_command").unwrap_or_default();
        let snippet = self
            .code_snippet(first_command, &plan, ledger, &tree, current_dir)
            .await?;
        ledger.push(HistoryEntry::generated(EntryKind::Code, snippet));

        tracing::info!(state = ?TurnState::Reviewing, "reviewing the plan");
        let pseudo = ExecutionOutcome::pseudo("Planning phase", "");
        let review = self
            .review_step(
                "Review the initial app planning. Nothing has been executed yet. If you \
                 approve, pass on the suggested terminal command; if not, modify or improve it.",
                &pseudo,
                ledger,
                &tree,
                current_dir,
            )
            .await?;
        ledger.push(HistoryEntry::generated(EntryKind::Review, review.clone()));

        let next = derive_next_step(&review, &pseudo);
        tracing::info!(state = ?next.state(), command = ?next.command(), "turn finished");
        Ok(TurnOutcome::from_next(next, tree, Some(awareness)))
    }

    /// 执行-反馈循环：执行 -> 截断账本 -> 评审 -> 入账 -> 推导下一步
    pub async fn continue_with_execution(
        &self,
        command: &str,
        fs: &SandboxFs,
        runner: &dyn CommandRunner,
        ledger: &mut HistoryLedger,
        current_dir: &Path,
    ) -> Result<TurnOutcome, TurnError> {
        tracing::info!(state = ?TurnState::Executing, command = %command, "executing command");
        let outcome = runner.run(command, current_dir).await;
        let tree = fs.list_tree();

        ledger.truncate_to_recent(self.history_limit);

        tracing::info!(state = ?TurnState::Reviewing, "reviewing command outcome");
        let review = self
            .review_step(
                "Review this command output and suggest the next step.",
                &outcome,
                ledger,
                &tree,
                current_dir,
            )
            .await?;

        ledger.push(HistoryEntry::executed(outcome.clone()));
        ledger.push(HistoryEntry::generated(EntryKind::Review, review.clone()));

        let next = derive_next_step(&review, &outcome);
        tracing::info!(state = ?next.state(), command = ?next.command(), "cycle finished");
        Ok(TurnOutcome::from_next(next, tree, None))
    }

    /// 文件检视协议：读文件（失败降级为空）-> 文件评审 -> 评审伪结果
    pub async fn review_file(
        &self,
        path: &str,
        fs: &SandboxFs,
        ledger: &mut HistoryLedger,
        current_dir: &Path,
    ) -> Result<TurnOutcome, TurnError> {
        let content = fs.read_file_or_empty(path);
        let tree = fs.list_tree();

        let file_review = self
            .file_review_step(path, &content, ledger, &tree, current_dir)
            .await?;
        ledger.push(HistoryEntry::generated(
            EntryKind::FileReview,
            file_review.clone(),
        ));

        let pseudo = ExecutionOutcome::pseudo(
            format!("Reviewed {}", path),
            serde_json::to_string(&file_review).unwrap_or_default(),
        );
        let review = self
            .review_step(
                "Review the file review and suggest the next step.",
                &pseudo,
                ledger,
                &tree,
                current_dir,
            )
            .await?;
        ledger.push(HistoryEntry::generated(EntryKind::Review, review.clone()));

        let next = derive_next_step(&review, &pseudo);
        Ok(TurnOutcome::from_next(next, tree, None))
    }

    /// 文件变更协议：读 -> 增强 -> 写回（失败致命）-> 评审伪结果
    pub async fn enhance_file(
        &self,
        path: &str,
        fs: &SandboxFs,
        ledger: &mut HistoryLedger,
        current_dir: &Path,
    ) -> Result<TurnOutcome, TurnError> {
        let content = fs.read_file_or_empty(path);
        let stale_tree = fs.list_tree();

        let enhancement = self
            .file_enhance_step(path, &content, ledger, &stale_tree, current_dir)
            .await?;

        // code 为 schema 必填字段，经校验保证存在
        let code = enhancement.str_field("code").unwrap_or_default();
        fs.write_file(path, code)?;
        tracing::info!(path = %path, bytes = code.len(), "enhanced file persisted");

        // 写回之后重新枚举，树必须反映地面真值
        let tree = fs.list_tree();
        ledger.push(HistoryEntry::generated(
            EntryKind::FileEnhance,
            enhancement.clone(),
        ));

        let pseudo = ExecutionOutcome::pseudo(
            format!("Enhanced {}", path),
            serde_json::to_string(&enhancement).unwrap_or_default(),
        );
        let review = self
            .review_step(
                "Review the file enhancement and suggest the next step.",
                &pseudo,
                ledger,
                &tree,
                current_dir,
            )
            .await?;
        ledger.push(HistoryEntry::generated(EntryKind::Review, review.clone()));

        let next = derive_next_step(&review, &pseudo);
        Ok(TurnOutcome::from_next(next, tree, None))
    }
}
