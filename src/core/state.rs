//! 回合状态机与下一步推导
//!
//! 把回合/反馈循环的状态做成显式的有限状态类型（Planning -> Reviewing ->
//! {Executing | AwaitingManualAction}），而不是从结果里散落的布尔标志推断；
//! manual_edit 与 manual_run 同时置位这类分歧组合会确定性地收敛到人工介入。

use serde::Serialize;

use crate::exec::ExecutionOutcome;
use crate::schema::GenerationResult;

/// 回合所处阶段（回合结束时报告终态）
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum TurnState {
    /// 正在生成计划
    Planning,
    /// 正在评审上一步结果
    Reviewing,
    /// 评审产出了可直接执行的命令
    Executing,
    /// 建议命令被显式扣下，等待用户手动操作
    AwaitingManualAction,
}

/// 回合结束时对下一步的建议
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum NextStep {
    /// 可直接交给执行协作者的命令
    Execute { command: String },
    /// 需要人工介入；建议命令被显式扣下（不是空串，是不存在）
    Manual { instructions: Vec<String> },
}

impl NextStep {
    /// 建议命令；人工介入时为 None
    pub fn command(&self) -> Option<&str> {
        match self {
            NextStep::Execute { command } => Some(command),
            NextStep::Manual { .. } => None,
        }
    }

    pub fn state(&self) -> TurnState {
        match self {
            NextStep::Execute { .. } => TurnState::Executing,
            NextStep::Manual { .. } => TurnState::AwaitingManualAction,
        }
    }
}

/// 从评审结果与执行结果推导下一步，所有回合协议共用同一优先级：
///
/// 1. 评审标记 requires_manual_edit 或执行结果标记 requires_manual_run ->
///    扣下建议命令，携带评审给出的人工操作说明；
/// 2. 建议命令会启动交互式编辑器 -> 改写为创建占位文件的非交互命令；
/// 3. 否则原样传递评审的命令。
pub fn derive_next_step(review: &GenerationResult, outcome: &ExecutionOutcome) -> NextStep {
    if review.flag("requires_manual_edit") || outcome.requires_manual_run {
        let mut instructions = Vec::new();
        for field in ["manual_edit_instructions", "manual_run_instructions"] {
            if let Some(text) = review.str_field(field) {
                if !text.trim().is_empty() {
                    instructions.push(text.to_string());
                }
            }
        }
        return NextStep::Manual { instructions };
    }

    let command = review
        .str_field("next_terminal_command")
        .unwrap_or_default()
        .to_string();

    match rewrite_editor_command(&command) {
        Some(rewritten) => NextStep::Execute { command: rewritten },
        None => NextStep::Execute { command },
    }
}

/// 交互式编辑器命令改写：nano/vim/vi <file> -> 创建占位文件的非交互等价命令
fn rewrite_editor_command(command: &str) -> Option<String> {
    let mut parts = command.split_whitespace();
    let editor = parts.next()?;
    if !matches!(editor, "nano" | "vim" | "vi") {
        return None;
    }
    let file = parts.next().unwrap_or("file");
    Some(format!("echo \"Initial content\" > {}", file))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::schema::{validate, Kind, SchemaModel};

    fn review_of(value: serde_json::Value) -> GenerationResult {
        // 测试用开放 schema，直接包装任意评审形状
        let schema = SchemaModel::builder()
            .required("next_terminal_command", Kind::String, "next command")
            .build();
        validate(&value, &schema).unwrap()
    }

    fn clean_outcome() -> ExecutionOutcome {
        ExecutionOutcome::pseudo("ls", "ok")
    }

    #[test]
    fn review_command_passes_through_verbatim() {
        let review = review_of(json!({"next_terminal_command": "mkdir app"}));
        let next = derive_next_step(&review, &clean_outcome());
        assert_eq!(next.command(), Some("mkdir app"));
        assert_eq!(next.state(), TurnState::Executing);
    }

    #[test]
    fn manual_edit_withholds_the_command_regardless_of_proposal() {
        let review = review_of(json!({
            "next_terminal_command": "rm -rf /",
            "requires_manual_edit": true,
            "manual_edit_instructions": "Open app.js and fix the import"
        }));
        let next = derive_next_step(&review, &clean_outcome());
        assert_eq!(next.command(), None);
        assert_eq!(next.state(), TurnState::AwaitingManualAction);
        match next {
            NextStep::Manual { instructions } => {
                assert_eq!(instructions, vec!["Open app.js and fix the import"]);
            }
            _ => panic!("expected manual step"),
        }
    }

    #[test]
    fn manual_run_outcome_also_withholds_the_command() {
        let review = review_of(json!({"next_terminal_command": "npm install"}));
        let outcome = ExecutionOutcome {
            command: "npm run dev".to_string(),
            stdout: String::new(),
            stderr: String::new(),
            requires_manual_run: true,
        };
        let next = derive_next_step(&review, &outcome);
        assert_eq!(next.command(), None);
    }

    #[test]
    fn both_manual_flags_collapse_into_one_manual_step() {
        let review = review_of(json!({
            "next_terminal_command": "npm start",
            "requires_manual_edit": true,
            "manual_edit_instructions": "edit it",
            "manual_run_instructions": "run it in another terminal"
        }));
        let outcome = ExecutionOutcome {
            command: "npm start".to_string(),
            stdout: String::new(),
            stderr: String::new(),
            requires_manual_run: true,
        };
        let next = derive_next_step(&review, &outcome);
        match next {
            NextStep::Manual { instructions } => assert_eq!(instructions.len(), 2),
            _ => panic!("expected manual step"),
        }
    }

    #[test]
    fn editor_command_is_rewritten_to_placeholder_creation() {
        let review = review_of(json!({"next_terminal_command": "nano app.js"}));
        let next = derive_next_step(&review, &clean_outcome());
        assert_eq!(next.command(), Some("echo \"Initial content\" > app.js"));
    }

    #[test]
    fn editor_without_target_gets_a_default_file() {
        let review = review_of(json!({"next_terminal_command": "vim"}));
        let next = derive_next_step(&review, &clean_outcome());
        assert_eq!(next.command(), Some("echo \"Initial content\" > file"));
    }
}
