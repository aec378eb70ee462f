//! Mason - Schema 约束的 LLM 开发助手
//!
//! 入口：初始化日志与配置，构建 Oracle / 编排器 / 执行器，然后跑一个简单的
//! 标准输入循环（本层扮演被排除在内核之外的「界面」角色，持有会话账本）：
//! - 任意一行文本开启新回合（规划 -> 代码 -> 评审）
//! - `run` 执行当前挂起的建议命令并进入执行-反馈循环
//! - `review <path>` / `enhance <path>` 走文件检视/变更协议
//! - `quit` 退出

use std::io::{BufRead, Write};
use std::sync::Arc;

use anyhow::Context;

use mason::config::load_config;
use mason::core::{HistoryLedger, NextStep, TaskOrchestrator, TurnOutcome};
use mason::exec::ShellRunner;
use mason::generate::GenerationClient;
use mason::llm::{OpenAiOracle, SamplingProfile};
use mason::sandbox::SandboxFs;

fn print_outcome(outcome: &TurnOutcome) {
    match &outcome.next {
        NextStep::Execute { command } => {
            println!("suggested command: {}", command);
            println!("(type 'run' to execute it)");
        }
        NextStep::Manual { instructions } => {
            println!("manual action required:");
            for line in instructions {
                println!("  - {}", line);
            }
            if instructions.is_empty() {
                println!("  - see the latest review entry for details");
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mason::observability::init();

    let cfg = load_config(None).unwrap_or_else(|e| {
        tracing::warn!("Config load failed ({}), using defaults", e);
        mason::config::AppConfig::default()
    });

    let sandbox_root = cfg
        .app
        .sandbox_root
        .clone()
        .unwrap_or_else(|| {
            std::env::current_dir()
                .unwrap_or_else(|_| std::path::PathBuf::from("."))
                .join("sandbox")
        });
    std::fs::create_dir_all(&sandbox_root)
        .with_context(|| format!("Failed to create sandbox at {}", sandbox_root.display()))?;

    let fs = SandboxFs::new(&sandbox_root, cfg.sandbox.ignored_dirs.clone());
    let oracle = Arc::new(OpenAiOracle::new(cfg.llm.base_url.as_deref(), None));
    let client = GenerationClient::new(
        oracle,
        SamplingProfile::from_config(&cfg.llm),
        cfg.llm.request_timeout_secs,
    );
    let orchestrator = TaskOrchestrator::new(client, cfg.app.history_limit);
    let runner = ShellRunner::new(cfg.terminal.timeout_secs, cfg.terminal.max_output_bytes);

    // 会话账本归调用方（本层）所有，按引用穿过每次编排调用
    let mut ledger = HistoryLedger::new();
    let mut pending: Option<String> = None;
    let current_dir = fs.root().to_path_buf();

    println!("mason ready. sandbox: {}", current_dir.display());
    let stdin = std::io::stdin();
    loop {
        print!("> ");
        std::io::stdout().flush().ok();
        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let result = if line == "quit" {
            break;
        } else if line == "run" {
            match pending.take() {
                Some(command) => {
                    orchestrator
                        .continue_with_execution(&command, &fs, &runner, &mut ledger, &current_dir)
                        .await
                }
                None => {
                    println!("no pending command");
                    continue;
                }
            }
        } else if let Some(path) = line.strip_prefix("review ") {
            orchestrator
                .review_file(path.trim(), &fs, &mut ledger, &current_dir)
                .await
        } else if let Some(path) = line.strip_prefix("enhance ") {
            orchestrator
                .enhance_file(path.trim(), &fs, &mut ledger, &current_dir)
                .await
        } else {
            orchestrator
                .start_turn(line, &fs, &mut ledger, &current_dir)
                .await
        };

        // 失败即整回合中止：原样呈现单一错误信息，无部分结果
        match result {
            Ok(outcome) => {
                pending = outcome.suggested_command().map(String::from);
                print_outcome(&outcome);
            }
            Err(e) => println!("turn failed: {}", e),
        }
    }

    Ok(())
}
