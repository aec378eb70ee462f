//! 命令执行协作者
//!
//! run(command, dir) -> ExecutionOutcome。失败的命令不是错误：spawn 失败、超时、
//! 非零退出一律落入 outcome 的 stderr，作为评审能力的普通输入。连续运行型命令
//! 在 spawn 之前短路（见 classifier）。

use std::path::Path;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::process::Command;

use crate::exec::classifier::ExecutionClassifier;

/// 连续命令短路时返回的固定提示语
pub const MANUAL_RUN_ADVISORY: &str =
    "This is a development server command that runs continuously.";

/// 一次命令执行的结果；requires_manual_run 表示命令被短路、需用户另开终端运行
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub requires_manual_run: bool,
}

impl ExecutionOutcome {
    /// 未经执行的伪结果（规划评审、文件评审等步骤复用评审能力时使用）
    pub fn pseudo(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            stdout: stdout.into(),
            stderr: String::new(),
            requires_manual_run: false,
        }
    }
}

/// 执行协作者 trait：并发独立调用安全，无共享可变缓冲
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command: &str, working_dir: &Path) -> ExecutionOutcome;
}

/// Shell 执行器：sh -c / cmd /C，带超时与输出字节上限
pub struct ShellRunner {
    classifier: ExecutionClassifier,
    timeout: Duration,
    max_output_bytes: usize,
}

impl ShellRunner {
    pub fn new(timeout_secs: u64, max_output_bytes: usize) -> Self {
        Self {
            classifier: ExecutionClassifier::new(),
            timeout: Duration::from_secs(timeout_secs),
            max_output_bytes,
        }
    }

    fn cap(&self, bytes: &[u8]) -> String {
        let text = String::from_utf8_lossy(bytes);
        if text.len() <= self.max_output_bytes {
            return text.to_string();
        }
        let mut end = self.max_output_bytes;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, working_dir: &Path) -> ExecutionOutcome {
        if self.classifier.is_continuous(command) {
            tracing::info!(command = %command, "continuous command short-circuited");
            return ExecutionOutcome {
                command: command.to_string(),
                stdout: MANUAL_RUN_ADVISORY.to_string(),
                stderr: String::new(),
                requires_manual_run: true,
            };
        }

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.current_dir(working_dir);

        let start = Instant::now();
        let (stdout, stderr) = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => {
                let mut stderr = self.cap(&output.stderr);
                if !output.status.success() && stderr.is_empty() {
                    stderr = format!("Command exited with {}", output.status);
                }
                (self.cap(&output.stdout), stderr)
            }
            Ok(Err(e)) => (String::new(), format!("Command execution failed: {}", e)),
            Err(_) => (
                String::new(),
                format!("Command timed out after {}s", self.timeout.as_secs()),
            ),
        };

        tracing::info!(
            command = %command,
            ok = stderr.is_empty(),
            duration_ms = start.elapsed().as_millis() as u64,
            "command executed"
        );

        ExecutionOutcome {
            command: command.to_string(),
            stdout,
            stderr,
            requires_manual_run: false,
        }
    }
}
