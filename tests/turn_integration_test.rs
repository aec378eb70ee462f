//! 回合协议集成测试：脚本化 Oracle + 假执行器跑通三类协议

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::{Arc, Mutex};

    use serde_json::{json, Value};

    use mason::core::{EntryKind, HistoryEntry, HistoryLedger, TaskOrchestrator, TurnError};
    use mason::exec::{CommandRunner, ExecutionOutcome, ShellRunner, MANUAL_RUN_ADVISORY};
    use mason::generate::GenerationClient;
    use mason::llm::{Oracle, SamplingProfile, ScriptedOracle};
    use mason::sandbox::SandboxFs;

    /// 记录收到的命令并报告成功的假执行器
    struct FakeRunner {
        commands: Mutex<Vec<String>>,
    }

    impl FakeRunner {
        fn new() -> Self {
            Self {
                commands: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl CommandRunner for FakeRunner {
        async fn run(&self, command: &str, _working_dir: &Path) -> ExecutionOutcome {
            self.commands.lock().unwrap().push(command.to_string());
            ExecutionOutcome {
                command: command.to_string(),
                stdout: String::new(),
                stderr: String::new(),
                requires_manual_run: false,
            }
        }
    }

    fn orchestrator_with(oracle: Arc<ScriptedOracle>) -> TaskOrchestrator {
        let client = GenerationClient::new(
            oracle as Arc<dyn Oracle>,
            SamplingProfile {
                model: "test-model".to_string(),
                temperature: 0.3,
            },
            5,
        );
        TaskOrchestrator::new(client, 10)
    }

    fn sandbox() -> (tempfile::TempDir, SandboxFs) {
        let dir = tempfile::tempdir().unwrap();
        let fs = SandboxFs::new(dir.path(), vec!["node_modules".to_string()]);
        (dir, fs)
    }

    fn plan_reply(command: &str) -> String {
        json!({
            "thoughts": ["a single script is enough"],
            "steps": ["create hello.js", "run it"],
            "file_tree": {"hello.js": {}},
            "read_me": "Hello world script",
            "next_terminal_command": command
        })
        .to_string()
    }

    fn awareness_reply() -> String {
        json!({
            "current_dir": "sandbox",
            "file_tree": {}
        })
        .to_string()
    }

    fn codegen_reply() -> String {
        json!({
            "code": "console.log(1)",
            "next_steps": ["execute the script"]
        })
        .to_string()
    }

    fn review_reply(next_command: &str) -> String {
        json!({
            "thoughts": ["step looks good"],
            "success": true,
            "goal_of_command": "create the hello world script",
            "next_terminal_command": next_command,
            "requires_manual_edit": false,
            "requires_manual_run": false
        })
        .to_string()
    }

    /// 从组装好的 prompt 中取出 Context JSON（用于断言账本截断）
    fn context_of(prompt: &str) -> Value {
        let start = prompt.find("Context: ").unwrap() + "Context: ".len();
        let end = prompt[start..].find("\n\nRequired Response Schema").unwrap();
        serde_json::from_str(&prompt[start..start + end]).unwrap()
    }

    fn filler_entry(i: usize) -> HistoryEntry {
        HistoryEntry::executed(ExecutionOutcome {
            command: format!("cmd-{}", i),
            stdout: String::new(),
            stderr: String::new(),
            requires_manual_run: false,
        })
    }

    #[tokio::test]
    async fn hello_world_turn_end_to_end() {
        let first_command = "echo 'console.log(1)' > hello.js";
        let oracle = Arc::new(ScriptedOracle::new(vec![
            plan_reply(first_command),
            awareness_reply(),
            codegen_reply(),
            review_reply(first_command),
        ]));
        let orchestrator = orchestrator_with(oracle.clone());
        let (_dir, fs) = sandbox();
        let mut ledger = HistoryLedger::new();

        let outcome = orchestrator
            .start_turn("create a hello-world script", &fs, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(outcome.suggested_command(), Some(first_command));
        assert!(outcome.awareness.is_some());
        let kinds: Vec<EntryKind> = ledger.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![EntryKind::Plan, EntryKind::Code, EntryKind::Review]
        );

        // 执行-反馈循环：执行成功、stderr 为空，最终建议 = 评审命令原样
        oracle.push(review_reply("cat hello.js"));
        let runner = FakeRunner::new();
        let outcome = orchestrator
            .continue_with_execution(first_command, &fs, &runner, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(outcome.suggested_command(), Some("cat hello.js"));
        assert_eq!(
            runner.commands.lock().unwrap().as_slice(),
            &[first_command.to_string()]
        );
        let kinds: Vec<EntryKind> = ledger.entries().iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                EntryKind::Plan,
                EntryKind::Code,
                EntryKind::Review,
                EntryKind::Execution,
                EntryKind::Review
            ]
        );
    }

    #[tokio::test]
    async fn execution_cycle_truncates_history_to_the_last_ten() {
        let oracle = Arc::new(ScriptedOracle::new(vec![review_reply("ls")]));
        let orchestrator = orchestrator_with(oracle.clone());
        let (_dir, fs) = sandbox();

        let mut ledger = HistoryLedger::new();
        for i in 0..15 {
            ledger.push(filler_entry(i));
        }

        let runner = FakeRunner::new();
        orchestrator
            .continue_with_execution("echo hi", &fs, &runner, &mut ledger, fs.root())
            .await
            .unwrap();

        // 评审调用的上下文恰好收到最近 10 条（cmd-5 .. cmd-14）
        let prompts = oracle.seen_prompts();
        let history = context_of(&prompts[0])["history"].as_array().unwrap().clone();
        assert_eq!(history.len(), 10);
        assert_eq!(history[0]["data"]["command"], "cmd-5");
        assert_eq!(history[9]["data"]["command"], "cmd-14");

        // 账本本身 = 截断后的 10 条 + 执行 + 评审
        assert_eq!(ledger.len(), 12);
    }

    #[tokio::test]
    async fn manual_edit_review_withholds_the_suggested_command() {
        let review = json!({
            "thoughts": ["automation will not help here"],
            "success": false,
            "goal_of_command": "fix the config by hand",
            "next_terminal_command": "cat config.json",
            "requires_manual_edit": true,
            "manual_edit_instructions": "Open config.json and set the port"
        })
        .to_string();
        let oracle = Arc::new(ScriptedOracle::new(vec![review]));
        let orchestrator = orchestrator_with(oracle);
        let (_dir, fs) = sandbox();
        let mut ledger = HistoryLedger::new();

        let runner = FakeRunner::new();
        let outcome = orchestrator
            .continue_with_execution("echo hi", &fs, &runner, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(outcome.suggested_command(), None);
    }

    #[tokio::test]
    async fn editor_proposal_is_rewritten_not_executed() {
        let oracle = Arc::new(ScriptedOracle::new(vec![review_reply("nano app.js")]));
        let orchestrator = orchestrator_with(oracle);
        let (_dir, fs) = sandbox();
        let mut ledger = HistoryLedger::new();

        let runner = FakeRunner::new();
        let outcome = orchestrator
            .continue_with_execution("mkdir app", &fs, &runner, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(
            outcome.suggested_command(),
            Some("echo \"Initial content\" > app.js")
        );
        // 改写发生在推导阶段，nano 从未被交给执行器
        assert_eq!(runner.commands.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn continuous_command_short_circuits_and_forces_manual_run() {
        let oracle = Arc::new(ScriptedOracle::new(vec![review_reply("npm install")]));
        let orchestrator = orchestrator_with(oracle);
        let (_dir, fs) = sandbox();
        let mut ledger = HistoryLedger::new();

        // 真实 ShellRunner：连续命令在 spawn 之前短路
        let runner = ShellRunner::new(5, 1024 * 1024);
        let outcome = orchestrator
            .continue_with_execution("npm run dev", &fs, &runner, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(outcome.suggested_command(), None);
        match &ledger.entries()[0].data {
            mason::core::EntryPayload::Executed(o) => {
                assert!(o.requires_manual_run);
                assert_eq!(o.stdout, MANUAL_RUN_ADVISORY);
            }
            _ => panic!("expected an execution entry"),
        }
    }

    #[tokio::test]
    async fn enhance_file_persists_the_returned_code() {
        let enhancement = json!({
            "file_path": "hello.js",
            "enhancements": ["add a greeting"],
            "code": "console.log('hello, world')",
            "next_steps": ["run the script"]
        })
        .to_string();
        let oracle = Arc::new(ScriptedOracle::new(vec![
            enhancement,
            review_reply("node --check hello.js"),
        ]));
        let orchestrator = orchestrator_with(oracle);
        let (_dir, fs) = sandbox();
        fs.write_file("hello.js", "console.log(1)").unwrap();
        let mut ledger = HistoryLedger::new();

        let outcome = orchestrator
            .enhance_file("hello.js", &fs, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(
            fs.read_file_or_empty("hello.js"),
            "console.log('hello, world')"
        );
        assert!(outcome.tree.contains("hello.js"));
        let kinds: Vec<EntryKind> = ledger.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntryKind::FileEnhance, EntryKind::Review]);
    }

    #[tokio::test]
    async fn review_of_a_missing_file_proceeds_with_empty_content() {
        let file_review = json!({
            "file_path": "ghost.js",
            "file_content": "",
            "review": "file does not exist yet",
            "next_steps": ["create it first"]
        })
        .to_string();
        let oracle = Arc::new(ScriptedOracle::new(vec![
            file_review,
            review_reply("touch ghost.js"),
        ]));
        let orchestrator = orchestrator_with(oracle);
        let (_dir, fs) = sandbox();
        let mut ledger = HistoryLedger::new();

        let outcome = orchestrator
            .review_file("ghost.js", &fs, &mut ledger, fs.root())
            .await
            .unwrap();

        assert_eq!(outcome.suggested_command(), Some("touch ghost.js"));
        let kinds: Vec<EntryKind> = ledger.entries().iter().map(|e| e.kind).collect();
        assert_eq!(kinds, vec![EntryKind::FileReview, EntryKind::Review]);
    }

    #[tokio::test]
    async fn malformed_plan_aborts_the_whole_turn_with_no_partial_results() {
        // 计划缺少必填的 next_terminal_command
        let bad_plan = json!({
            "thoughts": [],
            "steps": [],
            "file_tree": {}
        })
        .to_string();
        let oracle = Arc::new(ScriptedOracle::new(vec![bad_plan]));
        let orchestrator = orchestrator_with(oracle);
        let (_dir, fs) = sandbox();
        let mut ledger = HistoryLedger::new();

        let err = orchestrator
            .start_turn("build an app", &fs, &mut ledger, fs.root())
            .await
            .unwrap_err();

        assert!(matches!(err, TurnError::Generation(_)));
        assert!(ledger.is_empty());
    }
}
