//! 命令分类：一次性 vs 连续运行
//!
//! 连续运行型命令（dev server 等）永远不会被同步执行——执行协作者必须短路并报告
//! requires_manual_run，这是执行-反馈循环总能终止而不会无限阻塞的前提。

use regex::Regex;

/// 分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandClass {
    /// 预期无限运行（dev server、watch 进程），只能由用户另开终端手动执行
    Continuous,
    /// 可同步执行并等待完成
    OneShot,
}

/// 连续命令分类器：持有编译好的模式
#[derive(Debug)]
pub struct ExecutionClassifier {
    pattern: Regex,
}

impl Default for ExecutionClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionClassifier {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"(?i)(npm run dev|npm start|node .*\.js)").unwrap(),
        }
    }

    pub fn classify(&self, command: &str) -> CommandClass {
        if self.pattern.is_match(command) {
            CommandClass::Continuous
        } else {
            CommandClass::OneShot
        }
    }

    pub fn is_continuous(&self, command: &str) -> bool {
        self.classify(command) == CommandClass::Continuous
    }
}
