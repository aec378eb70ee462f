//! 执行层：命令分类与 Shell 执行协作者

pub mod classifier;
pub mod runner;

pub use classifier::{CommandClass, ExecutionClassifier};
pub use runner::{CommandRunner, ExecutionOutcome, ShellRunner, MANUAL_RUN_ADVISORY};
