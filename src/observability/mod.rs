//! 可观测性：结构化日志初始化
//!
//! 每次 Oracle 往返与命令执行都会输出审计行；RUST_LOG 可调级别。

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .init();
}
