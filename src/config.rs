//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `MASON__*` 覆盖（双下划线表示嵌套，
//! 如 `MASON__LLM__MODEL=gpt-4o`）。

use std::path::PathBuf;

use serde::Deserialize;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub terminal: TerminalSection,
    #[serde(default)]
    pub sandbox: SandboxSection,
}

/// [app] 段：应用名、沙箱根目录、历史账本上限
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
    /// 沙箱根目录，未设置时用 ./sandbox
    pub sandbox_root: Option<PathBuf>,
    /// 作为 Oracle 上下文时保留的账本条数（最旧先丢弃）
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

fn default_history_limit() -> usize {
    10
}

/// [llm] 段：模型身份、端点与采样/超时
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    /// 固定模型身份
    pub model: String,
    pub base_url: Option<String>,
    /// 低随机性采样（偏确定而非创造）
    pub temperature: f32,
    /// 单次 Oracle 往返的截止时间（秒）
    pub request_timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            base_url: None,
            temperature: 0.3,
            request_timeout_secs: 60,
        }
    }
}

/// [terminal] 段：单次命令执行超时与输出上限
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TerminalSection {
    pub timeout_secs: u64,
    /// 捕获的 stdout/stderr 各自的字节上限
    pub max_output_bytes: usize,
}

impl Default for TerminalSection {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_output_bytes: 1024 * 1024,
        }
    }
}

/// [sandbox] 段：目录树枚举时跳过的目录名
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SandboxSection {
    pub ignored_dirs: Vec<String>,
}

impl Default for SandboxSection {
    fn default() -> Self {
        Self {
            ignored_dirs: vec![
                "node_modules".to_string(),
                ".git".to_string(),
                "target".to_string(),
            ],
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app: AppSection::default(),
            llm: LlmSection::default(),
            terminal: TerminalSection::default(),
            sandbox: SandboxSection::default(),
        }
    }
}

/// 从 config 目录加载配置，环境变量 MASON__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 MASON__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("MASON")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    c.try_deserialize()
}
