//! 助手能力定义：六个 (提示词, SchemaModel) 固定配对
//!
//! 计划、文件树感知、代码片段、步骤评审、文件评审、文件增强。Schema 在编排器
//! 构造时建好，进程生命周期内不变；描述文本会被渲染进 prompt，直接约束 Oracle。

use crate::schema::{Kind, PrimitiveKind, SchemaModel};

/// 全部能力 Schema 的持有者
#[derive(Debug, Clone)]
pub struct CapabilitySchemas {
    pub plan: SchemaModel,
    pub awareness: SchemaModel,
    pub codegen: SchemaModel,
    pub review: SchemaModel,
    pub file_review: SchemaModel,
    pub file_enhance: SchemaModel,
}

impl Default for CapabilitySchemas {
    fn default() -> Self {
        Self::new()
    }
}

impl CapabilitySchemas {
    pub fn new() -> Self {
        Self {
            plan: plan_schema(),
            awareness: awareness_schema(),
            codegen: codegen_schema(),
            review: review_schema(),
            file_review: file_review_schema(),
            file_enhance: file_enhance_schema(),
        }
    }
}

fn plan_schema() -> SchemaModel {
    SchemaModel::builder()
        .required(
            "thoughts",
            Kind::Array(PrimitiveKind::String),
            "Thoughts and considerations for building the app",
        )
        .required(
            "steps",
            Kind::Array(PrimitiveKind::String),
            "Step-by-step plan to build the app",
        )
        .required(
            "file_tree",
            Kind::Object,
            "Proposed file structure for the app",
        )
        .optional("read_me", Kind::String, "Detailed overview of the app")
        .required(
            "next_terminal_command",
            Kind::String,
            "The immediate next terminal command to execute (non-interactive, avoid nano/vim). \
             Consider the current directory and folder structure, and keep everything inside \
             the project sandbox directory.",
        )
        .closed()
        .build()
}

fn awareness_schema() -> SchemaModel {
    SchemaModel::builder()
        .required(
            "current_dir",
            Kind::String,
            "The current directory in the file tree",
        )
        .required("file_tree", Kind::Object, "The file tree structure")
        .optional(
            "cd_command",
            Kind::String,
            "The command to change the current directory",
        )
        .optional(
            "ls_command",
            Kind::String,
            "The command to list the files in the current directory",
        )
        .closed()
        .build()
}

fn codegen_schema() -> SchemaModel {
    SchemaModel::builder()
        .required(
            "code",
            Kind::String,
            "The complete generated code snippet for the terminal command",
        )
        .required(
            "next_steps",
            Kind::Array(PrimitiveKind::String),
            "Suggested next steps after generating the code",
        )
        .closed()
        .build()
}

fn review_schema() -> SchemaModel {
    SchemaModel::builder()
        .required(
            "thoughts",
            Kind::Array(PrimitiveKind::String),
            "Analysis of the last step's outcome (command execution, planning, file review, \
             or enhancement). You have not executed your next command yet.",
        )
        .required("success", Kind::Boolean, "Whether the step succeeded")
        .required(
            "goal_of_command",
            Kind::String,
            "What the step was intended to achieve",
        )
        .required(
            "next_terminal_command",
            Kind::String,
            "The next non-interactive command to execute (avoid nano/vim). If the last step \
             failed, provide a fix or alternative. Be specific about the directories you are \
             working in, relative to everything else.",
        )
        .optional(
            "requires_manual_edit",
            Kind::Boolean,
            "Whether manual editing is needed instead of automation",
        )
        .optional(
            "manual_edit_instructions",
            Kind::String,
            "Instructions for manual editing if required",
        )
        .optional(
            "requires_manual_run",
            Kind::Boolean,
            "Whether the command needs to be run manually in a separate terminal",
        )
        .optional(
            "manual_run_instructions",
            Kind::String,
            "Instructions for running the command manually",
        )
        .closed()
        .build()
}

fn file_review_schema() -> SchemaModel {
    SchemaModel::builder()
        .required("file_path", Kind::String, "The path to the file being reviewed")
        .required(
            "file_content",
            Kind::String,
            "The content of the file being reviewed",
        )
        .required("review", Kind::String, "Review of the file content")
        .required(
            "next_steps",
            Kind::Array(PrimitiveKind::String),
            "Suggested next steps based on the file content",
        )
        .closed()
        .build()
}

fn file_enhance_schema() -> SchemaModel {
    SchemaModel::builder()
        .required("file_path", Kind::String, "The path to the file being enhanced")
        .required(
            "enhancements",
            Kind::Array(PrimitiveKind::String),
            "Enhancements to be made to the file",
        )
        .required(
            "code",
            Kind::String,
            "The code content of the file after enhancements",
        )
        .required(
            "next_steps",
            Kind::Array(PrimitiveKind::String),
            "Suggested next steps after enhancing the file",
        )
        .closed()
        .build()
}
