//! Prompt 组装：query + 上下文 + Schema 渲染 + 固定规则清单
//!
//! 上下文由调用方提供且原样序列化进 prompt，本层不做任何敏感信息过滤——
//! 调用方放进 context 的内容都会发往 Oracle。

use std::fmt::Write as _;

use serde_json::{Map, Value};

use crate::schema::{Kind, SchemaModel};

/// 将 Schema 渲染为 Oracle 可读的逐行描述
fn render_schema(schema: &SchemaModel) -> String {
    let mut out = String::new();
    for (name, spec) in schema.properties() {
        let requirement = if schema.is_required(name) {
            "required"
        } else {
            "optional"
        };
        let _ = writeln!(
            out,
            "- {} ({}, {}): {}",
            name, spec.kind, requirement, spec.description
        );
    }
    out
}

/// 组装发往 Oracle 的完整指令文本
pub fn compose(query: &str, schema: &SchemaModel, context: &Map<String, Value>) -> String {
    let context_json =
        serde_json::to_string(context).unwrap_or_else(|_| "{}".to_string());

    let mut rules = vec![
        "1. Response MUST be valid JSON".to_string(),
        "2. Response MUST follow the schema exactly".to_string(),
        format!(
            "3. All required fields MUST be present: {}",
            schema.required().join(", ")
        ),
        "4. Data types MUST match schema specifications".to_string(),
    ];
    if schema
        .properties()
        .any(|(_, spec)| matches!(spec.kind, Kind::Array(_)))
    {
        rules.push("5. Array items MUST match specified item types".to_string());
    }
    if schema.closed() {
        rules.push(format!(
            "{}. Do NOT include any field that is not declared in the schema",
            rules.len() + 1
        ));
    }

    format!(
        "You are an AI assistant that provides responses in a strictly structured format.\n\n\
         Query: {}\n\
         Context: {}\n\n\
         Required Response Schema:\n{}\n\
         Rules:\n{}",
        query,
        context_json,
        render_schema(schema),
        rules.join("\n")
    )
}
