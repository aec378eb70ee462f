//! SchemaModel：期望响应形状的声明式描述
//!
//! 用带标签变体（Kind）描述属性类别，而非反射 Rust 原生类型，使同一套校验器
//! 在所有助手能力间通用；Array 变体自带元素类别，保证「itemKind 恰在 Array 时存在」。

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 数组元素允许的基元类别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Boolean,
    Number,
    Object,
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PrimitiveKind::String => "string",
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Number => "number",
            PrimitiveKind::Object => "object",
        };
        f.write_str(name)
    }
}

/// 属性类别：基元或数组（数组自带元素类别）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    String,
    Boolean,
    Number,
    Object,
    Array(PrimitiveKind),
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::String => f.write_str("string"),
            Kind::Boolean => f.write_str("boolean"),
            Kind::Number => f.write_str("number"),
            Kind::Object => f.write_str("object"),
            Kind::Array(item) => write!(f, "array of {}", item),
        }
    }
}

/// 单个属性的声明：类别 + 供 Oracle 理解的描述文本
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub kind: Kind,
    pub description: String,
}

/// 期望响应形状：属性表、必填集合、封闭/开放世界标记
///
/// 构造后不可变；每个助手能力一个实例，进程启动时创建。
/// 「required ⊆ properties」由构造方式保证：builder 只能在声明属性时标记必填。
#[derive(Debug, Clone)]
pub struct SchemaModel {
    properties: BTreeMap<String, PropertySpec>,
    required: Vec<String>,
    closed: bool,
}

impl SchemaModel {
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::default()
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.get(name)
    }

    pub fn properties(&self) -> impl Iterator<Item = (&String, &PropertySpec)> {
        self.properties.iter()
    }

    pub fn required(&self) -> &[String] {
        &self.required
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn closed(&self) -> bool {
        self.closed
    }

    /// 无任何属性声明的 Schema 视为缺失（生成端以 MissingSchema 拒绝）
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

/// SchemaModel 构建器：required / optional 声明属性，closed 标记封闭世界
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    properties: BTreeMap<String, PropertySpec>,
    required: Vec<String>,
    closed: bool,
}

impl SchemaBuilder {
    pub fn required(mut self, name: &str, kind: Kind, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertySpec {
                kind,
                description: description.to_string(),
            },
        );
        self.required.push(name.to_string());
        self
    }

    pub fn optional(mut self, name: &str, kind: Kind, description: &str) -> Self {
        self.properties.insert(
            name.to_string(),
            PropertySpec {
                kind,
                description: description.to_string(),
            },
        );
        self
    }

    pub fn closed(mut self) -> Self {
        self.closed = true;
        self
    }

    pub fn build(self) -> SchemaModel {
        SchemaModel {
            properties: self.properties,
            required: self.required,
            closed: self.closed,
        }
    }
}

/// 校验通过后的结构化结果：保证含全部必填字段且类别正确（封闭时无多余字段）
///
/// 归调用方所有，无共享可变状态。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationResult {
    fields: Map<String, Value>,
}

impl GenerationResult {
    pub(crate) fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.as_str())
    }

    /// 布尔字段：缺失或非布尔一律视为 false（评审结果中的可选标志位）
    pub fn flag(&self, name: &str) -> bool {
        self.fields
            .get(name)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// 字符串数组字段：缺失时返回空
    pub fn string_items(&self, name: &str) -> Vec<&str> {
        self.fields
            .get(name)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
