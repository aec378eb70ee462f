//! 响应校验器：对解码后的任意 JSON 值做单遍结构校验
//!
//! 严格等类别匹配，无任何强制转换（数字字符串不满足 String 槽位，数字不满足 Boolean）。
//! Object 类别的值作为不透明整体接受，不检查内部形状：文件树一类的字段天然开放，
//! 浅层契约是刻意的。

use serde_json::Value;

use crate::core::ValidationError;
use crate::schema::model::{GenerationResult, Kind, PrimitiveKind, SchemaModel};

/// JSON 值的实际类别名（用于错误信息）
fn value_kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn primitive_matches(value: &Value, kind: PrimitiveKind) -> bool {
    match kind {
        PrimitiveKind::String => value.is_string(),
        PrimitiveKind::Boolean => value.is_boolean(),
        PrimitiveKind::Number => value.is_number(),
        PrimitiveKind::Object => value.is_object(),
    }
}

/// 校验任意 JSON 值是否符合 SchemaModel，成功时原样包装为 GenerationResult
///
/// 1. 非对象直接拒绝；
/// 2. 必填字段缺失 -> MissingFields（全部缺失项，按声明顺序）；
/// 3. 未声明字段：封闭 Schema 拒绝（UnexpectedField），开放 Schema 接受且不再检查；
/// 4. 非数组属性：值的基元类别必须与声明完全一致 -> TypeMismatch；
/// 5. 数组属性：值必须是序列（NotAnArray），元素逐个比对 itemKind，
///    首个不符的下标触发 ArrayItemTypeMismatch。
pub fn validate(value: &Value, schema: &SchemaModel) -> Result<GenerationResult, ValidationError> {
    let map = value.as_object().ok_or(ValidationError::NotAnObject)?;

    let missing: Vec<String> = schema
        .required()
        .iter()
        .filter(|name| !map.contains_key(name.as_str()))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ValidationError::MissingFields(missing));
    }

    for (key, field_value) in map {
        let spec = match schema.property(key) {
            Some(spec) => spec,
            None => {
                if schema.closed() {
                    return Err(ValidationError::UnexpectedField(key.clone()));
                }
                continue;
            }
        };

        match spec.kind {
            Kind::Array(item_kind) => {
                let items = field_value
                    .as_array()
                    .ok_or_else(|| ValidationError::NotAnArray(key.clone()))?;
                for (index, item) in items.iter().enumerate() {
                    if !primitive_matches(item, item_kind) {
                        return Err(ValidationError::ArrayItemTypeMismatch {
                            field: key.clone(),
                            index,
                            expected: item_kind,
                            actual: value_kind_name(item),
                        });
                    }
                }
            }
            kind => {
                let matches = match kind {
                    Kind::String => field_value.is_string(),
                    Kind::Boolean => field_value.is_boolean(),
                    Kind::Number => field_value.is_number(),
                    Kind::Object => field_value.is_object(),
                    Kind::Array(_) => unreachable!(),
                };
                if !matches {
                    return Err(ValidationError::TypeMismatch {
                        field: key.clone(),
                        expected: kind,
                        actual: value_kind_name(field_value),
                    });
                }
            }
        }
    }

    Ok(GenerationResult::new(map.clone()))
}
