//! Schema 层：响应形状声明与结构校验

pub mod model;
pub mod validator;

pub use model::{GenerationResult, Kind, PrimitiveKind, PropertySpec, SchemaBuilder, SchemaModel};
pub use validator::validate;
