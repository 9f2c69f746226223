use crate::models::{scalar_to_text, FlatRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_SEPARATOR: &str = "_";
pub const SCALAR_JOIN: &str = "; ";

/// 标量数组的展平策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarArrayPolicy {
    /// 合并为一个字符串，以 "; " 分隔 (有损)
    #[default]
    Join,
    /// 每个元素单独成列：{key}_{index}
    Index,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenOptions {
    pub separator: String,
    /// 对象/数组元素是否追加下标段
    pub index_segments: bool,
    pub scalar_arrays: ScalarArrayPolicy,
}

impl Default for FlattenOptions {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            index_segments: true,
            scalar_arrays: ScalarArrayPolicy::Join,
        }
    }
}

impl FlattenOptions {
    /// 单个商品条目的展平选项 (不追加下标段)
    pub fn for_product_entry(&self) -> Self {
        Self {
            index_segments: false,
            ..self.clone()
        }
    }

    pub fn join_key(&self, parent: &str, key: &str) -> String {
        if parent.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", parent, self.separator, key)
        }
    }
}

/// 递归展平嵌套数据结构
pub fn flatten(data: &Value, parent_key: &str, options: &FlattenOptions) -> FlatRecord {
    let mut items = FlatRecord::new();
    flatten_into(&mut items, parent_key, data, options);
    items
}

fn flatten_into(items: &mut FlatRecord, key: &str, value: &Value, options: &FlattenOptions) {
    match value {
        Value::Object(map) => {
            for (k, v) in map {
                let new_key = options.join_key(key, k);
                flatten_into(items, &new_key, v, options);
            }
        }
        Value::Array(list) if list.is_empty() => {
            items.insert(key.to_string(), Value::Null);
        }
        Value::Array(list) => {
            let mut joined = false;
            for (idx, item) in list.iter().enumerate() {
                match item {
                    Value::Object(_) | Value::Array(_) => {
                        let new_key = if options.index_segments {
                            options.join_key(key, &idx.to_string())
                        } else {
                            key.to_string()
                        };
                        flatten_into(items, &new_key, item, options);
                    }
                    scalar => match options.scalar_arrays {
                        ScalarArrayPolicy::Join => {
                            append_scalar(items, key, scalar, joined);
                            joined = true;
                        }
                        ScalarArrayPolicy::Index => {
                            items.insert(options.join_key(key, &idx.to_string()), scalar.clone());
                        }
                    },
                }
            }
        }
        scalar => {
            items.insert(key.to_string(), scalar.clone());
        }
    }
}

fn append_scalar(items: &mut FlatRecord, key: &str, scalar: &Value, started: bool) {
    let text = scalar_to_text(scalar);
    if started {
        if let Some(Value::String(existing)) = items.get_mut(key) {
            existing.push_str(SCALAR_JOIN);
            existing.push_str(&text);
            return;
        }
    }
    items.insert(key.to_string(), Value::String(text));
}
