use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;

/// 展平后的单层记录：组合键 -> 标量值 (保持插入顺序)
///
/// 值只会是 `Null` / `Bool` / `Number` / `String`，不会出现嵌套结构。
pub type FlatRecord = IndexMap<String, Value>;

/// 翻译后商品列表的规范字段名
pub const PRODUCT_LIST_KEY: &str = "product_list";

/// 标量转文本 (字符串原样输出，null 为空串)
pub fn scalar_to_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// 空值判定：null 或空字符串
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// 图片路径元数据 (目录扫描得到，合并到该图片的每个订单)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMetadata {
    pub image_name: String,
    pub batch_date: Option<String>, // 根目录 (YYYYMMDD)
    pub platform: Option<String>,   // 电商平台
    pub order_type: Option<String>, // 订单类型
    pub shop_id: Option<String>,    // 店铺/用户ID
}

impl PathMetadata {
    pub fn for_image(image_name: impl Into<String>) -> Self {
        Self {
            image_name: image_name.into(),
            ..Default::default()
        }
    }

    /// 以原始中文字段名写入订单，后续由字段映射表统一翻译。
    /// 订单不是对象时返回 false。
    pub fn merge_into(&self, order: &mut Value) -> bool {
        let Value::Object(map) = order else {
            return false;
        };

        map.insert("图片名称".to_string(), Value::String(self.image_name.clone()));
        let optional = [
            ("根目录", &self.batch_date),
            ("电商平台", &self.platform),
            ("订单类型", &self.order_type),
            ("用户ID", &self.shop_id),
        ];
        for (key, value) in optional {
            if let Some(v) = value {
                map.insert(key.to_string(), Value::String(v.clone()));
            }
        }
        true
    }
}

/// 待识别的图片
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSource {
    pub path: PathBuf,
    pub metadata: PathMetadata,
}

impl ImageSource {
    /// data URL 使用的 MIME 类型
    pub fn mime_type(&self) -> &'static str {
        match self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("png") => "image/png",
            _ => "image/jpeg",
        }
    }
}
