use crate::error::{value_kind, PipelineError};
use crate::models::{FlatRecord, PRODUCT_LIST_KEY};
use crate::service::flattener::{flatten, FlattenOptions};
use serde_json::{Map, Value};

/// 商品条目前缀：第一个商品为 `product`，其余为 `product_{i}`
pub fn product_prefix(index: usize, options: &FlattenOptions) -> String {
    if index == 0 {
        "product".to_string()
    } else {
        format!("product{}{}", options.separator, index)
    }
}

/// 订单展平并按商品展开
///
/// `product_list` 不参与订单级展平，原值交给 [`expand_products`]，
/// 结构化列表与字符串列表的每个条目都按同一规则展平。
pub fn expand_order(order: &Value, options: &FlattenOptions) -> Vec<FlatRecord> {
    let Value::Object(map) = order else {
        return vec![flatten(order, "", options)];
    };

    let base: Map<String, Value> = map
        .iter()
        .filter(|(key, _)| key.as_str() != PRODUCT_LIST_KEY)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    let mut record = flatten(&Value::Object(base), "", options);

    match map.get(PRODUCT_LIST_KEY) {
        Some(products) => {
            record.insert(PRODUCT_LIST_KEY.to_string(), products.clone());
            expand_products(&record, options)
        }
        None => vec![record],
    }
}

/// 商品信息展开：一个订单含 N 个商品时输出 N 行，订单级字段在每行重复
///
/// `product_list` 可以是数组、单个商品对象，或字符串编码的 JSON (允许单引号)。
/// 商品列表缺失或为空时原样返回一行 (去掉空的商品列表字段)。
pub fn expand_products(record: &FlatRecord, options: &FlattenOptions) -> Vec<FlatRecord> {
    match record.get(PRODUCT_LIST_KEY) {
        Some(Value::String(raw)) if !raw.trim().is_empty() => match parse_product_list(raw) {
            Ok(entries) => expand_entries(record, &entries, options),
            Err(e) => {
                tracing::warn!("商品列表解析失败，按无商品处理: {}", e);
                vec![record.clone()]
            }
        },
        Some(Value::Array(entries)) => expand_entries(record, entries, options),
        Some(entry @ Value::Object(_)) => expand_entries(record, std::slice::from_ref(entry), options),
        Some(Value::Null) | Some(Value::String(_)) => vec![without_product_list(record)],
        Some(other) => {
            tracing::warn!("商品列表类型不支持 ({})，按无商品处理", value_kind(other));
            vec![record.clone()]
        }
        None => vec![record.clone()],
    }
}

/// 解析字符串形式的商品列表，失败时把单引号替换为双引号再试一次
pub fn parse_product_list(raw: &str) -> Result<Vec<Value>, PipelineError> {
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(v) => v,
        Err(_) => serde_json::from_str::<Value>(&raw.replace('\'', "\""))
            .map_err(|source| PipelineError::MalformedProductList { source })?,
    };

    match parsed {
        Value::Array(entries) => Ok(entries),
        Value::Null => Ok(Vec::new()),
        entry @ Value::Object(_) => Ok(vec![entry]),
        other => Err(PipelineError::UnsupportedProductList {
            kind: value_kind(&other),
        }),
    }
}

fn without_product_list(record: &FlatRecord) -> FlatRecord {
    let mut base = record.clone();
    base.shift_remove(PRODUCT_LIST_KEY);
    base
}

fn expand_entries(record: &FlatRecord, entries: &[Value], options: &FlattenOptions) -> Vec<FlatRecord> {
    let base = without_product_list(record);
    if entries.is_empty() {
        return vec![base];
    }

    let entry_options = options.for_product_entry();
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let mut merged = base.clone();
            merged.extend(flatten(entry, &product_prefix(idx, options), &entry_options));
            merged
        })
        .collect()
}
