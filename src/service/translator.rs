use indexmap::IndexMap;
use serde_json::Value;

/// 递归翻译字典键名，未映射的键保持不变
///
/// 两个原始键映射到同一规范键时，保留首次出现的位置，值以最后一次为准。
pub fn translate_keys(data: &Value, mapping: &IndexMap<String, String>) -> Value {
    match data {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let key = mapping.get(k).cloned().unwrap_or_else(|| k.clone());
                    (key, translate_keys(v, mapping))
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(|v| translate_keys(v, mapping)).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mapping() -> IndexMap<String, String> {
        [
            ("交易状态", "transaction_status"),
            ("商品信息列表", "product_list"),
            ("商品名称", "product_name"),
            ("下单时间", "order_time"),
            ("支付时间", "order_time"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
    }

    #[test]
    fn translates_nested_objects_and_arrays() {
        let input = json!({
            "交易状态": "已完成",
            "商品信息列表": [{"商品名称": "A"}, {"商品名称": "B", "颜色": "红"}],
        });
        let out = translate_keys(&input, &mapping());
        assert_eq!(
            out,
            json!({
                "transaction_status": "已完成",
                "product_list": [{"product_name": "A"}, {"product_name": "B", "颜色": "红"}],
            })
        );
    }

    #[test]
    fn scalars_pass_through() {
        assert_eq!(translate_keys(&json!("交易状态"), &mapping()), json!("交易状态"));
        assert_eq!(translate_keys(&json!(3), &mapping()), json!(3));
        assert_eq!(translate_keys(&json!(null), &mapping()), json!(null));
    }

    #[test]
    fn key_collision_last_value_wins_first_position_kept() {
        let input = json!({
            "下单时间": "2025-01-01 10:00",
            "订单编号": "N1",
            "支付时间": "2025-01-01 10:05",
        });
        let out = translate_keys(&input, &mapping());
        let map = out.as_object().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["order_time", "订单编号"]);
        assert_eq!(map["order_time"], "2025-01-01 10:05");
    }

    #[test]
    fn builtin_table_collisions_are_known() {
        // 多对一映射：同一订单中同时出现时只保留最后一个值
        let tables = crate::models::MappingTables::builtin(1).unwrap();
        let mut by_target: IndexMap<&str, Vec<&str>> = IndexMap::new();
        for (raw, canonical) in &tables.fields {
            by_target.entry(canonical.as_str()).or_default().push(raw.as_str());
        }
        let order_time = &by_target["order_time"];
        assert!(order_time.contains(&"下单时间") && order_time.contains(&"支付时间"));
        let price = &by_target["price"];
        assert!(price.contains(&"total_price") && price.contains(&"discount_price"));

        let input = json!({"price": "99", "discount_price": "79"});
        let out = translate_keys(&input, &tables.fields);
        assert_eq!(out, json!({"price": "79"}));
    }
}
