use order_extract_rust::config::NormalizeConfig;
use order_extract_rust::models::{FlatRecord, MappingTables};
use order_extract_rust::service::{expand_order, flatten, normalize_columns, translate_keys, FlattenOptions, OrderPipeline};
use proptest::prelude::*;
use serde_json::{Map, Value};

fn key() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("交易状态".to_string()),
        Just("商品名称".to_string()),
        Just("商品价格".to_string()),
        Just("订单编号".to_string()),
        Just("收货地址".to_string()),
        Just("商品信息列表".to_string()),
        Just("price".to_string()),
        "[a-z]{1,6}",
    ]
}

fn scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z0-9 ]{0,8}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    scalar().prop_recursive(4, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..5).prop_map(Value::Array),
            prop::collection::vec((key(), inner), 0..5)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<String, Value>>())),
        ]
    })
}

fn order() -> impl Strategy<Value = Value> {
    prop::collection::vec((key(), json_value()), 0..6)
        .prop_map(|pairs| Value::Object(pairs.into_iter().collect::<Map<String, Value>>()))
}

fn same_shape(a: &Value, b: &Value) -> bool {
    match (a, b) {
        // 多对一映射可能合并键，值的结构不变
        (Value::Object(x), Value::Object(y)) => {
            y.len() <= x.len() && y.values().all(|v| x.values().any(|u| same_shape(u, v)))
        }
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(u, v)| same_shape(u, v))
        }
        (Value::Object(_), _) | (_, Value::Object(_)) | (Value::Array(_), _) | (_, Value::Array(_)) => false,
        (u, v) => u == v,
    }
}

fn is_scalar(v: &Value) -> bool {
    !matches!(v, Value::Array(_) | Value::Object(_))
}

fn as_object(record: &FlatRecord) -> Value {
    Value::Object(record.clone().into_iter().collect())
}

proptest! {
    #[test]
    fn translate_preserves_structure(value in json_value()) {
        let tables = MappingTables::builtin(2).unwrap();
        let translated = translate_keys(&value, &tables.fields);
        prop_assert!(same_shape(&value, &translated));
    }

    #[test]
    fn flatten_output_is_scalar_only(value in order()) {
        let flat = flatten(&value, "", &FlattenOptions::default());
        prop_assert!(flat.values().all(is_scalar));
    }

    #[test]
    fn flatten_is_idempotent(value in order()) {
        let options = FlattenOptions::default();
        let once = flatten(&value, "", &options);
        let twice = flatten(&as_object(&once), "", &options);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn expansion_rows_share_order_level_fields(value in order()) {
        let tables = MappingTables::builtin(2).unwrap();
        let options = FlattenOptions::default();
        let translated = translate_keys(&value, &tables.fields);
        let flat = flatten(&translated, "", &options);
        let rows = expand_order(&translated, &options);
        prop_assert!(!rows.is_empty());
        for row in &rows {
            prop_assert!(row.values().all(is_scalar));
            for (k, v) in &flat {
                if !k.starts_with("product_list") && !k.starts_with("product") {
                    prop_assert_eq!(row.get(k), Some(v));
                }
            }
        }
    }

    #[test]
    fn normalizer_keeps_row_count_and_drops_empty_columns(orders in prop::collection::vec(order(), 0..6)) {
        let pipeline = OrderPipeline::from_config(&NormalizeConfig::default()).unwrap();
        let mut records = Vec::new();
        for o in &orders {
            records.extend(pipeline.process_order(o).unwrap());
        }
        let before = records.len();
        let table = normalize_columns(records, pipeline.tables());
        prop_assert_eq!(table.row_count(), before);

        let mut seen = std::collections::HashSet::new();
        for column in &table.columns {
            prop_assert!(seen.insert(column.clone()));
            let has_value = table.rows.iter().any(|r| match r.get(column) {
                Some(Value::Null) | None => false,
                Some(Value::String(s)) => !s.is_empty(),
                Some(_) => true,
            });
            prop_assert!(has_value, "column {} is empty in every row", column);
        }
        for row in &table.rows {
            prop_assert_eq!(row.len(), table.columns.len());
        }
    }
}
