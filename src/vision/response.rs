use crate::error::{value_kind, ExtractError};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

static FENCED_BLOCK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)\s*```").expect("valid fence regex"));

/// 去掉 ```json ``` 代码块标记
pub fn strip_code_fence(raw: &str) -> &str {
    match FENCED_BLOCK.captures(raw).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => raw.trim(),
    }
}

/// 解析模型返回内容：对象视为单个订单，数组视为订单列表
pub fn parse_model_response(raw: &str) -> Result<Vec<Value>, ExtractError> {
    if raw.trim().is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    let body = strip_code_fence(raw);
    if body.is_empty() {
        return Err(ExtractError::EmptyResponse);
    }

    match serde_json::from_str::<Value>(body)? {
        Value::Array(orders) => Ok(orders),
        order @ Value::Object(_) => Ok(vec![order]),
        other => Err(ExtractError::UnexpectedShape {
            kind: value_kind(&other),
        }),
    }
}

/// 批量解析模型原始返回，失败的条目记录日志后跳过
///
/// 返回 (订单列表, 失败条数)
pub fn collect_orders(responses: &[String]) -> (Vec<Value>, usize) {
    let mut orders = Vec::new();
    let mut failed = 0;
    for (idx, raw) in responses.iter().enumerate() {
        match parse_model_response(raw) {
            Ok(parsed) => orders.extend(parsed),
            Err(e) => {
                tracing::warn!("❌ 第 {} 条模型返回解析失败，跳过: {}", idx, e);
                failed += 1;
            }
        }
    }
    (orders, failed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fenced_and_bare_arrays_parse_identically() {
        let bare = r#"[{"订单编号": "1"}]"#;
        let fenced = "```json\n[{\"订单编号\": \"1\"}]\n```";
        assert_eq!(parse_model_response(bare).unwrap(), parse_model_response(fenced).unwrap());
    }

    #[test]
    fn fence_with_surrounding_text() {
        let raw = "以下是提取结果：\n```json\n{\"交易状态\": \"已完成\"}\n```\n请核对。";
        assert_eq!(parse_model_response(raw).unwrap(), vec![json!({"交易状态": "已完成"})]);
    }

    #[test]
    fn fence_without_language_tag() {
        let raw = "```\n[{\"a\": 1}, {\"a\": 2}]\n```";
        assert_eq!(parse_model_response(raw).unwrap().len(), 2);
    }

    #[test]
    fn empty_and_invalid_are_recoverable_errors() {
        assert!(matches!(parse_model_response("  \n"), Err(ExtractError::EmptyResponse)));
        assert!(matches!(parse_model_response("```json\n```"), Err(ExtractError::EmptyResponse)));
        assert!(matches!(parse_model_response("无法识别订单"), Err(ExtractError::InvalidJson(_))));
        assert!(matches!(
            parse_model_response("\"text\""),
            Err(ExtractError::UnexpectedShape { kind: "string" })
        ));
    }

    #[test]
    fn collect_orders_skips_failures() {
        let responses = vec![
            "[{\"a\": 1}, {\"a\": 2}]".to_string(),
            String::new(),
            "{\"a\": 3}".to_string(),
            "not json".to_string(),
        ];
        let (orders, failed) = collect_orders(&responses);
        assert_eq!(orders.len(), 3);
        assert_eq!(failed, 2);
    }
}
