use crate::config::AppConfig;
use crate::models::{BatchStats, FlatRecord};
use crate::service::{run_extraction_job, JobReport, OrderPipeline};
use crate::vision::{collect_orders, VisionModel};
use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// 共享状态
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub pipeline: Arc<OrderPipeline>,
    pub model: Arc<dyn VisionModel>,
}

/// 请求体: `{"responses": [模型原始返回文本]}` 或 `{"orders": 订单数组/单个订单}`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizeRequest {
    Responses(Vec<String>),
    Orders(Value),
}

/// 标准化响应体
#[derive(Debug, Serialize)]
pub struct NormalizeResponse {
    pub success: bool,
    pub message: String,
    pub stats: Option<BatchStats>,
    pub failed_responses: usize,
    pub columns: Vec<String>,
    pub rows: Vec<FlatRecord>,
}

/// 提取任务响应体
#[derive(Debug, Serialize)]
pub struct ExtractResponse {
    pub success: bool,
    pub message: String,
    pub report: Option<JobReport>,
}

/// 健康检查
pub async fn health_check() -> &'static str {
    "OK"
}

/// 订单标准化接口 (不调用模型)
pub async fn normalize_orders(
    State(state): State<AppState>,
    Json(req): Json<NormalizeRequest>,
) -> Response {
    let (orders, failed_responses) = match req {
        NormalizeRequest::Responses(responses) => collect_orders(&responses),
        NormalizeRequest::Orders(Value::Array(orders)) => (orders, 0),
        NormalizeRequest::Orders(order @ Value::Object(_)) => (vec![order], 0),
        NormalizeRequest::Orders(_) => {
            let response = NormalizeResponse {
                success: false,
                message: "Error: \"orders\" must be an order object or an array of orders".to_string(),
                stats: None,
                failed_responses: 0,
                columns: Vec::new(),
                rows: Vec::new(),
            };
            return (StatusCode::BAD_REQUEST, Json(response)).into_response();
        }
    };

    let outcome = match state.pipeline.clone().run_batch_blocking(orders).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("标准化任务失败: {}", e);
            let response = NormalizeResponse {
                success: false,
                message: format!("Error: {}", e),
                stats: None,
                failed_responses,
                columns: Vec::new(),
                rows: Vec::new(),
            };
            return (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response();
        }
    };
    let response = NormalizeResponse {
        success: true,
        message: format!(
            "Normalized {} orders into {} rows",
            outcome.stats.processed_orders, outcome.stats.output_rows
        ),
        stats: Some(outcome.stats),
        failed_responses,
        columns: outcome.table.columns,
        rows: outcome.table.rows,
    };
    (StatusCode::OK, Json(response)).into_response()
}

/// 批量提取接口：扫描配置目录中的图片并导出表格
pub async fn run_extraction(State(state): State<AppState>) -> Response {
    match run_extraction_job(&state.config, state.model.clone(), state.pipeline.clone()).await {
        Ok(report) => {
            let response = ExtractResponse {
                success: true,
                message: format!(
                    "Processed {} images, {} orders extracted",
                    report.extraction.images_total, report.extraction.orders_extracted
                ),
                report: Some(report),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => {
            tracing::error!("提取任务失败: {}", e);
            let response = ExtractResponse {
                success: false,
                message: format!("Error: {}", e),
                report: None,
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(response)).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractError;
    use async_trait::async_trait;
    use serde_json::json;

    struct NoModel;

    #[async_trait]
    impl VisionModel for NoModel {
        async fn extract(&self, _image: &[u8], _mime: &str, _prompt: &str) -> Result<String, ExtractError> {
            Err(ExtractError::EmptyResponse)
        }
    }

    fn state() -> AppState {
        let config = AppConfig::default();
        let pipeline = OrderPipeline::from_config(&config.normalize).unwrap();
        AppState {
            config: Arc::new(config),
            pipeline: Arc::new(pipeline),
            model: Arc::new(NoModel),
        }
    }

    async fn body_json(resp: Response) -> Value {
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn normalize_accepts_raw_model_responses() {
        let req: NormalizeRequest = serde_json::from_value(json!({
            "responses": ["```json\n[{\"订单编号\": \"7\", \"收货地址\": []}]\n```", ""]
        }))
        .unwrap();
        let resp = normalize_orders(State(state()), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body = body_json(resp).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["failed_responses"], 1);
        assert_eq!(body["columns"], json!(["order_number"]));
        assert_eq!(body["rows"], json!([{"order_number": "7"}]));
    }

    #[tokio::test]
    async fn normalize_accepts_single_order_object() {
        let req: NormalizeRequest = serde_json::from_value(json!({"orders": {"交易状态": "已完成"}})).unwrap();
        let resp = normalize_orders(State(state()), Json(req)).await;
        let body = body_json(resp).await;
        assert_eq!(body["stats"]["output_rows"], 1);
        assert_eq!(body["rows"][0]["transaction_status"], "已完成");
    }

    #[tokio::test]
    async fn normalize_rejects_scalar_body() {
        let req: NormalizeRequest = serde_json::from_value(json!({"orders": "orders"})).unwrap();
        let resp = normalize_orders(State(state()), Json(req)).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn order_with_responses_field_stays_an_order() {
        let req: NormalizeRequest = serde_json::from_value(json!({
            "orders": [{"订单编号": "9", "responses": ["好评"]}]
        }))
        .unwrap();
        let resp = normalize_orders(State(state()), Json(req)).await;
        let body = body_json(resp).await;
        assert_eq!(body["failed_responses"], 0);
        assert_eq!(body["rows"], json!([{"order_number": "9", "responses": "好评"}]));
    }

    #[test]
    fn bare_order_body_is_rejected() {
        assert!(serde_json::from_value::<NormalizeRequest>(json!({"交易状态": "已完成"})).is_err());
    }

    #[tokio::test]
    async fn health() {
        assert_eq!(health_check().await, "OK");
    }
}
