use order_extract_rust::{api, AppConfig, OpenAiVisionClient, OrderPipeline};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 使用本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::load()?;
    info!("Starting server with config: {:?}", config);

    // 映射表与视觉模型客户端
    let pipeline = Arc::new(OrderPipeline::from_config(&config.normalize)?);
    info!(
        "Mapping tables loaded: {} fields, {} columns",
        pipeline.tables().fields.len(),
        pipeline.tables().columns.len()
    );
    let model = Arc::new(OpenAiVisionClient::new(config.vision.clone())?);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = api::AppState {
        config: Arc::new(config),
        pipeline,
        model,
    };
    let app = api::router(state);

    // 启动服务器
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  POST /api/orders/normalize  - 标准化订单 JSON / 模型原始返回");
    info!("  POST /api/orders/extract    - 扫描图片目录并导出表格");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
