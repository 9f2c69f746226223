use std::path::PathBuf;
use thiserror::Error;

/// 单张图片提取失败 (可恢复：跳过该图片，批次继续)
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("模型返回内容为空")]
    EmptyResponse,

    #[error("JSON 解析失败: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("模型返回的 JSON 不是对象或数组: {kind}")]
    UnexpectedShape { kind: &'static str },

    #[error("图片读取失败 {path}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("视觉模型请求失败: {0}")]
    Http(#[from] reqwest::Error),

    #[error("视觉模型返回 HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("视觉模型返回异常: {message}")]
    Api { message: String },
}

impl ExtractError {
    /// 仅网络错误、5xx 与 429 可重试
    pub fn is_retryable(&self) -> bool {
        match self {
            ExtractError::Http(e) if e.is_decode() => false,
            ExtractError::Http(e) => e
                .status()
                .map_or(true, |s| s.is_server_error() || s.as_u16() == 429),
            ExtractError::Status { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// 单个订单处理失败 (可恢复：跳过该订单)
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("订单不是 JSON 对象 (实际为 {kind})")]
    NotAnObject { kind: &'static str },

    #[error("商品列表无法解析: {source}")]
    MalformedProductList {
        #[source]
        source: serde_json::Error,
    },

    #[error("商品列表类型不支持: {kind}")]
    UnsupportedProductList { kind: &'static str },
}

/// 映射表加载失败
#[derive(Debug, Error)]
pub enum MappingError {
    #[error("映射表读取失败 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("映射表格式错误 {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
}

/// 文件级 I/O 失败 (不可恢复：终止本次运行)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("文件读取失败 {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("文件写入失败 {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON 文件格式错误 {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("JSON 文件内容应为订单数组或对象 {path}")]
    UnexpectedShape { path: PathBuf },

    #[error("CSV 写入失败 {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// 批量提取任务失败
#[derive(Debug, Error)]
pub enum JobError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("标准化任务异常终止: {0}")]
    Normalize(#[from] tokio::task::JoinError),
}

/// JSON 值的类型名，用于日志和错误信息
pub fn value_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
