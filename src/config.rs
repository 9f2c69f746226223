use crate::models::RunContext;
use crate::service::flattener::ScalarArrayPolicy;
use chrono::{Local, NaiveDate};
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const CONFIG_FILE: &str = "order_extract";
pub const ENV_PREFIX: &str = "ORDER_EXTRACT";

pub const DEFAULT_PROMPT: &str = "请从图片中提取完整订单信息，包含以下中文字段：
- 交易状态
- 下单时间
- 订单编号
- 店铺名称
- 商品信息列表：商品名称、商品件数、商品价格、商品划线价、服务标签
- 金额信息：总价、实付款、运费、运费险
- 优惠信息：店铺优惠、跨店满减、红包、礼金、购物券、支付优惠
**严格要求：**
1. **必须** 直接返回 **JSON 数组**，不要添加任何解释性文本。
2. **仅输出 JSON**，不要加 markdown 代码块 ```json ```。
3. 缺失字段保持为空，不要填充默认值。
4. **请确保所有字段必须使用中文，不要包含英文或其他语言。**
5. 若图片中存在多个*，请忽略。";

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub vision: VisionConfig,
    pub paths: PathsConfig,
    pub scan: ScanConfig,
    pub normalize: NormalizeConfig,
    /// 运行日期，缺省为当天
    pub run_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// 视觉模型 (OpenAI 兼容接口)
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionConfig {
    pub api_url: String,
    pub api_key: String,
    pub model_name: String,
    pub prompt: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub max_concurrency: usize,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.siliconflow.cn/v1".to_string(),
            api_key: String::new(),
            model_name: "Pro/OpenGVLab/InternVL2-8B".to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            max_tokens: 1024,
            temperature: 0.7,
            top_p: 0.7,
            max_concurrency: 4,
            max_retries: 2,
            retry_delay_ms: 2000,
            timeout_secs: 120,
        }
    }
}

// api_key 不输出到日志
impl fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VisionConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &if self.api_key.is_empty() { "<empty>" } else { "***" })
            .field("model_name", &self.model_name)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("max_concurrency", &self.max_concurrency)
            .field("max_retries", &self.max_retries)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// 图片根目录
    pub image_folder: String,
    /// JSON 与表格输出目录
    pub output_folder: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            image_folder: "./images".to_string(),
            output_folder: "./output".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanMode {
    /// 图片直接位于 image_folder 下
    Flat,
    /// image_folder/日期/平台/订单类型/店铺ID/图片
    #[default]
    Dated,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub mode: ScanMode,
    pub platforms: Vec<String>,
    pub order_types: Vec<String>,
    /// 日期目录 = 运行日期 - days_back
    pub days_back: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            mode: ScanMode::Dated,
            platforms: ["京东", "淘宝", "拼多多", "抖音", "快手"]
                .into_iter()
                .map(String::from)
                .collect(),
            order_types: vec!["单商品".to_string()],
            days_back: 3,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// 单个订单最大商品数量 (列映射模板展开范围)
    pub num_products: usize,
    pub expand_line_items: bool,
    pub scalar_arrays: ScalarArrayPolicy,
    pub output_prefix: String,
    /// 自定义映射表目录 (field_mapping.json / column_mapping.json)
    pub mapping_dir: Option<String>,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            num_products: 7,
            expand_line_items: true,
            scalar_arrays: ScalarArrayPolicy::Join,
            output_prefix: "Orders".to_string(),
            mapping_dir: None,
        }
    }
}

impl AppConfig {
    /// 默认值 -> order_extract.toml (可选) -> 环境变量 ORDER_EXTRACT__SECTION__KEY
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(CONFIG_FILE)
    }

    pub fn load_from(file_stem: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file_stem).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }

    pub fn run_context(&self) -> RunContext {
        RunContext::new(
            self.run_date.unwrap_or_else(|| Local::now().date_naive()),
            self.vision.model_name.clone(),
        )
    }
}
