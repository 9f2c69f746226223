use crate::config::VisionConfig;
use crate::error::ExtractError;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// 视觉模型：输入图片与提示词，返回模型原始文本
#[async_trait]
pub trait VisionModel: Send + Sync {
    async fn extract(&self, image: &[u8], mime: &str, prompt: &str) -> Result<String, ExtractError>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    frequency_penalty: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: Vec<ContentPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart<'a> {
    Text { text: &'a str },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// OpenAI 兼容的 chat/completions 客户端
pub struct OpenAiVisionClient {
    http: reqwest::Client,
    config: VisionConfig,
}

impl OpenAiVisionClient {
    pub fn new(config: VisionConfig) -> Result<Self, ExtractError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.config.api_url.trim_end_matches('/'))
    }

    async fn request_once(&self, image: &[u8], mime: &str, prompt: &str) -> Result<String, ExtractError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(image);
        let body = build_request(&self.config, prompt, format!("data:{};base64,{}", mime, encoded));

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(ExtractError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: ChatResponse = resp.json().await?;
        first_content(parsed)
    }
}

fn build_request<'a>(config: &'a VisionConfig, prompt: &'a str, data_url: String) -> ChatRequest<'a> {
    ChatRequest {
        model: &config.model_name,
        messages: vec![ChatMessage {
            role: "user",
            content: vec![
                ContentPart::Text { text: prompt },
                ContentPart::ImageUrl {
                    image_url: ImageUrl { url: data_url },
                },
            ],
        }],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
        top_p: config.top_p,
        frequency_penalty: 0.0,
    }
}

fn first_content(resp: ChatResponse) -> Result<String, ExtractError> {
    resp.choices
        .into_iter()
        .next()
        .map(|c| c.message.content.unwrap_or_default())
        .ok_or_else(|| ExtractError::Api {
            message: "响应中没有 choices".to_string(),
        })
}

#[async_trait]
impl VisionModel for OpenAiVisionClient {
    async fn extract(&self, image: &[u8], mime: &str, prompt: &str) -> Result<String, ExtractError> {
        let mut attempt = 0;
        loop {
            match self.request_once(image, mime, prompt).await {
                Ok(content) => return Ok(content),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "视觉模型请求失败，{}ms 后重试 ({}/{}): {}",
                        self.config.retry_delay_ms,
                        attempt,
                        self.config.max_retries,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_delay_ms)).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
