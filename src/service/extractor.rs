use crate::error::ExtractError;
use crate::models::ImageSource;
use crate::vision::{parse_model_response, VisionModel};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// 图片提取统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub images_total: usize,
    pub images_failed: usize,
    pub orders_extracted: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ExtractionOutcome {
    /// 按扫描顺序排列的订单 (已合并路径元数据)
    pub orders: Vec<Value>,
    pub stats: ExtractionStats,
}

/// 图片 -> 视觉模型 -> 订单 JSON
pub struct OrderExtractor {
    model: Arc<dyn VisionModel>,
    prompt: String,
    max_concurrency: usize,
}

impl OrderExtractor {
    pub fn new(model: Arc<dyn VisionModel>, prompt: impl Into<String>, max_concurrency: usize) -> Self {
        Self {
            model,
            prompt: prompt.into(),
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// 单张图片：读取、调用模型、解析、写入路径元数据
    pub async fn extract_image(&self, image: &ImageSource) -> Result<Vec<Value>, ExtractError> {
        let bytes = tokio::fs::read(&image.path)
            .await
            .map_err(|source| ExtractError::ImageRead {
                path: image.path.clone(),
                source,
            })?;

        let raw = self.model.extract(&bytes, image.mime_type(), &self.prompt).await?;
        let mut orders = parse_model_response(&raw).inspect_err(|_| {
            tracing::debug!("模型原始返回 {}: {}", image.metadata.image_name, raw);
        })?;

        for order in orders.iter_mut() {
            if !image.metadata.merge_into(order) {
                tracing::warn!("{} 返回的订单不是对象，未写入图片信息", image.metadata.image_name);
            }
        }
        Ok(orders)
    }

    /// 批量提取：并发上限为 max_concurrency，单张失败不影响其它图片
    pub async fn extract_all(&self, images: Vec<ImageSource>) -> ExtractionOutcome {
        let total = images.len();
        tracing::info!("🚀 开始处理 {} 张图片, 并发 {}", total, self.max_concurrency);

        let mut pending = stream::iter(images.into_iter().enumerate())
            .map(|(idx, image)| async move {
                let result = self.extract_image(&image).await;
                (idx, image, result)
            })
            .buffer_unordered(self.max_concurrency);

        let mut results = Vec::with_capacity(total);
        let mut done = 0;
        while let Some(item) = pending.next().await {
            done += 1;
            if done % 10 == 0 || done == 1 || done == total {
                tracing::info!("图片进度: {}/{}", done, total);
            }
            results.push(item);
        }
        results.sort_by_key(|(idx, _, _)| *idx);

        let mut outcome = ExtractionOutcome::default();
        outcome.stats.images_total = total;
        for (_, image, result) in results {
            match result {
                Ok(orders) => outcome.orders.extend(orders),
                Err(e) => {
                    tracing::error!("❌ 处理失败 {}: {}", image.path.display(), e);
                    outcome.stats.images_failed += 1;
                }
            }
        }
        outcome.stats.orders_extracted = outcome.orders.len();

        tracing::info!(
            "提取完成: 图片 {}, 失败 {}, 订单 {}",
            outcome.stats.images_total,
            outcome.stats.images_failed,
            outcome.stats.orders_extracted
        );
        outcome
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::PathMetadata;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::path::Path;

    /// 按图片内容返回固定文本的桩模型
    pub(crate) struct StubModel {
        pub replies: HashMap<Vec<u8>, String>,
    }

    #[async_trait]
    impl VisionModel for StubModel {
        async fn extract(&self, image: &[u8], _mime: &str, _prompt: &str) -> Result<String, ExtractError> {
            self.replies.get(image).cloned().ok_or_else(|| ExtractError::Api {
                message: "unknown image".to_string(),
            })
        }
    }

    fn image(dir: &Path, name: &str, content: &str) -> ImageSource {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        ImageSource {
            path,
            metadata: PathMetadata::for_image(name),
        }
    }

    #[tokio::test]
    async fn failures_are_isolated_and_order_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let images = vec![
            image(dir.path(), "1.png", "one"),
            image(dir.path(), "2.png", "two"),
            image(dir.path(), "3.png", "three"),
            image(dir.path(), "4.png", "four"),
        ];
        let replies = HashMap::from([
            (b"one".to_vec(), "```json\n[{\"订单编号\": \"A\"}, {\"订单编号\": \"B\"}]\n```".to_string()),
            (b"two".to_vec(), "识别失败".to_string()),
            (b"three".to_vec(), "{\"订单编号\": \"C\"}".to_string()),
        ]);
        let extractor = OrderExtractor::new(Arc::new(StubModel { replies }), "prompt", 3);

        let outcome = extractor.extract_all(images).await;
        assert_eq!(
            outcome.stats,
            ExtractionStats {
                images_total: 4,
                images_failed: 2,
                orders_extracted: 3,
            }
        );
        let numbers: Vec<_> = outcome.orders.iter().map(|o| o["订单编号"].clone()).collect();
        assert_eq!(numbers, vec!["A", "B", "C"]);
        assert_eq!(outcome.orders[2]["图片名称"], "3.png");
    }

    #[tokio::test]
    async fn missing_image_file_is_a_read_error() {
        let extractor = OrderExtractor::new(
            Arc::new(StubModel {
                replies: HashMap::new(),
            }),
            "prompt",
            1,
        );
        let source = ImageSource {
            path: "/nonexistent/a.png".into(),
            metadata: PathMetadata::for_image("a.png"),
        };
        let err = extractor.extract_image(&source).await.unwrap_err();
        assert!(matches!(err, ExtractError::ImageRead { .. }));
    }
}
