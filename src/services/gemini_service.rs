//! 识别服务 - 业务能力层
//!
//! 只负责"调用远端多模态模型"能力，不关心流程
//!
//! ## 技术栈
//! - 使用 `async-openai` crate 进行 API 调用
//! - 通过 OpenAI 兼容端点访问 Gemini（也兼容其他同协议服务）
//! - 本地图片以 base64 data URL 形式随消息提交

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImage,
        ChatCompletionRequestMessageContentPartText, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, ChatCompletionRequestUserMessageContentPart,
        CreateChatCompletionRequestArgs, ImageDetail, ImageUrl,
    },
    Client,
};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::image_service::PreparedImage;

/// 文本识别能力
///
/// 批处理编排只依赖这个接口，测试时可以用桩实现替换真实服务。
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// 提交 (提示词, 图片)，返回提取出的文本
    async fn recognize(&self, prompt: &str, image: &PreparedImage) -> AppResult<String>;

    /// 提交纯文本提示词，返回翻译后的文本
    async fn translate(&self, prompt: &str) -> AppResult<String>;
}

/// Gemini 识别服务
///
/// 职责：
/// - 封装对远端模型的两类调用：带图识别、纯文本翻译
/// - 只处理单次请求，不出现文件列表和页码
/// - 不关心流程顺序
pub struct GeminiService {
    client: Client<OpenAIConfig>,
    model_name: String,
}

impl GeminiService {
    /// 创建新的识别服务
    pub fn new(config: &Config) -> Self {
        // 配置 OpenAI 客户端（兼容 OpenAI API 的服务）
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.api_key)
            .with_api_base(&config.api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.model.clone(),
        }
    }

    /// 发送消息并提取响应文本
    ///
    /// API 故障映射为 `Recognition`；调用成功但没有文本内容映射为
    /// `EmptyResult`，两者在上层的处理方式不同。
    async fn send(&self, messages: Vec<ChatCompletionRequestMessage>) -> AppResult<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(messages)
            .build()?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("识别 API 调用失败: {}", e);
            AppError::Recognition { source: e }
        })?;

        debug!("识别 API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone());

        match content {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(AppError::EmptyResult {
                model: self.model_name.clone(),
            }),
        }
    }
}

#[async_trait]
impl TextRecognizer for GeminiService {
    async fn recognize(&self, prompt: &str, image: &PreparedImage) -> AppResult<String> {
        debug!("调用识别 API，模型: {}", self.model_name);
        debug!(
            "提示词长度: {} 字符, 图片尺寸: {}x{}",
            prompt.len(),
            image.width,
            image.height
        );

        // 构建包含文本和图片的用户消息
        let mut content_parts: Vec<ChatCompletionRequestUserMessageContentPart> = Vec::new();

        content_parts.push(ChatCompletionRequestUserMessageContentPart::Text(
            ChatCompletionRequestMessageContentPartText {
                text: prompt.to_string(),
            },
        ));

        content_parts.push(ChatCompletionRequestUserMessageContentPart::ImageUrl(
            ChatCompletionRequestMessageContentPartImage {
                image_url: ImageUrl {
                    url: image_data_url(&image.jpeg),
                    detail: Some(ImageDetail::Auto),
                },
            },
        ));

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(content_parts))
            .build()?;

        self.send(vec![ChatCompletionRequestMessage::User(user_msg)])
            .await
    }

    async fn translate(&self, prompt: &str) -> AppResult<String> {
        debug!("调用翻译 API，模型: {}", self.model_name);

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?;

        self.send(vec![ChatCompletionRequestMessage::User(user_msg)])
            .await
    }
}

/// 把 JPEG 数据编码为 data URL
fn image_data_url(jpeg: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64_STANDARD.encode(jpeg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_data_url_format() {
        let url = image_data_url(&[0xFF, 0xD8, 0xFF]);
        assert!(url.starts_with("data:image/jpeg;base64,"));
        assert_eq!(url, "data:image/jpeg;base64,/9j/");
    }

    /// 创建测试用的识别服务（读环境变量中的真实密钥）
    fn create_live_service() -> GeminiService {
        let config = Config::from_env();
        GeminiService::new(&config)
    }

    /// 测试真实的带图识别调用
    ///
    /// 运行方式：
    /// ```bash
    /// GEMINI_API_KEY=... cargo test test_recognize_live -- --ignored --nocapture
    /// ```
    #[tokio::test]
    #[ignore]
    async fn test_recognize_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_live_service();

        // 构造一张纯色测试图
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            64,
            64,
            image::Rgb([255, 255, 255]),
        ));
        let mut jpeg = Vec::new();
        let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 90);
        encoder.encode_image(&img).expect("编码测试图片失败");

        let prepared = PreparedImage {
            jpeg,
            width: 64,
            height: 64,
        };

        println!("\n========== 测试带图识别调用 ==========");
        let result = service
            .recognize("Describe any text visible in this image.", &prepared)
            .await;

        match result {
            Ok(text) => {
                println!("✅ 识别调用成功: {}", text);
                assert!(!text.is_empty());
            }
            Err(AppError::EmptyResult { .. }) => {
                // 空白图片没有文字是合理结果
                println!("⚠️ 模型没有返回文本（空白图片）");
            }
            Err(e) => {
                println!("❌ 识别调用失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }

    /// 测试真实的纯文本翻译调用
    #[tokio::test]
    #[ignore]
    async fn test_translate_live() {
        let _ = tracing_subscriber::fmt::try_init();

        let service = create_live_service();

        println!("\n========== 测试纯文本翻译调用 ==========");
        let result = service
            .translate("Translate the following Chinese text to English.\n\n你好，世界")
            .await;

        match result {
            Ok(text) => {
                println!("✅ 翻译调用成功: {}", text);
                assert!(!text.is_empty());
            }
            Err(e) => {
                println!("❌ 翻译调用失败: {}", e);
                panic!("测试失败: {}", e);
            }
        }
    }
}
