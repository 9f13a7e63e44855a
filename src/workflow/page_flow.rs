//! 单页处理流程 - 流程层
//!
//! 核心职责：定义"一张图片"的完整处理流程
//!
//! 流程顺序：
//! 1. 预处理图片
//! 2. 构建识别提示词
//! 3. 调用识别服务
//! 4. 可选：保存原始响应（调试用）

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::AppResult;
use crate::models::PageExtraction;
use crate::services::{ImageService, PromptBuilder, TextRecognizer};

/// 单页处理流程
///
/// - 编排一张图片从文件到文本的完整流程
/// - 只依赖业务能力（services）
/// - 跳过/继续策略在编排层决定，这里只返回结果
pub struct PageFlow<R> {
    prompt_builder: PromptBuilder,
    image_service: ImageService,
    recognizer: R,
    save_api_responses: bool,
    /// 调试产物写到输出文件所在目录
    debug_dir: PathBuf,
}

impl<R: TextRecognizer> PageFlow<R> {
    /// 创建新的单页处理流程
    pub fn new(config: &Config, recognizer: R) -> Self {
        let debug_dir = Path::new(&config.output_file)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            prompt_builder: PromptBuilder::new(config),
            image_service: ImageService::new(config),
            recognizer,
            save_api_responses: config.save_api_responses,
            debug_dir,
        }
    }

    /// 处理单张图片
    ///
    /// # 参数
    /// - `path`: 图片文件路径
    /// - `page_number`: 该文件在批次排序中的页码（1 起始）
    ///
    /// # 返回
    /// 返回该页的提取结果；任一阶段失败时返回对应的错误，
    /// 由编排层决定跳过还是中止。
    pub async fn run(&self, path: &Path, page_number: usize) -> AppResult<PageExtraction> {
        let file_name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        info!("正在处理: {}", file_name);

        // 1. 预处理图片
        let image = self.image_service.prepare(path)?;

        // 2. 构建提示词（每张图重新构建，配置可能随运行变化）
        let prompt = self.prompt_builder.build_ocr_prompt();
        debug!("提示词长度: {} 字符", prompt.len());

        // 3. 调用识别服务
        let text = self.recognizer.recognize(&prompt, &image).await?;

        info!("✓ 成功提取文本: {}", file_name);

        // 4. 保存原始响应（调试用，失败只警告）
        if self.save_api_responses {
            self.save_api_response(&text, &file_name);
        }

        Ok(PageExtraction {
            file_name,
            page_number,
            text,
        })
    }

    /// 翻译一段已提取的文本（不带图片的第二类调用）
    pub async fn translate_text(&self, text: &str) -> AppResult<String> {
        let prompt = self.prompt_builder.build_translation_prompt(text);
        self.recognizer.translate(&prompt).await
    }

    /// 保存 API 原始响应，失败只记录警告，不影响主结果
    fn save_api_response(&self, text: &str, file_name: &str) {
        let target = self.debug_dir.join(format!("response_{}.txt", file_name));
        match std::fs::write(&target, text) {
            Ok(_) => debug!("已保存 API 响应: {}", target.display()),
            Err(e) => warn!("保存 API 响应失败 ({}): {}", target.display(), e),
        }
    }
}
