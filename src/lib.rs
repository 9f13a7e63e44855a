//! # Gemini Manga OCR
//!
//! 把整夹漫画页面图片交给远端多模态模型做文字提取（可选翻译），
//! 汇总成单个结果报告的批处理工具
//!
//! ## 架构设计
//!
//! 本系统采用严格的三层架构：
//!
//! ### ① 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单张图片
//! - `PromptBuilder` - 提示词构建能力（阅读顺序、翻译格式的领域知识都在这里）
//! - `ImageService` - 图片预处理能力
//! - `GeminiService` - 远端识别/翻译能力（`TextRecognizer` 接口的实现）
//! - `ReportWriter` - 报告渲染与落盘能力
//!
//! ### ② 流程层（Workflow）
//! - `workflow/` - 定义"一张图片"的完整处理流程
//! - `PageFlow` - 流程编排（预处理 → 提示词 → 识别 → 调试产物）
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量处理器，扫描、排序、串行折叠、限速
//! - `orchestrator/app` - 应用入口，配置校验和最终统计
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod workflow;

// 重新导出常用类型
pub use config::{Config, MangaLanguage, ReadingOrder, TranslationMode, TranslationStyle};
pub use error::{AppError, AppResult};
pub use models::{BatchStats, PageExtraction};
pub use orchestrator::{scan_image_files, App, BatchProcessor};
pub use services::{
    GeminiService, ImageService, PreparedImage, PromptBuilder, ReportWriter, TextRecognizer,
};
pub use workflow::PageFlow;
