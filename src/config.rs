use std::path::Path;

use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// 漫画源语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MangaLanguage {
    English,
    Japanese,
    Chinese,
}

impl MangaLanguage {
    /// 尝试从字符串解析语言（大小写不敏感）
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "english" => Some(MangaLanguage::English),
            "japanese" => Some(MangaLanguage::Japanese),
            "chinese" => Some(MangaLanguage::Chinese),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            MangaLanguage::English => "English",
            MangaLanguage::Japanese => "Japanese",
            MangaLanguage::Chinese => "Chinese",
        }
    }
}

/// 阅读顺序
///
/// 传统漫画（日漫）为从右到左，西方漫画为从左到右。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReadingOrder {
    RightToLeft,
    LeftToRight,
}

impl ReadingOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "right-to-left" | "rtl" => Some(ReadingOrder::RightToLeft),
            "left-to-right" | "ltr" => Some(ReadingOrder::LeftToRight),
            _ => None,
        }
    }
}

/// 翻译输出模式
///
/// - `inline`: 每条文本后紧跟译文（逐条配对）
/// - `separate`: 原文和译文各为一个完整区块
/// - `both`: 逐条配对 + 原文区块 + 译文区块，共三个区块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    Inline,
    Separate,
    Both,
}

impl TranslationMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inline" => Some(TranslationMode::Inline),
            "separate" => Some(TranslationMode::Separate),
            "both" => Some(TranslationMode::Both),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TranslationMode::Inline => "inline",
            TranslationMode::Separate => "separate",
            TranslationMode::Both => "both",
        }
    }
}

/// 翻译风格
///
/// - `natural`: 流畅自然、符合语境
/// - `literal`: 贴近原文结构
/// - `localized`: 本地化文化表达
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationStyle {
    Natural,
    Literal,
    Localized,
}

impl TranslationStyle {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "natural" => Some(TranslationStyle::Natural),
            "literal" => Some(TranslationStyle::Literal),
            "localized" => Some(TranslationStyle::Localized),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TranslationStyle::Natural => "natural",
            TranslationStyle::Literal => "literal",
            TranslationStyle::Localized => "localized",
        }
    }
}

/// 程序配置文件
///
/// 每个批处理运行构造一份不可变配置，按引用传给各个组件；
/// 测试用例各自构造独立的配置值，不共享可变状态。
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    // --- API 配置 ---
    /// API 密钥（必需）
    pub api_key: String,
    /// OpenAI 兼容端点地址
    pub api_base_url: String,
    /// 模型名称
    pub model: String,

    // --- 文件配置 ---
    /// 漫画图片所在文件夹
    pub image_folder: String,
    /// 结果报告输出文件
    pub output_file: String,
    /// 支持的图片扩展名（带点，大小写不敏感）
    pub supported_extensions: Vec<String>,

    // --- OCR 配置 ---
    /// 默认提示词模板名称
    pub default_prompt: String,
    /// 漫画源语言
    pub manga_language: MangaLanguage,
    /// 阅读顺序
    pub reading_order: ReadingOrder,

    // --- 翻译配置 ---
    /// 是否启用翻译
    pub enable_translation: bool,
    /// 源语言
    pub source_language: String,
    /// 目标语言
    pub target_language: String,
    /// 翻译输出模式
    pub translation_mode: TranslationMode,
    /// 翻译风格
    pub translation_style: TranslationStyle,
    /// 翻译输出中是否保留原文
    pub preserve_original: bool,

    // --- 图片预处理配置 ---
    /// 是否启用对比度/锐度增强
    pub enable_preprocessing: bool,
    /// 超过该尺寸的图片会被等比缩小 (宽, 高)
    pub max_image_size: (u32, u32),
    /// 是否增强对比度
    pub enhance_contrast: bool,
    /// 对比度因子（1.0 = 不变）
    pub contrast_factor: f32,
    /// 是否增强锐度
    pub enhance_sharpness: bool,
    /// 锐度因子（1.0 = 不变）
    pub sharpness_factor: f32,
    /// 重编码 JPEG 质量 (1-100)
    pub image_quality: u8,

    // --- 输出格式配置 ---
    /// 页与页之间插入分隔线
    pub separate_pages: bool,
    /// 每页标注来源文件名
    pub include_filename: bool,
    /// 每页标注页码
    pub add_page_numbers: bool,
    /// 每页标注处理时间戳
    pub include_timestamp: bool,

    // --- 调试配置 ---
    /// 保存预处理后的图片副本
    pub save_processed_images: bool,
    /// 保存 API 原始响应
    pub save_api_responses: bool,
    /// 启用 debug 级别日志
    pub debug_mode: bool,
    /// 是否输出到控制台
    pub verbose_output: bool,
    /// 是否写错误日志文件
    pub save_error_log: bool,
    /// 错误日志文件路径
    pub error_log_file: String,

    // --- 运行配置 ---
    /// 每次请求后的固定延迟（秒），用于客户端限速
    pub request_delay: f64,
    /// 单个文件失败后是否继续处理后续文件
    pub continue_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.0-flash-exp".to_string(),
            image_folder: "images".to_string(),
            output_file: "extracted_manga_text.txt".to_string(),
            supported_extensions: [".png", ".jpg", ".jpeg", ".tiff", ".tif", ".bmp", ".gif", ".webp"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_prompt: "basic".to_string(),
            manga_language: MangaLanguage::English,
            reading_order: ReadingOrder::RightToLeft,
            enable_translation: false,
            source_language: "Chinese".to_string(),
            target_language: "English".to_string(),
            translation_mode: TranslationMode::Inline,
            translation_style: TranslationStyle::Natural,
            preserve_original: true,
            enable_preprocessing: true,
            max_image_size: (1920, 1920),
            enhance_contrast: true,
            contrast_factor: 1.2,
            enhance_sharpness: true,
            sharpness_factor: 1.1,
            image_quality: 95,
            separate_pages: true,
            include_filename: true,
            add_page_numbers: true,
            include_timestamp: false,
            save_processed_images: false,
            save_api_responses: false,
            debug_mode: false,
            verbose_output: true,
            save_error_log: false,
            error_log_file: "gemini_ocr_errors.log".to_string(),
            request_delay: 1.0,
            continue_on_error: true,
        }
    }
}

impl Config {
    /// 从环境变量加载配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        let default = Self::default();
        Self {
            api_key: std::env::var("GEMINI_API_KEY")
                .or_else(|_| std::env::var("GOOGLE_API_KEY"))
                .unwrap_or(default.api_key),
            api_base_url: std::env::var("GEMINI_API_BASE_URL").unwrap_or(default.api_base_url),
            model: std::env::var("GEMINI_MODEL").unwrap_or(default.model),
            image_folder: std::env::var("IMAGE_FOLDER").unwrap_or(default.image_folder),
            output_file: std::env::var("OUTPUT_FILE").unwrap_or(default.output_file),
            default_prompt: std::env::var("DEFAULT_PROMPT").unwrap_or(default.default_prompt),
            manga_language: std::env::var("MANGA_LANGUAGE")
                .ok()
                .and_then(|v| MangaLanguage::parse(&v))
                .unwrap_or(default.manga_language),
            reading_order: std::env::var("READING_ORDER")
                .ok()
                .and_then(|v| ReadingOrder::parse(&v))
                .unwrap_or(default.reading_order),
            enable_translation: std::env::var("ENABLE_TRANSLATION")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.enable_translation),
            source_language: std::env::var("SOURCE_LANGUAGE").unwrap_or(default.source_language),
            target_language: std::env::var("TARGET_LANGUAGE").unwrap_or(default.target_language),
            translation_mode: std::env::var("TRANSLATION_MODE")
                .ok()
                .and_then(|v| TranslationMode::parse(&v))
                .unwrap_or(default.translation_mode),
            translation_style: std::env::var("TRANSLATION_STYLE")
                .ok()
                .and_then(|v| TranslationStyle::parse(&v))
                .unwrap_or(default.translation_style),
            preserve_original: std::env::var("PRESERVE_ORIGINAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.preserve_original),
            enable_preprocessing: std::env::var("ENABLE_IMAGE_PREPROCESSING")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.enable_preprocessing),
            max_image_size: default.max_image_size,
            enhance_contrast: default.enhance_contrast,
            contrast_factor: default.contrast_factor,
            enhance_sharpness: default.enhance_sharpness,
            sharpness_factor: default.sharpness_factor,
            image_quality: default.image_quality,
            separate_pages: default.separate_pages,
            include_filename: default.include_filename,
            add_page_numbers: default.add_page_numbers,
            include_timestamp: std::env::var("INCLUDE_TIMESTAMP")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.include_timestamp),
            save_processed_images: std::env::var("SAVE_PROCESSED_IMAGES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.save_processed_images),
            save_api_responses: std::env::var("SAVE_API_RESPONSES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.save_api_responses),
            debug_mode: std::env::var("DEBUG_MODE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.debug_mode),
            verbose_output: std::env::var("VERBOSE_OUTPUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.verbose_output),
            save_error_log: std::env::var("SAVE_ERROR_LOG")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.save_error_log),
            error_log_file: std::env::var("ERROR_LOG_FILE").unwrap_or(default.error_log_file),
            request_delay: std::env::var("REQUEST_DELAY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.request_delay),
            continue_on_error: std::env::var("CONTINUE_ON_ERROR")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.continue_on_error),
            supported_extensions: default.supported_extensions,
        }
    }

    /// 从 TOML 配置文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Configuration(format!("无法读取配置文件 {}: {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Configuration(format!("无法解析配置文件 {}: {}", path.display(), e)))
    }

    /// 加载配置
    ///
    /// 优先读取 `MANGA_OCR_CONFIG` 指定的 TOML 文件（默认 `config.toml`），
    /// 文件不存在时回退到环境变量。
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("MANGA_OCR_CONFIG").unwrap_or_else(|_| "config.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            Ok(Self::from_env())
        }
    }

    /// 校验必需配置，在任何处理开始前调用
    pub fn validate(&self) -> AppResult<()> {
        if self.api_key.is_empty() {
            return Err(AppError::Configuration(
                "未设置 API 密钥，请通过 GEMINI_API_KEY 环境变量或配置文件提供".to_string(),
            ));
        }
        if self.supported_extensions.is_empty() {
            return Err(AppError::Configuration(
                "supported_extensions 不能为空".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        // 文档化的默认值：翻译关闭、自然风格、逐条配对输出
        assert!(!config.enable_translation);
        assert_eq!(config.translation_style, TranslationStyle::Natural);
        assert_eq!(config.translation_mode, TranslationMode::Inline);
        assert_eq!(config.reading_order, ReadingOrder::RightToLeft);
        assert_eq!(config.default_prompt, "basic");
        assert!(config.continue_on_error);
    }

    #[test]
    fn test_parse_option_enums() {
        assert_eq!(MangaLanguage::parse("Chinese"), Some(MangaLanguage::Chinese));
        assert_eq!(MangaLanguage::parse("JAPANESE"), Some(MangaLanguage::Japanese));
        assert_eq!(MangaLanguage::parse("korean"), None);

        assert_eq!(ReadingOrder::parse("right-to-left"), Some(ReadingOrder::RightToLeft));
        assert_eq!(ReadingOrder::parse("ltr"), Some(ReadingOrder::LeftToRight));

        assert_eq!(TranslationMode::parse("separate"), Some(TranslationMode::Separate));
        assert_eq!(TranslationStyle::parse("Localized"), Some(TranslationStyle::Localized));
    }

    #[test]
    fn test_from_toml() {
        let toml_str = r#"
            api_key = "test-key"
            model = "gemini-1.5-pro"
            manga_language = "chinese"
            reading_order = "left-to-right"
            enable_translation = true
            translation_mode = "separate"
            max_image_size = [1024, 1024]
        "#;

        let config: Config = toml::from_str(toml_str).expect("配置应能解析");
        assert_eq!(config.api_key, "test-key");
        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.manga_language, MangaLanguage::Chinese);
        assert_eq!(config.reading_order, ReadingOrder::LeftToRight);
        assert!(config.enable_translation);
        assert_eq!(config.translation_mode, TranslationMode::Separate);
        assert_eq!(config.max_image_size, (1024, 1024));
        // 未出现的键保持默认值
        assert_eq!(config.image_quality, 95);
    }

    #[test]
    fn test_validate_requires_api_key() {
        let config = Config::default();
        assert!(config.validate().is_err());

        let config = Config {
            api_key: "key".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_ok());
    }
}
