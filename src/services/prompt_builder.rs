//! 提示词构建服务 - 业务能力层
//!
//! 只负责"构建识别/翻译提示词"能力，不关心流程。
//! 漫画特有的领域知识（从右到左的阅读顺序、翻译输出格式）
//! 全部集中在这里，以自然语言指令的形式随图片发给模型。

use phf::phf_map;

use crate::config::{Config, MangaLanguage, ReadingOrder, TranslationMode, TranslationStyle};

const BASIC: &str =
    "Extract all text from this manga page image. Return only the text content without descriptions.";

const DETAILED: &str =
    "Carefully extract all text from this manga page including dialogue, sound effects, and any written text. Preserve the reading order and format the output clearly.";

const STRUCTURED: &str = "Extract text from this manga page and organize it as follows:\n- Dialogue: [character dialogue]\n- Sound effects: [onomatopoeia and sound effects]\n- Other text: [signs, captions, etc.]";

const JAPANESE: &str = "この漫画ページから全てのテキストを抽出してください。対話、効果音、その他の文字を含めて、読み順を保って明確に整理してください。";

const CHINESE: &str = "请从这张漫画页面中提取所有文字，包括对话、拟声词和其他文字，保持阅读顺序并清晰整理输出。";

const CHINESE_TRANSLATE: &str = "请提取这张漫画页面中的所有中文文字并翻译成英文。保持阅读顺序，每段文字先给出原文，再给出对应的英文翻译。";

/// 命名提示词模板注册表
///
/// 以 `_translate` 结尾的模板自带翻译指令，选中后不再追加翻译区块。
pub static OCR_PROMPTS: phf::Map<&'static str, &'static str> = phf_map! {
    "basic" => BASIC,
    "detailed" => DETAILED,
    "structured" => STRUCTURED,
    "japanese" => JAPANESE,
    "chinese" => CHINESE,
    "chinese_translate" => CHINESE_TRANSLATE,
};

/// 从右到左阅读顺序的固定空间指令
const READING_ORDER_INSTRUCTIONS: &str = r#"

CRITICAL SPATIAL INSTRUCTIONS FOR MANGA:
- The page flows from RIGHT to LEFT, TOP to BOTTOM
- Panel 1 is at the TOP-RIGHT corner
- Panel 2 is to the LEFT of Panel 1
- Continue LEFT across the top row
- Drop down to the next row and start again from the RIGHT
- Within each panel, speech bubbles follow RIGHT-TO-LEFT flow
- Vertical text reads TOP-TO-BOTTOM
- Pay attention to panel borders and speech bubble tails to determine reading sequence

Please number and extract text in this precise order, indicating the spatial position of each text element."#;

/// 提示词构建服务
///
/// 职责：
/// - 根据配置选择基础模板
/// - 按需追加翻译指令区块和阅读顺序指令区块
/// - 构建纯文本翻译提示词
/// - 只产出字符串，不发起任何调用
///
/// 构建过程永不失败，缺省项全部来自 `Config` 的默认值。
pub struct PromptBuilder {
    default_prompt: String,
    manga_language: MangaLanguage,
    reading_order: ReadingOrder,
    enable_translation: bool,
    source_language: String,
    target_language: String,
    translation_mode: TranslationMode,
    translation_style: TranslationStyle,
    preserve_original: bool,
}

impl PromptBuilder {
    /// 创建新的提示词构建服务
    pub fn new(config: &Config) -> Self {
        Self {
            default_prompt: config.default_prompt.clone(),
            manga_language: config.manga_language,
            reading_order: config.reading_order,
            enable_translation: config.enable_translation,
            source_language: config.source_language.clone(),
            target_language: config.target_language.clone(),
            translation_mode: config.translation_mode,
            translation_style: config.translation_style,
            preserve_original: config.preserve_original,
        }
    }

    /// 构建随图片提交的识别提示词
    ///
    /// 相同配置下输出完全确定：同一个基础模板 + 同一组追加区块。
    pub fn build_ocr_prompt(&self) -> String {
        let (template_key, template_text) = self.select_base_template();
        let mut prompt = template_text.to_string();

        // 翻译区块：仅当启用翻译且基础模板本身不是翻译专用模板时追加
        if self.enable_translation && !template_key.ends_with("_translate") {
            prompt.push_str(&self.translation_instructions());
        }

        // 阅读顺序区块：当且仅当配置为从右到左时追加
        if self.reading_order == ReadingOrder::RightToLeft {
            prompt.push_str(READING_ORDER_INSTRUCTIONS);
        }

        prompt
    }

    /// 选择基础模板
    ///
    /// 固定优先级，消除原有分支的歧义：
    /// 1. 显式指定的模板（`default_prompt` 不为 `basic` 且在注册表中）
    /// 2. 中文源 + 翻译启用 → 专用提取+翻译模板
    /// 3. 语言默认模板（中文/日文）
    /// 4. 通用 `detailed` 模板兜底
    fn select_base_template(&self) -> (&str, &'static str) {
        if self.default_prompt != "basic" {
            if let Some(text) = OCR_PROMPTS.get(self.default_prompt.as_str()) {
                return (self.default_prompt.as_str(), *text);
            }
        }

        if self.enable_translation && self.manga_language == MangaLanguage::Chinese {
            return ("chinese_translate", CHINESE_TRANSLATE);
        }

        match self.manga_language {
            MangaLanguage::Chinese => ("chinese", CHINESE),
            MangaLanguage::Japanese => ("japanese", JAPANESE),
            MangaLanguage::English => ("detailed", DETAILED),
        }
    }

    /// 构建翻译指令区块
    ///
    /// 按配置参数化：源/目标语言、翻译风格、是否保留原文、输出模式。
    /// 输出模式恰好选中三种格式子区块之一。
    fn translation_instructions(&self) -> String {
        let mut instructions = format!(
            r#"

TRANSLATION INSTRUCTIONS:
- Translate all extracted {source} text to {target}
- Translation style: {style}
- Preserve original text: {preserve}
- Output mode: {mode}

Translation Guidelines:
- For 'natural' style: Provide fluent, contextual translations
- For 'literal' style: Stay close to original meaning and structure
- For 'localized' style: Adapt cultural references and idioms
- Maintain the emotional tone and character personality
- Keep sound effects descriptive but culturally appropriate"#,
            source = self.source_language,
            target = self.target_language,
            style = self.translation_style.as_str(),
            preserve = if self.preserve_original { "Yes" } else { "No" },
            mode = self.translation_mode.as_str(),
        );

        match self.translation_mode {
            TranslationMode::Inline => {
                instructions.push_str(
                    r#"

OUTPUT FORMAT (Inline):
Panel X: [Original text] → [Translation]"#,
                );
            }
            TranslationMode::Separate => {
                instructions.push_str(&format!(
                    r#"

OUTPUT FORMAT (Separate):
=== ORIGINAL TEXT ===
[All original text in reading order]

=== {} TRANSLATION ===
[All translations in same order]"#,
                    self.target_language.to_uppercase()
                ));
            }
            TranslationMode::Both => {
                instructions.push_str(
                    r#"

OUTPUT FORMAT (Both):
=== DETAILED EXTRACTION ===
Panel X: [Original] → [Translation]

=== ORIGINAL TEXT ONLY ===
[All original text]

=== TRANSLATIONS ONLY ===
[All translations]"#,
                );
            }
        }

        instructions
    }

    /// 构建纯文本翻译提示词（不带图片的第二类调用）
    pub fn build_translation_prompt(&self, text: &str) -> String {
        format!(
            r#"Translate the following {source} text to {target}.

Translation style: {style}
- For 'natural': Provide fluent, contextual translations
- For 'literal': Stay close to original meaning
- For 'localized': Adapt cultural references

Text to translate:
{text}

Provide only the translation, maintaining the original formatting and structure."#,
            source = self.source_language,
            target = self.target_language,
            style = self.translation_style.as_str(),
            text = text,
        )
    }
}
