pub mod gemini_service;
pub mod image_service;
pub mod prompt_builder;
pub mod report_writer;

pub use gemini_service::{GeminiService, TextRecognizer};
pub use image_service::{ImageService, PreparedImage};
pub use prompt_builder::PromptBuilder;
pub use report_writer::ReportWriter;
