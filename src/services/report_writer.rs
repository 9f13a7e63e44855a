//! 报告写入服务 - 业务能力层
//!
//! 只负责"渲染并持久化结果报告"能力，不关心流程：
//! 单页小节格式化、报告头生成、一次性写入输出文件。

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{BatchStats, PageExtraction};

/// 报告写入服务
pub struct ReportWriter {
    output_file: PathBuf,
    model: String,
    separate_pages: bool,
    include_filename: bool,
    add_page_numbers: bool,
    include_timestamp: bool,
}

impl ReportWriter {
    /// 创建新的报告写入服务
    pub fn new(config: &Config) -> Self {
        Self {
            output_file: PathBuf::from(&config.output_file),
            model: config.model.clone(),
            separate_pages: config.separate_pages,
            include_filename: config.include_filename,
            add_page_numbers: config.add_page_numbers,
            include_timestamp: config.include_timestamp,
        }
    }

    /// 渲染单页小节
    ///
    /// 纯格式化，除各字段的开关外没有其他分支。
    pub fn format_page(&self, page: &PageExtraction) -> String {
        let mut parts: Vec<String> = Vec::new();

        // 页分隔线（首页之前不插）
        if self.separate_pages && page.page_number > 1 {
            parts.push(format!("\n{}", "=".repeat(80)));
        }

        if self.include_filename {
            parts.push(format!("File: {}", page.file_name));
        }

        if self.add_page_numbers {
            parts.push(format!("Page: {}", page.page_number));
        }

        if self.include_timestamp {
            parts.push(format!(
                "Processed: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            ));
        }

        parts.push("-".repeat(40));
        parts.push(page.text.clone());

        parts.join("\n") + "\n"
    }

    /// 生成报告头（时间戳、模型、统计数字）
    fn header(&self, stats: &BatchStats) -> String {
        format!(
            "Manga OCR Results - Generated on {}\nModel: {}\nTotal Images Processed: {}\nSuccessful Extractions: {}\nErrors: {}\n{}\n\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            self.model,
            stats.total,
            stats.success,
            stats.errors,
            "=".repeat(80),
        )
    }

    /// 写入完整报告
    ///
    /// 一次运行产出一个文件，单次写入，不做部分覆盖。
    pub fn write(&self, sections: &[String], stats: &BatchStats) -> AppResult<()> {
        let mut report = self.header(stats);
        report.push_str(&sections.join("\n"));

        std::fs::write(&self.output_file, report).map_err(|source| AppError::ReportWrite {
            path: self.output_file.clone(),
            source,
        })?;

        debug!("报告已写入: {}", self.output_file.display());
        Ok(())
    }

    /// 输出文件路径
    pub fn output_file(&self) -> &Path {
        &self.output_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(file_name: &str, page_number: usize, text: &str) -> PageExtraction {
        PageExtraction {
            file_name: file_name.to_string(),
            page_number,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_format_page_default_fields() {
        let writer = ReportWriter::new(&Config::default());
        let section = writer.format_page(&page("a.jpg", 1, "你好"));

        assert!(section.contains("File: a.jpg"));
        assert!(section.contains("Page: 1"));
        assert!(section.contains(&"-".repeat(40)));
        assert!(section.contains("你好"));
        // 默认不带时间戳，首页之前不插分隔线
        assert!(!section.contains("Processed:"));
        assert!(!section.contains(&"=".repeat(80)));
    }

    #[test]
    fn test_format_page_separator_from_second_page() {
        let writer = ReportWriter::new(&Config::default());

        let first = writer.format_page(&page("a.jpg", 1, "x"));
        let second = writer.format_page(&page("b.png", 2, "y"));

        assert!(!first.contains(&"=".repeat(80)));
        assert!(second.starts_with(&format!("\n{}", "=".repeat(80))));
    }

    #[test]
    fn test_format_page_field_toggles() {
        let config = Config {
            include_filename: false,
            add_page_numbers: false,
            include_timestamp: true,
            separate_pages: false,
            ..Config::default()
        };
        let writer = ReportWriter::new(&config);
        let section = writer.format_page(&page("a.jpg", 2, "text"));

        assert!(!section.contains("File:"));
        assert!(!section.contains("Page:"));
        assert!(section.contains("Processed:"));
        assert!(!section.contains(&"=".repeat(80)));
    }

    #[test]
    fn test_header_contains_model_and_counters() {
        let config = Config {
            model: "gemini-1.5-pro".to_string(),
            ..Config::default()
        };
        let writer = ReportWriter::new(&config);
        let stats = BatchStats {
            total: 5,
            success: 4,
            errors: 1,
        };
        let header = writer.header(&stats);

        assert!(header.contains("Model: gemini-1.5-pro"));
        assert!(header.contains("Total Images Processed: 5"));
        assert!(header.contains("Successful Extractions: 4"));
        assert!(header.contains("Errors: 1"));
    }

    #[test]
    fn test_write_produces_single_file() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        let output = dir.path().join("report.txt");
        let config = Config {
            output_file: output.to_string_lossy().to_string(),
            ..Config::default()
        };
        let writer = ReportWriter::new(&config);

        let sections = vec![
            writer.format_page(&page("a.jpg", 1, "第一页")),
            writer.format_page(&page("b.png", 2, "第二页")),
        ];
        let stats = BatchStats {
            total: 2,
            success: 2,
            errors: 0,
        };

        writer.write(&sections, &stats).expect("写入应成功");

        let content = std::fs::read_to_string(&output).expect("读取报告失败");
        assert!(content.starts_with("Manga OCR Results - Generated on "));
        assert!(content.contains("第一页"));
        assert!(content.contains("第二页"));
        // 页面按页码顺序出现
        assert!(content.find("第一页").unwrap() < content.find("第二页").unwrap());
    }
}
