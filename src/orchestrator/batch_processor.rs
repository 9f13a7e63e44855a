//! 批量图片处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **文件扫描**：按扩展名匹配、去重、按路径字典序排序
//! 2. **串行处理**：一张图片完整走完流程后才开始下一张
//! 3. **显式折叠**：把每个文件的成功/失败结果折叠进统计计数
//! 4. **客户端限速**：每次成功请求后固定等待
//! 5. **报告落盘**：至少一页成功时写出结果报告
//!
//! ## 设计特点
//!
//! - 排序后的文件位置（1 起始）就是页码，跳过的文件不让后续页码前移
//! - 跳过/中止策略由 `continue_on_error` 决定：
//!   开启时记录并继续，关闭时立即中止且不写任何报告

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::time::sleep;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::BatchStats;
use crate::services::{ReportWriter, TextRecognizer};
use crate::workflow::PageFlow;

/// 扫描文件夹中所有受支持的图片文件
///
/// # 参数
/// - `folder`: 目标文件夹
/// - `extensions`: 支持的扩展名（带不带点均可，大小写不敏感）
///
/// # 返回
/// 返回去重并按路径字典序排序的文件列表，这个顺序就是权威的页码顺序。
pub fn scan_image_files(folder: &Path, extensions: &[String]) -> AppResult<Vec<PathBuf>> {
    if !folder.exists() {
        return Err(AppError::FolderNotFound {
            path: folder.to_path_buf(),
        });
    }

    let normalized: Vec<String> = extensions
        .iter()
        .map(|e| e.trim_start_matches('.').to_lowercase())
        .collect();

    // BTreeSet 同时完成去重和字典序排序
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();

    let entries = std::fs::read_dir(folder).map_err(|_| AppError::FolderNotFound {
        path: folder.to_path_buf(),
    })?;

    for entry in entries.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(ext) = path.extension().and_then(|s| s.to_str()) {
            if normalized.iter().any(|e| *e == ext.to_lowercase()) {
                files.insert(path);
            }
        }
    }

    Ok(files.into_iter().collect())
}

/// 批量图片处理器
pub struct BatchProcessor<R> {
    flow: PageFlow<R>,
    report_writer: ReportWriter,
    image_folder: PathBuf,
    supported_extensions: Vec<String>,
    request_delay: f64,
    continue_on_error: bool,
}

impl<R: TextRecognizer> BatchProcessor<R> {
    /// 创建新的批量处理器
    pub fn new(config: &Config, recognizer: R) -> Self {
        Self {
            flow: PageFlow::new(config, recognizer),
            report_writer: ReportWriter::new(config),
            image_folder: PathBuf::from(&config.image_folder),
            supported_extensions: config.supported_extensions.clone(),
            request_delay: config.request_delay,
            continue_on_error: config.continue_on_error,
        }
    }

    /// 处理整个文件夹
    ///
    /// # 参数
    /// - `folder`: 覆盖配置中的目标文件夹（可选）
    ///
    /// # 返回
    /// 返回批处理统计。`continue_on_error` 关闭时，任一文件失败
    /// 会立即中止并传播错误，此时不写任何报告。
    pub async fn process_folder(&self, folder: Option<&Path>) -> AppResult<BatchStats> {
        let folder = folder
            .map(Path::to_path_buf)
            .unwrap_or_else(|| self.image_folder.clone());

        info!("📁 正在扫描图片文件夹: {}", folder.display());
        let files = scan_image_files(&folder, &self.supported_extensions)?;

        let mut stats = BatchStats {
            total: files.len(),
            ..Default::default()
        };

        if files.is_empty() {
            warn!("⚠️ 文件夹中没有受支持的图片文件: {}", folder.display());
            return Ok(stats);
        }

        info!("✓ 找到 {} 个图片文件", files.len());

        let mut sections: Vec<String> = Vec::new();

        for (idx, path) in files.iter().enumerate() {
            // 页码 = 排序后的位置，跳过的文件保留自己的页码槽位
            let page_number = idx + 1;
            log_page_start(page_number, files.len(), path);

            match self.flow.run(path, page_number).await {
                Ok(page) => {
                    stats.success += 1;
                    sections.push(self.report_writer.format_page(&page));

                    // 固定间隔限速，只在成功请求后等待
                    self.rate_limit_delay().await;
                }
                Err(e) => {
                    stats.errors += 1;
                    log_page_error(page_number, path, &e);

                    if !self.continue_on_error {
                        return Err(e);
                    }
                }
            }
        }

        if stats.success > 0 {
            self.report_writer.write(&sections, &stats)?;
            info!(
                "📄 报告已保存至: {}",
                self.report_writer.output_file().display()
            );
        } else {
            warn!("⚠️ 没有从任何图片中提取到文本，不生成报告");
        }

        Ok(stats)
    }

    async fn rate_limit_delay(&self) {
        if self.request_delay > 0.0 {
            sleep(Duration::from_secs_f64(self.request_delay)).await;
        }
    }
}

// ========== 日志辅助函数 ==========

fn log_page_start(page_number: usize, total: usize, path: &Path) {
    info!("\n{}", "─".repeat(30));
    info!(
        "处理第 {}/{} 张图片: {}",
        page_number,
        total,
        path.file_name().unwrap_or_default().to_string_lossy()
    );
}

fn log_page_error(page_number: usize, path: &Path, err: &AppError) {
    let file_name = path.file_name().unwrap_or_default().to_string_lossy();
    match err {
        // 空结果只是警告，与硬性失败区分开
        AppError::EmptyResult { .. } => {
            warn!("⚠️ 第 {} 页跳过 ({}): {}", page_number, file_name, err);
        }
        _ => {
            error!("❌ 第 {} 页处理失败 ({}): {}", page_number, file_name, err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(dir: &Path, name: &str) {
        std::fs::write(dir.join(name), b"x").expect("写入测试文件失败");
    }

    fn default_extensions() -> Vec<String> {
        Config::default().supported_extensions
    }

    #[test]
    fn test_scan_sorts_lexicographically() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        touch(dir.path(), "b.png");
        touch(dir.path(), "a.jpg");
        touch(dir.path(), "c.bmp");
        touch(dir.path(), "notes.txt");

        let files = scan_image_files(dir.path(), &default_extensions()).expect("扫描应成功");

        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.jpg", "b.png", "c.bmp"]);
    }

    #[test]
    fn test_scan_matches_extensions_case_insensitively() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        touch(dir.path(), "upper.PNG");
        touch(dir.path(), "mixed.JpEg");
        touch(dir.path(), "skip.pdf");

        let files = scan_image_files(dir.path(), &default_extensions()).expect("扫描应成功");
        assert_eq!(files.len(), 2);
    }

    #[test]
    fn test_scan_missing_folder() {
        let result = scan_image_files(Path::new("/不存在的文件夹"), &default_extensions());
        assert!(matches!(result, Err(AppError::FolderNotFound { .. })));
    }

    #[test]
    fn test_scan_is_stable_across_runs() {
        let dir = tempfile::tempdir().expect("创建临时目录失败");
        touch(dir.path(), "002.png");
        touch(dir.path(), "001.png");
        touch(dir.path(), "010.png");

        let first = scan_image_files(dir.path(), &default_extensions()).expect("扫描应成功");
        let second = scan_image_files(dir.path(), &default_extensions()).expect("扫描应成功");
        assert_eq!(first, second);
    }
}
