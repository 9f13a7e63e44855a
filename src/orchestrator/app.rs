//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! - 在任何处理开始前校验配置（缺少 API 密钥直接失败）
//! - 组装识别服务和批量处理器
//! - 输出启动横幅和最终统计信息

use std::time::Duration;

use tracing::info;

use crate::config::Config;
use crate::error::AppResult;
use crate::models::BatchStats;
use crate::orchestrator::BatchProcessor;
use crate::services::GeminiService;

/// 应用主结构
pub struct App {
    config: Config,
    processor: BatchProcessor<GeminiService>,
}

impl App {
    /// 初始化应用
    ///
    /// 校验配置并组装各服务；配置不完整时在任何处理开始前失败。
    pub fn initialize(config: Config) -> AppResult<Self> {
        config.validate()?;

        log_startup(&config);

        let recognizer = GeminiService::new(&config);
        let processor = BatchProcessor::new(&config, recognizer);

        Ok(Self { config, processor })
    }

    /// 运行应用主逻辑
    ///
    /// # 返回
    /// 返回是否至少有一页提取成功（成功时报告已写出）
    pub async fn run(&self) -> AppResult<bool> {
        let start = std::time::Instant::now();

        let stats = self.processor.process_folder(None).await?;

        print_final_stats(&stats, start.elapsed(), &self.config);

        Ok(stats.success > 0)
    }
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 漫画 OCR 批处理模式");
    info!("📖 模型: {}", config.model);
    info!("🈯 源语言: {}", config.manga_language.as_str());
    info!("📁 图片文件夹: {}", config.image_folder);
    info!("{}", "=".repeat(60));
}

fn print_final_stats(stats: &BatchStats, elapsed: Duration, config: &Config) {
    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", stats.success, stats.total);
    info!("❌ 失败: {}", stats.errors);
    info!("⏱️ 耗时: {:.2} 秒", elapsed.as_secs_f64());
    info!("{}", "=".repeat(60));

    if stats.success > 0 {
        info!("\n结果已保存至: {}", config.output_file);
    }
}
