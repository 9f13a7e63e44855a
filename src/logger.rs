//! 日志初始化模块
//!
//! 控制台输出由 `verbose_output` 控制，错误日志文件由
//! `save_error_log` 控制；`RUST_LOG` 环境变量优先于 `debug_mode`。

use std::fs::File;
use std::sync::Arc;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::Config;

/// 初始化日志
pub fn init(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if config.debug_mode { "debug" } else { "info" }));

    let console_layer = config.verbose_output.then(|| fmt::layer());

    let file_layer = if config.save_error_log {
        match File::create(&config.error_log_file) {
            Ok(file) => Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file))),
            Err(e) => {
                eprintln!("无法创建日志文件 {}: {}", config.error_log_file, e);
                None
            }
        }
    } else {
        None
    };

    // 重复初始化（测试场景）静默忽略
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}
