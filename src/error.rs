use std::path::PathBuf;

use thiserror::Error;

/// 应用程序错误类型
///
/// 每个变体对应批处理流程中一个明确的失败阶段，
/// 并携带定位问题所需的上下文（文件名、模型名等）。
#[derive(Debug, Error)]
pub enum AppError {
    /// 配置错误（缺少 API 密钥等必需设置），在任何处理开始前终止程序
    #[error("配置错误: {0}")]
    Configuration(String),

    /// 目标文件夹不存在，本次批处理直接失败，不尝试任何文件
    #[error("文件夹不存在: {}", .path.display())]
    FolderNotFound { path: PathBuf },

    /// 图片无法打开或解码，跳过该文件并计入错误统计
    #[error("图片预处理失败 ({}): {}", .path.display(), .source)]
    Preprocess {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// 识别 API 调用失败（网络或服务端错误）
    #[error("识别 API 调用失败: {source}")]
    Recognition {
        #[from]
        source: async_openai::error::OpenAIError,
    },

    /// API 调用成功但没有返回任何文本，与硬性失败区分开
    #[error("识别结果为空 (模型: {model})")]
    EmptyResult { model: String },

    /// 结果报告无法写入，即使所有页面都已提取成功也视为批处理失败
    #[error("报告写入失败 ({}): {}", .path.display(), .source)]
    ReportWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;
