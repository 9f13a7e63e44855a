//! 图片预处理服务 - 业务能力层
//!
//! 只负责"把一张图片整理成可提交的形态"能力，不关心流程：
//! 解码 → 统一 RGB → 按需缩小 → 可选增强 → 重编码 JPEG。

use std::path::{Path, PathBuf};

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// 预处理完成、可直接提交给识别服务的图片
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// JPEG 编码后的图片数据
    pub jpeg: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// 图片预处理服务
pub struct ImageService {
    enable_preprocessing: bool,
    max_image_size: (u32, u32),
    enhance_contrast: bool,
    contrast_factor: f32,
    enhance_sharpness: bool,
    sharpness_factor: f32,
    image_quality: u8,
    save_processed_images: bool,
    /// 调试副本写到输出文件所在目录
    debug_dir: PathBuf,
}

impl ImageService {
    /// 创建新的图片预处理服务
    pub fn new(config: &Config) -> Self {
        let debug_dir = Path::new(&config.output_file)
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));

        Self {
            enable_preprocessing: config.enable_preprocessing,
            max_image_size: config.max_image_size,
            enhance_contrast: config.enhance_contrast,
            contrast_factor: config.contrast_factor,
            enhance_sharpness: config.enhance_sharpness,
            sharpness_factor: config.sharpness_factor,
            image_quality: config.image_quality,
            save_processed_images: config.save_processed_images,
            debug_dir,
        }
    }

    /// 预处理单张图片
    ///
    /// # 参数
    /// - `path`: 图片文件路径
    ///
    /// # 返回
    /// 返回 JPEG 编码后的图片数据及最终尺寸；
    /// 文件无法打开或解码时返回 `AppError::Preprocess`。
    pub fn prepare(&self, path: &Path) -> AppResult<PreparedImage> {
        let img = image::open(path).map_err(|source| AppError::Preprocess {
            path: path.to_path_buf(),
            source,
        })?;

        // 统一转为 RGB，去掉 alpha 通道和调色板模式
        let mut img = DynamicImage::ImageRgb8(img.to_rgb8());

        // 超出尺寸上限时等比缩小
        let (max_w, max_h) = self.max_image_size;
        let (w, h) = img.dimensions();
        if w > max_w || h > max_h {
            img = img.resize(max_w, max_h, FilterType::Lanczos3);
            info!("图片已缩小至 {}x{}", img.width(), img.height());
        }

        if self.enable_preprocessing {
            img = self.enhance(img);
        }

        if self.save_processed_images {
            self.save_debug_copy(&img, path);
        }

        // 重编码为 JPEG 提交给识别服务
        let mut jpeg = Vec::new();
        let mut encoder = JpegEncoder::new_with_quality(&mut jpeg, self.image_quality);
        encoder
            .encode_image(&img)
            .map_err(|source| AppError::Preprocess {
                path: path.to_path_buf(),
                source,
            })?;

        let (width, height) = img.dimensions();
        Ok(PreparedImage {
            jpeg,
            width,
            height,
        })
    }

    /// 应用对比度/锐度增强
    fn enhance(&self, mut img: DynamicImage) -> DynamicImage {
        if self.enhance_contrast {
            // PIL 风格因子（1.0 = 不变）映射为百分比增量
            img = img.adjust_contrast((self.contrast_factor - 1.0) * 100.0);
        }

        if self.enhance_sharpness && self.sharpness_factor > 1.0 {
            img = img.unsharpen(self.sharpness_factor - 1.0, 1);
        }

        img
    }

    /// 保存预处理后的调试副本，失败只记录警告，不影响主流程
    fn save_debug_copy(&self, img: &DynamicImage, source_path: &Path) {
        let file_stem = source_path.file_stem().unwrap_or_default().to_string_lossy();
        let target = self.debug_dir.join(format!("processed_{}.jpg", file_stem));

        match img.save(&target) {
            Ok(_) => debug!("已保存预处理图片: {}", target.display()),
            Err(e) => warn!("保存预处理图片失败 ({}): {}", target.display(), e),
        }
    }
}
