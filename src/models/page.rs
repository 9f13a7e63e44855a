/// 单页提取结果
///
/// 页码是该文件在批次内按文件名排序后的 1 起始位置，
/// 跳过的文件不会让后续页码前移。
#[derive(Debug, Clone)]
pub struct PageExtraction {
    /// 源图片文件名（不含路径）
    pub file_name: String,
    /// 页码（1 起始）
    pub page_number: usize,
    /// 提取出的文本
    pub text: String,
}

/// 批处理统计
///
/// 不变量: success + errors <= total
#[derive(Debug, Default, Clone, Copy)]
pub struct BatchStats {
    /// 匹配到的文件总数
    pub total: usize,
    /// 成功提取的页数
    pub success: usize,
    /// 跳过（预处理失败、识别失败、空结果）的文件数
    pub errors: usize,
}
