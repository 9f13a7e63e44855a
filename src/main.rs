use anyhow::Result;
use gemini_manga_ocr::logger;
use gemini_manga_ocr::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logger::init(&config);

    // 初始化并运行应用
    let success = App::initialize(config)?.run().await?;

    if success {
        println!("\n✅ OCR 处理完成");
    } else {
        println!("\n❌ OCR 处理失败或没有提取到任何文本");
    }

    Ok(())
}
