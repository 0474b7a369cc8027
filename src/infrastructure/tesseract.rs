//! OCR 引擎 - 基础设施层

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::error::{OcrError, OcrResult};

/// 图片 → 文本
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    async fn recognize(&self, image: &Path) -> OcrResult<String>;
}

/// 调用 `tesseract` 命令行
pub struct TesseractRecognizer {
    lang: String,
}

impl TesseractRecognizer {
    pub fn new(lang: impl Into<String>) -> Self {
        Self { lang: lang.into() }
    }

    /// PATH 中是否有 tesseract
    pub fn is_available() -> bool {
        which::which("tesseract").is_ok()
    }
}

#[async_trait]
impl TextRecognizer for TesseractRecognizer {
    async fn recognize(&self, image: &Path) -> OcrResult<String> {
        debug!("tesseract 识别: {} (lang={})", image.display(), self.lang);

        let output = Command::new("tesseract")
            .arg(image)
            .arg("stdout")
            .arg("-l")
            .arg(&self.lang)
            .output()
            .await
            .map_err(|e| OcrError::RecognitionUnavailable {
                detail: format!("无法运行 tesseract (需要安装 tesseract-ocr): {}", e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("tesseract 退出码异常: {}", stderr);
            return Err(OcrError::RecognitionUnavailable {
                detail: format!("tesseract 失败: {}", stderr),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}
