//! OCR 提取流程
//!
//! 文档 → 单页光栅图 → 灰度 JPEG → OCR 原始文本。
//! 不做表格解析，只返回识别出的文本。

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{OcrError, OcrResult};
use crate::infrastructure::{PageRasterizer, PopplerRasterizer, TesseractRecognizer, TextRecognizer};

/// 内存中的一页图片，只在一次提取调用内存在
pub struct RasterPage {
    pub page_index: usize,
    image: DynamicImage,
}

impl RasterPage {
    pub fn load(path: &Path, page_index: usize) -> OcrResult<Self> {
        let image = image::open(path)?;
        debug!("已加载第 {} 页: {}x{}", page_index + 1, image.width(), image.height());
        Ok(Self { page_index, image })
    }

    /// 转灰度后保存为 OCR 读取的 JPEG
    pub fn save_for_ocr(&self, path: &Path) -> OcrResult<()> {
        self.image
            .grayscale()
            .to_luma8()
            .save_with_format(path, ImageFormat::Jpeg)?;
        Ok(())
    }
}

/// OCR 提取流程
pub struct OcrExtractionPipeline {
    rasterizer: Box<dyn PageRasterizer>,
    recognizer: Box<dyn TextRecognizer>,
    artifact_dir: PathBuf,
}

impl OcrExtractionPipeline {
    /// 使用 poppler + tesseract
    pub fn new(config: &Config) -> Self {
        Self::with_backends(
            Box::new(PopplerRasterizer::new(config.ocr_dpi)),
            Box::new(TesseractRecognizer::new(config.ocr_lang.clone())),
            config.ocr_artifact_dir.clone(),
        )
    }

    pub fn with_backends(
        rasterizer: Box<dyn PageRasterizer>,
        recognizer: Box<dyn TextRecognizer>,
        artifact_dir: PathBuf,
    ) -> Self {
        Self {
            rasterizer,
            recognizer,
            artifact_dir,
        }
    }

    /// 识别文档第 `page_index` 页（从 0 开始）的文本
    pub async fn extract_page(&self, document: &Path, page_index: usize) -> OcrResult<String> {
        let page_count = self.rasterizer.page_count(document).await?;
        if page_index >= page_count {
            return Err(OcrError::PageOutOfRange {
                page_index,
                page_count,
            });
        }

        info!(
            "🖼️ 光栅化 {} 第 {}/{} 页",
            document.display(),
            page_index + 1,
            page_count
        );
        tokio::fs::create_dir_all(&self.artifact_dir).await?;

        let stem = document
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "document".to_string());
        let artifact_stem = self
            .artifact_dir
            .join(format!("{}_page_{}", stem, page_index + 1));

        let raster_path = self
            .rasterizer
            .rasterize(document, page_index, &artifact_stem)
            .await?;

        let jpeg_path = self
            .artifact_dir
            .join(format!("{}_page_{}.jpeg", stem, page_index + 1));
        {
            let page = RasterPage::load(&raster_path, page_index)?;
            page.save_for_ocr(&jpeg_path)?;
        }
        debug!("中间图片: {}", jpeg_path.display());

        let text = self.recognizer.recognize(&jpeg_path).await?;
        info!("✓ 识别完成，共 {} 行", text.lines().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FakeRasterizer {
        pages: usize,
        rendered: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl PageRasterizer for FakeRasterizer {
        async fn page_count(&self, _document: &Path) -> OcrResult<usize> {
            Ok(self.pages)
        }

        async fn rasterize(&self, _document: &Path, _page_index: usize, output_stem: &Path) -> OcrResult<PathBuf> {
            self.rendered.fetch_add(1, Ordering::SeqCst);
            let path = PathBuf::from(format!("{}.png", output_stem.display()));
            image::RgbImage::from_pixel(16, 8, image::Rgb([200, 10, 10])).save(&path)?;
            Ok(path)
        }
    }

    struct FakeRecognizer {
        text: Option<&'static str>,
    }

    #[async_trait]
    impl TextRecognizer for FakeRecognizer {
        async fn recognize(&self, image: &Path) -> OcrResult<String> {
            assert!(image.exists(), "OCR 前应当已写出中间图片");
            match self.text {
                Some(text) => Ok(text.to_string()),
                None => Err(OcrError::RecognitionUnavailable {
                    detail: "tesseract not found".to_string(),
                }),
            }
        }
    }

    fn pipeline(pages: usize, text: Option<&'static str>, dir: &Path) -> (OcrExtractionPipeline, Arc<AtomicUsize>) {
        let rendered = Arc::new(AtomicUsize::new(0));
        let pipeline = OcrExtractionPipeline::with_backends(
            Box::new(FakeRasterizer {
                pages,
                rendered: Arc::clone(&rendered),
            }),
            Box::new(FakeRecognizer { text }),
            dir.to_path_buf(),
        );
        (pipeline, rendered)
    }

    #[tokio::test]
    async fn extracts_requested_page_text() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, rendered) = pipeline(3, Some("RTX 4070 $899\n"), dir.path());

        let text = pipeline
            .extract_page(Path::new("fuwell.pdf"), 1)
            .await
            .unwrap();

        assert_eq!(text, "RTX 4070 $899\n");
        assert_eq!(rendered.load(Ordering::SeqCst), 1);
        assert!(dir.path().join("fuwell_page_2.png").exists());
        assert!(dir.path().join("fuwell_page_2.jpeg").exists());
    }

    #[tokio::test]
    async fn page_index_past_end_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, rendered) = pipeline(2, Some("unused"), dir.path());

        let err = pipeline
            .extract_page(Path::new("fuwell.pdf"), 2)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            OcrError::PageOutOfRange {
                page_index: 2,
                page_count: 2
            }
        ));
        assert_eq!(rendered.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_engine_is_recognition_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let (pipeline, _) = pipeline(1, None, dir.path());

        let err = pipeline
            .extract_page(Path::new("fuwell.pdf"), 0)
            .await
            .unwrap_err();
        assert!(matches!(err, OcrError::RecognitionUnavailable { .. }));
    }

    #[test]
    fn raster_page_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("p.png");
        image::RgbImage::new(10, 4).save(&png).unwrap();

        let page = RasterPage::load(&png, 0).unwrap();
        assert_eq!(page.page_index, 0);

        let jpeg = dir.path().join("p.jpeg");
        page.save_for_ocr(&jpeg).unwrap();
        let reloaded = image::open(&jpeg).unwrap();
        assert_eq!((reloaded.width(), reloaded.height()), (10, 4));
        assert_eq!(reloaded.color(), image::ColorType::L8);
    }
}
