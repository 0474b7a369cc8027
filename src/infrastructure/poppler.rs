//! PDF 光栅化 - 基础设施层
//!
//! 调用 poppler 的 `pdfinfo` / `pdftoppm`

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use regex::Regex;
use tokio::process::Command;
use tracing::debug;

use crate::error::{OcrError, OcrResult};

/// PDF 光栅化能力
#[async_trait]
pub trait PageRasterizer: Send + Sync {
    /// 文档页数
    async fn page_count(&self, document: &Path) -> OcrResult<usize>;

    /// 把第 `page_index` 页（从 0 开始）渲染为图片，`output_stem` 为不含扩展名的输出路径
    async fn rasterize(&self, document: &Path, page_index: usize, output_stem: &Path) -> OcrResult<PathBuf>;
}

/// poppler-utils 实现
pub struct PopplerRasterizer {
    dpi: u32,
}

impl PopplerRasterizer {
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }
}

#[async_trait]
impl PageRasterizer for PopplerRasterizer {
    async fn page_count(&self, document: &Path) -> OcrResult<usize> {
        let output = Command::new("pdfinfo")
            .arg(document)
            .output()
            .await
            .map_err(|e| OcrError::RasterizationFailed {
                detail: format!("无法运行 pdfinfo (需要安装 poppler-utils): {}", e),
            })?;

        if !output.status.success() {
            return Err(OcrError::RasterizationFailed {
                detail: format!("pdfinfo 失败: {}", String::from_utf8_lossy(&output.stderr)),
            });
        }

        parse_page_count(&String::from_utf8_lossy(&output.stdout)).ok_or_else(|| {
            OcrError::RasterizationFailed {
                detail: "pdfinfo 输出中没有页数".to_string(),
            }
        })
    }

    async fn rasterize(&self, document: &Path, page_index: usize, output_stem: &Path) -> OcrResult<PathBuf> {
        // pdftoppm 的页码从 1 开始
        let page_number = (page_index + 1).to_string();
        debug!("pdftoppm 渲染第 {} 页 (dpi={})", page_number, self.dpi);

        let output = Command::new("pdftoppm")
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number)
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-png")
            .arg("-singlefile")
            .arg(document)
            .arg(output_stem)
            .output()
            .await
            .map_err(|e| OcrError::RasterizationFailed {
                detail: format!("无法运行 pdftoppm: {}", e),
            })?;

        if !output.status.success() {
            return Err(OcrError::RasterizationFailed {
                detail: format!("pdftoppm 失败: {}", String::from_utf8_lossy(&output.stderr)),
            });
        }

        // -singlefile 时输出为 <output_stem>.png
        let mut image_path = output_stem.as_os_str().to_owned();
        image_path.push(".png");
        let image_path = PathBuf::from(image_path);
        if !image_path.exists() {
            return Err(OcrError::RasterizationFailed {
                detail: format!("pdftoppm 没有生成 {}", image_path.display()),
            });
        }
        Ok(image_path)
    }
}

fn parse_page_count(pdfinfo_output: &str) -> Option<usize> {
    let re = Regex::new(r"(?m)^Pages:\s+(\d+)").ok()?;
    re.captures(pdfinfo_output)?.get(1)?.as_str().parse().ok()
}
