//! 业务能力层
//!
//! 每个服务只处理单个供应商，不关心批量流程。
//! 两种获取方式都实现 `RetrievalStrategy`，编排层只依赖这个 trait。

pub mod document_namer;
pub mod interactive;
pub mod normalizer;
pub mod ocr_pipeline;
pub mod price_lines;
pub mod static_link;

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{AcquireError, AcquireResult};
use crate::models::{StrategyKind, VendorEntry};

pub use document_namer::canonical_name;
pub use interactive::InteractiveRetriever;
pub use normalizer::DownloadNormalizer;
pub use ocr_pipeline::{OcrExtractionPipeline, RasterPage};
pub use price_lines::PriceLineFilter;
pub use static_link::StaticLinkRetriever;

/// 获取策略
#[async_trait]
pub trait RetrievalStrategy: Send + Sync {
    /// 该策略处理的获取方式
    fn kind(&self) -> StrategyKind;

    /// 获取一个供应商的文档，成功时返回规范路径
    async fn acquire(&self, entry: &VendorEntry) -> AcquireResult<PathBuf>;
}

/// 在输出目录下创建一次获取专用的临时目录
///
/// 每次获取只在自己的目录里产出文件，规范化时不会误选其它文件。
pub(crate) fn scoped_download_dir(output_dir: &Path) -> AcquireResult<tempfile::TempDir> {
    std::fs::create_dir_all(output_dir).map_err(|e| AcquireError::filesystem(output_dir, e))?;
    tempfile::Builder::new()
        .prefix(".download-")
        .tempdir_in(output_dir)
        .map_err(|e| AcquireError::filesystem(output_dir, e))
}
