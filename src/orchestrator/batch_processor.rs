//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：输出目录、注册表、获取策略
//! 2. **资源管理**：持有 HTTP 客户端和浏览器启动器（通过各个策略）
//! 3. **全局统计**：汇总所有供应商的处理结果
//!
//! 单个供应商的细节交给 `AcquisitionOrchestrator` 和 workflow 层。

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::browser::ChromiumLauncher;
use crate::config::Config;
use crate::infrastructure::{HttpClient, TesseractRecognizer};
use crate::models::{load_registry_file, Registry};
use crate::orchestrator::acquisition::{AcquisitionOrchestrator, RunSummary};
use crate::services::{InteractiveRetriever, OcrExtractionPipeline, PriceLineFilter, StaticLinkRetriever};
use crate::utils::logging;

/// 应用主结构
pub struct App {
    config: Config,
    orchestrator: AcquisitionOrchestrator,
}

impl App {
    /// 初始化应用
    ///
    /// `only` 非空时只处理其中列出的供应商。
    pub async fn initialize(config: Config, only: &[String]) -> Result<Self> {
        logging::log_startup(&config);

        tokio::fs::create_dir_all(&config.output_dir)
            .await
            .with_context(|| format!("无法创建输出目录 {}", config.output_dir.display()))?;

        let mut registry = load_registry(&config).await?;
        registry.retain_only(only);

        let http = HttpClient::new(&config).context("HTTP 客户端配置无效（检查 USER_AGENT）")?;
        let launcher = Arc::new(ChromiumLauncher::new(&config));

        let orchestrator = AcquisitionOrchestrator::new(registry, config.verbose_logging)
            .with_strategy(Arc::new(StaticLinkRetriever::new(&config, http)))
            .with_strategy(Arc::new(InteractiveRetriever::new(&config, launcher)));

        Ok(Self {
            config,
            orchestrator,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<RunSummary> {
        let registry = self.orchestrator.registry();
        if registry.is_empty() {
            warn!("⚠️ 注册表中没有可处理的供应商，程序结束");
            return Ok(RunSummary::default());
        }

        logging::log_vendors_loaded(registry.len(), &self.config.output_dir);

        let summary = self.orchestrator.run().await;

        logging::print_final_stats(&summary, &self.config.output_log_file);

        Ok(summary)
    }
}

async fn load_registry(config: &Config) -> Result<Registry> {
    match &config.registry_file {
        Some(path) => {
            info!("📁 读取注册表: {}", path.display());
            Ok(load_registry_file(path).await?)
        }
        None => {
            info!("📁 使用内置注册表");
            Ok(Registry::builtin()?)
        }
    }
}

/// 对单个文档做 OCR，`filter` 存在时只返回命中型号的行
pub async fn extract_document(
    config: &Config,
    document: &Path,
    page_index: usize,
    filter: Option<&PriceLineFilter>,
) -> Result<String> {
    if !TesseractRecognizer::is_available() {
        warn!("⚠️ PATH 中找不到 tesseract，识别可能失败");
    }

    let pipeline = OcrExtractionPipeline::new(config);
    let text = pipeline
        .extract_page(document, page_index)
        .await
        .with_context(|| format!("无法识别 {} 第 {} 页", document.display(), page_index + 1))?;

    Ok(match filter {
        Some(filter) => {
            info!("按型号筛选: {}", filter.models().join(", "));
            filter.matching_lines(&text).join("\n")
        }
        None => text,
    })
}
