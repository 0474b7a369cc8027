//! # Pricelist Fetch
//!
//! 从各供应商网站获取最新价目表 PDF，并对指定页面做 OCR
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure / Browser）
//! - `infrastructure/` - HTTP 客户端、下载完成检测、poppler / tesseract 外部进程
//! - `browser/` - Chrome 启动与会话，唯一接触 chromiumoxide 的地方
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 只处理单个供应商
//! - `StaticLinkRetriever` / `InteractiveRetriever` - 两种获取方式，都实现 `RetrievalStrategy`
//! - `DownloadNormalizer` - 把下载结果改成规范文件名
//! - `OcrExtractionPipeline` - 单页光栅化 + OCR
//!
//! ### ③ 流程层（Workflow）
//! - `VendorCtx` - 上下文封装（供应商 + 序号）
//! - `AcquisitionFlow` - 执行一次获取并把结果变成 `DownloadResult`
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/acquisition` - 逐个处理注册表中的供应商
//! - `orchestrator/batch_processor` - 应用生命周期和全局统计
//!
//! ## 模块结构

pub mod browser;
pub mod config;
pub mod error;
pub mod infrastructure;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AcquireError, ConfigError, ErrorKind, OcrError};
pub use models::{DownloadResult, Registry, StrategyKind, VendorEntry};
pub use orchestrator::{extract_document, AcquisitionOrchestrator, App, RunSummary};
pub use services::{OcrExtractionPipeline, PriceLineFilter, RetrievalStrategy};
pub use workflow::{AcquisitionFlow, VendorCtx};
