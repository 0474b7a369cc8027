//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 构建注册表和获取策略
//! - 输出全局统计信息
//!
//! ### `acquisition` - 供应商逐个获取
//! - 按注册顺序遍历供应商
//! - 按获取方式分派到 `RetrievalStrategy`
//! - 浏览器启动失败后停用交互式获取
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (App)
//!     ↓
//! acquisition (处理 Vec<VendorEntry>)
//!     ↓
//! workflow::AcquisitionFlow (处理单个供应商)
//!     ↓
//! services (能力层：static_link / interactive / normalizer / ocr)
//!     ↓
//! infrastructure / browser (HTTP、外部进程、Chrome)
//! ```

pub mod acquisition;
pub mod batch_processor;

pub use acquisition::{AcquisitionOrchestrator, RunSummary};
pub use batch_processor::{extract_document, App};
