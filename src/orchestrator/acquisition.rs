//! 供应商逐个获取 - 编排层
//!
//! 按注册顺序处理每一个供应商，每个供应商恰好产出一条结果。
//! 只依赖 `RetrievalStrategy`，不认识具体的获取方式。

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{AcquireError, ErrorKind};
use crate::models::{DownloadResult, Registry, StrategyKind};
use crate::services::RetrievalStrategy;
use crate::workflow::{AcquisitionFlow, VendorCtx};

/// 一次运行的全部结果，顺序与注册表一致
#[derive(Debug, Default)]
pub struct RunSummary {
    pub results: Vec<DownloadResult>,
}

impl RunSummary {
    pub fn total(&self) -> usize {
        self.results.len()
    }

    pub fn succeeded(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.iter().filter(|r| r.success)
    }

    pub fn failed(&self) -> impl Iterator<Item = &DownloadResult> {
        self.results.iter().filter(|r| !r.success)
    }

    /// 是否出现过浏览器启动失败
    pub fn had_startup_failure(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.error_kind == Some(ErrorKind::StartupFailure))
    }
}

/// 获取编排器
pub struct AcquisitionOrchestrator {
    registry: Registry,
    strategies: HashMap<StrategyKind, Arc<dyn RetrievalStrategy>>,
    flow: AcquisitionFlow,
}

impl AcquisitionOrchestrator {
    pub fn new(registry: Registry, verbose_logging: bool) -> Self {
        Self {
            registry,
            strategies: HashMap::new(),
            flow: AcquisitionFlow::new(verbose_logging),
        }
    }

    /// 绑定一种获取方式，同类重复绑定时后者覆盖前者
    pub fn with_strategy(mut self, strategy: Arc<dyn RetrievalStrategy>) -> Self {
        self.strategies.insert(strategy.kind(), strategy);
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// 依次处理所有供应商
    ///
    /// 单个供应商的失败只记录，不中断循环。某种获取方式启动失败后，
    /// 同类的剩余供应商直接记为 `StartupFailure`，其它方式照常进行。
    pub async fn run(&self) -> RunSummary {
        let total = self.registry.len();
        let mut disabled: HashSet<StrategyKind> = HashSet::new();
        let mut summary = RunSummary {
            results: Vec::with_capacity(total),
        };

        for (idx, entry) in self.registry.entries().iter().enumerate() {
            let ctx = VendorCtx::new(entry, idx + 1, total);
            let kind = entry.kind();

            let result = if disabled.contains(&kind) {
                let err = AcquireError::startup(format!("{} 获取方式已因启动失败停用", kind));
                self.flow.skip(entry, &ctx, &err)
            } else if let Some(strategy) = self.strategies.get(&kind) {
                self.flow.run(strategy.as_ref(), entry, &ctx).await
            } else {
                let err = AcquireError::misconfigured(
                    &entry.vendor_id,
                    format!("没有可用的 {} 获取方式", kind),
                );
                self.flow.skip(entry, &ctx, &err)
            };

            if result.error_kind == Some(ErrorKind::StartupFailure) && disabled.insert(kind) {
                error!("🛑 {} 获取方式启动失败，本次运行不再尝试", kind);
            }

            summary.results.push(result);
        }

        info!(
            "处理完成: 成功 {}/{}",
            summary.succeeded().count(),
            summary.total()
        );
        summary
    }
}
