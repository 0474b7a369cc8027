//! 单个供应商的获取流程 - 流程层
//!
//! 调用获取策略，把结果（无论成败）变成一条 `DownloadResult`。
//! 错误在这里被截获，不会越过供应商边界。

use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::error::AcquireError;
use crate::models::{DownloadResult, VendorEntry};
use crate::services::RetrievalStrategy;
use crate::workflow::vendor_ctx::VendorCtx;

/// 获取流程
///
/// - 不持有任何资源
/// - 只依赖 `RetrievalStrategy`，不关心具体获取方式
pub struct AcquisitionFlow {
    verbose_logging: bool,
}

impl AcquisitionFlow {
    pub fn new(verbose_logging: bool) -> Self {
        Self { verbose_logging }
    }

    pub async fn run(
        &self,
        strategy: &dyn RetrievalStrategy,
        entry: &VendorEntry,
        ctx: &VendorCtx,
    ) -> DownloadResult {
        info!("{} 📥 开始获取: {}", ctx, entry.source_url);
        if self.verbose_logging {
            debug!("{} 配置: {:?}", ctx, entry.strategy);
        }

        let started = Instant::now();
        match strategy.acquire(entry).await {
            Ok(path) => {
                info!(
                    "{} ✅ 已保存: {} (耗时 {:.1}s)",
                    ctx,
                    path.display(),
                    started.elapsed().as_secs_f64()
                );
                DownloadResult::succeeded(&entry.vendor_id, path)
            }
            Err(e) => {
                self.log_failure(ctx, &e);
                DownloadResult::failed(&entry.vendor_id, &e)
            }
        }
    }

    /// 不执行获取，直接记录为失败
    pub fn skip(&self, entry: &VendorEntry, ctx: &VendorCtx, error: &AcquireError) -> DownloadResult {
        warn!("{} ⏭️ 跳过: {}", ctx, error);
        DownloadResult::failed(&entry.vendor_id, error)
    }

    fn log_failure(&self, ctx: &VendorCtx, error: &AcquireError) {
        if error.is_fatal_for_browser() {
            error!("{} ❌ [{}] {}", ctx, error.kind(), error);
        } else {
            warn!("{} ❌ [{}] {}", ctx, error.kind(), error);
        }
    }
}
