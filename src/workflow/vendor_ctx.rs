//! 供应商处理上下文
//!
//! 封装"我正在处理第几个供应商"这一信息

use std::fmt::Display;

use crate::models::{StrategyKind, VendorEntry};

/// 供应商处理上下文
#[derive(Debug, Clone)]
pub struct VendorCtx {
    pub vendor_id: String,

    /// 在注册表中的位置（从1开始，仅用于日志显示）
    pub index: usize,

    pub total: usize,

    pub kind: StrategyKind,
}

impl VendorCtx {
    pub fn new(entry: &VendorEntry, index: usize, total: usize) -> Self {
        Self {
            vendor_id: entry.vendor_id.clone(),
            index,
            total,
            kind: entry.kind(),
        }
    }
}

impl Display for VendorCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[供应商 {}/{} {} ({})]",
            self.index, self.total, self.vendor_id, self.kind
        )
    }
}
