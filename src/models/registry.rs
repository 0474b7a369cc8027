use std::collections::HashSet;

use tracing::{info, warn};

use crate::error::ConfigError;
use crate::models::loaders::parse_registry;
use crate::models::vendor::VendorEntry;

/// 内置供应商表
const BUILTIN_REGISTRY: &str = include_str!("../../vendors.toml");

/// 供应商注册表
///
/// 保持注册顺序，运行期间不可变。
#[derive(Debug, Clone, Default)]
pub struct Registry {
    entries: Vec<VendorEntry>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 内置注册表
    pub fn builtin() -> Result<Self, ConfigError> {
        parse_registry(BUILTIN_REGISTRY, "<builtin>")
    }

    /// 注册一个供应商，校验配置并拒绝重复 ID 和重复的规范文件名
    pub fn register(&mut self, entry: VendorEntry) -> Result<(), ConfigError> {
        entry.validate()?;
        if self.entries.iter().any(|e| e.vendor_id == entry.vendor_id) {
            return Err(ConfigError::DuplicateVendor {
                vendor: entry.vendor_id,
            });
        }
        // 文件名相同会互相覆盖，大小写不同也算冲突
        if let Some(existing) = self
            .entries
            .iter()
            .find(|e| e.canonical_filename.eq_ignore_ascii_case(&entry.canonical_filename))
        {
            return Err(ConfigError::DuplicateFilename {
                filename: entry.canonical_filename,
                existing: existing.vendor_id.clone(),
                vendor: entry.vendor_id,
            });
        }
        self.entries.push(entry);
        Ok(())
    }

    pub fn entries(&self) -> &[VendorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 只保留指定的供应商（顺序不变），返回注册表中不存在的 ID
    pub fn retain_only(&mut self, vendor_ids: &[String]) -> Vec<String> {
        if vendor_ids.is_empty() {
            return Vec::new();
        }

        let unknown: Vec<String> = vendor_ids
            .iter()
            .filter(|id| !self.entries.iter().any(|e| &e.vendor_id == *id))
            .cloned()
            .collect();
        for id in &unknown {
            warn!("⚠️ 注册表中没有供应商 {}（可能已停用或拼写错误）", id);
        }

        let wanted: HashSet<&str> = vendor_ids.iter().map(String::as_str).collect();
        self.entries.retain(|e| wanted.contains(e.vendor_id.as_str()));
        info!("按命令行筛选后剩余 {} 个供应商", self.entries.len());
        unknown
    }
}
