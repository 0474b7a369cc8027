use std::path::Path;

use serde::Deserialize;
use tokio::fs;
use tracing::info;

use crate::error::ConfigError;
use crate::models::registry::Registry;
use crate::models::vendor::{StrategyKind, VendorEntry};

#[derive(Debug, Deserialize)]
struct RegistryFile {
    #[serde(default, rename = "vendor")]
    vendors: Vec<VendorRecord>,
}

/// TOML 中的一条供应商记录
#[derive(Debug, Deserialize)]
struct VendorRecord {
    id: String,
    url: String,
    strategy: StrategyKind,
    #[serde(default)]
    link_match_token: Option<String>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    file_locator: Option<String>,
    #[serde(default)]
    download_trigger_locator: Option<String>,
    #[serde(default)]
    popup_close_locator: Option<String>,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl VendorRecord {
    fn into_entry(self) -> Result<VendorEntry, ConfigError> {
        let missing = |field: &str| ConfigError::InvalidVendor {
            vendor: self.id.clone(),
            reason: format!("缺少字段 {}", field),
        };

        let entry = match self.strategy {
            StrategyKind::StaticLink => VendorEntry::static_link(
                &self.id,
                &self.url,
                self.link_match_token.clone().ok_or_else(|| missing("link_match_token"))?,
                self.base_url.clone().unwrap_or_default(),
            ),
            StrategyKind::Interactive => VendorEntry::interactive(
                &self.id,
                &self.url,
                self.file_locator.clone().ok_or_else(|| missing("file_locator"))?,
                self.download_trigger_locator
                    .clone()
                    .ok_or_else(|| missing("download_trigger_locator"))?,
                self.popup_close_locator.clone(),
            ),
        };

        Ok(match self.filename {
            Some(name) => entry.with_filename(name),
            None => entry,
        })
    }
}

/// 从 TOML 文本构建注册表，`enabled = false` 的记录不注册
pub fn parse_registry(content: &str, origin: &str) -> Result<Registry, ConfigError> {
    let file: RegistryFile = toml::from_str(content).map_err(|e| ConfigError::RegistryParse {
        path: origin.to_string(),
        source: e,
    })?;

    let mut registry = Registry::new();
    for record in file.vendors {
        if !record.enabled {
            info!("跳过已停用的供应商: {}", record.id);
            continue;
        }
        registry.register(record.into_entry()?)?;
    }

    Ok(registry)
}

/// 从文件加载注册表
pub async fn load_registry_file(path: &Path) -> Result<Registry, ConfigError> {
    let content = fs::read_to_string(path)
        .await
        .map_err(|e| ConfigError::RegistryRead {
            path: path.display().to_string(),
            source: e,
        })?;

    let registry = parse_registry(&content, &path.display().to_string())?;
    info!(
        "已从 {} 加载 {} 个供应商",
        path.file_name().unwrap_or_default().to_string_lossy(),
        registry.len()
    );

    Ok(registry)
}
