use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{AcquireError, ConfigError, ErrorKind};
use crate::infrastructure::download_watch::is_document;
use crate::services::document_namer::canonical_name;

/// 获取方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// 静态页面上的直接链接
    StaticLink,
    /// 需要浏览器交互才能触发下载
    Interactive,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::StaticLink => f.write_str("static_link"),
            StrategyKind::Interactive => f.write_str("interactive"),
        }
    }
}

/// 静态链接配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticLinkConfig {
    /// href 中必须包含的片段
    pub link_match_token: String,
    /// 相对链接的基准地址，为空表示 href 已是绝对地址
    pub base_url: String,
}

/// 浏览器交互配置，每一项都是 XPath 表达式
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractiveConfig {
    pub file_locator: String,
    pub download_trigger_locator: String,
    pub popup_close_locator: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StrategyConfig {
    StaticLink(StaticLinkConfig),
    Interactive(InteractiveConfig),
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::StaticLink(_) => StrategyKind::StaticLink,
            StrategyConfig::Interactive(_) => StrategyKind::Interactive,
        }
    }
}

/// 注册表中的一个供应商，注册后不可变
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendorEntry {
    pub vendor_id: String,
    pub source_url: String,
    pub strategy: StrategyConfig,
    pub canonical_filename: String,
}

impl VendorEntry {
    pub fn static_link(
        vendor_id: impl Into<String>,
        source_url: impl Into<String>,
        link_match_token: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        let vendor_id = vendor_id.into();
        Self {
            canonical_filename: canonical_name(&vendor_id),
            vendor_id,
            source_url: source_url.into(),
            strategy: StrategyConfig::StaticLink(StaticLinkConfig {
                link_match_token: link_match_token.into(),
                base_url: base_url.into(),
            }),
        }
    }

    pub fn interactive(
        vendor_id: impl Into<String>,
        source_url: impl Into<String>,
        file_locator: impl Into<String>,
        download_trigger_locator: impl Into<String>,
        popup_close_locator: Option<String>,
    ) -> Self {
        let vendor_id = vendor_id.into();
        Self {
            canonical_filename: canonical_name(&vendor_id),
            vendor_id,
            source_url: source_url.into(),
            strategy: StrategyConfig::Interactive(InteractiveConfig {
                file_locator: file_locator.into(),
                download_trigger_locator: download_trigger_locator.into(),
                popup_close_locator,
            }),
        }
    }

    /// 覆盖规范文件名
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.canonical_filename = filename.into();
        self
    }

    pub fn kind(&self) -> StrategyKind {
        self.strategy.kind()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidVendor {
            vendor: self.vendor_id.clone(),
            reason: reason.to_string(),
        };

        if self.vendor_id.trim().is_empty() {
            return Err(invalid("供应商 ID 不能为空"));
        }
        if self.source_url.trim().is_empty() {
            return Err(invalid("url 不能为空"));
        }
        if self.canonical_filename.is_empty()
            || self.canonical_filename.contains(['/', '\\'])
        {
            return Err(invalid("文件名不能为空，也不能包含路径分隔符"));
        }
        if !is_document(Path::new(&self.canonical_filename)) {
            return Err(invalid("文件名必须以 .pdf 结尾"));
        }

        match &self.strategy {
            StrategyConfig::StaticLink(cfg) => {
                if cfg.link_match_token.is_empty() {
                    return Err(invalid("link_match_token 不能为空"));
                }
            }
            StrategyConfig::Interactive(cfg) => {
                if cfg.file_locator.trim().is_empty() || cfg.download_trigger_locator.trim().is_empty() {
                    return Err(invalid("file_locator 和 download_trigger_locator 不能为空"));
                }
            }
        }

        Ok(())
    }
}

/// 单个供应商的获取结果
#[derive(Debug, Clone)]
pub struct DownloadResult {
    pub vendor_id: String,
    /// 成功时为最终的规范路径
    pub file_path: Option<PathBuf>,
    pub success: bool,
    pub error_kind: Option<ErrorKind>,
    pub error_detail: Option<String>,
}

impl DownloadResult {
    pub fn succeeded(vendor_id: impl Into<String>, file_path: PathBuf) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            file_path: Some(file_path),
            success: true,
            error_kind: None,
            error_detail: None,
        }
    }

    pub fn failed(vendor_id: impl Into<String>, error: &AcquireError) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            file_path: None,
            success: false,
            error_kind: Some(error.kind()),
            error_detail: Some(error.to_string()),
        }
    }
}
