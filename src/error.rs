use std::fmt;
use std::path::Path;
use std::time::Duration;

use thiserror::Error;

/// 装箱的底层错误
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 单个供应商获取过程中的错误
///
/// 除 `StartupFailure` 外，所有错误都只影响当前供应商。
#[derive(Debug, Error)]
pub enum AcquireError {
    /// 页面上没有匹配的链接 / 下载目录中没有产出文件
    #[error("未找到: {what}")]
    NotFound { what: String },

    /// 网络错误或非 2xx 状态码
    #[error("传输失败 ({url}): {source}")]
    TransportFailure {
        url: String,
        #[source]
        source: BoxError,
    },

    /// 等待元素出现超时
    #[error("等待元素超时 ({timeout:?}): {locator}")]
    LocatorTimeout { locator: String, timeout: Duration },

    /// 导航或点击失败
    #[error("页面交互失败 ({target}): {source}")]
    InteractionFailed {
        target: String,
        #[source]
        source: BoxError,
    },

    /// 下载在限定时间内没有稳定下来
    #[error("下载未完成 (目录: {dir}, 已等待 {waited:?})")]
    DownloadIncomplete { dir: String, waited: Duration },

    /// 删除或重命名文件失败
    #[error("文件操作失败 ({path}): {source}")]
    FilesystemConflict {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// 浏览器引擎无法启动
    #[error("浏览器启动失败: {source}")]
    StartupFailure {
        #[source]
        source: BoxError,
    },

    /// 没有可处理该供应商的获取策略
    #[error("配置错误 (供应商: {vendor}): {reason}")]
    Misconfigured { vendor: String, reason: String },
}

/// 错误类别，用于统计和汇总
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    TransportFailure,
    LocatorTimeout,
    InteractionFailed,
    DownloadIncomplete,
    FilesystemConflict,
    StartupFailure,
    Misconfigured,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::NotFound => "NotFound",
            ErrorKind::TransportFailure => "TransportFailure",
            ErrorKind::LocatorTimeout => "LocatorTimeout",
            ErrorKind::InteractionFailed => "InteractionFailed",
            ErrorKind::DownloadIncomplete => "DownloadIncomplete",
            ErrorKind::FilesystemConflict => "FilesystemConflict",
            ErrorKind::StartupFailure => "StartupFailure",
            ErrorKind::Misconfigured => "Misconfigured",
        };
        f.write_str(name)
    }
}

impl AcquireError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AcquireError::NotFound { .. } => ErrorKind::NotFound,
            AcquireError::TransportFailure { .. } => ErrorKind::TransportFailure,
            AcquireError::LocatorTimeout { .. } => ErrorKind::LocatorTimeout,
            AcquireError::InteractionFailed { .. } => ErrorKind::InteractionFailed,
            AcquireError::DownloadIncomplete { .. } => ErrorKind::DownloadIncomplete,
            AcquireError::FilesystemConflict { .. } => ErrorKind::FilesystemConflict,
            AcquireError::StartupFailure { .. } => ErrorKind::StartupFailure,
            AcquireError::Misconfigured { .. } => ErrorKind::Misconfigured,
        }
    }

    /// 是否应当停止后续的浏览器类获取
    pub fn is_fatal_for_browser(&self) -> bool {
        matches!(self, AcquireError::StartupFailure { .. })
    }

    // ========== 便捷构造函数 ==========

    pub fn not_found(what: impl Into<String>) -> Self {
        AcquireError::NotFound { what: what.into() }
    }

    pub fn transport(
        url: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AcquireError::TransportFailure {
            url: url.into(),
            source: Box::new(source),
        }
    }

    pub fn interaction(
        target: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AcquireError::InteractionFailed {
            target: target.into(),
            source: Box::new(source),
        }
    }

    pub fn filesystem(path: &Path, source: std::io::Error) -> Self {
        AcquireError::FilesystemConflict {
            path: path.display().to_string(),
            source,
        }
    }

    pub fn startup(source: impl Into<BoxError>) -> Self {
        AcquireError::StartupFailure {
            source: source.into(),
        }
    }

    pub fn misconfigured(vendor: impl Into<String>, reason: impl Into<String>) -> Self {
        AcquireError::Misconfigured {
            vendor: vendor.into(),
            reason: reason.into(),
        }
    }
}

// ========== 从常见错误类型转换 ==========

impl From<reqwest::Error> for AcquireError {
    fn from(err: reqwest::Error) -> Self {
        let url = err.url().map(|u| u.to_string()).unwrap_or_default();
        AcquireError::TransportFailure {
            url,
            source: Box::new(err),
        }
    }
}

impl From<chromiumoxide::error::CdpError> for AcquireError {
    fn from(err: chromiumoxide::error::CdpError) -> Self {
        AcquireError::InteractionFailed {
            target: "cdp".to_string(),
            source: Box::new(err),
        }
    }
}

impl From<std::io::Error> for AcquireError {
    fn from(err: std::io::Error) -> Self {
        AcquireError::FilesystemConflict {
            path: String::new(),
            source: err,
        }
    }
}

/// OCR 提取错误
#[derive(Debug, Error)]
pub enum OcrError {
    /// 文档页数不足
    #[error("页码 {page_index} 超出范围 (文档共 {page_count} 页)")]
    PageOutOfRange { page_index: usize, page_count: usize },

    /// 光栅化工具无法运行或运行失败
    #[error("页面光栅化失败: {detail}")]
    RasterizationFailed { detail: String },

    /// OCR 引擎无法调用
    #[error("OCR 引擎不可用: {detail}")]
    RecognitionUnavailable { detail: String },

    #[error("图片处理失败: {0}")]
    Image(#[from] image::ImageError),

    #[error("文件错误: {0}")]
    Io(#[from] std::io::Error),
}

/// 配置 / 注册表错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("无法读取注册表文件 ({path}): {source}")]
    RegistryRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("注册表文件解析失败 ({path}): {source}")]
    RegistryParse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("供应商 {vendor} 配置无效: {reason}")]
    InvalidVendor { vendor: String, reason: String },

    #[error("供应商 {vendor} 重复注册")]
    DuplicateVendor { vendor: String },

    #[error("供应商 {vendor} 的文件名 {filename} 已被 {existing} 使用")]
    DuplicateFilename {
        filename: String,
        existing: String,
        vendor: String,
    },
}

// ========== Result 类型别名 ==========

pub type AcquireResult<T> = Result<T, AcquireError>;
pub type OcrResult<T> = Result<T, OcrError>;
