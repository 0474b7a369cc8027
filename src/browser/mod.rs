//! 浏览器能力
//!
//! `BrowserLauncher` 负责启动会话，`BrowserSession` 只暴露
//! 导航、按定位表达式查找和点击、关闭这几种能力。
//! 交互式获取流程只依赖这两个 trait，不认识 chromiumoxide。

pub mod headless;

use std::path::Path;

use async_trait::async_trait;

use crate::error::AcquireResult;

pub use headless::ChromiumLauncher;

/// 浏览器启动器
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// 启动一个新会话，下载文件自动保存到 `download_dir`（绝对路径）
    ///
    /// 启动失败必须返回 `AcquireError::StartupFailure`
    async fn launch(&self, download_dir: &Path) -> AcquireResult<Box<dyn BrowserSession>>;
}

/// 一个浏览器会话
#[async_trait]
pub trait BrowserSession: Send {
    /// 打开页面并等待加载完成
    async fn navigate(&mut self, url: &str) -> AcquireResult<()>;

    /// 定位表达式当前是否能匹配到元素
    async fn is_present(&mut self, locator: &str) -> AcquireResult<bool>;

    /// 点击定位表达式匹配到的元素
    async fn click(&mut self, locator: &str) -> AcquireResult<()>;

    /// 关闭会话并释放浏览器进程
    async fn close(self: Box<Self>) -> AcquireResult<()>;
}
