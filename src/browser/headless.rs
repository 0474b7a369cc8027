use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::browser::{
    SetDownloadBehaviorBehavior, SetDownloadBehaviorParams,
};
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use serde_json::json;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::config::Config;
use crate::error::{AcquireError, AcquireResult};

/// 按顺序尝试的 Chrome 可执行文件名
const CHROME_CANDIDATES: [&str; 4] = [
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
];

/// 基于 chromiumoxide 的启动器，每次获取启动一个独立的浏览器进程
pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    headless: bool,
}

impl ChromiumLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            executable: config.chrome_executable.clone(),
            headless: config.headless,
        }
    }

    /// 查找 Chrome：优先使用配置，其次在 PATH 中查找
    pub fn resolve_executable(&self) -> AcquireResult<PathBuf> {
        if let Some(path) = &self.executable {
            if path.exists() {
                return Ok(path.clone());
            }
            return Err(AcquireError::startup(format!(
                "配置的 Chrome 不存在: {}",
                path.display()
            )));
        }

        CHROME_CANDIDATES
            .iter()
            .find_map(|name| which::which(name).ok())
            .ok_or_else(|| AcquireError::startup("在 PATH 中找不到 Chrome / Chromium"))
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, download_dir: &Path) -> AcquireResult<Box<dyn BrowserSession>> {
        info!("🚀 启动浏览器...");
        let executable = self.resolve_executable()?;
        debug!("Chrome: {}", executable.display());

        // 临时用户目录，写入下载相关的偏好设置
        let profile = tempfile::Builder::new()
            .prefix("pricelist-profile-")
            .tempdir()
            .map_err(AcquireError::startup)?;
        write_download_preferences(profile.path(), download_dir).map_err(AcquireError::startup)?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(executable)
            .user_data_dir(profile.path())
            .args(vec![
                "--disable-gpu",
                "--no-sandbox",
                "--disable-dev-shm-usage",
                "--disable-extensions",
            ]);
        builder = if self.headless {
            builder.new_headless_mode()
        } else {
            builder.with_head()
        };
        let config = builder.build().map_err(|e| {
            error!("配置浏览器失败: {}", e);
            AcquireError::startup(e)
        })?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(|e| {
            error!("启动浏览器失败: {}", e);
            AcquireError::startup(e)
        })?;
        debug!("浏览器启动成功");

        // 在后台处理浏览器事件
        let handler_task = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let session = ChromiumSession {
            browser,
            page: None,
            handler_task,
            _profile: profile,
        };

        let mut params = SetDownloadBehaviorParams::new(SetDownloadBehaviorBehavior::Allow);
        params.download_path = Some(download_dir.display().to_string());
        if let Err(e) = session.browser.execute(params).await {
            error!("设置下载目录失败: {}", e);
            let _ = Box::new(session).close().await;
            return Err(AcquireError::startup(e));
        }

        // 等待浏览器状态同步
        sleep(Duration::from_millis(300)).await;

        Ok(Box::new(session))
    }
}

/// 写入 Chrome 偏好：自动下载到指定目录、不弹出提示、PDF 直接下载而不是内嵌打开
fn write_download_preferences(profile_dir: &Path, download_dir: &Path) -> std::io::Result<()> {
    let prefs = json!({
        "download": {
            "default_directory": download_dir.display().to_string(),
            "prompt_for_download": false,
            "directory_upgrade": true
        },
        "plugins": {
            "always_open_pdf_externally": true
        }
    });

    let default_dir = profile_dir.join("Default");
    std::fs::create_dir_all(&default_dir)?;
    std::fs::write(default_dir.join("Preferences"), prefs.to_string())
}

/// 一个 Chrome 会话
///
/// 正常路径通过 `close` 关闭；future 被丢弃时（例如 Ctrl-C），
/// chromiumoxide 的 `Browser` 在 drop 时结束子进程，临时用户目录随之删除。
struct ChromiumSession {
    browser: Browser,
    page: Option<Page>,
    handler_task: JoinHandle<()>,
    _profile: TempDir,
}

impl ChromiumSession {
    fn page(&self) -> AcquireResult<&Page> {
        self.page.as_ref().ok_or_else(|| AcquireError::InteractionFailed {
            target: "page".to_string(),
            source: "尚未打开页面".into(),
        })
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> AcquireResult<()> {
        let page = self.browser.new_page(url).await.map_err(|e| {
            error!("导航到 {} 失败: {}", url, e);
            AcquireError::interaction(url, e)
        })?;
        page.wait_for_navigation()
            .await
            .map_err(|e| AcquireError::interaction(url, e))?;
        info!("已导航到: {}", url);
        self.page = Some(page);
        Ok(())
    }

    async fn is_present(&mut self, locator: &str) -> AcquireResult<bool> {
        Ok(self.page()?.find_xpath(locator).await.is_ok())
    }

    async fn click(&mut self, locator: &str) -> AcquireResult<()> {
        let element = self
            .page()?
            .find_xpath(locator)
            .await
            .map_err(|e| AcquireError::interaction(locator, e))?;
        if let Ok(Some(href)) = element.attribute("href").await {
            debug!("点击元素 href: {}", href);
        }
        element
            .click()
            .await
            .map_err(|e| AcquireError::interaction(locator, e))?;
        Ok(())
    }

    async fn close(mut self: Box<Self>) -> AcquireResult<()> {
        if let Err(e) = self.browser.close().await {
            warn!("关闭浏览器失败: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            warn!("等待浏览器进程退出失败: {}", e);
        }
        self.handler_task.abort();
        debug!("浏览器会话已关闭");
        Ok(())
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler_task.abort();
    }
}
