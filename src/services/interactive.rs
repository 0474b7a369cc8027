//! 交互式获取 - 业务能力层
//!
//! 打开页面 → 点击文件链接 → (可选) 关闭弹窗 → 点击下载 → 等待下载稳定。
//! 每一步的等待都有上限；无论成功失败，浏览器会话都会关闭。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

use crate::browser::{BrowserLauncher, BrowserSession};
use crate::config::Config;
use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::DownloadWatch;
use crate::models::{InteractiveConfig, StrategyConfig, StrategyKind, VendorEntry};
use crate::services::normalizer::DownloadNormalizer;
use crate::services::{scoped_download_dir, RetrievalStrategy};

/// 交互式获取服务
pub struct InteractiveRetriever {
    launcher: Arc<dyn BrowserLauncher>,
    normalizer: DownloadNormalizer,
    watch: DownloadWatch,
    locator_timeout: Duration,
    poll_interval: Duration,
}

impl InteractiveRetriever {
    pub fn new(config: &Config, launcher: Arc<dyn BrowserLauncher>) -> Self {
        Self {
            launcher,
            normalizer: DownloadNormalizer::new(&config.output_dir),
            watch: DownloadWatch::new(config.download_settle, config.download_timeout),
            locator_timeout: config.locator_timeout,
            poll_interval: Duration::from_millis(200),
        }
    }

    /// 元素轮询间隔（同时用于下载检测）
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self.watch = self.watch.with_poll_interval(poll_interval);
        self
    }

    /// 执行一次交互式下载，成功时返回规范路径
    pub async fn retrieve(
        &self,
        page_url: &str,
        config: &InteractiveConfig,
        canonical_filename: &str,
    ) -> AcquireResult<PathBuf> {
        let scratch = scoped_download_dir(self.normalizer.output_dir())?;
        let download_dir = std::fs::canonicalize(scratch.path())
            .map_err(|e| AcquireError::filesystem(scratch.path(), e))?;
        debug!("下载目录: {}", download_dir.display());

        let mut session = self.launcher.launch(&download_dir).await?;
        let outcome = self
            .drive(session.as_mut(), page_url, config, &download_dir)
            .await;

        // 会话在任何结果下都要关闭
        if let Err(e) = session.close().await {
            warn!("关闭浏览器会话失败: {}", e);
        }
        outcome?;

        self.normalizer
            .normalize(&download_dir, canonical_filename)
            .await
    }

    async fn drive(
        &self,
        session: &mut dyn BrowserSession,
        page_url: &str,
        config: &InteractiveConfig,
        download_dir: &Path,
    ) -> AcquireResult<()> {
        session.navigate(page_url).await?;

        self.wait_for(session, &config.file_locator).await?;
        session.click(&config.file_locator).await?;
        info!("✓ 已点击文件链接");

        if let Some(popup) = &config.popup_close_locator {
            match self.wait_for(session, popup).await {
                Ok(()) => {
                    session.click(popup).await?;
                    info!("✓ 已关闭弹窗");
                }
                // 弹窗没有出现不算失败，继续下一步
                Err(AcquireError::LocatorTimeout { .. }) => {
                    warn!("⚠️ 未出现弹窗，跳过关闭步骤: {}", popup);
                }
                Err(e) => return Err(e),
            }
        }

        self.wait_for(session, &config.download_trigger_locator).await?;
        session.click(&config.download_trigger_locator).await?;
        info!("✓ 已点击下载按钮，等待下载完成...");

        self.watch.wait_until_complete(download_dir).await
    }

    /// 在超时内轮询，直到元素出现
    async fn wait_for(&self, session: &mut dyn BrowserSession, locator: &str) -> AcquireResult<()> {
        let deadline = Instant::now() + self.locator_timeout;
        loop {
            if session.is_present(locator).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(AcquireError::LocatorTimeout {
                    locator: locator.to_string(),
                    timeout: self.locator_timeout,
                });
            }
            sleep(self.poll_interval).await;
        }
    }
}

#[async_trait]
impl RetrievalStrategy for InteractiveRetriever {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Interactive
    }

    async fn acquire(&self, entry: &VendorEntry) -> AcquireResult<PathBuf> {
        let StrategyConfig::Interactive(config) = &entry.strategy else {
            return Err(AcquireError::misconfigured(
                &entry.vendor_id,
                "不是交互式配置",
            ));
        };

        self.retrieve(&entry.source_url, config, &entry.canonical_filename)
            .await
    }
}


#[cfg(test)]
mod tests {
    use super::fakes::FakeLauncher;
    use super::*;
    use crate::error::ErrorKind;

    const FILE: &str = "//a[contains(@href, '/PRICELIST')]";
    const DOWNLOAD: &str = "//span[text()='Download']";
    const POPUP: &str = "//button[@class='close']";

    fn test_config(output: &Path) -> Config {
        let mut config = Config::with_output_dir(output);
        config.locator_timeout = Duration::from_millis(100);
        config.download_settle = Duration::from_millis(50);
        config.download_timeout = Duration::from_secs(2);
        config
    }

    fn interactive(popup: Option<&str>) -> InteractiveConfig {
        InteractiveConfig {
            file_locator: FILE.to_string(),
            download_trigger_locator: DOWNLOAD.to_string(),
            popup_close_locator: popup.map(str::to_string),
        }
    }

    fn retriever(config: &Config, launcher: FakeLauncher) -> InteractiveRetriever {
        InteractiveRetriever::new(config, Arc::new(launcher))
            .with_poll_interval(Duration::from_millis(10))
    }

    #[tokio::test]
    async fn full_flow_saves_canonical_file_and_closes_session() {
        let output = tempfile::tempdir().unwrap();
        let config = test_config(output.path());
        let launcher = FakeLauncher::new(&[FILE, POPUP, DOWNLOAD], DOWNLOAD);
        let state = Arc::clone(&launcher.state);

        let saved = retriever(&config, launcher)
            .retrieve("https://tradepac.test", &interactive(Some(POPUP)), "tradepac.pdf")
            .await
            .unwrap();

        assert_eq!(saved, output.path().join("tradepac.pdf"));
        assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-fake");

        let state = state.lock().unwrap();
        assert_eq!(state.visited, vec!["https://tradepac.test"]);
        assert_eq!(state.clicks, vec![FILE, POPUP, DOWNLOAD]);
        assert_eq!((state.launched, state.closed), (1, 1));
    }

    #[tokio::test]
    async fn file_locator_timeout_releases_session() {
        let output = tempfile::tempdir().unwrap();
        let config = test_config(output.path());
        let launcher = FakeLauncher::new(&[DOWNLOAD], DOWNLOAD);
        let state = Arc::clone(&launcher.state);

        let err = retriever(&config, launcher)
            .retrieve("https://tradepac.test", &interactive(None), "tradepac.pdf")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::LocatorTimeout);
        let state = state.lock().unwrap();
        assert_eq!((state.launched, state.closed), (1, 1));
        assert!(state.clicks.is_empty());
        assert!(!output.path().join("tradepac.pdf").exists());
    }

    #[tokio::test]
    async fn missing_popup_is_not_fatal() {
        let output = tempfile::tempdir().unwrap();
        let config = test_config(output.path());
        let launcher = FakeLauncher::new(&[FILE, DOWNLOAD], DOWNLOAD);
        let state = Arc::clone(&launcher.state);

        let saved = retriever(&config, launcher)
            .retrieve("https://tradepac.test", &interactive(Some(POPUP)), "tradepac.pdf")
            .await;

        tokio_test::assert_ok!(saved);
        assert_eq!(state.lock().unwrap().clicks, vec![FILE, DOWNLOAD]);
    }

    #[tokio::test]
    async fn download_that_never_arrives_is_reported() {
        let output = tempfile::tempdir().unwrap();
        let mut config = test_config(output.path());
        config.download_timeout = Duration::from_millis(150);
        // 下载按钮可见，但点击后不会产出文件
        let launcher = FakeLauncher::new(&[FILE, DOWNLOAD], "//never");
        let state = Arc::clone(&launcher.state);

        let err = retriever(&config, launcher)
            .retrieve("https://pc-themes.test", &interactive(None), "pc_themes.pdf")
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DownloadIncomplete);
        assert_eq!(state.lock().unwrap().closed, 1);
    }

    #[tokio::test]
    async fn launch_failure_is_startup_failure() {
        let output = tempfile::tempdir().unwrap();
        let config = test_config(output.path());
        let mut launcher = FakeLauncher::new(&[FILE, DOWNLOAD], DOWNLOAD);
        launcher.fail_launch = true;

        let err = retriever(&config, launcher)
            .retrieve("https://tradepac.test", &interactive(None), "tradepac.pdf")
            .await
            .unwrap_err();
        assert!(err.is_fatal_for_browser());
    }

    #[tokio::test]
    async fn scratch_directories_are_cleaned_up() {
        let output = tempfile::tempdir().unwrap();
        let config = test_config(output.path());
        let launcher = FakeLauncher::new(&[FILE, DOWNLOAD], DOWNLOAD);

        retriever(&config, launcher)
            .retrieve("https://tradepac.test", &interactive(None), "tradepac.pdf")
            .await
            .unwrap();

        let names: Vec<String> = std::fs::read_dir(output.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["tradepac.pdf"]);
    }
}
