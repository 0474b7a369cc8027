//! 下载完成检测 - 基础设施层
//!
//! 轮询下载目录，直到文档文件存在、没有未完成的临时文件，
//! 且文件大小在 settle 时间内不再变化。

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::fs;
use tokio::time::{sleep, Instant};
use tracing::debug;

use crate::error::{AcquireError, AcquireResult};

/// 文档扩展名
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// 浏览器写入中的临时文件扩展名
const PARTIAL_EXTENSIONS: [&str; 3] = ["crdownload", "part", "tmp"];

pub fn is_document(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(DOCUMENT_EXTENSION))
}

pub fn is_partial_download(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| PARTIAL_EXTENSIONS.iter().any(|p| e.eq_ignore_ascii_case(p)))
}

#[derive(Debug, PartialEq, Eq)]
enum Snapshot {
    /// 还有未写完的临时文件
    InProgress,
    /// (路径, 大小)，按路径排序
    Files(Vec<(PathBuf, u64)>),
}

/// 下载完成检测器
#[derive(Debug, Clone)]
pub struct DownloadWatch {
    poll_interval: Duration,
    settle: Duration,
    timeout: Duration,
}

impl DownloadWatch {
    pub fn new(settle: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval: Duration::from_millis(250),
            settle,
            timeout,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// 等待目录中的下载稳定下来
    pub async fn wait_until_complete(&self, dir: &Path) -> AcquireResult<()> {
        let started = Instant::now();
        let mut last_seen: Option<Vec<(PathBuf, u64)>> = None;
        let mut stable_since = Instant::now();

        loop {
            match snapshot(dir).await? {
                Snapshot::Files(files) if !files.is_empty() => {
                    if last_seen.as_ref() == Some(&files) {
                        if stable_since.elapsed() >= self.settle {
                            debug!("下载已稳定: {} 个文件", files.len());
                            return Ok(());
                        }
                    } else {
                        last_seen = Some(files);
                        stable_since = Instant::now();
                    }
                }
                _ => last_seen = None,
            }

            if started.elapsed() >= self.timeout {
                return Err(AcquireError::DownloadIncomplete {
                    dir: dir.display().to_string(),
                    waited: started.elapsed(),
                });
            }

            sleep(self.poll_interval).await;
        }
    }
}

async fn snapshot(dir: &Path) -> AcquireResult<Snapshot> {
    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AcquireError::filesystem(dir, e))?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if is_partial_download(&path) {
            return Ok(Snapshot::InProgress);
        }
        if !is_document(&path) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if metadata.is_file() && metadata.len() > 0 {
            files.push((path, metadata.len()));
        }
    }

    files.sort();
    Ok(Snapshot::Files(files))
}
