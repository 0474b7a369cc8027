//! 下载规范化 - 业务能力层
//!
//! 在来源目录中挑出最新创建的文档，改名为规范文件名并放进输出目录。

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tokio::fs;
use tracing::{debug, info};

use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::download_watch::is_document;

/// 下载规范化服务
#[derive(Debug, Clone)]
pub struct DownloadNormalizer {
    output_dir: PathBuf,
}

impl DownloadNormalizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 把 `source_dir` 中最新的文档移动到 `<output_dir>/<canonical_filename>`
    ///
    /// 目标位置已有文件时先删除。规范文件本身不参与挑选。
    pub async fn normalize(&self, source_dir: &Path, canonical_filename: &str) -> AcquireResult<PathBuf> {
        let target = self.output_dir.join(canonical_filename);

        let latest = latest_document(source_dir, &target).await?.ok_or_else(|| {
            AcquireError::not_found(format!("{} 中没有可用的文档", source_dir.display()))
        })?;
        debug!("最新文档: {}", latest.display());

        let target_exists = fs::try_exists(&target)
            .await
            .map_err(|e| AcquireError::filesystem(&target, e))?;
        if target_exists {
            fs::remove_file(&target)
                .await
                .map_err(|e| AcquireError::filesystem(&target, e))?;
            info!("🗑️ 已删除旧文件: {}", target.display());
        }

        fs::rename(&latest, &target)
            .await
            .map_err(|e| AcquireError::filesystem(&latest, e))?;
        info!("✓ 已保存为: {}", target.display());

        Ok(target)
    }
}

/// 按创建时间挑最新的文档，文件系统不支持创建时间时退回修改时间
async fn latest_document(dir: &Path, exclude: &Path) -> AcquireResult<Option<PathBuf>> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| AcquireError::filesystem(dir, e))?;

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| AcquireError::filesystem(dir, e))?
    {
        let path = entry.path();
        if path == exclude || !is_document(&path) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        let stamp = metadata.created().or_else(|_| metadata.modified())?;
        if latest.as_ref().map_or(true, |(best, _)| stamp > *best) {
            latest = Some((stamp, path));
        }
    }

    Ok(latest.map(|(_, path)| path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::fs;
    use std::thread::sleep;
    use std::time::Duration;

    fn pdf_files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .filter(|n| n.ends_with(".pdf"))
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn picks_most_recently_created_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("older.pdf"), b"t1").unwrap();
        sleep(Duration::from_millis(50));
        fs::write(dir.path().join("newer.pdf"), b"t2").unwrap();
        fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let normalizer = DownloadNormalizer::new(dir.path());
        let target = normalizer.normalize(dir.path(), "bizgram.pdf").await.unwrap();

        assert_eq!(target, dir.path().join("bizgram.pdf"));
        assert_eq!(fs::read(&target).unwrap(), b"t2");
        assert_eq!(pdf_files(dir.path()), vec!["bizgram.pdf", "older.pdf"]);
    }

    #[tokio::test]
    async fn second_run_replaces_existing_canonical_file() {
        let output = tempfile::tempdir().unwrap();
        let normalizer = DownloadNormalizer::new(output.path());

        for body in [b"first".as_slice(), b"second".as_slice()] {
            let scratch = tempfile::tempdir_in(output.path()).unwrap();
            fs::write(scratch.path().join("PriceList.pdf"), body).unwrap();
            normalizer
                .normalize(scratch.path(), "tradepac.pdf")
                .await
                .unwrap();
        }

        assert_eq!(pdf_files(output.path()), vec!["tradepac.pdf"]);
        assert_eq!(fs::read(output.path().join("tradepac.pdf")).unwrap(), b"second");
    }

    #[tokio::test]
    async fn canonical_file_is_never_picked_as_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("fuwell.pdf"), b"old").unwrap();

        let err = DownloadNormalizer::new(dir.path())
            .normalize(dir.path(), "fuwell.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(fs::read(dir.path().join("fuwell.pdf")).unwrap(), b"old");
    }

    #[tokio::test]
    async fn missing_source_directory_is_filesystem_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DownloadNormalizer::new(dir.path())
            .normalize(&dir.path().join("gone"), "x.pdf")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::FilesystemConflict);
    }
}
