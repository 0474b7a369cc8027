//! 静态链接获取 - 业务能力层
//!
//! 拉取页面，找到第一个匹配的 PDF 链接，直接下载。

use std::path::PathBuf;

use async_trait::async_trait;
use scraper::{Html, Selector};
use tracing::{debug, info};
use url::Url;

use crate::config::Config;
use crate::error::{AcquireError, AcquireResult};
use crate::infrastructure::HttpClient;
use crate::models::{StaticLinkConfig, StrategyConfig, StrategyKind, VendorEntry};
use crate::services::normalizer::DownloadNormalizer;
use crate::services::{scoped_download_dir, RetrievalStrategy};

/// href 中表示 PDF 资源的片段
const PDF_MARKER: &str = ".pdf";

/// 按文档顺序找第一个同时包含 PDF 标记和匹配片段的 href
///
/// 第一个匹配即返回，不打分，也不回退到其它候选。
pub fn find_document_link(document: &Html, config: &StaticLinkConfig) -> Option<String> {
    let anchors = Selector::parse("a").ok()?;

    for anchor in document.select(&anchors) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        debug!("检查链接: {}", href);
        if href.contains(PDF_MARKER) && href.contains(&config.link_match_token) {
            info!("✓ 找到 PDF 链接: {}", href);
            return Some(href.to_string());
        }
    }

    None
}

/// `base_url` 非空时按 URL 规则拼接，否则 href 必须已是绝对地址
pub fn resolve_link(href: &str, base_url: &str) -> AcquireResult<String> {
    let resolved = if base_url.is_empty() {
        Url::parse(href)
    } else {
        Url::parse(base_url).and_then(|base| base.join(href))
    };

    resolved
        .map(|url| url.to_string())
        .map_err(|e| AcquireError::transport(href, e))
}

/// 静态链接获取服务
pub struct StaticLinkRetriever {
    http: HttpClient,
    normalizer: DownloadNormalizer,
}

impl StaticLinkRetriever {
    pub fn new(config: &Config, http: HttpClient) -> Self {
        Self {
            http,
            normalizer: DownloadNormalizer::new(&config.output_dir),
        }
    }

    /// 拉取并解析来源页面（静态链接的预取步骤）
    pub async fn prefetch(&self, source_url: &str) -> AcquireResult<String> {
        info!("🌐 正在拉取页面: {}", source_url);
        self.http.get_text(source_url).await
    }

    /// 在已拉取的页面中找链接并下载，保存为规范文件名
    pub async fn retrieve(
        &self,
        page_html: &str,
        config: &StaticLinkConfig,
        canonical_filename: &str,
    ) -> AcquireResult<PathBuf> {
        // Html 不是 Send，解析和查找必须在 await 之前结束
        let href = {
            let document = Html::parse_document(page_html);
            find_document_link(&document, config)
        };
        let href = href.ok_or_else(|| {
            AcquireError::not_found(format!(
                "没有同时包含 {:?} 和 {:?} 的链接",
                PDF_MARKER, config.link_match_token
            ))
        })?;

        let url = resolve_link(&href, &config.base_url)?;
        info!("⬇️ 正在下载: {}", url);
        let body = self.http.get_bytes(&url).await?;

        let scratch = scoped_download_dir(self.normalizer.output_dir())?;
        let staged = scratch.path().join(canonical_filename);
        tokio::fs::write(&staged, &body)
            .await
            .map_err(|e| AcquireError::filesystem(&staged, e))?;
        debug!("已写入 {} 字节到 {}", body.len(), staged.display());

        self.normalizer
            .normalize(scratch.path(), canonical_filename)
            .await
    }
}

#[async_trait]
impl RetrievalStrategy for StaticLinkRetriever {
    fn kind(&self) -> StrategyKind {
        StrategyKind::StaticLink
    }

    async fn acquire(&self, entry: &VendorEntry) -> AcquireResult<PathBuf> {
        let StrategyConfig::StaticLink(config) = &entry.strategy else {
            return Err(AcquireError::misconfigured(
                &entry.vendor_id,
                "不是静态链接配置",
            ));
        };

        let page_html = self.prefetch(&entry.source_url).await?;
        self.retrieve(&page_html, config, &entry.canonical_filename)
            .await
    }
}
