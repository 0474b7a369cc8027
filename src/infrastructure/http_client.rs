//! HTTP 客户端 - 基础设施层
//!
//! 只负责 GET，非 2xx 一律视为传输失败，不做重试

use std::time::Duration;

use tracing::debug;

use crate::config::Config;
use crate::error::AcquireResult;

/// HTTP 客户端
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &Config) -> reqwest::Result<Self> {
        Self::with_settings(config.http_timeout, &config.user_agent)
    }

    /// User-Agent 等配置非法时返回错误
    pub fn with_settings(timeout: Duration, user_agent: &str) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(user_agent)
            .build()?;

        Ok(Self { client })
    }

    /// 获取页面文本
    pub async fn get_text(&self, url: &str) -> AcquireResult<String> {
        debug!("GET {}", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// 获取完整的响应体
    pub async fn get_bytes(&self, url: &str) -> AcquireResult<Vec<u8>> {
        debug!("GET {} (下载)", url);
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.bytes().await?;
        debug!("收到 {} 字节", body.len());
        Ok(body.to_vec())
    }
}
