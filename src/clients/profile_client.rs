//! 成员主页客户端
//!
//! 封装对 `<base>/author/<username>` 的访问，每次调用只发一次请求，不做重试。
use crate::config::{Config, Credentials};
use crate::error::{AppError, AppResult};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

/// 成员主页来源
///
/// 编排层只依赖这个能力，测试时可以换成内存实现。
pub trait ProfileSource: Send + Sync {
    /// 取回某个成员主页的 HTML 文本
    fn fetch_profile(&self, username: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// 成员主页客户端
pub struct ProfileClient {
    http: reqwest::Client,
    base_url: String,
    credentials: Credentials,
}

impl ProfileClient {
    /// 创建新的主页客户端
    pub fn new(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| AppError::request_failed("<client>", e))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            credentials: config.credentials.clone(),
        })
    }

    /// 某个成员主页的地址
    pub fn profile_url(&self, username: &str) -> String {
        format!("{}/author/{}", self.base_url, username)
    }
}

impl ProfileSource for ProfileClient {
    async fn fetch_profile(&self, username: &str) -> AppResult<String> {
        let url = self.profile_url(username);
        debug!("请求成员主页: {}", url);

        let response = self
            .http
            .get(&url)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .send()
            .await
            .map_err(|e| AppError::request_failed(username, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::bad_status(username, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::request_failed(username, e))?;

        debug!("成员主页 {} 返回 {} 字节", username, body.len());
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url_template() {
        let config = Config {
            base_url: "https://example.org/".to_string(),
            ..Default::default()
        };
        let client = ProfileClient::new(&config).unwrap();
        assert_eq!(
            client.profile_url("jdoe"),
            "https://example.org/author/jdoe"
        );
    }
}
