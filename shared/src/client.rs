//! 出站服务调用
//!
//! 所有跨服务 HTTP 调用的统一出口：显式超时 + 有限次重试。
//! 失败时如何降级 (fail closed / fail open) 由调用方决定，
//! 这里只负责把结果分类为 [`ClientError`]。

use std::time::Duration;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// 调用策略
///
/// | 字段 | 默认值 | 说明 |
/// |------|--------|------|
/// | timeout | 5s | 单次请求超时 |
/// | attempts | 2 | 总尝试次数 (1 = 不重试) |
/// | backoff | 200ms | 重试间隔 |
#[derive(Debug, Clone)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for CallPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            attempts: 2,
            backoff: Duration::from_millis(200),
        }
    }
}

/// 出站调用错误
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Unexpected status {status}: {body}")]
    Status {
        status: http::StatusCode,
        body: String,
    },

    #[error("Failed to decode response: {0}")]
    Decode(String),
}

impl ClientError {
    /// 5xx 和传输层错误可以重试，4xx 不行
    fn is_retryable(&self) -> bool {
        match self {
            ClientError::Timeout(_) | ClientError::Transport(_) => true,
            ClientError::Status { status, .. } => status.is_server_error(),
            ClientError::Decode(_) => false,
        }
    }
}

/// 单个下游服务的 HTTP 客户端
#[derive(Debug, Clone)]
pub struct ServiceClient {
    base_url: String,
    client: reqwest::Client,
    policy: CallPolicy,
}

impl ServiceClient {
    /// 创建客户端，`base_url` 不带尾部斜杠
    pub fn new(base_url: impl Into<String>, policy: CallPolicy) -> Self {
        let client = reqwest::Client::builder()
            .timeout(policy.timeout)
            .build()
            .expect("reqwest client construction cannot fail with static config");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
            policy,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET 并反序列化 JSON 响应体
    ///
    /// `bearer` 为调用方转发的用户令牌 (不做服务间凭证)。
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T, ClientError> {
        self.with_retry(|| async move {
            let mut req = self.client.get(format!("{}{}", self.base_url, path));
            if let Some(token) = bearer {
                req = req.bearer_auth(token);
            }
            Self::read_json(req.send().await).await
        })
        .await
    }

    /// POST JSON 并反序列化响应体
    ///
    /// `headers` 用于内部信任边界的静态头 (如共享密钥)。
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        headers: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        self.with_retry(|| async move {
            let mut req = self.client.post(format!("{}{}", self.base_url, path));
            for (name, value) in headers {
                req = req.header(*name, *value);
            }
            Self::read_json(req.json(body).send().await).await
        })
        .await
    }

    async fn with_retry<T, F, Fut>(&self, op: F) -> Result<T, ClientError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        let attempts = self.policy.attempts.max(1);
        let mut last_err = None;

        for attempt in 1..=attempts {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    tracing::warn!(
                        target: "outbound",
                        attempt,
                        attempts,
                        error = %e,
                        "Outbound call failed, retrying"
                    );
                    tokio::time::sleep(self.policy.backoff).await;
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        // attempts >= 1 保证循环里要么 return 要么写入 last_err
        Err(last_err.unwrap_or_else(|| ClientError::Transport("no attempt executed".into())))
    }

    async fn read_json<T: DeserializeOwned>(
        result: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<T, ClientError> {
        let resp = result.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout(e.to_string())
            } else {
                ClientError::Transport(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Status { status, body });
        }

        resp.json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_bounded() {
        let policy = CallPolicy::default();
        assert_eq!(policy.timeout, Duration::from_secs(5));
        assert!(policy.attempts >= 1);
    }

    #[test]
    fn retryable_classification() {
        assert!(ClientError::Timeout("t".into()).is_retryable());
        assert!(ClientError::Transport("t".into()).is_retryable());
        assert!(
            ClientError::Status {
                status: http::StatusCode::BAD_GATEWAY,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(
            !ClientError::Status {
                status: http::StatusCode::NOT_FOUND,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!ClientError::Decode("d".into()).is_retryable());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = ServiceClient::new("http://localhost:8082/", CallPolicy::default());
        assert_eq!(client.base_url(), "http://localhost:8082");
    }
}
