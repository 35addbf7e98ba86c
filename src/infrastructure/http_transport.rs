//! HTTP 传输 - 基础设施层
//!
//! 持有唯一的 HTTP 客户端资源，只暴露"发送一个请求"的能力

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::call_config::{HttpMethod, RequestBody};

/// 一次 HTTP 请求
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: HttpMethod::Get,
            url: url.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }
}

/// 一次 HTTP 响应（头部名称统一为小写）
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// 构造 JSON 响应
    pub fn json(status: u16, body: &Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Self {
            status,
            headers,
            body: body.to_string(),
        }
    }

    /// 附加一个响应头
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }
}

/// HTTP 传输能力
///
/// 只负责把请求发出去、把响应原样带回来；不解释状态码，也不重试。
#[async_trait]
pub trait HttpTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> AppResult<HttpResponse>;
}

/// 基于 reqwest 的传输实现
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// 创建新的传输
    ///
    /// # 参数
    /// - `timeout_secs`: 单个请求的超时秒数
    pub fn new(timeout_secs: u64) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lms_content/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self { client })
    }
}

fn to_reqwest_method(method: HttpMethod) -> Method {
    match method {
        HttpMethod::Get => Method::GET,
        HttpMethod::Post => Method::POST,
        HttpMethod::Put => Method::PUT,
        HttpMethod::Delete => Method::DELETE,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        debug!("{} {}", request.method.as_str(), request.url);

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method), &request.url);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match &request.body {
            Some(RequestBody::Json(value)) => builder.json(value),
            Some(RequestBody::Form(pairs)) => builder.form(pairs),
            None => builder,
        };

        let response = builder
            .send()
            .await
            .map_err(|e| AppError::api_request_failed(request.url.clone(), e))?;

        let status = response.status().as_u16();

        // 同名响应头（例如多个 Link）合并为逗号分隔
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let Ok(value) = value.to_str() else {
                continue;
            };
            headers
                .entry(name.as_str().to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(value);
                })
                .or_insert_with(|| value.to_string());
        }

        let body = response
            .text()
            .await
            .map_err(|e| AppError::api_request_failed(request.url.clone(), e))?;

        debug!("{} {} -> {} ({} 字节)", request.method.as_str(), request.url, status, body.len());

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let response = HttpResponse::json(200, &json!([])).with_header("Link", "<x>; rel=\"next\"");
        assert_eq!(response.header("link"), Some("<x>; rel=\"next\""));
        assert_eq!(response.header("LINK"), Some("<x>; rel=\"next\""));
        assert!(response.is_success());
    }

    #[test]
    fn test_non_2xx_is_not_success() {
        assert!(!HttpResponse::json(404, &json!({"message": "x"})).is_success());
        assert!(!HttpResponse::json(301, &json!({})).is_success());
    }

    #[test]
    fn test_reqwest_transport_builds() {
        assert!(ReqwestTransport::new(5).is_ok());
    }
}
