/// LMS API 客户端
///
/// 封装所有与 LMS REST API 相关的调用逻辑：地址解析、鉴权头、调用配置、JSON 解析
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::infrastructure::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
use crate::models::call_config::{merge_optional, CallConfig};
use crate::models::content::not_found_message;
use crate::models::Course;

/// JSON 响应
#[derive(Debug, Clone)]
pub struct JsonResponse {
    pub status: u16,
    /// 原始 `Link` 响应头
    pub link: Option<String>,
    pub body: Value,
}

impl JsonResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// LMS API 客户端
#[derive(Clone)]
pub struct CanvasClient {
    base_url: String,
    token: String,
    /// 只用于列表请求的基础配置（如 `per_page`）
    list_config: CallConfig,
    transport: Arc<dyn HttpTransport>,
}

impl CanvasClient {
    /// 根据程序配置创建客户端（使用 reqwest）
    pub fn new(config: &Config) -> AppResult<Self> {
        let transport = ReqwestTransport::new(config.request_timeout_secs)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// 使用指定的传输创建客户端
    pub fn with_transport(config: &Config, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.api_token.clone(),
            list_config: CallConfig::default(),
            transport,
        }
    }

    /// 设置分页列表请求都会合并的基础配置
    ///
    /// 单条内容的 GET / PUT 不带这些参数
    pub fn with_list_config(mut self, config: CallConfig) -> Self {
        self.list_config = config;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// 解析请求地址
    ///
    /// 地址必须以 `/` 开头或带协议，相对地址拼接到 `base_url` 上
    pub fn resolve_url(&self, url: &str) -> AppResult<String> {
        if url.starts_with('/') {
            return Ok(format!("{}{}", self.base_url, url));
        }
        if has_scheme(url) {
            return Ok(url.to_string());
        }
        Err(AppError::invalid_url(url))
    }

    /// 发送请求并解析 JSON
    ///
    /// # 参数
    /// - `url`: 请求地址（查询参数来自 `config`）
    /// - `config`: 调用配置
    ///
    /// # 返回
    /// 返回状态码、`Link` 头和 JSON 正文；正文无法解析且状态码非 2xx 时报错
    pub async fn send_json(&self, url: &str, config: Option<&CallConfig>) -> AppResult<JsonResponse> {
        let (url, config) = self.prepare_request(url, config)?;
        self.send_resolved(&url, &config).await
    }

    /// 解析地址并拼接查询参数
    ///
    /// # 返回
    /// 返回 (完整地址, 调用配置)
    pub fn prepare_request(&self, url: &str, config: Option<&CallConfig>) -> AppResult<(String, CallConfig)> {
        let config = config.cloned().unwrap_or_default();
        let url = config.apply_to_url(&self.resolve_url(url)?);
        Ok((url, config))
    }

    /// 同 `prepare_request`，但先合并列表基础配置
    pub fn prepare_list_request(&self, url: &str, config: Option<&CallConfig>) -> AppResult<(String, CallConfig)> {
        let config = merge_optional(Some(&self.list_config), config);
        self.prepare_request(url, Some(&config))
    }

    /// 发送请求，`url` 已经是完整地址且已带查询参数
    ///
    /// 用于分页时直接跟随 `next` 链接
    pub async fn send_resolved(&self, url: &str, config: &CallConfig) -> AppResult<JsonResponse> {
        let request = self.build_request(url, config);
        let response = self.transport.execute(request).await?;
        decode_json(url, response)
    }

    /// 获取 JSON（对应 `fetchJson`）
    ///
    /// 不检查状态码：后端对不存在的资源返回 `{message}`，交给调用方判断
    pub async fn fetch_json(&self, url: &str, config: Option<&CallConfig>) -> AppResult<Value> {
        Ok(self.send_json(url, config).await?.body)
    }

    /// 获取课程信息
    pub async fn get_course(&self, course_id: u64) -> AppResult<Course> {
        let url = format!("/api/v1/courses/{}", course_id);
        let response = self.send_json(&url, None).await?;
        if !response.is_success() {
            return Err(AppError::bad_response(
                url,
                response.status,
                not_found_message(&response.body),
            ));
        }
        Ok(serde_json::from_value(response.body)?)
    }

    /// 构建请求
    fn build_request(&self, url: &str, config: &CallConfig) -> HttpRequest {
        let mut headers = config.fetch_init.headers.clone();
        headers
            .entry("Accept".to_string())
            .or_insert_with(|| "application/json".to_string());
        if !self.token.is_empty() {
            headers
                .entry("Authorization".to_string())
                .or_insert_with(|| format!("Bearer {}", self.token));
        }

        HttpRequest {
            method: config.method(),
            url: url.to_string(),
            headers,
            body: config.fetch_init.body.clone(),
        }
    }
}

/// 是否带协议（如 `https:`）
fn has_scheme(url: &str) -> bool {
    match url.find(':') {
        Some(idx) if idx > 0 => {
            let scheme = &url[..idx];
            scheme.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

/// 解析 JSON 响应
fn decode_json(url: &str, response: HttpResponse) -> AppResult<JsonResponse> {
    let link = response.header("link").map(str::to_string);
    let status = response.status;

    let body = if response.body.trim().is_empty() {
        Value::Null
    } else {
        match serde_json::from_str::<Value>(&response.body) {
            Ok(v) => v,
            Err(e) if (200..300).contains(&status) => return Err(e.into()),
            Err(_) => {
                debug!("非 JSON 错误响应: {} -> {}", url, status);
                return Err(AppError::bad_response(url, status, None));
            }
        }
    };

    Ok(JsonResponse { status, link, body })
}
