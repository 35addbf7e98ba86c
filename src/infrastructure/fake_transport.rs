//! 内存中的假后端
//!
//! 按 (方法, URL) 返回预先登记的响应，并记录收到的每个请求。
//! 测试和离线演示使用，不访问网络。

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::http_transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::error::{AppError, AppResult};
use crate::models::call_config::HttpMethod;

/// 模拟的网络故障
#[derive(Debug)]
pub struct SimulatedNetworkError(pub String);

impl std::fmt::Display for SimulatedNetworkError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "simulated network failure: {}", self.0)
    }
}

impl std::error::Error for SimulatedNetworkError {}

#[derive(Default)]
pub struct FakeTransport {
    /// 队列中只剩一个响应时重复返回它
    routes: Mutex<HashMap<(HttpMethod, String), VecDeque<HttpResponse>>>,
    failing: Mutex<HashSet<String>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记一个响应
    pub fn on(&self, method: HttpMethod, url: impl Into<String>, response: HttpResponse) -> &Self {
        self.on_sequence(method, url, vec![response])
    }

    /// 登记一组依次返回的响应，最后一个会一直重复
    pub fn on_sequence(&self, method: HttpMethod, url: impl Into<String>, responses: Vec<HttpResponse>) -> &Self {
        self.lock_routes().insert((method, url.into()), responses.into());
        self
    }

    /// 登记一个 GET JSON 响应
    pub fn on_get_json(&self, url: impl Into<String>, body: Value) -> &Self {
        self.on(HttpMethod::Get, url, HttpResponse::json(200, &body))
    }

    /// 登记一个带 `Link: rel="next"` 的分页响应
    pub fn on_get_page(&self, url: impl Into<String>, body: Value, next: Option<&str>) -> &Self {
        let mut response = HttpResponse::json(200, &body);
        if let Some(next) = next {
            response = response.with_header("link", format!("<{}>; rel=\"next\"", next));
        }
        self.on(HttpMethod::Get, url, response)
    }

    /// 该 URL 的请求一律以网络错误失败
    pub fn fail(&self, url: impl Into<String>) -> &Self {
        self.failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(url.into());
        self
    }

    /// 收到的全部请求
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests().len()
    }

    /// 指定方法的请求数量
    pub fn count_for(&self, method: HttpMethod) -> usize {
        self.requests().iter().filter(|r| r.method == method).count()
    }

    fn lock_routes(&self) -> std::sync::MutexGuard<'_, HashMap<(HttpMethod, String), VecDeque<HttpResponse>>> {
        self.routes.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn execute(&self, request: HttpRequest) -> AppResult<HttpResponse> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let is_failing = self
            .failing
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&request.url);
        if is_failing {
            return Err(AppError::api_request_failed(
                request.url.clone(),
                SimulatedNetworkError(request.url.clone()),
            ));
        }

        let response = self
            .lock_routes()
            .get_mut(&(request.method, request.url.clone()))
            .and_then(|queue| {
                if queue.len() > 1 {
                    queue.pop_front()
                } else {
                    queue.front().cloned()
                }
            });

        Ok(response.unwrap_or_else(|| {
            HttpResponse::json(
                404,
                &json!({ "message": "The specified resource does not exist." }),
            )
        }))
    }
}
