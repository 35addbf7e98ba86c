//! 调用配置
//!
//! 每一次请求都会携带的查询参数和请求选项，可以逐层合并。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 查询参数值：标量或标量数组
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QueryValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<QueryValue>),
}

impl QueryValue {
    fn push_pairs(&self, key: &str, out: &mut Vec<(String, String)>) {
        match self {
            QueryValue::Bool(b) => out.push((key.to_string(), b.to_string())),
            QueryValue::Int(i) => out.push((key.to_string(), i.to_string())),
            QueryValue::Float(f) => out.push((key.to_string(), f.to_string())),
            QueryValue::Str(s) => out.push((key.to_string(), s.clone())),
            // 数组展开为重复的 key
            QueryValue::List(items) => {
                for item in items {
                    item.push_pairs(key, out);
                }
            }
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Str(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Str(value)
    }
}

impl From<i32> for QueryValue {
    fn from(value: i32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<i64> for QueryValue {
    fn from(value: i64) -> Self {
        QueryValue::Int(value)
    }
}

impl From<u32> for QueryValue {
    fn from(value: u32) -> Self {
        QueryValue::Int(i64::from(value))
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

/// HTTP 方法
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

/// 请求体
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestBody {
    Json(Value),
    Form(Vec<(String, String)>),
}

/// 请求选项（method / body / headers）
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchInit {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,
}

/// 调用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CallConfig {
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub query_params: BTreeMap<String, QueryValue>,
    pub fetch_init: FetchInit,
}

impl CallConfig {
    /// 添加（或替换）一个查询参数
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.query_params.insert(key.into(), value.into());
        self
    }

    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.fetch_init.method = Some(method);
        self
    }

    pub fn with_body(mut self, body: RequestBody) -> Self {
        self.fetch_init.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fetch_init.headers.insert(name.into(), value.into());
        self
    }

    /// 请求方法，未设置时为 GET
    pub fn method(&self) -> HttpMethod {
        self.fetch_init.method.unwrap_or_default()
    }

    /// 序列化查询参数（按 key 排序，数组展开为重复 key）
    pub fn query_string(&self) -> String {
        let mut pairs = Vec::new();
        for (key, value) in &self.query_params {
            value.push_pairs(key, &mut pairs);
        }
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(pairs)
            .finish()
    }

    /// 把查询参数拼接到 URL 上（`#` 锚点保留在最后）
    pub fn apply_to_url(&self, url: &str) -> String {
        if self.query_params.is_empty() {
            return url.to_string();
        }
        let (base, fragment) = url.split_at(url.find('#').unwrap_or(url.len()));
        let separator = if base.contains('?') { '&' } else { '?' };
        format!("{}{}{}{}", base, separator, self.query_string(), fragment)
    }

    /// 以 `self` 为基础合并 `other`，返回新的配置
    pub fn merged_with(&self, other: &CallConfig) -> CallConfig {
        override_config(self, other)
    }
}

/// 合并两个调用配置，`override_cfg` 优先
///
/// - `query_params` / `headers` 按 key 合并，同名 key 由覆盖方整体替换（数组不拼接）
/// - `method` / `body` 覆盖方有值时替换
/// - 两个参数都不会被修改
pub fn override_config(base: &CallConfig, override_cfg: &CallConfig) -> CallConfig {
    let mut query_params = base.query_params.clone();
    for (key, value) in &override_cfg.query_params {
        query_params.insert(key.clone(), value.clone());
    }

    let mut headers = base.fetch_init.headers.clone();
    for (key, value) in &override_cfg.fetch_init.headers {
        headers.insert(key.clone(), value.clone());
    }

    CallConfig {
        query_params,
        fetch_init: FetchInit {
            method: override_cfg.fetch_init.method.or(base.fetch_init.method),
            body: override_cfg
                .fetch_init
                .body
                .clone()
                .or_else(|| base.fetch_init.body.clone()),
            headers,
        },
    }
}

/// 合并可选配置
pub fn merge_optional(base: Option<&CallConfig>, override_cfg: Option<&CallConfig>) -> CallConfig {
    match (base, override_cfg) {
        (Some(b), Some(o)) => override_config(b, o),
        (Some(b), None) => b.clone(),
        (None, Some(o)) => o.clone(),
        (None, None) => CallConfig::default(),
    }
}
