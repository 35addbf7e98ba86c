//! 课程内容记录
//!
//! 四种内容（作业、讨论、页面、测验）各自的数据结构，以及带类型标签的 [`Content`]。
//! 未声明的字段保存在 `extra` 中，保证回写时不丢数据。

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::content_kind::ContentKind;
use crate::error::{AppError, AppResult};

/// 内容记录的公共能力
pub trait ContentRecord: DeserializeOwned + Serialize + Clone + Send + Sync + 'static {
    /// 记录所属的内容类型
    const KIND: ContentKind;

    fn id(&self) -> u64;
    fn name(&self) -> &str;
    fn body(&self) -> Option<&str>;

    /// 根据 JSON 结构判断是否为本类型（检查本类型独有的字段）
    fn data_is_this_kind(data: &Value) -> bool;

    fn into_content(self) -> Content;
}

/// 对象中是否存在某个 key
fn has_key(data: &Value, key: &str) -> bool {
    data.as_object().is_some_and(|obj| obj.contains_key(key))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub submission_types: Vec<String>,
    #[serde(default)]
    pub due_at: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentRecord for Assignment {
    const KIND: ContentKind = ContentKind::Assignment;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn body(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn data_is_this_kind(data: &Value) -> bool {
        has_key(data, "submission_types")
    }

    fn into_content(self) -> Content {
        Content::Assignment(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discussion {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    pub discussion_type: String,
    #[serde(default)]
    pub require_initial_post: Option<bool>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentRecord for Discussion {
    const KIND: ContentKind = ContentKind::Discussion;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn body(&self) -> Option<&str> {
        self.message.as_deref()
    }

    fn data_is_this_kind(data: &Value) -> bool {
        has_key(data, "discussion_type")
    }

    fn into_content(self) -> Content {
        Content::Discussion(self)
    }
}

/// 页面以 `page_id` 作为数字ID，`url` 是页面的 slug
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub page_id: u64,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentRecord for Page {
    const KIND: ContentKind = ContentKind::Page;

    fn id(&self) -> u64 {
        self.page_id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    fn data_is_this_kind(data: &Value) -> bool {
        has_key(data, "page_id")
    }

    fn into_content(self) -> Content {
        Content::Page(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quiz_type: String,
    #[serde(default)]
    pub published: Option<bool>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentRecord for Quiz {
    const KIND: ContentKind = ContentKind::Quiz;

    fn id(&self) -> u64 {
        self.id
    }

    fn name(&self) -> &str {
        &self.title
    }

    fn body(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn data_is_this_kind(data: &Value) -> bool {
        has_key(data, "quiz_type")
    }

    fn into_content(self) -> Content {
        Content::Quiz(self)
    }
}

/// 带类型标签的内容记录
///
/// 在 API 边界由 [`ContentKind::parse`] 或 [`Content::from_value`] 生成，
/// 之后的代码直接按标签分派，不再猜测 JSON 结构。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Content {
    Assignment(Assignment),
    Discussion(Discussion),
    Page(Page),
    Quiz(Quiz),
}

impl Content {
    /// 根据 JSON 结构识别类型并解析
    pub fn from_value(data: Value) -> AppResult<Self> {
        let kind = crate::content_kind::kind_for_data(&data).ok_or_else(|| {
            AppError::Content(crate::error::ContentError::UnknownKind {
                hint: crate::utils::logging::truncate_text(&data.to_string(), 80),
            })
        })?;
        kind.parse(data)
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Content::Assignment(_) => ContentKind::Assignment,
            Content::Discussion(_) => ContentKind::Discussion,
            Content::Page(_) => ContentKind::Page,
            Content::Quiz(_) => ContentKind::Quiz,
        }
    }

    pub fn id(&self) -> u64 {
        match self {
            Content::Assignment(c) => c.id(),
            Content::Discussion(c) => c.id(),
            Content::Page(c) => c.id(),
            Content::Quiz(c) => c.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Content::Assignment(c) => c.name(),
            Content::Discussion(c) => c.name(),
            Content::Page(c) => c.name(),
            Content::Quiz(c) => c.name(),
        }
    }

    pub fn body(&self) -> Option<&str> {
        match self {
            Content::Assignment(c) => c.body(),
            Content::Discussion(c) => c.body(),
            Content::Page(c) => c.body(),
            Content::Quiz(c) => c.body(),
        }
    }

    pub fn html_url(&self) -> Option<&str> {
        match self {
            Content::Assignment(c) => c.html_url.as_deref(),
            Content::Discussion(c) => c.html_url.as_deref(),
            Content::Page(c) => c.html_url.as_deref(),
            Content::Quiz(c) => c.html_url.as_deref(),
        }
    }
}

/// 单条内容的查询结果
///
/// 后端对不存在的内容返回带 `message` 的对象而不是报错，这里显式建模为 `NotFound`。
#[derive(Debug, Clone, PartialEq)]
pub enum ContentLookup<T> {
    Found(T),
    NotFound { message: String },
}

impl<T> ContentLookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, ContentLookup::Found(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            ContentLookup::Found(t) => Some(t),
            ContentLookup::NotFound { .. } => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            ContentLookup::Found(t) => Some(t),
            ContentLookup::NotFound { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ContentLookup<U> {
        match self {
            ContentLookup::Found(t) => ContentLookup::Found(f(t)),
            ContentLookup::NotFound { message } => ContentLookup::NotFound { message },
        }
    }
}

/// 提取"未找到"类响应中的提示信息
///
/// 支持 `{"message": "..."}` 和 `{"errors": [{"message": "..."}]}` 两种形式。
pub fn not_found_message(data: &Value) -> Option<String> {
    if let Some(msg) = data.get("message").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    data.get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first())
        .and_then(|e| e.get("message"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
