//! 内容类型描述
//!
//! 作业、讨论、页面、测验四种内容共用同一套 get / list / put 操作，
//! 差异只在地址片段、字段名和回写时的包装 key。

use std::fmt;
use std::sync::LazyLock;

use futures::stream::{BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, info};

use super::url_templates::ContentUrls;
use crate::api::paged_fetch_as;
use crate::clients::CanvasClient;
use crate::error::{AppError, AppResult};
use crate::models::call_config::{merge_optional, CallConfig, HttpMethod, RequestBody};
use crate::models::content::{
    not_found_message, Assignment, Content, ContentLookup, ContentRecord, Discussion, Page, Quiz,
};

/// 内容类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Assignment,
    Discussion,
    Page,
    Quiz,
}

impl ContentKind {
    /// 注册顺序（按地址分派时使用）
    pub const ALL: [ContentKind; 4] = [
        ContentKind::Assignment,
        ContentKind::Discussion,
        ContentKind::Page,
        ContentKind::Quiz,
    ];

    /// 地址中的路径片段
    pub fn segment(self) -> &'static str {
        match self {
            ContentKind::Assignment => "assignments",
            ContentKind::Discussion => "discussion_topics",
            ContentKind::Page => "pages",
            ContentKind::Quiz => "quizzes",
        }
    }

    /// 中文名称（日志用）
    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Assignment => "作业",
            ContentKind::Discussion => "讨论",
            ContentKind::Page => "页面",
            ContentKind::Quiz => "测验",
        }
    }

    /// ID 字段名
    pub fn id_field(self) -> &'static str {
        match self {
            ContentKind::Page => "page_id",
            _ => "id",
        }
    }

    /// 名称字段名
    pub fn name_field(self) -> &'static str {
        match self {
            ContentKind::Assignment => "name",
            _ => "title",
        }
    }

    /// 正文字段名
    pub fn body_field(self) -> &'static str {
        match self {
            ContentKind::Assignment | ContentKind::Quiz => "description",
            ContentKind::Discussion => "message",
            ContentKind::Page => "body",
        }
    }

    /// 回写时包裹参数的 key，讨论不包裹
    fn put_wrapper(self) -> Option<&'static str> {
        match self {
            ContentKind::Assignment => Some("assignment"),
            ContentKind::Discussion => None,
            ContentKind::Page => Some("wiki_page"),
            ContentKind::Quiz => Some("quiz"),
        }
    }

    /// 地址模板
    pub fn urls(self) -> &'static ContentUrls {
        static URLS: LazyLock<[ContentUrls; 4]> =
            LazyLock::new(|| ContentKind::ALL.map(|kind| ContentUrls::new(kind.segment())));
        &URLS[self as usize]
    }

    /// JSON 结构是否属于本类型
    pub fn data_is_this_kind(self, data: &Value) -> bool {
        match self {
            ContentKind::Assignment => Assignment::data_is_this_kind(data),
            ContentKind::Discussion => Discussion::data_is_this_kind(data),
            ContentKind::Page => Page::data_is_this_kind(data),
            ContentKind::Quiz => Quiz::data_is_this_kind(data),
        }
    }

    pub fn get_id(self, data: &Value) -> Option<u64> {
        data.get(self.id_field()).and_then(Value::as_u64)
    }

    pub fn get_name(self, data: &Value) -> Option<&str> {
        data.get(self.name_field()).and_then(Value::as_str)
    }

    pub fn get_body(self, data: &Value) -> Option<&str> {
        data.get(self.body_field()).and_then(Value::as_str)
    }

    /// 把原始 JSON 解析为带标签的内容
    pub fn parse(self, data: Value) -> AppResult<Content> {
        match self {
            ContentKind::Assignment => parse_record::<Assignment>(data).map(Content::Assignment),
            ContentKind::Discussion => parse_record::<Discussion>(data).map(Content::Discussion),
            ContentKind::Page => parse_record::<Page>(data).map(Content::Page),
            ContentKind::Quiz => parse_record::<Quiz>(data).map(Content::Quiz),
        }
    }

    /// 获取单条内容
    ///
    /// # 返回
    /// 后端返回 `{message}` 时为 `ContentLookup::NotFound`，不作为错误
    pub async fn get(
        self,
        client: &CanvasClient,
        course_id: u64,
        content_id: u64,
        config: Option<&CallConfig>,
    ) -> AppResult<ContentLookup<Content>> {
        match self {
            ContentKind::Assignment => Ok(get_typed::<Assignment>(client, course_id, content_id, config)
                .await?
                .map(Content::Assignment)),
            ContentKind::Discussion => Ok(get_typed::<Discussion>(client, course_id, content_id, config)
                .await?
                .map(Content::Discussion)),
            ContentKind::Page => Ok(get_typed::<Page>(client, course_id, content_id, config)
                .await?
                .map(Content::Page)),
            ContentKind::Quiz => Ok(get_typed::<Quiz>(client, course_id, content_id, config)
                .await?
                .map(Content::Quiz)),
        }
    }

    /// 按需拉取课程中本类型的全部内容
    ///
    /// 每次调用都会重新发起请求，流只能消费一次
    pub fn data_generator<'a>(
        self,
        client: &'a CanvasClient,
        course_id: u64,
        config: Option<&CallConfig>,
    ) -> BoxStream<'a, AppResult<Content>> {
        match self {
            ContentKind::Assignment => into_content_stream(list_typed::<Assignment>(client, course_id, config)),
            ContentKind::Discussion => into_content_stream(list_typed::<Discussion>(client, course_id, config)),
            ContentKind::Page => into_content_stream(list_typed::<Page>(client, course_id, config)),
            ContentKind::Quiz => into_content_stream(list_typed::<Quiz>(client, course_id, config)),
        }
    }

    /// 回写部分字段
    ///
    /// # 参数
    /// - `update`: 需要修改的字段（不含包装 key）
    ///
    /// # 返回
    /// 返回后端保存后的内容；后端拒绝时返回错误
    pub async fn put(
        self,
        client: &CanvasClient,
        course_id: u64,
        content_id: u64,
        update: &Value,
        config: Option<&CallConfig>,
    ) -> AppResult<Content> {
        match self {
            ContentKind::Assignment => put_typed::<Assignment>(client, course_id, content_id, update, config)
                .await
                .map(Content::Assignment),
            ContentKind::Discussion => put_typed::<Discussion>(client, course_id, content_id, update, config)
                .await
                .map(Content::Discussion),
            ContentKind::Page => put_typed::<Page>(client, course_id, content_id, update, config)
                .await
                .map(Content::Page),
            ContentKind::Quiz => put_typed::<Quiz>(client, course_id, content_id, update, config)
                .await
                .map(Content::Quiz),
        }
    }

    /// 生成回写请求体
    pub fn put_body(self, update: &Value) -> Value {
        match self.put_wrapper() {
            Some(key) => json!({ key: update }),
            None => update.clone(),
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

fn into_content_stream<'a, T, S>(stream: S) -> BoxStream<'a, AppResult<Content>>
where
    T: ContentRecord,
    S: Stream<Item = AppResult<T>> + Send + 'a,
{
    stream
        .map(|item| item.map(ContentRecord::into_content))
        .boxed()
}

/// 按类型解析记录，结构不符时报错
fn parse_record<T: ContentRecord>(data: Value) -> AppResult<T> {
    if !T::data_is_this_kind(&data) {
        return Err(AppError::shape_mismatch(
            T::KIND,
            format!("缺少 {} 的特征字段", T::KIND.segment()),
        ));
    }
    serde_json::from_value(data).map_err(|e| AppError::shape_mismatch(T::KIND, e.to_string()))
}

/// 区分正常记录与"未找到"响应
fn lookup_record<T: ContentRecord>(data: Value) -> AppResult<ContentLookup<T>> {
    // 讨论的正文字段也叫 message，先按类型特征判断
    if T::data_is_this_kind(&data) {
        return parse_record(data).map(ContentLookup::Found);
    }
    if let Some(message) = not_found_message(&data) {
        return Ok(ContentLookup::NotFound { message });
    }
    Err(AppError::shape_mismatch(T::KIND, "既不是内容记录也不是提示信息"))
}

/// 获取单条内容（编译期已知类型）
pub async fn get_typed<T: ContentRecord>(
    client: &CanvasClient,
    course_id: u64,
    content_id: u64,
    config: Option<&CallConfig>,
) -> AppResult<ContentLookup<T>> {
    let url = T::KIND.urls().api_url(course_id, content_id);
    debug!("获取{}: {}", T::KIND, url);
    let data = client.fetch_json(&url, config).await?;
    lookup_record(data)
}

/// 分页列出课程中的全部内容（编译期已知类型）
pub fn list_typed<'a, T: ContentRecord>(
    client: &'a CanvasClient,
    course_id: u64,
    config: Option<&CallConfig>,
) -> impl Stream<Item = AppResult<T>> + Send + 'a {
    paged_fetch_as::<T>(client, &T::KIND.urls().all_api_url(course_id), config)
}

/// 回写部分字段（编译期已知类型）
pub async fn put_typed<T: ContentRecord>(
    client: &CanvasClient,
    course_id: u64,
    content_id: u64,
    update: &Value,
    config: Option<&CallConfig>,
) -> AppResult<T> {
    let url = T::KIND.urls().api_url(course_id, content_id);
    let put_config = CallConfig::default()
        .with_method(HttpMethod::Put)
        .with_body(RequestBody::Json(T::KIND.put_body(update)));
    let config = merge_optional(Some(&put_config), config);

    info!("📤 回写{} #{}", T::KIND, content_id);
    let response = client.send_json(&url, Some(&config)).await?;

    if !response.is_success() {
        return Err(AppError::bad_response(
            url,
            response.status,
            not_found_message(&response.body),
        ));
    }

    parse_record(response.body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::collect_all;
    use crate::config::Config;
    use crate::infrastructure::{FakeTransport, HttpResponse};
    use std::sync::Arc;

    const BASE: &str = "https://lms.test";

    fn client(fake: Arc<FakeTransport>) -> CanvasClient {
        let config = Config {
            base_url: BASE.to_string(),
            ..Config::default()
        };
        CanvasClient::with_transport(&config, fake)
    }

    #[test]
    fn test_urls_follow_segment() {
        assert_eq!(ContentKind::Quiz.urls().segment(), "quizzes");
        assert_eq!(
            ContentKind::Discussion.urls().api_url(3, 4),
            "/api/v1/courses/3/discussion_topics/4"
        );
    }

    #[test]
    fn test_url_round_trip_every_kind() {
        for kind in ContentKind::ALL {
            for (course_id, content_id) in [(1u64, 1u64), (17, 4002), (99_999, 3)] {
                let url = kind.urls().api_url(course_id, content_id);
                assert_eq!(
                    kind.urls().course_and_content_id_from_url(&url),
                    Some((course_id, content_id))
                );
            }
        }
    }

    #[test]
    fn test_raw_accessors() {
        let page = json!({"page_id": 5, "title": "Home", "body": "<p>x</p>", "url": "home"});
        assert_eq!(ContentKind::Page.get_id(&page), Some(5));
        assert_eq!(ContentKind::Page.get_name(&page), Some("Home"));
        assert_eq!(ContentKind::Page.get_body(&page), Some("<p>x</p>"));

        let assignment = json!({"id": 9, "name": "Lab", "submission_types": []});
        assert_eq!(ContentKind::Assignment.get_name(&assignment), Some("Lab"));
        assert_eq!(ContentKind::Assignment.get_body(&assignment), None);
    }

    #[test]
    fn test_put_body_wrapping() {
        let update = json!({"published": true});
        assert_eq!(ContentKind::Page.put_body(&update), json!({"wiki_page": {"published": true}}));
        assert_eq!(ContentKind::Discussion.put_body(&update), update);
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        let quiz = json!({"id": 1, "title": "Q", "quiz_type": "survey"});
        assert!(ContentKind::Assignment.parse(quiz.clone()).is_err());
        assert_eq!(ContentKind::Quiz.parse(quiz).unwrap().kind(), ContentKind::Quiz);
    }

    #[tokio::test]
    async fn test_get_found_and_not_found() {
        let fake = Arc::new(FakeTransport::new());
        fake.on_get_json(
            format!("{}/api/v1/courses/1/discussion_topics/2", BASE),
            json!({"id": 2, "title": "Intro", "message": "<p>Say hi</p>", "discussion_type": "threaded"}),
        );
        let client = client(fake);

        let found = ContentKind::Discussion.get(&client, 1, 2, None).await.unwrap();
        let content = found.found().unwrap();
        assert_eq!(content.name(), "Intro");
        assert_eq!(content.body(), Some("<p>Say hi</p>"));

        let missing = ContentKind::Discussion.get(&client, 1, 3, None).await.unwrap();
        assert_eq!(
            missing,
            ContentLookup::NotFound {
                message: "The specified resource does not exist.".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_data_generator_lists_collection() {
        let fake = Arc::new(FakeTransport::new());
        fake.on_get_page(
            format!("{}/api/v1/courses/1/quizzes", BASE),
            json!([{"id": 1, "title": "A", "quiz_type": "assignment"}]),
            Some("https://lms.test/api/v1/courses/1/quizzes?page=2"),
        );
        fake.on_get_page(
            format!("{}/api/v1/courses/1/quizzes?page=2", BASE),
            json!([{"id": 2, "title": "B", "quiz_type": "survey"}]),
            None,
        );
        let client = client(fake.clone());

        let quizzes = collect_all(ContentKind::Quiz.data_generator(&client, 1, None)).await.unwrap();
        let names: Vec<&str> = quizzes.iter().map(Content::name).collect();
        assert_eq!(names, vec!["A", "B"]);

        // 再次调用会重新请求
        collect_all(ContentKind::Quiz.data_generator(&client, 1, None)).await.unwrap();
        assert_eq!(fake.request_count(), 4);
    }

    #[tokio::test]
    async fn test_put_sends_wrapped_body() {
        let fake = Arc::new(FakeTransport::new());
        fake.on(
            HttpMethod::Put,
            format!("{}/api/v1/courses/1/assignments/5", BASE),
            HttpResponse::json(
                200,
                &json!({"id": 5, "name": "Essay", "submission_types": ["online_text_entry"], "published": true}),
            ),
        );
        let client = client(fake.clone());

        let updated = ContentKind::Assignment
            .put(&client, 1, 5, &json!({"published": true}), None)
            .await
            .unwrap();
        assert_eq!(updated.id(), 5);

        let request = &fake.requests()[0];
        assert_eq!(request.method, HttpMethod::Put);
        assert_eq!(
            request.body,
            Some(RequestBody::Json(json!({"assignment": {"published": true}})))
        );
    }

    #[tokio::test]
    async fn test_put_rejection_is_error() {
        let fake = Arc::new(FakeTransport::new());
        fake.on(
            HttpMethod::Put,
            format!("{}/api/v1/courses/1/pages/5", BASE),
            HttpResponse::json(400, &json!({"errors": [{"message": "title is too long"}]})),
        );
        let client = client(fake);

        let err = ContentKind::Page
            .put(&client, 1, 5, &json!({"title": "x"}), None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("title is too long"));
    }
}
