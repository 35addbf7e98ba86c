//! 内容分派
//!
//! 根据地址或 JSON 结构判断内容类型。

use serde_json::Value;
use tracing::debug;

use super::kind::ContentKind;
use crate::clients::CanvasClient;
use crate::error::AppResult;
use crate::models::call_config::CallConfig;
use crate::models::content::{Content, ContentLookup};

/// 按结构判断时的顺序：特征字段越独特越靠前
const SHAPE_ORDER: [ContentKind; 4] = [
    ContentKind::Quiz,
    ContentKind::Discussion,
    ContentKind::Page,
    ContentKind::Assignment,
];

/// 根据地址判断内容类型（按注册顺序，第一个匹配的胜出）
pub fn kind_for_url(url: &str) -> Option<ContentKind> {
    ContentKind::ALL
        .into_iter()
        .find(|kind| kind.urls().is_valid_url(url))
}

/// 根据 JSON 结构判断内容类型
pub fn kind_for_data(data: &Value) -> Option<ContentKind> {
    SHAPE_ORDER
        .into_iter()
        .find(|kind| kind.data_is_this_kind(data))
}

/// 所有结构匹配的类型（按判断顺序），用于检查记录是否有歧义
pub fn matching_kinds_for_data(data: &Value) -> Vec<ContentKind> {
    SHAPE_ORDER
        .into_iter()
        .filter(|kind| kind.data_is_this_kind(data))
        .collect()
}

/// 从地址中解析类型和 (课程ID, 内容ID)
pub fn course_and_content_id_from_url(url: &str) -> Option<(ContentKind, u64, u64)> {
    let kind = kind_for_url(url)?;
    let (course_id, content_id) = kind.urls().course_and_content_id_from_url(url)?;
    Some((kind, course_id, content_id))
}

/// 根据地址获取内容
///
/// # 返回
/// 地址不属于任何类型时返回 `Ok(None)`
pub async fn content_from_url(
    client: &CanvasClient,
    url: &str,
    config: Option<&CallConfig>,
) -> AppResult<Option<ContentLookup<Content>>> {
    let Some((kind, course_id, content_id)) = course_and_content_id_from_url(url) else {
        debug!("地址不属于任何内容类型: {}", url);
        return Ok(None);
    };
    kind.get(client, course_id, content_id, config).await.map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::infrastructure::FakeTransport;
    use serde_json::json;
    use std::sync::Arc;

    fn samples() -> Vec<(ContentKind, Value)> {
        vec![
            (
                ContentKind::Assignment,
                json!({"id": 1, "name": "Essay", "description": "<p>Write</p>",
                       "submission_types": ["online_text_entry"], "due_at": null}),
            ),
            (
                ContentKind::Page,
                json!({"page_id": 2, "url": "welcome", "title": "Welcome", "body": "<p>hi</p>"}),
            ),
            (
                ContentKind::Quiz,
                json!({"id": 3, "title": "Quiz 1", "description": "", "quiz_type": "assignment"}),
            ),
            (
                ContentKind::Discussion,
                json!({"id": 4, "title": "Intro", "message": "<p>Say hi</p>", "discussion_type": "side_comment"}),
            ),
        ]
    }

    #[test]
    fn test_each_sample_matches_exactly_one_kind() {
        for (expected, data) in samples() {
            assert_eq!(matching_kinds_for_data(&data), vec![expected], "{:?}", data);
            assert_eq!(kind_for_data(&data), Some(expected));
        }
    }

    #[test]
    fn test_ambiguous_record_follows_shape_order() {
        // 测验记录同时带有 submission_types 时按测验处理
        let data = json!({"id": 9, "title": "x", "quiz_type": "survey", "submission_types": []});
        assert_eq!(
            matching_kinds_for_data(&data),
            vec![ContentKind::Quiz, ContentKind::Assignment]
        );
        assert_eq!(kind_for_data(&data), Some(ContentKind::Quiz));
    }

    #[test]
    fn test_unknown_shape() {
        assert_eq!(kind_for_data(&json!({"id": 1})), None);
        assert_eq!(kind_for_data(&json!([1, 2])), None);
    }

    #[test]
    fn test_kind_for_url_forms() {
        assert_eq!(
            kind_for_url("https://lms.test/courses/5/assignments/10"),
            Some(ContentKind::Assignment)
        );
        assert_eq!(
            kind_for_url("/api/v1/courses/5/discussion_topics/10"),
            Some(ContentKind::Discussion)
        );
        assert_eq!(kind_for_url("/courses/5/pages/3?module_item_id=1"), Some(ContentKind::Page));
        assert_eq!(kind_for_url("/courses/5/quizzes/3/edit"), Some(ContentKind::Quiz));
        assert_eq!(kind_for_url("/courses/5/modules/3"), None);
        assert_eq!(kind_for_url("/courses/5/quizzes"), None);
    }

    #[test]
    fn test_ids_from_url_for_every_kind() {
        for kind in ContentKind::ALL {
            let url = kind.urls().html_url(31, 415);
            assert_eq!(course_and_content_id_from_url(&url), Some((kind, 31, 415)));
        }
    }

    #[tokio::test]
    async fn test_content_from_url() {
        let fake = Arc::new(FakeTransport::new());
        fake.on_get_json(
            "https://lms.test/api/v1/courses/5/pages/3",
            json!({"page_id": 3, "url": "syllabus", "title": "Syllabus"}),
        );
        let config = Config {
            base_url: "https://lms.test".to_string(),
            ..Config::default()
        };
        let client = CanvasClient::with_transport(&config, fake);

        let content = content_from_url(&client, "https://lms.test/courses/5/pages/3", None)
            .await
            .unwrap()
            .unwrap()
            .into_option()
            .unwrap();
        assert_eq!(content.kind(), ContentKind::Page);
        assert_eq!(content.name(), "Syllabus");

        let none = content_from_url(&client, "https://lms.test/courses/5/files/3", None)
            .await
            .unwrap();
        assert!(none.is_none());

        let missing = content_from_url(&client, "/courses/5/pages/4", None).await.unwrap().unwrap();
        assert!(!missing.is_found());
    }
}
