//! 标题检查：课程中不应有空标题或默认标题（Untitled）的内容

use async_trait::async_trait;
use futures::TryStreamExt;

use super::Validation;
use crate::api::merge_streams;
use crate::clients::CanvasClient;
use crate::content_kind::ContentKind;
use crate::error::AppResult;
use crate::models::{CallConfig, Course, MessageResult, ValidationResult};

pub struct UntitledContent;

/// 是否为空标题或默认标题
fn is_placeholder_title(name: &str) -> bool {
    let name = name.trim();
    name.is_empty() || name.to_ascii_lowercase().starts_with("untitled")
}

impl UntitledContent {
    async fn check(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> AppResult<ValidationResult> {
        let streams = ContentKind::ALL
            .into_iter()
            .map(|kind| kind.data_generator(client, course.id, config))
            .collect();
        let mut contents = merge_streams(streams);

        let mut messages = Vec::new();
        let mut links = Vec::new();
        while let Some(content) = contents.try_next().await? {
            if is_placeholder_title(content.name()) {
                messages.push(MessageResult::error(format!(
                    "{} #{} 没有标题: 「{}」",
                    content.kind(),
                    content.id(),
                    content.name()
                )));
                links.push(super::content_link(client, course, &content));
            }
        }

        if messages.is_empty() {
            Ok(ValidationResult::success())
        } else {
            Ok(ValidationResult::failure(messages, links))
        }
    }
}

#[async_trait]
impl Validation for UntitledContent {
    fn name(&self) -> &'static str {
        "untitled_content"
    }

    fn description(&self) -> &'static str {
        "作业、讨论、页面和测验都有标题"
    }

    async fn run(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> ValidationResult {
        self.check(client, course, config)
            .await
            .unwrap_or_else(|e| ValidationResult::from_error(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::*;
    use crate::infrastructure::FakeTransport;
    use crate::models::ValidationStatus;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_placeholder_titles() {
        assert!(is_placeholder_title(""));
        assert!(is_placeholder_title("   "));
        assert!(is_placeholder_title("Untitled Page"));
        assert!(is_placeholder_title("untitled"));
        assert!(!is_placeholder_title("Week 1: Untitled Thoughts"));
    }

    #[tokio::test]
    async fn test_checks_every_kind() {
        let fake = Arc::new(FakeTransport::new());
        fake.on_get_json(
            list_url("assignments"),
            json!([{"id": 1, "name": "Essay", "submission_types": []}]),
        );
        fake.on_get_json(
            list_url("discussion_topics"),
            json!([{"id": 2, "title": "", "discussion_type": "threaded"}]),
        );
        fake.on_get_json(
            list_url("pages"),
            json!([{"page_id": 3, "url": "untitled", "title": "Untitled"}]),
        );
        fake.on_get_json(
            list_url("quizzes"),
            json!([{"id": 4, "title": "Quiz 1", "quiz_type": "assignment"}]),
        );

        let result = UntitledContent.run(&client(fake.clone()), &Course::from_id(1), None).await;
        assert_eq!(result.success, ValidationStatus::Failure);
        assert_eq!(result.messages.len(), 2);
        assert_eq!(
            result.links,
            vec![
                "https://lms.test/courses/1/discussion_topics/2".to_string(),
                "https://lms.test/courses/1/pages/3".to_string(),
            ]
        );
        assert_eq!(fake.request_count(), 4);
    }

    #[tokio::test]
    async fn test_empty_course_passes() {
        let fake = Arc::new(FakeTransport::new());
        for segment in ["assignments", "discussion_topics", "pages", "quizzes"] {
            fake.on_get_json(list_url(segment), json!([]));
        }
        let result = UntitledContent.run(&client(fake), &Course::from_id(1), None).await;
        assert!(result.is_success());
    }
}
