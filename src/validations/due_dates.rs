//! 截止日期检查：每个作业都应设置可解析的 `due_at`

use async_trait::async_trait;
use chrono::DateTime;
use futures::TryStreamExt;

use super::Validation;
use crate::clients::CanvasClient;
use crate::content_kind::list_typed;
use crate::error::AppResult;
use crate::models::{Assignment, CallConfig, ContentRecord, Course, MessageResult, ValidationResult};

pub struct DueDates;

impl DueDates {
    async fn check(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> AppResult<ValidationResult> {
        let mut messages = Vec::new();
        let mut links = Vec::new();

        let mut assignments = Box::pin(list_typed::<Assignment>(client, course.id, config));
        while let Some(assignment) = assignments.try_next().await? {
            let problem = match assignment.due_at.as_deref() {
                None => Some("没有设置截止日期".to_string()),
                Some(due) if DateTime::parse_from_rfc3339(due).is_err() => {
                    Some(format!("截止日期格式无法识别: {}", due))
                }
                Some(_) => None,
            };
            if let Some(problem) = problem {
                messages.push(MessageResult::error(format!("作业「{}」{}", assignment.name(), problem)));
                links.push(super::content_link(client, course, &assignment.into_content()));
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
impl Validation for DueDates {
    fn name(&self) -> &'static str {
        "due_dates"
    }

    fn description(&self) -> &'static str {
        "所有作业都设置了截止日期"
    }

    async fn run(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> ValidationResult {
        self.check(client, course, config)
            .await
            .unwrap_or_else(|e| ValidationResult::from_error(&e))
    }
}
