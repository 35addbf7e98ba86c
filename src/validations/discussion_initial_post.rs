//! 讨论首帖检查：学生需要先发帖才能看到其他人的回复

use async_trait::async_trait;
use futures::TryStreamExt;
use serde_json::json;
use tracing::{info, warn};

use super::Validation;
use crate::clients::CanvasClient;
use crate::content_kind::{list_typed, ContentKind};
use crate::error::{AppError, AppResult};
use crate::models::{CallConfig, ContentRecord, Course, Discussion, MessageResult, ValidationResult};

pub struct DiscussionInitialPost;

impl DiscussionInitialPost {
    async fn check(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> AppResult<ValidationResult> {
        let mut messages = Vec::new();
        let mut links = Vec::new();
        let mut ids = Vec::new();

        let mut discussions = Box::pin(list_typed::<Discussion>(client, course.id, config));
        while let Some(discussion) = discussions.try_next().await? {
            if discussion.require_initial_post == Some(true) {
                continue;
            }
            messages.push(MessageResult::error(format!(
                "讨论「{}」没有要求先发帖",
                discussion.name()
            )));
            ids.push(discussion.id);
            links.push(super::content_link(client, course, &discussion.into_content()));
        }

        if ids.is_empty() {
            Ok(ValidationResult::success())
        } else {
            Ok(ValidationResult::failure(messages, links).with_user_data(json!(ids)))
        }
    }
}

#[async_trait]
impl Validation for DiscussionInitialPost {
    fn name(&self) -> &'static str {
        "discussion_initial_post"
    }

    fn description(&self) -> &'static str {
        "所有讨论都要求学生先发帖再查看回复"
    }

    async fn run(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> ValidationResult {
        self.check(client, course, config)
            .await
            .unwrap_or_else(|e| ValidationResult::from_error(&e))
    }

    fn is_fixable(&self) -> bool {
        true
    }

    async fn remediate(
        &self,
        client: &CanvasClient,
        course: &Course,
        previous: &ValidationResult,
    ) -> AppResult<ValidationResult> {
        let ids: Vec<u64> = match &previous.user_data {
            Some(data) => serde_json::from_value(data.clone())?,
            None => match self.check(client, course, None).await?.user_data {
                Some(data) => serde_json::from_value(data)?,
                None => Vec::new(),
            },
        };

        let update = json!({ "require_initial_post": true });
        let mut messages = Vec::new();
        let mut failed = 0usize;
        for &id in &ids {
            match ContentKind::Discussion.put(client, course.id, id, &update, None).await {
                Ok(saved) => {
                    info!("✓ 讨论「{}」已要求先发帖", saved.name());
                    messages.push(MessageResult::info(format!("讨论「{}」已要求先发帖", saved.name())));
                }
                Err(e) => {
                    warn!("⚠️ 修改讨论 #{} 失败: {}", id, e);
                    messages.push(MessageResult::error(format!("修改讨论 #{} 失败: {}", id, e)));
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == ids.len() {
            return Err(AppError::Other(format!("{} 个讨论全部修改失败", failed)));
        }
        Ok(ValidationResult::failure(messages, Vec::new()))
    }
}
