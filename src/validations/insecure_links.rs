//! 不安全链接检查：正文中的 `href` / `src` 不应使用 `http://`
//!
//! 修复时把这些地址改为 `https://` 并回写正文。

use std::sync::LazyLock;

use async_trait::async_trait;
use futures::TryStreamExt;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{info, warn};

use super::Validation;
use crate::api::merge_streams;
use crate::clients::CanvasClient;
use crate::content_kind::ContentKind;
use crate::error::{AppError, AppResult};
use crate::models::call_config::{merge_optional, QueryValue};
use crate::models::{CallConfig, Course, MessageResult, ValidationResult};

pub struct InsecureLinks;

/// `run` 发现的待修复内容，通过 `user_data` 交给修复步骤
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct InsecureItem {
    kind: ContentKind,
    id: u64,
    name: String,
    body: String,
}

static INSECURE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(\b(?:href|src)\s*=\s*["']?)http://"#).expect("不安全链接正则无效")
});

/// 正文中不安全链接的数量
fn count_insecure(body: &str) -> usize {
    INSECURE_ATTR_RE.find_iter(body).count()
}

/// 把 `href` / `src` 中的 `http://` 改为 `https://`
fn secure_body(body: &str) -> String {
    INSECURE_ATTR_RE.replace_all(body, "${1}https://").into_owned()
}

impl InsecureLinks {
    async fn check(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> AppResult<ValidationResult> {
        // 页面列表默认不返回正文
        let page_config = merge_optional(
            Some(&CallConfig::default().with_query("include[]", QueryValue::List(vec!["body".into()]))),
            config,
        );
        let streams = ContentKind::ALL
            .into_iter()
            .map(|kind| match kind {
                ContentKind::Page => kind.data_generator(client, course.id, Some(&page_config)),
                _ => kind.data_generator(client, course.id, config),
            })
            .collect();
        let mut contents = merge_streams(streams);

        let mut messages = Vec::new();
        let mut links = Vec::new();
        let mut items = Vec::new();
        while let Some(content) = contents.try_next().await? {
            let Some(body) = content.body() else {
                continue;
            };
            let count = count_insecure(body);
            if count == 0 {
                continue;
            }
            messages.push(MessageResult::error(format!(
                "{}「{}」中有 {} 个 http:// 链接",
                content.kind(),
                content.name(),
                count
            )));
            links.push(super::content_link(client, course, &content));
            items.push(InsecureItem {
                kind: content.kind(),
                id: content.id(),
                name: content.name().to_string(),
                body: body.to_string(),
            });
        }

        if items.is_empty() {
            return Ok(ValidationResult::success());
        }
        Ok(ValidationResult::failure(messages, links).with_user_data(serde_json::to_value(&items)?))
    }

    /// 取出上次结果中的待修复内容；没有时重新检查
    async fn items_to_fix(
        &self,
        client: &CanvasClient,
        course: &Course,
        previous: &ValidationResult,
    ) -> AppResult<Vec<InsecureItem>> {
        let data = match &previous.user_data {
            Some(data) => data.clone(),
            None => self.check(client, course, None).await?.user_data.unwrap_or(Value::Null),
        };
        if data.is_null() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_value(data)?)
    }
}

#[async_trait]
impl Validation for InsecureLinks {
    fn name(&self) -> &'static str {
        "insecure_links"
    }

    fn description(&self) -> &'static str {
        "正文中的链接和资源都使用 https"
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
        let items = self.items_to_fix(client, course, previous).await?;
        let mut messages = Vec::new();
        let mut failed = 0usize;

        for item in &items {
            let field = item.kind.body_field();
            let update = json!({ field: secure_body(&item.body) });
            match item.kind.put(client, course.id, item.id, &update, None).await {
                Ok(_) => {
                    info!("✓ 已修复{}「{}」", item.kind, item.name);
                    messages.push(MessageResult::info(format!("已修复{}「{}」", item.kind, item.name)));
                }
                Err(e) => {
                    warn!("⚠️ 修复{}「{}」失败: {}", item.kind, item.name, e);
                    messages.push(MessageResult::error(format!("修复{}「{}」失败: {}", item.kind, item.name, e)));
                    failed += 1;
                }
            }
        }

        if failed > 0 && failed == items.len() {
            return Err(AppError::Other(format!("{} 项内容全部修复失败", failed)));
        }
        Ok(ValidationResult::failure(messages, Vec::new()))
    }
}
