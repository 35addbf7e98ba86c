//! 检查项
//!
//! ## 职责
//!
//! 每个检查项由 `name`、`description`、`run` 和可选的修复组成：
//! - `run` 只读取课程内容，不修改远端数据
//! - `fix` 先确认需要修复，再调用 `remediate`，最后重新 `run` 验证
//!
//! 检查过程中的错误由检查项自己转换为失败结果，不向上抛出。

pub mod discussion_initial_post;
pub mod due_dates;
pub mod insecure_links;
pub mod untitled_content;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::clients::CanvasClient;
use crate::error::{AppResult, ContentError};
use crate::models::{CallConfig, Content, Course, ValidationResult};

pub use discussion_initial_post::DiscussionInitialPost;
pub use due_dates::DueDates;
pub use insecure_links::InsecureLinks;
pub use untitled_content::UntitledContent;

/// 检查项
#[async_trait]
pub trait Validation: Send + Sync {
    /// 唯一名称（命令行中使用）
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// 检查课程内容，不修改任何数据
    async fn run(&self, client: &CanvasClient, course: &Course, config: Option<&CallConfig>) -> ValidationResult;

    fn is_fixable(&self) -> bool {
        false
    }

    /// 执行修复动作
    ///
    /// # 参数
    /// - `previous`: 未通过的检查结果，`user_data` 中带有 `run` 发现的数据
    async fn remediate(
        &self,
        _client: &CanvasClient,
        _course: &Course,
        _previous: &ValidationResult,
    ) -> AppResult<ValidationResult> {
        Err(ContentError::UnsupportedFix {
            name: self.name().to_string(),
        }
        .into())
    }

    /// 修复并验证
    ///
    /// - 没有传入上次结果时先执行 `run`
    /// - 上次结果已通过时返回"未执行"，不发起任何修改
    /// - 否则执行修复，再重新检查；修复过程的消息保留在结果前面
    async fn fix(&self, client: &CanvasClient, course: &Course, previous: Option<ValidationResult>) -> ValidationResult {
        let previous = match previous {
            Some(result) => result,
            None => self.run(client, course, None).await,
        };

        if previous.is_success() {
            debug!("[{}] 已通过，跳过修复", self.name());
            return ValidationResult::not_run("检查已通过，无需修复");
        }

        info!("🔧 [{}] 开始修复 {}", self.name(), course.display_name());
        let remediation = match self.remediate(client, course, &previous).await {
            Ok(result) => result,
            Err(e) => return ValidationResult::from_error(&e),
        };

        let mut verified = self.run(client, course, None).await;
        let mut messages = remediation.messages;
        messages.append(&mut verified.messages);
        verified.messages = messages;
        verified
    }
}

/// 全部检查项
pub fn catalog() -> Vec<Box<dyn Validation>> {
    vec![
        Box::new(DueDates),
        Box::new(UntitledContent),
        Box::new(InsecureLinks),
        Box::new(DiscussionInitialPost),
    ]
}

/// 按名称查找检查项
pub fn find(name: &str) -> Option<Box<dyn Validation>> {
    catalog().into_iter().find(|v| v.name() == name)
}

/// 内容在页面上的地址，用作结果中的链接
pub(crate) fn content_link(client: &CanvasClient, course: &Course, content: &Content) -> String {
    match content.html_url() {
        Some(url) => url.to_string(),
        None => format!(
            "{}{}",
            client.base_url(),
            content.kind().urls().html_url(course.id, content.id())
        ),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::clients::CanvasClient;
    use crate::config::Config;
    use crate::infrastructure::FakeTransport;

    pub const BASE: &str = "https://lms.test";

    pub fn client(fake: Arc<FakeTransport>) -> CanvasClient {
        let config = Config {
            base_url: BASE.to_string(),
            ..Config::default()
        };
        CanvasClient::with_transport(&config, fake)
    }

    /// 课程 1 中某类内容的列表地址
    pub fn list_url(segment: &str) -> String {
        format!("{}/api/v1/courses/1/{}", BASE, segment)
    }
}
