//! 检查执行器 - 编排层
//!
//! ## 职责
//!
//! 对一门课程执行一组检查项，是命令行 `check` 的入口。
//!
//! ## 核心功能
//!
//! 1. **并发控制**：使用 Semaphore 限制同时运行的检查项数量
//! 2. **修复**：开启修复时，对未通过且可修复的检查项调用 `fix`
//! 3. **报告**：结果写入报告文件，并输出统计信息
//!
//! 各检查项独立拉取数据，相互之间没有顺序保证；报告按检查项的传入顺序输出。

use std::fmt::Write as _;
use std::sync::Arc;

use tokio::sync::Semaphore;
use tracing::{error, info};

use crate::clients::CanvasClient;
use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::{Course, ValidationResult, ValidationStatus};
use crate::utils::logging::{append_log, init_log_file, log_startup, print_final_stats};
use crate::validations::Validation;

/// 单个检查项的执行结果
#[derive(Debug, Clone)]
pub struct RuleOutcome {
    pub name: String,
    pub description: String,
    pub result: ValidationResult,
    /// 执行了修复时为修复并验证后的结果
    pub fix_result: Option<ValidationResult>,
}

impl RuleOutcome {
    /// 最终状态（修复过则以修复结果为准）
    pub fn final_status(&self) -> ValidationStatus {
        self.fix_result
            .as_ref()
            .map_or(self.result.success, |r| r.success)
    }

    pub fn was_fixed(&self) -> bool {
        self.fix_result.as_ref().is_some_and(ValidationResult::is_success)
    }
}

/// 执行统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub passed: usize,
    pub failed: usize,
    pub unknown: usize,
    pub fixed: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &RuleOutcome) {
        match outcome.final_status() {
            ValidationStatus::Success => self.passed += 1,
            ValidationStatus::Failure => self.failed += 1,
            ValidationStatus::Unknown | ValidationStatus::NotRun => self.unknown += 1,
        }
        if outcome.was_fixed() {
            self.fixed += 1;
        }
    }
}

/// 一次执行的完整结果
#[derive(Debug, Clone)]
pub struct RunReport {
    pub course: Course,
    pub outcomes: Vec<RuleOutcome>,
    pub stats: RunStats,
}

/// 检查执行器
pub struct ValidationRunner {
    config: Config,
    client: CanvasClient,
}

impl ValidationRunner {
    /// 根据配置创建执行器（使用真实网络）
    pub fn new(config: Config) -> AppResult<Self> {
        let client = CanvasClient::new(&config)?.with_list_config(config.list_call_config());
        Ok(Self::with_client(config, client))
    }

    /// 使用已有的客户端创建执行器
    pub fn with_client(config: Config, client: CanvasClient) -> Self {
        Self { config, client }
    }

    pub fn client(&self) -> &CanvasClient {
        &self.client
    }

    /// 对课程执行检查项
    ///
    /// # 参数
    /// - `course_id`: 课程ID
    /// - `validations`: 要执行的检查项
    /// - `fix`: 是否修复未通过的检查项
    ///
    /// # 返回
    /// 返回每个检查项的结果和统计；课程不存在或报告文件无法写入时报错
    pub async fn run(
        &self,
        course_id: u64,
        validations: Vec<Box<dyn Validation>>,
        fix: bool,
    ) -> AppResult<RunReport> {
        init_log_file(&self.config.output_log_file, "课程检查报告")?;
        log_startup(&self.config.base_url, self.config.max_concurrent_validations);

        let course = self.client.get_course(course_id).await?;
        info!("📚 课程: {}", course.display_name());
        info!("✓ 共 {} 个检查项{}\n", validations.len(), if fix { "（开启修复）" } else { "" });

        let outcomes = self.run_all(&course, validations, fix).await?;

        let mut stats = RunStats::default();
        let mut report = format!("课程: {}\n\n", course.display_name());
        for outcome in &outcomes {
            stats.record(outcome);
            report.push_str(&format_outcome(outcome));
        }
        append_log(&self.config.output_log_file, &report)?;

        print_final_stats(
            stats.passed,
            stats.failed,
            stats.unknown,
            stats.fixed,
            &self.config.output_log_file,
        );

        Ok(RunReport {
            course,
            outcomes,
            stats,
        })
    }

    /// 并发执行所有检查项，结果按传入顺序返回
    async fn run_all(
        &self,
        course: &Course,
        validations: Vec<Box<dyn Validation>>,
        fix: bool,
    ) -> AppResult<Vec<RuleOutcome>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_validations.max(1)));
        let mut handles = Vec::new();

        for validation in validations {
            let validation: Arc<dyn Validation> = Arc::from(validation);
            let permit = semaphore.clone().acquire_owned().await?;
            let client = self.client.clone();
            let course = course.clone();
            let name = validation.name().to_string();
            let description = validation.description().to_string();

            let handle = tokio::spawn(async move {
                let _permit = permit;
                run_one(validation.as_ref(), &client, &course, fix).await
            });
            handles.push((name, description, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (name, description, handle) in handles {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("[{}] 任务执行失败: {}", name, e);
                    let err: AppError = e.into();
                    RuleOutcome {
                        name,
                        description,
                        result: ValidationResult::from_error(&err),
                        fix_result: None,
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(outcomes)
    }
}

/// 执行单个检查项（需要时修复）
async fn run_one(validation: &dyn Validation, client: &CanvasClient, course: &Course, fix: bool) -> RuleOutcome {
    let name = validation.name();
    let result = validation.run(client, course, None).await;
    info!("[{}] {}", name, status_marker(result.success));

    let fix_result = if fix && !result.is_success() && validation.is_fixable() {
        let fixed = validation.fix(client, course, Some(result.clone())).await;
        info!("[{}] 🔧 修复后: {}", name, status_marker(fixed.success));
        Some(fixed)
    } else {
        None
    };

    RuleOutcome {
        name: name.to_string(),
        description: validation.description().to_string(),
        result,
        fix_result,
    }
}

fn status_marker(status: ValidationStatus) -> String {
    let icon = match status {
        ValidationStatus::Success => "✅",
        ValidationStatus::Failure => "❌",
        ValidationStatus::Unknown => "❔",
        ValidationStatus::NotRun => "⏭️",
    };
    format!("{} {}", icon, status.label())
}

/// 报告文件中的一段
fn format_outcome(outcome: &RuleOutcome) -> String {
    let mut text = String::new();
    let _ = writeln!(
        text,
        "[{}] {} - {}",
        outcome.final_status().label(),
        outcome.name,
        outcome.description
    );
    for message in &outcome.result.messages {
        let _ = writeln!(text, "  - {}", message.text);
    }
    for link in &outcome.result.links {
        let _ = writeln!(text, "    {}", link);
    }
    if let Some(fixed) = &outcome.fix_result {
        let _ = writeln!(text, "  修复结果: {}", fixed.success.label());
        for message in &fixed.messages {
            let _ = writeln!(text, "  - {}", message.text);
        }
    }
    text.push('\n');
    text
}
