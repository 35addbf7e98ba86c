//! # LMS Content
//!
//! 通过 LMS REST API 读取、检查和修复课程内容的 Rust 库
//!
//! ## 架构设计
//!
//! 本系统采用分层架构，依赖只向下：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源（HTTP 连接池），只暴露"执行一个请求"的能力
//! - `ReqwestTransport` - 真实网络；`FakeTransport` - 内存中的假后端
//!
//! ### ② 客户端与分页（Clients / API）
//! - `clients/` - `CanvasClient`：地址解析、鉴权、调用配置、JSON 解析
//! - `api/` - `paged_fetch`：按 `Link: rel="next"` 逐页拉取的惰性条目流
//!
//! ### ③ 内容类型（Content Kinds）
//! - `content_kind/` - 作业、讨论、页面、测验的统一 get / list / put，以及按地址或结构分派
//!
//! ### ④ 检查项（Validations）
//! - `validations/` - `Validation`：`run` 只读检查，`fix` 修复并验证
//!
//! ### ⑤ 编排层（Orchestration）
//! - `orchestrator/` - `ValidationRunner`：并发执行检查项、统计、写报告
//!
//! ## 模块结构

pub mod api;
pub mod clients;
pub mod config;
pub mod content_kind;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod utils;
pub mod validations;

// 重新导出常用类型
pub use api::{collect_all, merge_streams, paged_fetch, paged_fetch_as};
pub use clients::CanvasClient;
pub use config::Config;
pub use content_kind::{kind_for_data, kind_for_url, ContentKind};
pub use error::{AppError, AppResult};
pub use infrastructure::{FakeTransport, HttpTransport, ReqwestTransport};
pub use models::{
    override_config, CallConfig, Content, ContentLookup, Course, ValidationResult, ValidationStatus,
};
pub use orchestrator::ValidationRunner;
pub use validations::{catalog, Validation};
