//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 负责对课程批量执行检查项并调度修复，只做调度和统计，不做具体的检查判断。
//!
//! ## 层次关系
//!
//! ```text
//! validation_runner (处理 Vec<Box<dyn Validation>>)
//!     ↓
//! validations (单个检查项：run / fix)
//!     ↓
//! content_kind (get / list / put)
//!     ↓
//! api::paged_fetch + clients::CanvasClient
//!     ↓
//! infrastructure (HttpTransport)
//! ```

pub mod validation_runner;

pub use validation_runner::{RuleOutcome, RunReport, RunStats, ValidationRunner};
