//! 检查结果
//!
//! `run` / `fix` 的统一返回值。`success` 在线上格式中是 `true`、`false`、
//! `"unknown"` 或 `"not run"`。

use serde::de::{self, Deserializer, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::AppError;

/// 检查状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    Success,
    Failure,
    Unknown,
    NotRun,
}

impl ValidationStatus {
    pub fn label(self) -> &'static str {
        match self {
            ValidationStatus::Success => "通过",
            ValidationStatus::Failure => "未通过",
            ValidationStatus::Unknown => "未知",
            ValidationStatus::NotRun => "未执行",
        }
    }
}

impl Serialize for ValidationStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ValidationStatus::Success => serializer.serialize_bool(true),
            ValidationStatus::Failure => serializer.serialize_bool(false),
            ValidationStatus::Unknown => serializer.serialize_str("unknown"),
            ValidationStatus::NotRun => serializer.serialize_str("not run"),
        }
    }
}

impl<'de> Deserialize<'de> for ValidationStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatusVisitor;

        impl<'de> Visitor<'de> for StatusVisitor {
            type Value = ValidationStatus;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("true, false, \"unknown\" or \"not run\"")
            }

            fn visit_bool<E: de::Error>(self, value: bool) -> Result<Self::Value, E> {
                Ok(if value {
                    ValidationStatus::Success
                } else {
                    ValidationStatus::Failure
                })
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<Self::Value, E> {
                match value {
                    "unknown" => Ok(ValidationStatus::Unknown),
                    "not run" => Ok(ValidationStatus::NotRun),
                    other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
                }
            }
        }

        deserializer.deserialize_any(StatusVisitor)
    }
}

/// 消息类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Info,
    Error,
}

/// 展示给用户的一条消息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResult {
    pub text: String,
    pub kind: MessageKind,
}

impl MessageResult {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Info,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: MessageKind::Error,
        }
    }
}

/// 检查结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub success: ValidationStatus,
    #[serde(default)]
    pub messages: Vec<MessageResult>,
    #[serde(default)]
    pub links: Vec<String>,
    /// `run` 发现的数据，交给 `fix` 复用，避免重复请求
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_data: Option<Value>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            success: ValidationStatus::Success,
            messages: Vec::new(),
            links: Vec::new(),
            user_data: None,
        }
    }

    pub fn failure(messages: Vec<MessageResult>, links: Vec<String>) -> Self {
        Self {
            success: ValidationStatus::Failure,
            messages,
            links,
            user_data: None,
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self {
            success: ValidationStatus::Unknown,
            messages: vec![MessageResult::info(message)],
            links: Vec::new(),
            user_data: None,
        }
    }

    pub fn not_run(message: impl Into<String>) -> Self {
        Self {
            success: ValidationStatus::NotRun,
            messages: vec![MessageResult::info(message)],
            links: Vec::new(),
            user_data: None,
        }
    }

    /// 检查过程中出错时，转换为带错误信息的失败结果
    pub fn from_error(err: &AppError) -> Self {
        Self::failure(vec![MessageResult::error(err.to_string())], Vec::new())
    }

    pub fn with_user_data(mut self, data: Value) -> Self {
        self.user_data = Some(data);
        self
    }

    pub fn is_success(&self) -> bool {
        self.success == ValidationStatus::Success
    }
}
