use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 课程
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: u64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub course_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    /// 只知道课程ID时使用
    pub fn from_id(id: u64) -> Self {
        Self {
            id,
            name: None,
            course_code: None,
            extra: Map::new(),
        }
    }

    /// 用于日志显示的名称
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => format!("{} (#{})", name, self.id),
            None => format!("#{}", self.id),
        }
    }
}
