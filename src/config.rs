use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::error::{AppResult, ConfigError};
use crate::models::call_config::{CallConfig, QueryValue};

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// LMS 站点地址（API 与页面共用）
    pub base_url: String,
    /// API 访问令牌，为空时不发送 Authorization 头
    pub api_token: String,
    /// 列表接口每页数量
    pub per_page: u32,
    /// 同时运行的检查项数量
    pub max_concurrent_validations: usize,
    /// 单个请求超时（秒）
    pub request_timeout_secs: u64,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出报告文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            api_token: String::new(),
            per_page: 100,
            max_concurrent_validations: 4,
            request_timeout_secs: 30,
            verbose_logging: false,
            output_log_file: "validation_report.txt".to_string(),
        }
    }
}

impl Config {
    /// 从环境变量读取配置，未设置的项使用默认值
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 从 TOML 文件读取配置
    ///
    /// # 参数
    /// - `path`: 配置文件路径
    pub fn from_file(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileReadFailed {
            path: path.display().to_string(),
            source,
        })?;

        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.display().to_string(),
            source,
        })?;

        debug!("已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 加载配置：先读文件（如果有），再用环境变量覆盖
    pub fn load(path: Option<&Path>) -> AppResult<Self> {
        let base = match path {
            Some(p) => Self::from_file(p)?,
            None => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 用环境变量覆盖当前配置
    pub fn with_env_overrides(self) -> Self {
        Self {
            base_url: std::env::var("LMS_BASE_URL").unwrap_or(self.base_url),
            api_token: std::env::var("LMS_API_TOKEN").unwrap_or(self.api_token),
            per_page: std::env::var("LMS_PER_PAGE").ok().and_then(|v| v.parse().ok()).unwrap_or(self.per_page),
            max_concurrent_validations: std::env::var("MAX_CONCURRENT_VALIDATIONS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_concurrent_validations),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(self.output_log_file),
        }
    }

    /// 检查必填项
    pub fn validate(&self) -> AppResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                name: "base_url".to_string(),
            }
            .into());
        }
        if self.max_concurrent_validations == 0 {
            return Err(ConfigError::MissingValue {
                name: "max_concurrent_validations".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// 所有列表请求共用的默认调用配置
    pub fn list_call_config(&self) -> CallConfig {
        CallConfig::default().with_query("per_page", QueryValue::Int(i64::from(self.per_page)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_from_file_partial_values_keep_defaults() {
        let path = std::env::temp_dir().join(format!("lms_content_config_{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "base_url = \"https://canvas.example.edu\"").unwrap();
        writeln!(file, "per_page = 50").unwrap();
        drop(file);

        let config = Config::from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.base_url, "https://canvas.example.edu");
        assert_eq!(config.per_page, 50);
        assert_eq!(config.max_concurrent_validations, 4);
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let err = Config::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(
            err,
            crate::error::AppError::Config(ConfigError::FileReadFailed { .. })
        ));
    }

    #[test]
    fn test_validate_requires_base_url() {
        assert!(Config::default().validate().is_ok());
        let config = Config {
            base_url: "  ".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(crate::error::AppError::Config(ConfigError::MissingValue { .. }))
        ));
    }

    #[test]
    fn test_list_call_config_sets_per_page() {
        let config = Config {
            per_page: 25,
            ..Config::default()
        };
        assert_eq!(config.list_call_config().query_string(), "per_page=25");
    }
}
