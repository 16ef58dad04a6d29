//! 配置模型
//!
//! 作用域树运行时的配置。未知字段会被拒绝，拼写错误的键不会被静默忽略。

use crate::conventions::{
    validate_scope_name, DEFAULT_ROOT_SCOPE_NAME, OBJECT_GRAPH_SERVICE,
};
use crate::errors::ConfigError;
use serde::{Deserialize, Serialize};

/// 支持的日志级别
pub const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// 作用域树配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeTreeConfig {
    /// 根作用域名称
    pub root_scope_name: String,
    /// 对象图服务名
    pub graph_service_name: String,
    /// 日志设置
    pub logging: LoggingSettings,
}

impl Default for ScopeTreeConfig {
    fn default() -> Self {
        Self {
            root_scope_name: DEFAULT_ROOT_SCOPE_NAME.to_string(),
            graph_service_name: OBJECT_GRAPH_SERVICE.to_string(),
            logging: LoggingSettings::default(),
        }
    }
}

impl ScopeTreeConfig {
    /// 验证配置
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_scope_name(&self.root_scope_name)
            .map_err(|e| ConfigError::validation(format!("root_scope_name: {}", e)))?;

        if self.graph_service_name.trim().is_empty() {
            return Err(ConfigError::validation("graph_service_name 不能为空"));
        }

        self.logging.validate()
    }
}

/// 日志设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// 日志级别
    pub level: String,
    /// 是否使用 JSON 格式
    pub json_format: bool,
    /// 是否显示目标
    pub show_target: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            show_target: true,
        }
    }
}

impl LoggingSettings {
    /// 验证日志设置
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.level.to_ascii_lowercase();
        if LOG_LEVELS.contains(&level.as_str()) {
            Ok(())
        } else {
            Err(ConfigError::validation(format!(
                "未知的日志级别: {}",
                self.level
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conventions::PATH_SEPARATOR;

    #[test]
    fn test_default_config_is_valid() {
        let config = ScopeTreeConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.root_scope_name, DEFAULT_ROOT_SCOPE_NAME);
        assert_eq!(config.graph_service_name, OBJECT_GRAPH_SERVICE);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = ScopeTreeConfig::default();
        config.root_scope_name = format!("a{}b", PATH_SEPARATOR);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError { .. })
        ));

        let mut config = ScopeTreeConfig::default();
        config.graph_service_name = "  ".to_string();
        assert!(config.validate().is_err());

        let mut config = ScopeTreeConfig::default();
        config.logging.level = "verbose".to_string();
        assert!(config.validate().is_err());
    }
}
