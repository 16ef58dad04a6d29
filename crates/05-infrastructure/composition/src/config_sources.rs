//! 配置源
//!
//! 用 `config` crate 把 TOML、JSON 文件、带前缀的环境变量和内联配置
//! 按添加顺序叠加，后添加者覆盖先添加者，最后绑定到 [`ScopeTreeConfig`]。

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File, FileFormat};
use infrastructure_common::{ConfigError, ScopeTreeConfig};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// 前缀与键之间的分隔符，例如 `LORN_SCOPE_ROOT_SCOPE_NAME`
pub const ENV_PREFIX_SEPARATOR: &str = "_";
/// 嵌套键的分隔符，例如 `LORN_SCOPE_LOGGING__LEVEL`
pub const ENV_NESTED_SEPARATOR: &str = "__";

/// 配置源
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    /// TOML 文件
    Toml(PathBuf),
    /// JSON 文件
    Json(PathBuf),
    /// 环境变量，`vars` 为空时读取进程环境
    Environment {
        prefix: String,
        vars: Option<config::Map<String, String>>,
    },
    /// 内联配置
    Inline(serde_json::Value),
}

impl ConfigSource {
    /// TOML 文件配置源，文件必须存在
    pub fn toml_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::Toml(existing_file(path.as_ref())?))
    }

    /// JSON 文件配置源，文件必须存在
    pub fn json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        Ok(Self::Json(existing_file(path.as_ref())?))
    }

    /// 读取进程环境变量的配置源
    pub fn environment(prefix: impl Into<String>) -> Self {
        Self::Environment {
            prefix: prefix.into(),
            vars: None,
        }
    }

    /// 读取给定键值对的环境变量配置源
    pub fn environment_from<I>(prefix: impl Into<String>, vars: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self::Environment {
            prefix: prefix.into(),
            vars: Some(vars.into_iter().collect()),
        }
    }

    /// 内联配置源
    pub fn inline(value: serde_json::Value) -> Self {
        Self::Inline(value)
    }

    /// 把这一层加入配置构建器
    pub fn add_to(&self, builder: ConfigBuilder<DefaultState>) -> ConfigBuilder<DefaultState> {
        match self {
            Self::Toml(path) => builder.add_source(File::from(path.as_path()).format(FileFormat::Toml)),
            Self::Json(path) => builder.add_source(File::from(path.as_path()).format(FileFormat::Json)),
            Self::Environment { prefix, vars } => builder.add_source(
                Environment::with_prefix(prefix)
                    .prefix_separator(ENV_PREFIX_SEPARATOR)
                    .separator(ENV_NESTED_SEPARATOR)
                    .source(vars.clone()),
            ),
            Self::Inline(value) => {
                builder.add_source(File::from_str(&value.to_string(), FileFormat::Json))
            }
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Toml(path) => write!(f, "toml:{}", path.display()),
            Self::Json(path) => write!(f, "json:{}", path.display()),
            Self::Environment { prefix, .. } => write!(f, "env:{}_*", prefix),
            Self::Inline(_) => write!(f, "inline"),
        }
    }
}

fn existing_file(path: &Path) -> Result<PathBuf, ConfigError> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(ConfigError::FileNotFound {
            path: path.display().to_string(),
        })
    }
}

fn parse_error(e: config::ConfigError) -> ConfigError {
    ConfigError::ParseError {
        source: Box::new(e),
    }
}

/// 在基础配置之上依次叠加配置源，绑定并验证
pub fn resolve_config(
    base: &ScopeTreeConfig,
    sources: &[ConfigSource],
) -> Result<ScopeTreeConfig, ConfigError> {
    let defaults = config::Config::try_from(base).map_err(parse_error)?;
    let mut builder = config::Config::builder().add_source(defaults);

    for source in sources {
        debug!("添加配置源: {}", source);
        builder = source.add_to(builder);
    }

    let config: ScopeTreeConfig = builder
        .build()
        .and_then(|settings| settings.try_deserialize())
        .map_err(|e| {
            error!("配置绑定失败: {}", e);
            parse_error(e)
        })?;

    config.validate()?;
    debug!("配置绑定成功: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::{Builder, NamedTempFile};

    fn temp_file(suffix: &str, content: &str) -> NamedTempFile {
        let mut file = Builder::new().suffix(suffix).tempfile().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn test_toml_file_over_defaults() {
        let file = temp_file(
            ".toml",
            "root_scope_name = \"App\"\n\n[logging]\nlevel = \"debug\"\n",
        );

        let config = resolve_config(
            &ScopeTreeConfig::default(),
            &[ConfigSource::toml_file(file.path()).unwrap()],
        )
        .unwrap();

        assert_eq!(config.root_scope_name, "App");
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.show_target);
        assert_eq!(
            config.graph_service_name,
            ScopeTreeConfig::default().graph_service_name
        );
    }

    #[test]
    fn test_later_sources_win() {
        let toml = temp_file(
            ".toml",
            "root_scope_name = \"FromToml\"\ngraph_service_name = \"toml.graph\"\n",
        );
        let json = temp_file(".json", r#"{ "root_scope_name": "FromJson" }"#);

        let config = resolve_config(
            &ScopeTreeConfig::default(),
            &[
                ConfigSource::toml_file(toml.path()).unwrap(),
                ConfigSource::json_file(json.path()).unwrap(),
                ConfigSource::inline(json!({ "logging": { "json_format": true } })),
            ],
        )
        .unwrap();

        assert_eq!(config.root_scope_name, "FromJson");
        assert_eq!(config.graph_service_name, "toml.graph");
        assert!(config.logging.json_format);
    }

    #[test]
    fn test_environment_vars() {
        let source = ConfigSource::environment_from(
            "APP",
            vars(&[
                ("APP_ROOT_SCOPE_NAME", "Main"),
                ("APP_LOGGING__LEVEL", "warn"),
                ("OTHER_GRAPH_SERVICE_NAME", "ignored"),
            ]),
        );

        let config = resolve_config(&ScopeTreeConfig::default(), &[source]).unwrap();

        assert_eq!(config.root_scope_name, "Main");
        assert_eq!(config.logging.level, "warn");
        assert_eq!(
            config.graph_service_name,
            ScopeTreeConfig::default().graph_service_name
        );
    }

    #[test]
    fn test_misspelled_key_rejected() {
        let file = temp_file(".toml", "graph_servce_name = \"typo\"\n");

        let result = resolve_config(
            &ScopeTreeConfig::default(),
            &[ConfigSource::toml_file(file.path()).unwrap()],
        );
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));

        let result = resolve_config(
            &ScopeTreeConfig::default(),
            &[ConfigSource::inline(json!({ "logging": { "levle": "debug" } }))],
        );
        assert!(matches!(result, Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ConfigSource::toml_file("/nonexistent/scope.toml"),
            Err(ConfigError::FileNotFound { .. })
        ));
        assert!(matches!(
            ConfigSource::json_file("/nonexistent/scope.json"),
            Err(ConfigError::FileNotFound { .. })
        ));
    }

    #[test]
    fn test_malformed_file() {
        let file = temp_file(".toml", "root_scope_name = ");

        assert!(matches!(
            resolve_config(
                &ScopeTreeConfig::default(),
                &[ConfigSource::toml_file(file.path()).unwrap()],
            ),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_validation_after_binding() {
        let result = resolve_config(
            &ScopeTreeConfig::default(),
            &[ConfigSource::inline(json!({ "root_scope_name": "a>b" }))],
        );
        assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
    }

    #[test]
    fn test_display() {
        assert_eq!(ConfigSource::environment("APP").to_string(), "env:APP_*");
        assert_eq!(ConfigSource::inline(json!({})).to_string(), "inline");
    }
}
