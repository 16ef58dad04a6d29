//! 作用域运行时启动器

use crate::binder::GraphScopeBinder;
use crate::config_sources::{resolve_config, ConfigSource};
use di_abstractions::{ModuleRef, ObjectGraph};
use di_impl::root_graph;
use infrastructure_common::{ConfigError, InfrastructureError, LoggingSettings, ScopeTreeConfig};
use scope_tree::{Scope, ScopeTree};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// 作用域运行时启动器
///
/// 使用建造者模式加载配置、初始化日志并创建带对象图的根作用域
pub struct ScopeBootstrapper {
    /// 基础配置
    config: ScopeTreeConfig,
    /// 配置源列表，后添加者覆盖先添加者
    config_sources: Vec<ConfigSource>,
    /// 根对象图
    root_graph: Option<Arc<dyn ObjectGraph>>,
    /// 根模块，未给出根对象图时使用
    root_modules: Vec<ModuleRef>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 显式日志配置，为空时使用配置文件中的日志设置
    logging_config: Option<LoggingConfig>,
}

impl ScopeBootstrapper {
    /// 创建新的启动器
    pub fn new() -> Self {
        Self {
            config: ScopeTreeConfig::default(),
            config_sources: Vec::new(),
            root_graph: None,
            root_modules: Vec::new(),
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: None,
        }
    }

    /// 设置基础配置
    pub fn with_config(mut self, config: ScopeTreeConfig) -> Self {
        self.config = config;
        self
    }

    /// 添加 TOML 配置文件
    pub fn add_config_toml<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let source = ConfigSource::toml_file(path)?;
        info!("添加 TOML 配置文件: {}", source);
        self.config_sources.push(source);
        Ok(self)
    }

    /// 添加 JSON 配置文件
    pub fn add_config_json<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let source = ConfigSource::json_file(path)?;
        info!("添加 JSON 配置文件: {}", source);
        self.config_sources.push(source);
        Ok(self)
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars<S: Into<String>>(mut self, prefix: S) -> Self {
        let source = ConfigSource::environment(prefix);
        info!("添加环境变量配置源: {}", source);
        self.config_sources.push(source);
        self
    }

    /// 添加内联配置，例如命令行参数给出的覆盖值
    pub fn add_config_value(mut self, value: serde_json::Value) -> Self {
        self.config_sources.push(ConfigSource::inline(value));
        self
    }

    /// 添加任意配置源
    pub fn add_config_source(mut self, source: ConfigSource) -> Self {
        info!("添加配置源: {}", source);
        self.config_sources.push(source);
        self
    }

    /// 设置根对象图
    pub fn with_root_graph(mut self, graph: Arc<dyn ObjectGraph>) -> Self {
        self.root_graph = Some(graph);
        self
    }

    /// 添加根模块
    pub fn with_root_module(mut self, module: ModuleRef) -> Self {
        self.root_modules.push(module);
        self
    }

    /// 使用显式日志配置
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = Some(config);
        self.logging_enabled = true;
        self
    }

    /// 使用配置中的日志设置
    pub fn with_configured_logging(mut self) -> Self {
        self.logging_enabled = true;
        self
    }

    /// 构建作用域运行时
    pub fn build(self) -> Result<ScopeRuntime, InfrastructureError> {
        let config = resolve_config(&self.config, &self.config_sources)?;

        // 只有在明确要求时才初始化日志
        if self.logging_enabled {
            let logging = match self.logging_config {
                Some(logging) => logging,
                None => LoggingConfig::from_settings(&config.logging)?,
            };
            initialize_logging(&logging)?;
        }

        info!("开始构建作用域运行时");

        let graph = match self.root_graph {
            Some(graph) => {
                if !self.root_modules.is_empty() {
                    return Err(InfrastructureError::BootstrapFailed {
                        message: "根对象图与根模块不能同时设置".to_string(),
                    });
                }
                graph
            }
            None => root_graph(&self.root_modules)?,
        };

        let tree = ScopeTree::new();
        let binder = GraphScopeBinder::with_service_name(config.graph_service_name.clone());
        let root = binder.create_root_scope(&tree, &config.root_scope_name, Some(graph))?;

        info!(
            "作用域运行时构建完成，根作用域: {}，对象图服务名: {}",
            root.path(),
            binder.service_name()
        );

        Ok(ScopeRuntime {
            config,
            tree,
            binder,
            root,
        })
    }
}

impl Default for ScopeBootstrapper {
    fn default() -> Self {
        Self::new()
    }
}

/// 作用域运行时
///
/// 持有作用域树、绑定器和根作用域，由调用方显式传递
#[derive(Debug, Clone)]
pub struct ScopeRuntime {
    config: ScopeTreeConfig,
    tree: ScopeTree,
    binder: GraphScopeBinder,
    root: Scope,
}

impl ScopeRuntime {
    /// 生效的配置
    pub fn config(&self) -> &ScopeTreeConfig {
        &self.config
    }

    /// 作用域树
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// 绑定器
    pub fn binder(&self) -> &GraphScopeBinder {
        &self.binder
    }

    /// 根作用域
    pub fn root(&self) -> &Scope {
        &self.root
    }

    /// 销毁根作用域及所有后代
    pub fn shutdown(&self) {
        info!("关闭作用域运行时: {}", self.root.path());
        self.root.destroy();
    }
}

/// 初始化日志系统
fn initialize_logging(config: &LoggingConfig) -> Result<(), InfrastructureError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str().to_ascii_lowercase()));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number);

    if config.json_format {
        subscriber.json().try_init()
    } else {
        subscriber.try_init()
    }
    .map_err(|e| InfrastructureError::BootstrapFailed {
        message: format!("日志初始化失败: {}", e),
    })?;

    info!("日志系统初始化完成");
    Ok(())
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 从配置文件中的日志设置转换
    pub fn from_settings(settings: &LoggingSettings) -> Result<Self, ConfigError> {
        settings.validate()?;
        let level = tracing::Level::from_str(&settings.level)
            .map_err(|e| ConfigError::validation(format!("日志级别 {}: {}", settings.level, e)))?;

        Ok(Self {
            level,
            show_target: settings.show_target,
            json_format: settings.json_format,
            ..Self::default()
        })
    }
}
