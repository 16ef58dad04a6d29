//! 错误类型定义

use thiserror::Error;

/// 作用域树错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("作用域已销毁: {path}")]
    Destroyed { path: String },

    #[error("子作用域已存在: {parent} 下的 {name}")]
    DuplicateChild { parent: String, name: String },

    #[error("作用域名称无效: '{name}', 原因: {reason}")]
    InvalidName { name: String, reason: String },

    #[error("服务类型不匹配: {service_name}, 期望 {expected}")]
    ServiceTypeMismatch {
        service_name: String,
        expected: String,
    },
}

impl ScopeError {
    /// 创建已销毁错误
    pub fn destroyed(path: impl Into<String>) -> Self {
        Self::Destroyed { path: path.into() }
    }

    /// 是否为已销毁错误
    pub fn is_destroyed(&self) -> bool {
        matches!(self, Self::Destroyed { .. })
    }
}

/// 依赖注入错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DependencyError {
    #[error("绑定不存在: {type_name}")]
    BindingNotFound { type_name: String },

    #[error("重复绑定: {type_name}, 模块: {module}")]
    DuplicateBinding { type_name: String, module: String },

    #[error("绑定类型不匹配: 期望 {expected}")]
    TypeMismatch { expected: String },

    #[error("注入失败: {target}, 原因: {message}")]
    InjectionFailed { target: String, message: String },

    #[error("子图派生失败: {message}")]
    DerivationFailed { message: String },
}

impl DependencyError {
    /// 创建绑定不存在错误
    pub fn binding_not_found(type_name: impl Into<String>) -> Self {
        Self::BindingNotFound {
            type_name: type_name.into(),
        }
    }

    /// 创建注入失败错误
    pub fn injection_failed(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InjectionFailed {
            target: target.into(),
            message: message.into(),
        }
    }
}

/// 作用域绑定器错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BinderError {
    #[error("作用域链上没有对象图: {scope}")]
    MissingGraph { scope: String },

    #[error("作用域错误: {source}")]
    Scope {
        #[from]
        source: ScopeError,
    },

    #[error("依赖注入错误: {source}")]
    Dependency {
        #[from]
        source: DependencyError,
    },
}

impl BinderError {
    /// 创建缺少对象图错误
    pub fn missing_graph(scope: impl Into<String>) -> Self {
        Self::MissingGraph {
            scope: scope.into(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置文件读取失败: {source}")]
    FileReadError {
        #[from]
        source: std::io::Error,
    },

    #[error("配置解析失败: {source}")]
    ParseError {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

impl ConfigError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("作用域错误: {source}")]
    ScopeError {
        #[from]
        source: ScopeError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("绑定器错误: {source}")]
    BinderError {
        #[from]
        source: BinderError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ScopeResult<T> = Result<T, ScopeError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type BinderResult<T> = Result<T, BinderError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
