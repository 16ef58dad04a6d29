//! # Infrastructure Common
//!
//! 这个 crate 提供了作用域树与对象图组合层共用的错误类型、命名约定和配置模型。
//!
//! ## 核心内容
//!
//! - [`ScopeError`] / [`DependencyError`] / [`BinderError`] - 分层错误类型
//! - [`ScopeTreeConfig`] - 作用域树配置
//! - [`conventions`] - 保留服务名、路径分隔符等约定
//!
//! ## 设计原则
//!
//! - 所有错误同步返回，由调用方决定如何处理
//! - 未找到（not-found）以 `Ok(None)` 表示，而不是错误
//! - 不依赖任何进程级全局状态

pub mod configuration;
pub mod conventions;
pub mod errors;

pub use configuration::*;
pub use conventions::*;
pub use errors::*;
