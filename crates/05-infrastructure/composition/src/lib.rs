//! # 作用域组合层
//!
//! 这个 crate 把作用域树和对象图组合在一起：作用域以保留服务名持有对象图，
//! 子作用域携带从父作用域对象图派生的子图。
//!
//! ## 主要功能
//!
//! - **作用域绑定器**: 按蓝图查找或创建子作用域，并通过上下文注入对象
//! - **配置源管理**: 基于 `config` crate 叠加 TOML、JSON 文件、环境变量和内联配置
//! - **运行时启动**: 初始化日志并创建带对象图的根作用域
//!
//! ## 基本使用
//!
//! ```rust
//! use di_abstractions::StaticBlueprint;
//! use infrastructure_composition::ScopeBootstrapper;
//!
//! let runtime = ScopeBootstrapper::new().build().unwrap();
//!
//! let blueprint = StaticBlueprint::new("activity");
//! let activity = runtime
//!     .binder()
//!     .require_child_scope(runtime.root(), &blueprint)
//!     .unwrap();
//! assert_eq!(activity.path(), "Root>activity");
//!
//! runtime.shutdown();
//! assert!(activity.is_destroyed());
//! ```

pub mod binder;
pub mod bootstrapper;
pub mod config_sources;

pub use binder::{GraphScopeBinder, ScopeContext, ScopeExtension};
pub use bootstrapper::{LoggingConfig, ScopeBootstrapper, ScopeRuntime};
pub use config_sources::{resolve_config, ConfigSource};

// 重新导出错误类型
pub use infrastructure_common::{BinderError, InfrastructureError};
