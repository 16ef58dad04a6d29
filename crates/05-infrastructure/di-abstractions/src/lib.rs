//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义作用域树与具体对象图引擎之间的能力接口。
//!
//! ## 核心接口
//!
//! - [`ObjectGraph`] - 可派生子图、可执行注入的对象图
//! - [`Module`] - 向子图贡献绑定的模块描述
//! - [`ModuleSpec`] - 无 / 单个 / 多个模块的派生规格
//! - [`Blueprint`] - 子作用域名称与模块规格的描述
//! - [`Injectable`] - 接收注入的目标
//! - [`BindingRegistry`] - 模块写入绑定的注册表

pub mod blueprint;
pub mod graph;
pub mod module;
pub mod registry;

pub use blueprint::*;
pub use graph::*;
pub use module::*;
pub use registry::*;

pub use infrastructure_common::OBJECT_GRAPH_SERVICE;
