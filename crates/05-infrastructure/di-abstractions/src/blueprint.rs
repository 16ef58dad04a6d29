//! 子作用域蓝图

use crate::module::{Module, ModuleRef, ModuleSpec};
use std::sync::Arc;

/// 蓝图 trait
///
/// 描述子作用域的名称和派生子图所用的模块。
/// `module_spec` 只在子作用域第一次创建时读取。
pub trait Blueprint {
    /// 子作用域名称
    fn scope_name(&self) -> &str;

    /// 模块规格
    fn module_spec(&self) -> ModuleSpec;
}

/// 静态蓝图
#[derive(Debug, Clone)]
pub struct StaticBlueprint {
    name: String,
    modules: ModuleSpec,
}

impl StaticBlueprint {
    /// 创建不带模块的蓝图
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modules: ModuleSpec::None,
        }
    }

    /// 设置单个模块
    pub fn with_module<M: Module>(mut self, module: M) -> Self {
        self.modules = ModuleSpec::Single(Arc::new(module));
        self
    }

    /// 设置模块集合
    pub fn with_modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = ModuleRef>,
    {
        self.modules = ModuleSpec::many(modules);
        self
    }

    /// 直接设置模块规格
    pub fn with_spec(mut self, modules: ModuleSpec) -> Self {
        self.modules = modules;
        self
    }
}

impl Blueprint for StaticBlueprint {
    fn scope_name(&self) -> &str {
        &self.name
    }

    fn module_spec(&self) -> ModuleSpec {
        self.modules.clone()
    }
}
