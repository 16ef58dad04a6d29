//! # 对象图参考实现
//!
//! 提供分层的实例绑定对象图 [`ModuleGraph`] 和常用模块实现。
//! 这里不做构造函数分析，模块直接贡献现成的实例。

use di_abstractions::{
    BindingInstance, BindingRegistry, Injectable, Module, ModuleRef, ObjectGraph,
};
use infrastructure_common::DependencyError;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 绑定信息
#[derive(Debug, Clone)]
struct Binding {
    /// 类型名称
    type_name: &'static str,
    /// 贡献该绑定的模块
    module: String,
    /// 实例
    instance: BindingInstance,
}

/// 分层对象图
///
/// 每次派生产生一个新层，只持有本层模块贡献的绑定，查找时向父层回退。
/// 子层绑定遮蔽父层同类型绑定；同一次派生中两个模块绑定同一类型会失败。
#[derive(Debug)]
pub struct ModuleGraph {
    /// 本层模块名称
    modules: Vec<String>,
    /// 本层绑定
    bindings: HashMap<TypeId, Binding>,
    /// 父层
    parent: Option<Arc<ModuleGraph>>,
}

impl ModuleGraph {
    /// 创建空的根对象图
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            bindings: HashMap::new(),
            parent: None,
        }
    }

    /// 用模块创建根对象图
    pub fn with_modules(modules: &[ModuleRef]) -> Result<Self, DependencyError> {
        Self::layer(None, modules)
    }

    /// 转为共享的对象图
    pub fn into_shared(self) -> Arc<dyn ObjectGraph> {
        Arc::new(self)
    }

    /// 派生子图，保留具体类型
    pub fn extend(self: &Arc<Self>, modules: &[ModuleRef]) -> Result<Arc<Self>, DependencyError> {
        Ok(Arc::new(Self::layer(Some(Arc::clone(self)), modules)?))
    }

    /// 从根到本层的全部模块名称
    pub fn module_names(&self) -> Vec<String> {
        let mut names = self
            .parent
            .as_ref()
            .map(|parent| parent.module_names())
            .unwrap_or_default();
        names.extend(self.modules.iter().cloned());
        names
    }

    /// 层数，根为 0
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |parent| parent.depth() + 1)
    }

    /// 可见的绑定类型数量
    pub fn binding_count(&self) -> usize {
        let mut seen = Vec::new();
        let mut current = Some(self);
        while let Some(layer) = current {
            for type_id in layer.bindings.keys() {
                if !seen.contains(type_id) {
                    seen.push(*type_id);
                }
            }
            current = layer.parent.as_deref();
        }
        seen.len()
    }

    /// 绑定来源模块
    pub fn binding_module<T: Any>(&self) -> Option<&str> {
        self.find(TypeId::of::<T>()).map(|binding| binding.module.as_str())
    }

    fn layer(
        parent: Option<Arc<ModuleGraph>>,
        modules: &[ModuleRef],
    ) -> Result<Self, DependencyError> {
        let mut bindings = HashMap::new();

        for module in modules {
            let mut registry = LayerRegistry {
                bindings: &mut bindings,
                module: module.name(),
            };
            module.configure(&mut registry)?;
        }

        let graph = Self {
            modules: modules.iter().map(|module| module.name().to_string()).collect(),
            bindings,
            parent,
        };

        debug!(
            "创建对象图层: 深度 {}, 模块 {:?}, 绑定 {:?}",
            graph.depth(),
            graph.modules,
            graph
                .bindings
                .values()
                .map(|binding| binding.type_name)
                .collect::<Vec<_>>()
        );
        Ok(graph)
    }

    fn find(&self, type_id: TypeId) -> Option<&Binding> {
        let mut current = Some(self);
        while let Some(layer) = current {
            if let Some(binding) = layer.bindings.get(&type_id) {
                return Some(binding);
            }
            current = layer.parent.as_deref();
        }
        None
    }
}

impl Default for ModuleGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectGraph for ModuleGraph {
    fn plus(
        self: Arc<Self>,
        modules: &[ModuleRef],
    ) -> Result<Arc<dyn ObjectGraph>, DependencyError> {
        let child = Self::layer(Some(self), modules)?;
        Ok(Arc::new(child))
    }

    fn resolve_by_type_id(&self, type_id: TypeId) -> Option<BindingInstance> {
        self.find(type_id).map(|binding| Arc::clone(&binding.instance))
    }

    fn inject(&self, target: &mut dyn Injectable) -> Result<(), DependencyError> {
        target.inject(self)
    }
}

/// 单层注册表
struct LayerRegistry<'a> {
    bindings: &'a mut HashMap<TypeId, Binding>,
    module: &'a str,
}

impl BindingRegistry for LayerRegistry<'_> {
    fn bind_instance(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        instance: BindingInstance,
    ) -> Result<(), DependencyError> {
        if let Some(existing) = self.bindings.get(&type_id) {
            return Err(DependencyError::DuplicateBinding {
                type_name: type_name.to_string(),
                module: format!("{} / {}", existing.module, self.module),
            });
        }

        self.bindings.insert(
            type_id,
            Binding {
                type_name,
                module: self.module.to_string(),
                instance,
            },
        );
        Ok(())
    }
}

/// 实例模块
///
/// 直接提供现成实例的模块
pub struct InstanceModule {
    name: String,
    instances: Vec<(TypeId, &'static str, BindingInstance)>,
}

impl InstanceModule {
    /// 创建空的实例模块
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            instances: Vec::new(),
        }
    }

    /// 提供实例
    pub fn provide<T>(self, instance: T) -> Self
    where
        T: Any + Send + Sync,
    {
        self.provide_arc(Arc::new(instance))
    }

    /// 提供已共享的实例
    pub fn provide_arc<T>(mut self, instance: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        let instance: BindingInstance = instance;
        self.instances
            .push((TypeId::of::<T>(), std::any::type_name::<T>(), instance));
        self
    }

    /// 转为模块引用
    pub fn into_ref(self) -> ModuleRef {
        Arc::new(self)
    }
}

impl fmt::Debug for InstanceModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let types: Vec<&str> = self.instances.iter().map(|(_, name, _)| *name).collect();
        f.debug_struct("InstanceModule")
            .field("name", &self.name)
            .field("provides", &types)
            .finish()
    }
}

impl Module for InstanceModule {
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, registry: &mut dyn BindingRegistry) -> Result<(), DependencyError> {
        for (type_id, type_name, instance) in &self.instances {
            registry.bind_instance(*type_id, *type_name, Arc::clone(instance))?;
        }
        Ok(())
    }
}

/// 函数模块
///
/// 在派生时调用闭包写入绑定，每次派生都会重新调用
pub struct FnModule<F>
where
    F: Fn(&mut dyn BindingRegistry) -> Result<(), DependencyError> + Send + Sync + 'static,
{
    name: String,
    configure_fn: F,
}

impl<F> FnModule<F>
where
    F: Fn(&mut dyn BindingRegistry) -> Result<(), DependencyError> + Send + Sync + 'static,
{
    /// 创建函数模块
    pub fn new(name: impl Into<String>, configure_fn: F) -> Self {
        Self {
            name: name.into(),
            configure_fn,
        }
    }
}

impl<F> fmt::Debug for FnModule<F>
where
    F: Fn(&mut dyn BindingRegistry) -> Result<(), DependencyError> + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnModule")
            .field("name", &self.name)
            .field("configure_fn", &"<function>")
            .finish()
    }
}

impl<F> Module for FnModule<F>
where
    F: Fn(&mut dyn BindingRegistry) -> Result<(), DependencyError> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn configure(&self, registry: &mut dyn BindingRegistry) -> Result<(), DependencyError> {
        (self.configure_fn)(registry)
    }
}

/// 创建带模块的根对象图并记录日志
pub fn root_graph(modules: &[ModuleRef]) -> Result<Arc<dyn ObjectGraph>, DependencyError> {
    let graph = ModuleGraph::with_modules(modules)?;
    info!("创建根对象图，模块: {:?}", graph.module_names());
    Ok(graph.into_shared())
}
