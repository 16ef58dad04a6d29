//! 对象图作用域绑定器
//!
//! 每个蓝图名称对应一个子作用域，子作用域携带从父作用域对象图派生的子图。

use di_abstractions::{derive_subgraph, Blueprint, Injectable, ModuleSpec, ObjectGraph};
use di_impl::ModuleGraph;
use infrastructure_common::{
    root_scope_name, BinderError, BinderResult, ScopeError, ScopeResult, OBJECT_GRAPH_SERVICE,
};
use scope_tree::{Scope, ScopeBuilder, ScopeTree};
use std::sync::Arc;
use tracing::{debug, info};

/// 作用域上下文 trait
///
/// 能给出所在作用域的宿主对象，例如界面中的一个页面。
pub trait ScopeContext {
    /// 所在作用域，没有作用域时返回 `None`
    fn scope(&self) -> Option<Scope>;
}

impl ScopeContext for Scope {
    fn scope(&self) -> Option<Scope> {
        Some(self.clone())
    }
}

impl ScopeContext for Option<Scope> {
    fn scope(&self) -> Option<Scope> {
        self.clone()
    }
}

/// 作用域扩展 trait
///
/// 在子作用域创建前向构建器追加服务
pub trait ScopeExtension {
    fn extend(&self, builder: ScopeBuilder) -> ScopeBuilder;
}

impl<F> ScopeExtension for F
where
    F: Fn(ScopeBuilder) -> ScopeBuilder,
{
    fn extend(&self, builder: ScopeBuilder) -> ScopeBuilder {
        self(builder)
    }
}

/// 对象图作用域绑定器
///
/// 本身无状态，只记录对象图使用的服务名。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphScopeBinder {
    service_name: String,
}

impl Default for GraphScopeBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphScopeBinder {
    /// 使用默认服务名创建绑定器
    pub fn new() -> Self {
        Self::with_service_name(OBJECT_GRAPH_SERVICE)
    }

    /// 使用指定服务名创建绑定器
    pub fn with_service_name(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// 对象图服务名
    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// 创建携带对象图的根作用域
    ///
    /// 未给出对象图时使用空的 [`ModuleGraph`]。
    pub fn create_root_scope(
        &self,
        tree: &ScopeTree,
        name: &str,
        graph: Option<Arc<dyn ObjectGraph>>,
    ) -> ScopeResult<Scope> {
        let graph = graph.unwrap_or_else(|| ModuleGraph::new().into_shared());
        let builder = tree.build_root(root_scope_name(name));
        self.in_new_scope(builder, graph).build()
    }

    /// 在构建器上注册对象图，同名服务后写入者覆盖先写入者
    pub fn in_new_scope(&self, builder: ScopeBuilder, graph: Arc<dyn ObjectGraph>) -> ScopeBuilder {
        builder.with_service(self.service_name.clone(), Arc::new(graph))
    }

    /// 从构建器父作用域的对象图派生子图并注册
    pub fn in_new_scope_with_modules(
        &self,
        builder: ScopeBuilder,
        modules: &ModuleSpec,
    ) -> BinderResult<ScopeBuilder> {
        let parent = builder
            .parent()
            .cloned()
            .ok_or_else(|| BinderError::missing_graph(builder.name()))?;
        let parent_graph = self.require_object_graph(&parent)?;
        let graph = self.derive_subgraph(&parent_graph, modules)?;
        Ok(self.in_new_scope(builder, graph))
    }

    /// 按规格派生子图
    pub fn derive_subgraph(
        &self,
        parent: &Arc<dyn ObjectGraph>,
        modules: &ModuleSpec,
    ) -> BinderResult<Arc<dyn ObjectGraph>> {
        Ok(derive_subgraph(parent, modules)?)
    }

    /// 查找作用域链上最近的对象图
    pub fn get_object_graph(&self, scope: &Scope) -> ScopeResult<Option<Arc<dyn ObjectGraph>>> {
        let graph = scope.get_service::<Arc<dyn ObjectGraph>>(&self.service_name)?;
        Ok(graph.map(|graph| Arc::clone(graph.as_ref())))
    }

    /// 查找上下文可达的对象图，找不到时返回 [`BinderError::MissingGraph`]
    pub fn require_object_graph<C>(&self, context: &C) -> BinderResult<Arc<dyn ObjectGraph>>
    where
        C: ScopeContext + ?Sized,
    {
        let scope = context
            .scope()
            .ok_or_else(|| BinderError::missing_graph("<无作用域>"))?;
        self.get_object_graph(&scope)?
            .ok_or_else(|| BinderError::missing_graph(scope.path()))
    }

    /// 用上下文可达的对象图注入目标
    pub fn inject_into<C>(&self, context: &C, target: &mut dyn Injectable) -> BinderResult<()>
    where
        C: ScopeContext + ?Sized,
    {
        let graph = self.require_object_graph(context)?;
        graph.inject(target)?;
        Ok(())
    }

    /// 查找或创建蓝图对应的子作用域
    ///
    /// 子作用域已存在时原样返回，不会重新读取模块规格。
    pub fn require_child_scope(
        &self,
        parent: &Scope,
        blueprint: &dyn Blueprint,
    ) -> BinderResult<Scope> {
        self.require_scope(parent, blueprint, None)
    }

    /// 查找或创建页面级子作用域，创建时由扩展追加服务
    pub fn require_activity_scope(
        &self,
        parent: &Scope,
        blueprint: &dyn Blueprint,
        extension: &dyn ScopeExtension,
    ) -> BinderResult<Scope> {
        self.require_scope(parent, blueprint, Some(extension))
    }

    fn require_scope(
        &self,
        parent: &Scope,
        blueprint: &dyn Blueprint,
        extension: Option<&dyn ScopeExtension>,
    ) -> BinderResult<Scope> {
        let name = blueprint.scope_name();

        if let Some(child) = parent.find_child(name)? {
            debug!("复用子作用域: {}", child.path());
            return Ok(child);
        }

        let parent_graph = self
            .get_object_graph(parent)?
            .ok_or_else(|| BinderError::missing_graph(parent.path()))?;
        let graph = self.derive_subgraph(&parent_graph, &blueprint.module_spec())?;

        let mut builder = self.in_new_scope(parent.build_child(name), graph);
        if let Some(extension) = extension {
            builder = extension.extend(builder);
        }

        match builder.build() {
            Ok(child) => {
                info!("为蓝图创建子作用域: {}", child.path());
                Ok(child)
            }
            // 另一个调用方抢先创建了同名子作用域
            Err(error @ ScopeError::DuplicateChild { .. }) => match parent.find_child(name)? {
                Some(existing) => {
                    debug!("子作用域已被并发创建: {}", existing.path());
                    Ok(existing)
                }
                None => Err(error.into()),
            },
            Err(error) => Err(error.into()),
        }
    }
}
