//! 作用域构建器

use crate::lifecycle::Scoped;
use crate::scope::{notify_enter, Scope, ScopeId, ScopeNode, ScopeTree, Service, ServiceMap};
use chrono::Utc;
use infrastructure_common::{child_path, validate_scope_name, ScopeError, ScopeResult};
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 作用域构建器
///
/// 在作用域创建前收集命名服务，`build` 之后即被消耗。
pub struct ScopeBuilder {
    tree: ScopeTree,
    parent: Option<Scope>,
    name: String,
    services: ServiceMap,
    scoped_services: Vec<(String, Arc<dyn Scoped>)>,
}

impl ScopeBuilder {
    pub(crate) fn root(tree: ScopeTree, name: impl Into<String>) -> Self {
        Self {
            tree,
            parent: None,
            name: name.into(),
            services: ServiceMap::new(),
            scoped_services: Vec::new(),
        }
    }

    pub(crate) fn child(parent: Scope, name: impl Into<String>) -> Self {
        Self {
            tree: parent.tree().clone(),
            parent: Some(parent),
            name: name.into(),
            services: ServiceMap::new(),
            scoped_services: Vec::new(),
        }
    }

    /// 待创建作用域的名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 父作用域，根构建器返回 `None`
    pub fn parent(&self) -> Option<&Scope> {
        self.parent.as_ref()
    }

    /// 注册服务，同名服务后写入者覆盖先写入者
    pub fn with_service<T>(self, name: impl Into<String>, service: Arc<T>) -> Self
    where
        T: Any + Send + Sync,
    {
        self.with_service_raw(name, service)
    }

    /// 注册已擦除类型的服务
    pub fn with_service_raw(mut self, name: impl Into<String>, service: Service) -> Self {
        let name = name.into();
        self.scoped_services.retain(|(existing, _)| *existing != name);
        self.services.insert(name, service);
        self
    }

    /// 批量注册服务
    pub fn with_services<I>(self, services: I) -> Self
    where
        I: IntoIterator<Item = (String, Service)>,
    {
        services
            .into_iter()
            .fold(self, |builder, (name, service)| builder.with_service_raw(name, service))
    }

    /// 注册作用域感知服务
    ///
    /// 服务在作用域创建后收到 [`Scoped::on_enter_scope`]，销毁时收到
    /// [`Scoped::on_exit_scope`]。
    pub fn with_scoped_service<T>(self, name: impl Into<String>, service: Arc<T>) -> Self
    where
        T: Scoped,
    {
        let name = name.into();
        let mut builder = self.with_service_raw(name.clone(), Arc::clone(&service) as Service);
        let service: Arc<dyn Scoped> = service;
        builder.scoped_services.push((name, service));
        builder
    }

    /// 创建作用域
    ///
    /// 根作用域的创建总是成功。子作用域在父作用域已销毁时返回
    /// [`ScopeError::Destroyed`]，名称无效时返回 [`ScopeError::InvalidName`]，
    /// 与存活的兄弟重名时返回 [`ScopeError::DuplicateChild`]。
    pub fn build(self) -> ScopeResult<Scope> {
        let scoped_services: Vec<Arc<dyn Scoped>> = self
            .scoped_services
            .into_iter()
            .map(|(_, service)| service)
            .collect();

        debug!(
            "构建作用域: {}，服务 {} 个",
            self.name,
            self.services.len()
        );

        let Some(parent) = self.parent else {
            return Ok(self
                .tree
                .insert_root(&self.name, self.services, scoped_services));
        };

        let scope = {
            let mut state = self.tree.state.write();

            let parent_node = state
                .nodes
                .get(&parent.id)
                .ok_or_else(|| ScopeError::destroyed(parent.path()))?;

            validate_scope_name(&self.name)?;

            let duplicate = parent_node.children.iter().any(|id| {
                state
                    .nodes
                    .get(id)
                    .is_some_and(|child| *child.name == *self.name)
            });
            if duplicate {
                return Err(ScopeError::DuplicateChild {
                    parent: parent.path().to_string(),
                    name: self.name,
                });
            }

            let id = ScopeId::new();
            let name: Arc<str> = Arc::from(self.name.as_str());
            let node = ScopeNode {
                path: Arc::from(child_path(parent.path(), &self.name)),
                name,
                parent: Some(parent.id),
                children: Vec::new(),
                services: self.services,
                scoped_services: scoped_services.clone(),
                created_at: Utc::now(),
            };

            let scope = self.tree.handle(id, &node);
            state.nodes.insert(id, node);
            if let Some(parent_node) = state.nodes.get_mut(&parent.id) {
                parent_node.children.push(id);
            }
            scope
        };

        info!("创建子作用域: {}", scope.path());
        notify_enter(&scope, &scoped_services);
        Ok(scope)
    }
}

impl fmt::Debug for ScopeBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut services: Vec<&str> = self.services.keys().map(String::as_str).collect();
        services.sort_unstable();

        f.debug_struct("ScopeBuilder")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(Scope::path))
            .field("services", &services)
            .finish()
    }
}
