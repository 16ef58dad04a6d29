//! 作用域树与作用域句柄

use crate::builder::ScopeBuilder;
use crate::lifecycle::Scoped;
use chrono::{DateTime, Utc};
use infrastructure_common::{ScopeError, ScopeResult, DEFAULT_ROOT_SCOPE_NAME};
use parking_lot::RwLock;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use tracing::{debug, info};

/// 服务实例
pub type Service = Arc<dyn Any + Send + Sync>;

/// 服务名到服务实例的映射
pub type ServiceMap = HashMap<String, Service>;

/// 作用域标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(uuid::Uuid);

impl ScopeId {
    pub(crate) fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 树中的节点
pub(crate) struct ScopeNode {
    pub(crate) name: Arc<str>,
    pub(crate) path: Arc<str>,
    pub(crate) parent: Option<ScopeId>,
    pub(crate) children: Vec<ScopeId>,
    pub(crate) services: ServiceMap,
    pub(crate) scoped_services: Vec<Arc<dyn Scoped>>,
    pub(crate) created_at: DateTime<Utc>,
}

/// 树状态，被一把读写锁保护
#[derive(Default)]
pub(crate) struct TreeState {
    pub(crate) nodes: HashMap<ScopeId, ScopeNode>,
    pub(crate) roots: Vec<ScopeId>,
}

impl TreeState {
    /// 按后序移除子树，返回被移除的节点（子节点在前）
    fn remove_subtree(&mut self, id: ScopeId, removed: &mut Vec<ScopeNode>) {
        let Some(mut node) = self.nodes.remove(&id) else {
            return;
        };

        for child in std::mem::take(&mut node.children) {
            self.remove_subtree(child, removed);
        }

        removed.push(node);
    }
}

/// 作用域树
///
/// 结构性操作（创建、销毁）持有写锁，查询持有读锁。
/// 同一棵树可以有多个互不相关的根作用域。
#[derive(Clone, Default)]
pub struct ScopeTree {
    pub(crate) state: Arc<RwLock<TreeState>>,
}

impl ScopeTree {
    /// 创建空的作用域树
    pub fn new() -> Self {
        Self::default()
    }

    /// 开始构建根作用域
    pub fn build_root(&self, name: impl Into<String>) -> ScopeBuilder {
        ScopeBuilder::root(self.clone(), name)
    }

    /// 使用给定服务创建根作用域
    pub fn create_root<I>(&self, services: I) -> Scope
    where
        I: IntoIterator<Item = (String, Service)>,
    {
        self.insert_root(DEFAULT_ROOT_SCOPE_NAME, services.into_iter().collect(), Vec::new())
    }

    /// 在父作用域下创建子作用域
    pub fn build_child<I>(&self, parent: &Scope, name: &str, services: I) -> ScopeResult<Scope>
    where
        I: IntoIterator<Item = (String, Service)>,
    {
        parent.build_child(name).with_services(services).build()
    }

    /// 查找直接子作用域
    pub fn find_child(&self, parent: &Scope, name: &str) -> ScopeResult<Option<Scope>> {
        parent.find_child(name)
    }

    /// 沿祖先链查找服务
    pub fn get_service(&self, scope: &Scope, name: &str) -> ScopeResult<Option<Service>> {
        scope.get_service_raw(name)
    }

    /// 销毁作用域及其所有后代
    pub fn destroy(&self, scope: &Scope) {
        scope.destroy();
    }

    /// 所有存活的根作用域，按创建顺序
    pub fn roots(&self) -> Vec<Scope> {
        let state = self.state.read();
        state
            .roots
            .iter()
            .filter_map(|id| state.nodes.get(id).map(|node| self.handle(*id, node)))
            .collect()
    }

    /// 存活的作用域数量
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    /// 树中是否没有存活的作用域
    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    pub(crate) fn handle(&self, id: ScopeId, node: &ScopeNode) -> Scope {
        Scope {
            tree: self.clone(),
            id,
            name: Arc::clone(&node.name),
            path: Arc::clone(&node.path),
            created_at: node.created_at,
        }
    }

    pub(crate) fn insert_root(
        &self,
        name: &str,
        services: ServiceMap,
        scoped_services: Vec<Arc<dyn Scoped>>,
    ) -> Scope {
        let name: Arc<str> = Arc::from(infrastructure_common::root_scope_name(name));
        let id = ScopeId::new();
        let node = ScopeNode {
            name: Arc::clone(&name),
            path: Arc::clone(&name),
            parent: None,
            children: Vec::new(),
            services,
            scoped_services,
            created_at: Utc::now(),
        };

        let scope = self.handle(id, &node);
        let enter = node.scoped_services.clone();
        {
            let mut state = self.state.write();
            state.nodes.insert(id, node);
            state.roots.push(id);
        }

        info!("创建根作用域: {}", scope.path());
        notify_enter(&scope, &enter);
        scope
    }
}

impl fmt::Debug for ScopeTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("ScopeTree")
            .field("scopes", &state.nodes.len())
            .field("roots", &state.roots.len())
            .finish()
    }
}

pub(crate) fn notify_enter(scope: &Scope, scoped_services: &[Arc<dyn Scoped>]) {
    for service in scoped_services {
        service.on_enter_scope(scope);
    }
}

/// 作用域句柄
///
/// 句柄本身不持有节点数据，节点销毁后所有操作返回 [`ScopeError::Destroyed`]。
#[derive(Clone)]
pub struct Scope {
    pub(crate) tree: ScopeTree,
    pub(crate) id: ScopeId,
    pub(crate) name: Arc<str>,
    pub(crate) path: Arc<str>,
    pub(crate) created_at: DateTime<Utc>,
}

impl Scope {
    /// 作用域名称
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 从根到本作用域的完整路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 作用域标识
    pub fn id(&self) -> ScopeId {
        self.id
    }

    /// 创建时间
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// 所属的作用域树
    pub fn tree(&self) -> &ScopeTree {
        &self.tree
    }

    /// 是否已销毁
    pub fn is_destroyed(&self) -> bool {
        !self.tree.state.read().nodes.contains_key(&self.id)
    }

    /// 开始构建子作用域
    ///
    /// 父作用域是否已销毁在 [`ScopeBuilder::build`] 时检查。
    pub fn build_child(&self, name: impl Into<String>) -> ScopeBuilder {
        ScopeBuilder::child(self.clone(), name)
    }

    /// 父作用域，根作用域返回 `None`
    pub fn parent(&self) -> ScopeResult<Option<Scope>> {
        let state = self.tree.state.read();
        let node = self.node(&state)?;
        Ok(node
            .parent
            .and_then(|id| state.nodes.get(&id).map(|parent| self.tree.handle(id, parent))))
    }

    /// 按名称查找直接子作用域，不递归
    pub fn find_child(&self, name: &str) -> ScopeResult<Option<Scope>> {
        let state = self.tree.state.read();
        let node = self.node(&state)?;
        Ok(node.children.iter().find_map(|id| {
            state
                .nodes
                .get(id)
                .filter(|child| &*child.name == name)
                .map(|child| self.tree.handle(*id, child))
        }))
    }

    /// 存活的直接子作用域，按创建顺序
    pub fn children(&self) -> ScopeResult<Vec<Scope>> {
        let state = self.tree.state.read();
        let node = self.node(&state)?;
        Ok(node
            .children
            .iter()
            .filter_map(|id| state.nodes.get(id).map(|child| self.tree.handle(*id, child)))
            .collect())
    }

    /// 沿祖先链查找服务，返回最近的注册
    pub fn get_service_raw(&self, name: &str) -> ScopeResult<Option<Service>> {
        let state = self.tree.state.read();
        let mut current = self.node(&state)?;

        loop {
            if let Some(service) = current.services.get(name) {
                return Ok(Some(Arc::clone(service)));
            }

            match current.parent.and_then(|id| state.nodes.get(&id)) {
                Some(parent) => current = parent,
                None => {
                    debug!("服务未找到: {} (自 {})", name, self.path);
                    return Ok(None);
                }
            }
        }
    }

    /// 沿祖先链查找指定类型的服务
    ///
    /// 最近的注册类型不是 `T` 时返回 [`ScopeError::ServiceTypeMismatch`]，
    /// 不会继续向上查找。
    pub fn get_service<T>(&self, name: &str) -> ScopeResult<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        self.get_service_raw(name)?
            .map(|service| {
                service
                    .downcast::<T>()
                    .map_err(|_| ScopeError::ServiceTypeMismatch {
                        service_name: name.to_string(),
                        expected: std::any::type_name::<T>().to_string(),
                    })
            })
            .transpose()
    }

    /// 本作用域或祖先是否注册了该服务
    pub fn has_service(&self, name: &str) -> ScopeResult<bool> {
        Ok(self.get_service_raw(name)?.is_some())
    }

    /// 销毁本作用域及所有后代
    ///
    /// 重复销毁是空操作。作用域感知服务按子先父后的顺序收到退出回调。
    pub fn destroy(&self) {
        let removed = {
            let mut state = self.tree.state.write();
            let Some(parent) = state.nodes.get(&self.id).map(|node| node.parent) else {
                return;
            };

            match parent {
                Some(parent_id) => {
                    if let Some(parent) = state.nodes.get_mut(&parent_id) {
                        parent.children.retain(|id| *id != self.id);
                    }
                }
                None => state.roots.retain(|id| *id != self.id),
            }

            let mut removed = Vec::new();
            state.remove_subtree(self.id, &mut removed);
            removed
        };

        info!("销毁作用域: {}，共 {} 个", self.path, removed.len());

        for mut node in removed {
            node.services.clear();
            for service in node.scoped_services.iter().rev() {
                service.on_exit_scope();
            }
        }
    }

    fn node<'a>(&self, state: &'a TreeState) -> ScopeResult<&'a ScopeNode> {
        state
            .nodes
            .get(&self.id)
            .ok_or_else(|| ScopeError::destroyed(&*self.path))
    }
}

impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Arc::ptr_eq(&self.tree.state, &other.tree.state)
    }
}

impl Eq for Scope {}

impl Hash for Scope {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("id", &self.id)
            .field("path", &self.path)
            .finish()
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}
