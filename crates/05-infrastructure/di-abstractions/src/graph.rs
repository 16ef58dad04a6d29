//! 对象图抽象接口
//!
//! 作用域树只依赖对象图的两种能力：派生子图与执行注入

use crate::module::{ModuleRef, ModuleSpec};
use crate::registry::BindingInstance;
use infrastructure_common::DependencyError;
use std::any::{Any, TypeId};
use std::fmt::Debug;
use std::sync::Arc;
use tracing::debug;

/// 对象图 trait
pub trait ObjectGraph: Send + Sync + Debug + 'static {
    /// 用给定模块派生子图，模块为空时得到零模块扩展
    fn plus(self: Arc<Self>, modules: &[ModuleRef])
        -> Result<Arc<dyn ObjectGraph>, DependencyError>;

    /// 按类型查找绑定
    fn resolve_by_type_id(&self, type_id: TypeId) -> Option<BindingInstance>;

    /// 向目标执行注入
    fn inject(&self, target: &mut dyn Injectable) -> Result<(), DependencyError>;
}

impl dyn ObjectGraph {
    /// 查找指定类型的绑定
    pub fn get<T>(&self) -> Result<Arc<T>, DependencyError>
    where
        T: Any + Send + Sync,
    {
        let type_name = std::any::type_name::<T>();
        self.resolve_by_type_id(TypeId::of::<T>())
            .ok_or_else(|| DependencyError::binding_not_found(type_name))?
            .downcast::<T>()
            .map_err(|_| DependencyError::TypeMismatch {
                expected: type_name.to_string(),
            })
    }

    /// 是否能解析指定类型
    pub fn contains<T>(&self) -> bool
    where
        T: Any + Send + Sync,
    {
        self.resolve_by_type_id(TypeId::of::<T>()).is_some()
    }
}

/// 按规格形态派生子图
///
/// `None` 为零模块扩展，`Single` 恰好传入一个模块，`Many` 传入全部模块。
pub fn derive_subgraph(
    parent: &Arc<dyn ObjectGraph>,
    spec: &ModuleSpec,
) -> Result<Arc<dyn ObjectGraph>, DependencyError> {
    debug!("派生子图，模块: {:?}", spec.module_names());

    let parent = Arc::clone(parent);
    match spec {
        ModuleSpec::None => parent.plus(&[]),
        ModuleSpec::Single(module) => parent.plus(std::slice::from_ref(module)),
        ModuleSpec::Many(modules) => parent.plus(modules),
    }
}

/// 可注入目标 trait
pub trait Injectable {
    /// 从对象图中取出依赖
    fn inject(&mut self, graph: &dyn ObjectGraph) -> Result<(), DependencyError>;
}
