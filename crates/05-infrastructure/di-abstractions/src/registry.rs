//! 绑定注册表抽象接口

use infrastructure_common::DependencyError;
use std::any::{Any, TypeId};
use std::sync::Arc;

/// 绑定实例
pub type BindingInstance = Arc<dyn Any + Send + Sync>;

/// 绑定注册表 trait
///
/// 模块在派生子图时通过它写入绑定
pub trait BindingRegistry {
    /// 注册实例绑定
    fn bind_instance(
        &mut self,
        type_id: TypeId,
        type_name: &'static str,
        instance: BindingInstance,
    ) -> Result<(), DependencyError>;
}

impl dyn BindingRegistry + '_ {
    /// 注册指定类型的实例绑定
    pub fn bind<T>(&mut self, instance: T) -> Result<(), DependencyError>
    where
        T: Any + Send + Sync,
    {
        self.bind_arc(Arc::new(instance))
    }

    /// 注册已共享的实例绑定
    pub fn bind_arc<T>(&mut self, instance: Arc<T>) -> Result<(), DependencyError>
    where
        T: Any + Send + Sync,
    {
        self.bind_instance(TypeId::of::<T>(), std::any::type_name::<T>(), instance)
    }
}
