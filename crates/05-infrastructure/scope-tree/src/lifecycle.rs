//! 作用域生命周期回调

use crate::scope::Scope;

/// 作用域感知服务
///
/// 通过 [`ScopeBuilder::with_scoped_service`](crate::ScopeBuilder::with_scoped_service)
/// 注册的服务会在作用域创建后收到 `on_enter_scope`，在作用域销毁时收到
/// `on_exit_scope`。回调在树锁之外执行，可以再次查询作用域树。
pub trait Scoped: Send + Sync + 'static {
    /// 作用域已创建
    fn on_enter_scope(&self, scope: &Scope);

    /// 作用域正在销毁，此时作用域已不可用
    fn on_exit_scope(&self);
}
