//! 模块与模块规格

use crate::registry::BindingRegistry;
use infrastructure_common::DependencyError;
use std::fmt::Debug;
use std::sync::Arc;

/// 模块 trait
///
/// 模块在派生子图时向注册表贡献绑定
pub trait Module: Send + Sync + Debug + 'static {
    /// 模块名称
    fn name(&self) -> &str;

    /// 写入绑定
    fn configure(&self, registry: &mut dyn BindingRegistry) -> Result<(), DependencyError> {
        let _ = registry;
        Ok(())
    }
}

/// 共享的模块引用
pub type ModuleRef = Arc<dyn Module>;

/// 子图派生规格
///
/// 在编写 [`Blueprint`](crate::Blueprint) 时决定形态，派生时只按形态分派。
#[derive(Debug, Clone, Default)]
pub enum ModuleSpec {
    /// 不带模块的扩展
    #[default]
    None,
    /// 单个模块
    Single(ModuleRef),
    /// 有序的模块集合
    Many(Vec<ModuleRef>),
}

impl ModuleSpec {
    /// 单个模块规格
    pub fn single<M: Module>(module: M) -> Self {
        Self::Single(Arc::new(module))
    }

    /// 多个模块规格
    pub fn many<I>(modules: I) -> Self
    where
        I: IntoIterator<Item = ModuleRef>,
    {
        Self::Many(modules.into_iter().collect())
    }

    /// 按顺序返回规格中的模块
    pub fn modules(&self) -> &[ModuleRef] {
        match self {
            Self::None => &[],
            Self::Single(module) => std::slice::from_ref(module),
            Self::Many(modules) => modules,
        }
    }

    /// 模块数量
    pub fn len(&self) -> usize {
        self.modules().len()
    }

    /// 是否不带任何模块
    pub fn is_empty(&self) -> bool {
        self.modules().is_empty()
    }

    /// 模块名称列表
    pub fn module_names(&self) -> Vec<String> {
        self.modules()
            .iter()
            .map(|module| module.name().to_string())
            .collect()
    }
}

impl From<ModuleRef> for ModuleSpec {
    fn from(module: ModuleRef) -> Self {
        Self::Single(module)
    }
}

impl From<Vec<ModuleRef>> for ModuleSpec {
    fn from(modules: Vec<ModuleRef>) -> Self {
        Self::Many(modules)
    }
}

impl From<Option<ModuleRef>> for ModuleSpec {
    fn from(module: Option<ModuleRef>) -> Self {
        module.map_or(Self::None, Self::Single)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Named(&'static str);

    impl Module for Named {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn test_module_spec_shapes() {
        let none = ModuleSpec::default();
        assert!(none.is_empty());
        assert!(matches!(none, ModuleSpec::None));

        let single = ModuleSpec::single(Named("a"));
        assert_eq!(single.module_names(), vec!["a"]);

        let many = ModuleSpec::many(vec![
            Arc::new(Named("a")) as ModuleRef,
            Arc::new(Named("b")) as ModuleRef,
        ]);
        assert_eq!(many.len(), 2);
        assert_eq!(many.module_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_empty_collection_stays_many() {
        let spec = ModuleSpec::from(Vec::<ModuleRef>::new());
        assert!(matches!(spec, ModuleSpec::Many(_)));
        assert!(spec.is_empty());
    }

    #[test]
    fn test_from_option() {
        assert!(matches!(ModuleSpec::from(None), ModuleSpec::None));
        let module: ModuleRef = Arc::new(Named("a"));
        assert!(matches!(ModuleSpec::from(Some(module)), ModuleSpec::Single(_)));
    }
}
