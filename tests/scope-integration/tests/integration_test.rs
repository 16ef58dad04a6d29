//! 作用域运行时端到端集成测试

use di_abstractions::{
    BindingRegistry, Blueprint, Injectable, ModuleRef, ModuleSpec, ObjectGraph, StaticBlueprint,
};
use di_impl::{FnModule, InstanceModule};
use infrastructure_common::{BinderError, DependencyError, ScopeError};
use infrastructure_composition::{ConfigSource, ScopeBootstrapper, ScopeContext, ScopeRuntime};
use parking_lot::Mutex;
use scope_tree::{Scope, ScopeBuilder, Scoped};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Once};
use tempfile::NamedTempFile;

static INIT_LOGGER: Once = Once::new();

/// 初始化测试日志系统（只初始化一次）
fn init_test_logger() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter("debug")
            .try_init()
            .ok(); // 忽略初始化失败的错误
    });
}

#[derive(Debug, PartialEq)]
struct Session(&'static str);

#[derive(Debug, PartialEq)]
struct Cart(u32);

/// 记录生命周期事件的服务
struct Lifecycle {
    label: &'static str,
    events: Arc<Mutex<Vec<String>>>,
}

impl Scoped for Lifecycle {
    fn on_enter_scope(&self, scope: &Scope) {
        self.events
            .lock()
            .push(format!("enter {} @ {}", self.label, scope.path()));
    }

    fn on_exit_scope(&self) {
        self.events.lock().push(format!("exit {}", self.label));
    }
}

/// 宿主页面
struct Page {
    scope: Option<Scope>,
}

impl ScopeContext for Page {
    fn scope(&self) -> Option<Scope> {
        self.scope.clone()
    }
}

#[derive(Default)]
struct CartView {
    session: Option<Arc<Session>>,
    cart: Option<Arc<Cart>>,
}

impl Injectable for CartView {
    fn inject(&mut self, graph: &dyn ObjectGraph) -> Result<(), DependencyError> {
        self.session = Some(graph.get::<Session>()?);
        self.cart = Some(graph.get::<Cart>()?);
        Ok(())
    }
}

/// 每次读取模块规格都会计数的蓝图
struct CartBlueprint {
    reads: AtomicUsize,
}

impl Blueprint for CartBlueprint {
    fn scope_name(&self) -> &str {
        "cart"
    }

    fn module_spec(&self) -> ModuleSpec {
        self.reads.fetch_add(1, Ordering::SeqCst);
        ModuleSpec::single(InstanceModule::new("cart").provide(Cart(3)))
    }
}

fn runtime() -> ScopeRuntime {
    init_test_logger();
    ScopeBootstrapper::new()
        .with_root_module(InstanceModule::new("session").provide(Session("user-1")).into_ref())
        .build()
        .unwrap()
}

#[test]
fn test_page_lifecycle_end_to_end() {
    let runtime = runtime();
    let binder = runtime.binder();
    let events = Arc::new(Mutex::new(Vec::new()));
    let blueprint = CartBlueprint {
        reads: AtomicUsize::new(0),
    };

    let lifecycle_events = Arc::clone(&events);
    let extension = move |builder: ScopeBuilder| {
        builder.with_scoped_service(
            "page-lifecycle",
            Arc::new(Lifecycle {
                label: "page",
                events: Arc::clone(&lifecycle_events),
            }),
        )
    };

    let scope = binder
        .require_activity_scope(runtime.root(), &blueprint, &extension)
        .unwrap();
    let page = Page {
        scope: Some(scope.clone()),
    };

    let mut view = CartView::default();
    binder.inject_into(&page, &mut view).unwrap();
    assert_eq!(view.session.as_deref(), Some(&Session("user-1")));
    assert_eq!(view.cart.as_deref(), Some(&Cart(3)));

    // 重建页面复用作用域，扩展不会再次执行
    let again = binder
        .require_activity_scope(runtime.root(), &blueprint, &extension)
        .unwrap();
    assert_eq!(again, scope);
    assert_eq!(blueprint.reads.load(Ordering::SeqCst), 1);

    runtime.shutdown();
    assert!(scope.is_destroyed());
    assert_eq!(
        *events.lock(),
        vec!["enter page @ Root>cart".to_string(), "exit page".to_string()]
    );

    let mut view = CartView::default();
    assert!(matches!(
        binder.inject_into(&page, &mut view),
        Err(BinderError::Scope {
            source: ScopeError::Destroyed { .. }
        })
    ));
}

#[test]
fn test_exit_order_children_first() {
    let runtime = runtime();
    let binder = runtime.binder();
    let events = Arc::new(Mutex::new(Vec::new()));

    let with_lifecycle = |label: &'static str| {
        let events = Arc::clone(&events);
        move |builder: ScopeBuilder| {
            builder.with_scoped_service(
                label,
                Arc::new(Lifecycle {
                    label,
                    events: Arc::clone(&events),
                }),
            )
        }
    };

    let outer = binder
        .require_activity_scope(
            runtime.root(),
            &StaticBlueprint::new("outer"),
            &with_lifecycle("outer"),
        )
        .unwrap();
    binder
        .require_activity_scope(&outer, &StaticBlueprint::new("inner"), &with_lifecycle("inner"))
        .unwrap();

    outer.destroy();

    let events = events.lock();
    assert_eq!(
        events[events.len() - 2..].to_vec(),
        vec!["exit inner".to_string(), "exit outer".to_string()]
    );
}

#[test]
fn test_module_derivation_runs_once_per_scope() {
    let runtime = runtime();
    let counter = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&counter);
    let module: ModuleRef = Arc::new(FnModule::new("counted", move |registry: &mut dyn BindingRegistry| {
        calls.fetch_add(1, Ordering::SeqCst);
        registry.bind(Cart(1))
    }));
    let blueprint = StaticBlueprint::new("counted").with_spec(ModuleSpec::Single(module));

    for _ in 0..3 {
        runtime
            .binder()
            .require_child_scope(runtime.root(), &blueprint)
            .unwrap();
    }

    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_runtime_from_config_files() {
    init_test_logger();
    let mut toml_file = NamedTempFile::new().unwrap();
    writeln!(toml_file, "root_scope_name = \"Shop\"").unwrap();
    let mut json_file = NamedTempFile::new().unwrap();
    write!(json_file, r#"{{ "graph_service_name": "shop.graph" }}"#).unwrap();

    let runtime = ScopeBootstrapper::new()
        .add_config_toml(toml_file.path())
        .unwrap()
        .add_config_json(json_file.path())
        .unwrap()
        .build()
        .unwrap();

    let child = runtime
        .binder()
        .require_child_scope(runtime.root(), &StaticBlueprint::new("catalog"))
        .unwrap();

    assert_eq!(child.path(), "Shop>catalog");
    assert!(child.has_service("shop.graph").unwrap());
    assert_eq!(runtime.tree().len(), 2);
}

#[test]
fn test_runtime_from_env_vars() {
    init_test_logger();
    let vars = [
        ("SCOPE_IT_ROOT_SCOPE_NAME", "EnvRoot"),
        ("SCOPE_IT_GRAPH_SERVICE_NAME", "env.graph"),
        ("SCOPE_IT_LOGGING__JSON_FORMAT", "true"),
    ]
    .map(|(key, value)| (key.to_string(), value.to_string()));

    let runtime = ScopeBootstrapper::new()
        .add_config_source(ConfigSource::environment_from("SCOPE_IT", vars))
        .build()
        .unwrap();

    assert_eq!(runtime.root().path(), "EnvRoot");
    assert_eq!(runtime.binder().service_name(), "env.graph");
    assert!(runtime.config().logging.json_format);
    assert!(runtime.root().has_service("env.graph").unwrap());
}

#[test]
fn test_independent_runtimes_share_nothing() {
    let first = runtime();
    let second = runtime();

    let a = first
        .binder()
        .require_child_scope(first.root(), &StaticBlueprint::new("page"))
        .unwrap();
    let b = second
        .binder()
        .require_child_scope(second.root(), &StaticBlueprint::new("page"))
        .unwrap();

    assert_ne!(a, b);
    first.shutdown();
    assert!(a.is_destroyed());
    assert!(!b.is_destroyed());
}
