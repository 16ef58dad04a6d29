//! # 示例应用程序
//!
//! 演示页面作用域的创建、注入、复用与销毁

use anyhow::Context;
use clap::Parser;
use di_abstractions::{Injectable, ModuleSpec, ObjectGraph, StaticBlueprint};
use di_impl::InstanceModule;
use infrastructure_common::DependencyError;
use infrastructure_composition::{LoggingConfig, ScopeBootstrapper, ScopeContext, ScopeRuntime};
use scope_tree::{Scope, ScopeBuilder, Scoped};
use serde_json::json;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 命令行参数
#[derive(Parser, Debug)]
#[command(name = "example-app")]
#[command(about = "Lorn Scope 示例应用")]
struct Args {
    /// 配置文件路径
    #[arg(short, long, default_value = "config/app.toml")]
    config: String,

    /// 日志级别
    #[arg(long)]
    log_level: Option<String>,

    /// 使用开发环境日志输出
    #[arg(long)]
    dev: bool,
}

/// 应用级服务
#[derive(Debug)]
struct Analytics {
    endpoint: String,
}

/// 页面级服务
#[derive(Debug)]
struct CheckoutService {
    currency: &'static str,
}

/// 随页面作用域进入和退出的运行器
struct ActivityRunner;

impl Scoped for ActivityRunner {
    fn on_enter_scope(&self, scope: &Scope) {
        info!("页面运行器进入作用域: {}", scope.path());
    }

    fn on_exit_scope(&self) {
        info!("页面运行器退出作用域");
    }
}

/// 宿主页面
struct Activity {
    name: &'static str,
    scope: Option<Scope>,
}

impl ScopeContext for Activity {
    fn scope(&self) -> Option<Scope> {
        self.scope.clone()
    }
}

/// 结算页面的展示器
#[derive(Default)]
struct CheckoutPresenter {
    analytics: Option<Arc<Analytics>>,
    checkout: Option<Arc<CheckoutService>>,
}

impl Injectable for CheckoutPresenter {
    fn inject(&mut self, graph: &dyn ObjectGraph) -> Result<(), DependencyError> {
        self.analytics = Some(graph.get::<Analytics>()?);
        self.checkout = Some(graph.get::<CheckoutService>()?);
        Ok(())
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let runtime = build_runtime(&args)?;
    info!("启动 Lorn Scope 示例应用");

    run_activity(&runtime)?;

    runtime.shutdown();
    info!("应用已关闭，剩余作用域 {} 个", runtime.tree().len());
    Ok(())
}

/// 构建作用域运行时
fn build_runtime(args: &Args) -> anyhow::Result<ScopeRuntime> {
    let mut bootstrapper = ScopeBootstrapper::new();

    if Path::new(&args.config).exists() {
        if args.config.ends_with(".json") {
            bootstrapper = bootstrapper.add_config_json(&args.config)?;
        } else {
            bootstrapper = bootstrapper.add_config_toml(&args.config)?;
        }
    } else {
        eprintln!("配置文件不存在，将使用默认配置和环境变量: {}", args.config);
    }

    bootstrapper = bootstrapper.add_config_env_vars("LORN_SCOPE");

    if let Some(level) = &args.log_level {
        bootstrapper = bootstrapper.add_config_value(json!({ "logging": { "level": level } }));
    }

    bootstrapper = if args.dev {
        bootstrapper.with_logging(LoggingConfig::development())
    } else {
        bootstrapper.with_configured_logging()
    };

    let app_module = InstanceModule::new("app")
        .provide(Analytics {
            endpoint: "memory://analytics".to_string(),
        })
        .into_ref();

    bootstrapper
        .with_root_module(app_module)
        .build()
        .context("构建作用域运行时失败")
}

/// 演示页面作用域
fn run_activity(runtime: &ScopeRuntime) -> anyhow::Result<()> {
    let binder = runtime.binder();
    let blueprint = StaticBlueprint::new("checkout").with_spec(ModuleSpec::single(
        InstanceModule::new("checkout").provide(CheckoutService { currency: "CNY" }),
    ));
    let attach_runner = |builder: ScopeBuilder| {
        builder.with_scoped_service("activity-runner", Arc::new(ActivityRunner))
    };

    let scope = binder.require_activity_scope(runtime.root(), &blueprint, &attach_runner)?;
    let mut activity = Activity {
        name: "CheckoutActivity",
        scope: Some(scope.clone()),
    };

    let mut presenter = CheckoutPresenter::default();
    binder.inject_into(&activity, &mut presenter)?;
    if let (Some(analytics), Some(checkout)) = (&presenter.analytics, &presenter.checkout) {
        info!(
            "{} 注入完成: analytics={}, currency={}",
            activity.name, analytics.endpoint, checkout.currency
        );
    }

    // 页面重建时复用同一个作用域
    let again = binder.require_activity_scope(runtime.root(), &blueprint, &attach_runner)?;
    info!("页面重建后复用作用域: {}", again == scope);

    // 页面结束
    scope.destroy();
    activity.scope = None;
    info!("{} 已结束，作用域已销毁: {}", activity.name, scope.is_destroyed());

    Ok(())
}
