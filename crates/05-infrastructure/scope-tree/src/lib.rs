//! # Scope Tree
//!
//! 分层的命名服务作用域树。
//!
//! ## 核心类型
//!
//! - [`ScopeTree`] - 作用域树，持有所有节点，一棵树一把读写锁
//! - [`Scope`] - 作用域句柄，克隆开销很小，相等性即节点身份
//! - [`ScopeBuilder`] - 在作用域创建前收集服务
//! - [`Scoped`] - 感知所在作用域进入与退出的服务
//!
//! ## 基本使用
//!
//! ```rust
//! use scope_tree::ScopeTree;
//! use std::sync::Arc;
//!
//! let tree = ScopeTree::new();
//! let root = tree
//!     .build_root("Root")
//!     .with_service("greeting", Arc::new(String::from("hello")))
//!     .build()
//!     .unwrap();
//!
//! let child = root.build_child("activity").build().unwrap();
//! let greeting = child.get_service::<String>("greeting").unwrap();
//! assert_eq!(greeting.as_deref().map(String::as_str), Some("hello"));
//!
//! root.destroy();
//! assert!(child.is_destroyed());
//! ```

pub mod builder;
pub mod lifecycle;
pub mod scope;

pub use builder::ScopeBuilder;
pub use lifecycle::Scoped;
pub use scope::{Scope, ScopeId, ScopeTree, Service, ServiceMap};
