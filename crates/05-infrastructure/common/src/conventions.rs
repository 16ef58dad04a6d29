//! 约定规范定义
//!
//! 作用域命名和保留服务名的约定

use crate::errors::ScopeError;

/// 对象图在作用域服务表中的保留服务名
///
/// 其他服务如果注册在同一名称下，后写入者覆盖先写入者。
pub const OBJECT_GRAPH_SERVICE: &str = "lorn.scope.ObjectGraphService";

/// 作用域路径分隔符
pub const PATH_SEPARATOR: char = '>';

/// 默认根作用域名称
pub const DEFAULT_ROOT_SCOPE_NAME: &str = "Root";

/// 校验子作用域名称
///
/// 名称不能为空，也不能包含路径分隔符。
pub fn validate_scope_name(name: &str) -> Result<(), ScopeError> {
    if name.is_empty() {
        return Err(ScopeError::InvalidName {
            name: name.to_string(),
            reason: "名称不能为空".to_string(),
        });
    }

    if name.contains(PATH_SEPARATOR) {
        return Err(ScopeError::InvalidName {
            name: name.to_string(),
            reason: format!("名称不能包含路径分隔符 '{}'", PATH_SEPARATOR),
        });
    }

    Ok(())
}

/// 拼接子作用域路径
pub fn child_path(parent_path: &str, name: &str) -> String {
    format!("{}{}{}", parent_path, PATH_SEPARATOR, name)
}

/// 根作用域名称，空名称回退到默认值
pub fn root_scope_name(name: &str) -> &str {
    if name.is_empty() {
        DEFAULT_ROOT_SCOPE_NAME
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_scope_name() {
        assert!(validate_scope_name("activity").is_ok());
        assert!(validate_scope_name("feature-1").is_ok());

        assert!(matches!(
            validate_scope_name(""),
            Err(ScopeError::InvalidName { .. })
        ));
        assert!(matches!(
            validate_scope_name("a>b"),
            Err(ScopeError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_child_path() {
        assert_eq!(child_path("Root", "activity"), "Root>activity");
        assert_eq!(child_path("Root>activity", "feature"), "Root>activity>feature");
    }

    #[test]
    fn test_root_scope_name_fallback() {
        assert_eq!(root_scope_name(""), DEFAULT_ROOT_SCOPE_NAME);
        assert_eq!(root_scope_name("App"), "App");
    }
}
