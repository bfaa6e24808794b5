//! Function registry.

use std::collections::HashMap;
use std::sync::Arc;

use super::{builtins, function_key, Function, FunctionSignature};

/// A registry of callable functions.
///
/// Functions are stored under `name#arity`, so one name can carry several
/// arities.
///
/// # Example
///
/// ```
/// use xqrt_runtime::FunctionRegistry;
///
/// let registry = FunctionRegistry::with_builtins();
/// assert!(registry.contains("fn:count", 1));
/// assert!(!registry.contains("fn:count", 2));
/// ```
#[derive(Default, Clone)]
pub struct FunctionRegistry {
    functions: HashMap<String, Arc<dyn Function>>,
}

impl FunctionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self { functions: HashMap::new() }
    }

    /// Creates a registry holding the built-in functions.
    #[must_use]
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        builtins::register_builtins(&mut registry);
        registry
    }

    /// Registers a function.
    ///
    /// A function with the same name and arity is replaced.
    pub fn register(&mut self, function: Arc<dyn Function>) {
        let key = function.signature().key();
        self.functions.insert(key, function);
    }

    /// Gets a function by name and arity.
    #[must_use]
    pub fn get(&self, name: &str, arity: usize) -> Option<Arc<dyn Function>> {
        self.functions.get(&function_key(name, arity)).cloned()
    }

    /// Returns true if a function with the given name and arity exists.
    #[must_use]
    pub fn contains(&self, name: &str, arity: usize) -> bool {
        self.functions.contains_key(&function_key(name, arity))
    }

    /// Returns true if any arity of `name` is registered.
    #[must_use]
    pub fn contains_name(&self, name: &str) -> bool {
        self.functions.values().any(|f| f.signature().name == name)
    }

    /// Removes a function from the registry.
    pub fn unregister(&mut self, name: &str, arity: usize) -> Option<Arc<dyn Function>> {
        self.functions.remove(&function_key(name, arity))
    }

    /// Returns the number of registered functions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.functions.len()
    }

    /// Returns true if no functions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    /// Lists all registry keys.
    #[must_use]
    pub fn list_keys(&self) -> Vec<&str> {
        self.functions.keys().map(String::as_str).collect()
    }

    /// Lists all registered signatures.
    #[must_use]
    pub fn list_signatures(&self) -> Vec<FunctionSignature> {
        self.functions.values().map(|f| f.signature()).collect()
    }

    /// Merges another registry into this one.
    ///
    /// Functions from `other` overwrite any with the same key.
    pub fn merge(&mut self, other: FunctionRegistry) {
        self.functions.extend(other.functions);
    }
}

impl std::fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys = self.list_keys();
        keys.sort_unstable();
        f.debug_struct("FunctionRegistry").field("functions", &keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use xqrt_core::{Item, Sequence};

    use super::*;
    use crate::error::RuntimeResult;

    struct Echo;

    impl Function for Echo {
        fn signature(&self) -> FunctionSignature {
            FunctionSignature::new("test:echo", 1).with_description("Returns its argument")
        }

        fn invoke(&self, args: &[Sequence]) -> RuntimeResult<Sequence> {
            Ok(args.first().cloned().unwrap_or_default())
        }
    }

    #[test]
    fn register_and_get() {
        let mut registry = FunctionRegistry::new();
        registry.register(Arc::new(Echo));

        assert!(registry.contains("test:echo", 1));
        assert!(!registry.contains("test:echo", 2));
        assert!(registry.contains_name("test:echo"));

        let echo = registry.get("test:echo", 1).expect("function should exist");
        let arg = Sequence::singleton(Item::integer(4));
        assert_eq!(echo.invoke(&[arg.clone()]).unwrap(), arg);
    }

    #[test]
    fn unregister() {
        let mut registry = FunctionRegistry::new();
        registry.register(Arc::new(Echo));
        assert!(registry.unregister("test:echo", 1).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn merge_adds_functions() {
        let mut registry = FunctionRegistry::with_builtins();
        let before = registry.len();
        let mut extra = FunctionRegistry::new();
        extra.register(Arc::new(Echo));
        registry.merge(extra);
        assert_eq!(registry.len(), before + 1);
        assert!(registry.list_keys().contains(&"test:echo#1"));
    }
}
