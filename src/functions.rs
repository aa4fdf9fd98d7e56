use hashbrown::HashMap as FastHashMap;
use std::fmt;
use std::sync::Arc;

/// A named function callable from route definitions: `call` elements,
/// template filters and parameter encoder chains.
pub type RouteFunction = Arc<dyn Fn(&[String]) -> String + Send + Sync>;

/// Encoder applied to reverse-route arguments when a parameter declares none.
pub const DEFAULT_ENCODER: &str = "urlencode";

#[derive(Clone)]
pub struct FunctionRegistry {
    functions: FastHashMap<String, RouteFunction>,
}

impl FunctionRegistry {
    /// Registry preloaded with the built-in functions.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        registry.register("urlencode", |args| {
            urlencoding::encode(first(args)).into_owned()
        });
        registry.register("urldecode", |args| {
            let raw = first(args);
            urlencoding::decode(raw)
                .map(|decoded| decoded.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        });
        registry.register("lowercase", |args| first(args).to_lowercase());
        registry.register("uppercase", |args| first(args).to_uppercase());
        registry.register("capitalize", |args| {
            let mut chars = first(args).chars();
            match chars.next() {
                Some(head) => head.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        });
        registry.register("trim", |args| first(args).trim().to_string());
        registry
    }

    pub fn empty() -> Self {
        Self {
            functions: FastHashMap::new(),
        }
    }

    /// Registers `function` under `name`, replacing any previous entry.
    pub fn register<N, F>(&mut self, name: N, function: F) -> &mut Self
    where
        N: Into<String>,
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        self.functions.insert(name.into(), Arc::new(function));
        self
    }

    pub fn get(&self, name: &str) -> Option<FunctionRef> {
        self.functions.get(name).map(|func| FunctionRef {
            name: name.to_string(),
            func: Arc::clone(func),
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("functions", &self.names())
            .finish()
    }
}

/// A function resolved at compile time.
#[derive(Clone)]
pub struct FunctionRef {
    name: String,
    func: RouteFunction,
}

impl FunctionRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, args: &[String]) -> String {
        (self.func)(args)
    }
}

impl fmt::Debug for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FunctionRef").field(&self.name).finish()
    }
}

/// Runs `value` through `chain`; the first function is applied first.
pub fn apply_chain(chain: &[FunctionRef], value: String) -> String {
    chain
        .iter()
        .fold(value, |acc, func| func.apply(std::slice::from_ref(&acc)))
}

fn first(args: &[String]) -> &str {
    args.first().map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtins_are_registered() {
        let registry = FunctionRegistry::new();
        for name in ["urlencode", "urldecode", "lowercase", "uppercase", "capitalize", "trim"] {
            assert!(registry.contains(name), "missing builtin {name}");
        }
        assert!(FunctionRegistry::empty().names().is_empty());
    }

    #[test]
    fn urlencode_escapes_reserved_characters() {
        let registry = FunctionRegistry::new();
        let encode = registry.get("urlencode").expect("builtin");
        assert_eq!(encode.apply(&["a b/c".to_string()]), "a%20b%2Fc");
        let decode = registry.get("urldecode").expect("builtin");
        assert_eq!(decode.apply(&["a%20b%2Fc".to_string()]), "a b/c");
    }

    #[test]
    fn chain_applies_first_declared_innermost() {
        let mut registry = FunctionRegistry::empty();
        registry.register("wrap", |args| format!("[{}]", args[0]));
        registry.register("shout", |args| format!("{}!", args[0]));
        let chain = vec![
            registry.get("wrap").expect("wrap"),
            registry.get("shout").expect("shout"),
        ];
        assert_eq!(apply_chain(&chain, "hi".to_string()), "[hi]!");
    }

    #[test]
    fn capitalize_only_touches_the_first_character() {
        let registry = FunctionRegistry::new();
        let capitalize = registry.get("capitalize").expect("builtin");
        assert_eq!(capitalize.apply(&["hello World".to_string()]), "Hello World");
        assert_eq!(capitalize.apply(&[]), "");
    }
}
