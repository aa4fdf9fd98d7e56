use crate::functions::FunctionRegistry;
use crate::router::compiler::{CompiledRouter, compile};
use crate::router::{RouterError, RouterOptions, RouterResult};
use crate::runtime::MatchResult;
use crate::spec::SpecNode;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Debug)]
struct RouterState {
    options: RouterOptions,
    functions: FunctionRegistry,
    compiled: Option<Arc<CompiledRouter>>,
}

impl RouterState {
    fn new(options: RouterOptions) -> Self {
        Self {
            options,
            functions: FunctionRegistry::new(),
            compiled: None,
        }
    }
}

/// Thread-safe front end: compilations are serialized behind a write lock and
/// publish an immutable [`CompiledRouter`] that lookups share.
#[derive(Debug)]
pub struct Router {
    inner: RwLock<RouterState>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new(None)
    }
}

impl Router {
    pub fn new(options: Option<RouterOptions>) -> Self {
        let state = RouterState::new(options.unwrap_or_default());
        Self {
            inner: RwLock::new(state),
        }
    }

    /// Makes `function` available to route trees loaded afterwards.
    pub fn register_function<N, F>(&self, name: N, function: F)
    where
        N: Into<String>,
        F: Fn(&[String]) -> String + Send + Sync + 'static,
    {
        let mut guard = self.inner.write();
        guard.functions.register(name, function);
    }

    /// Compiles `spec` and replaces the published router. On error the previous one stays.
    pub fn load(&self, spec: &SpecNode) -> RouterResult<Arc<CompiledRouter>> {
        let mut guard = self.inner.write();
        let compiled = Arc::new(compile(spec, &guard.options, &guard.functions)?);
        guard.compiled = Some(Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn load_json(&self, source: &str) -> RouterResult<Arc<CompiledRouter>> {
        let spec = SpecNode::from_json(source)?;
        self.load(&spec)
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().compiled.is_some()
    }

    pub fn route(&self, attributes: &HashMap<String, String>) -> RouterResult<MatchResult> {
        Ok(self.get_compiled()?.route(attributes))
    }

    pub fn route_path(&self, path: &str) -> RouterResult<MatchResult> {
        Ok(self.get_compiled()?.route_path(path))
    }

    pub fn build_path(&self, id: &str, args: &HashMap<String, String>) -> RouterResult<String> {
        self.get_compiled()?.build_path(id, args)
    }

    pub fn get_compiled(&self) -> RouterResult<Arc<CompiledRouter>> {
        let guard = self.inner.read();
        guard.compiled.clone().ok_or(RouterError::NotLoaded)
    }
}
