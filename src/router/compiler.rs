use crate::ast::{RouteTable, build_ast};
use crate::codegen::{Program, emit_program};
use crate::functions::FunctionRegistry;
use crate::reverse::{ReverseRoute, ReverseTable};
use crate::router::{RouterOptions, RouterResult};
use crate::runtime::{MatchResult, MatchStats, RequestContext, execute};
use crate::spec::SpecNode;
use std::collections::HashMap;

/// Immutable result of one compilation: the matching program and the route table.
///
/// Evaluation holds no shared mutable state, so one instance can serve any
/// number of concurrent requests.
#[derive(Debug)]
pub struct CompiledRouter {
    program: Program,
    routes: RouteTable,
    reverse: ReverseTable,
    options: RouterOptions,
}

/// Runs the whole pipeline: AST build (with conflict detection), regex
/// batching and emission, then reverse-route generation.
#[tracing::instrument(level = "debug", skip_all, fields(limit = options.regex_group_limit))]
pub fn compile(
    spec: &SpecNode,
    options: &RouterOptions,
    functions: &FunctionRegistry,
) -> RouterResult<CompiledRouter> {
    options.validate()?;

    let ast = build_ast(spec)?;
    let program = emit_program(&ast, functions, options.regex_group_limit)?;
    let reverse = ReverseTable::compile(ast.routes(), functions)?;
    let routes = ast.routes().clone();

    tracing::debug!(
        nodes = ast.len(),
        routes = routes.len(),
        regex_groups = program.regex_groups(),
        "router compiled"
    );

    Ok(CompiledRouter {
        program,
        routes,
        reverse,
        options: options.clone(),
    })
}

impl CompiledRouter {
    pub fn route(&self, attributes: &HashMap<String, String>) -> MatchResult {
        self.route_with_stats(attributes).0
    }

    pub fn route_with_stats(&self, attributes: &HashMap<String, String>) -> (MatchResult, MatchStats) {
        let request = RequestContext::new(
            attributes,
            &self.options.path_attributes,
            &self.options.query_attribute,
        );
        let (result, stats) = execute(&self.program, &request);

        if self.options.debug {
            tracing::debug!(
                path = request.path(),
                code = result.code(),
                advances = stats.advances,
                retreats = stats.retreats,
                "route evaluated"
            );
        }
        (result, stats)
    }

    /// Routes a bare path (optionally with `?query`) through the first path attribute.
    pub fn route_path(&self, path: &str) -> MatchResult {
        let mut attributes = HashMap::with_capacity(1);
        if let Some(name) = self
            .options
            .path_attributes
            .iter()
            .find(|name| !name.trim().is_empty())
        {
            attributes.insert(name.clone(), path.to_string());
        }
        self.route(&attributes)
    }

    pub fn build_path(&self, id: &str, args: &HashMap<String, String>) -> RouterResult<String> {
        Ok(self.reverse.build_path(id, args)?)
    }

    pub fn reverse(&self, id: &str) -> RouterResult<&ReverseRoute> {
        Ok(self.reverse.get(id)?)
    }

    pub fn reverse_routes(&self) -> &ReverseTable {
        &self.reverse
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn route_table(&self) -> &RouteTable {
        &self.routes
    }

    pub fn options(&self) -> &RouterOptions {
        &self.options
    }
}
