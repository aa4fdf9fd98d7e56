use crate::ast::{RouteEntry, RouteTable};
use crate::codegen::{CodegenResult, resolve_functions};
use crate::functions::{DEFAULT_ENCODER, FunctionRef, FunctionRegistry, apply_chain};
use crate::pattern::{Pattern, PatternPart};
use crate::reverse::{ReverseError, ReverseResult};
use hashbrown::HashMap as FastHashMap;
use std::collections::HashMap;

#[derive(Debug, Clone)]
enum ReversePart {
    Text(String),
    Param {
        name: String,
        required: bool,
        encoders: Vec<FunctionRef>,
    },
}

/// Path builder for one identified route.
#[derive(Debug, Clone)]
pub struct ReverseRoute {
    id: String,
    template: String,
    segments: Vec<Vec<ReversePart>>,
    params: Vec<String>,
}

impl ReverseRoute {
    /// Resolves encoder chains for every parameter on the route; parameters
    /// without one are encoded with [`DEFAULT_ENCODER`].
    pub fn compile(entry: &RouteEntry, functions: &FunctionRegistry) -> CodegenResult<Self> {
        let default_chain = [DEFAULT_ENCODER.to_string()];
        let mut params = Vec::new();
        let mut segments = Vec::with_capacity(entry.patterns.len());

        for pattern in &entry.patterns {
            params.extend(pattern.required_params().map(|param| param.name.clone()));
            let mut parts = Vec::with_capacity(pattern.parts.len());
            for part in &pattern.parts {
                parts.push(match part {
                    PatternPart::Literal(text) => ReversePart::Text(text.clone()),
                    PatternPart::Param(idx) => {
                        let param = &pattern.params[*idx];
                        let chain = if param.functions.is_empty() {
                            &default_chain[..]
                        } else {
                            &param.functions[..]
                        };
                        ReversePart::Param {
                            name: param.name.clone(),
                            required: param.required,
                            encoders: resolve_functions(functions, chain)?,
                        }
                    }
                });
            }
            segments.push(parts);
        }

        Ok(Self {
            id: entry.id.clone(),
            template: route_template(&entry.patterns),
            segments,
            params,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Path with each placeholder replaced by the substitution marker, e.g. `/post/%s`.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Names of the required parameters, in path order.
    pub fn params(&self) -> &[String] {
        &self.params
    }

    /// Builds the path from named arguments; absent optional parameters render empty.
    pub fn build(&self, args: &HashMap<String, String>) -> ReverseResult<String> {
        self.render(|name| args.get(name).map(String::as_str))
    }

    /// Builds the path from positional arguments matching [`ReverseRoute::params`].
    pub fn build_with(&self, args: &[&str]) -> ReverseResult<String> {
        self.render(|name| {
            self.params
                .iter()
                .position(|param| param.as_str() == name)
                .and_then(|idx| args.get(idx).copied())
        })
    }

    fn render<'v>(&self, lookup: impl Fn(&str) -> Option<&'v str>) -> ReverseResult<String> {
        let mut path = String::new();
        for parts in &self.segments {
            let mut segment = String::new();
            for part in parts {
                match part {
                    ReversePart::Text(text) => segment.push_str(text),
                    ReversePart::Param {
                        name,
                        required,
                        encoders,
                    } => match lookup(name).filter(|value| !value.is_empty()) {
                        Some(value) => segment.push_str(&apply_chain(encoders, value.to_string())),
                        // empty counts as absent
                        None if *required => {
                            return Err(ReverseError::MissingArgument { name: name.clone() });
                        }
                        None => {}
                    },
                }
            }
            if !segment.is_empty() {
                path.push('/');
                path.push_str(&segment);
            }
        }

        if path.is_empty() {
            path.push('/');
        }
        Ok(path)
    }
}

/// Reverse routes for every entry of a [`RouteTable`].
#[derive(Debug, Clone, Default)]
pub struct ReverseTable {
    routes: Vec<ReverseRoute>,
    index: FastHashMap<String, usize>,
}

impl ReverseTable {
    #[tracing::instrument(level = "trace", skip(table, functions), fields(routes = table.len()))]
    pub fn compile(table: &RouteTable, functions: &FunctionRegistry) -> CodegenResult<Self> {
        let mut out = Self::default();
        for entry in table.iter() {
            out.index.insert(entry.id.clone(), out.routes.len());
            out.routes.push(ReverseRoute::compile(entry, functions)?);
        }
        Ok(out)
    }

    pub fn get(&self, id: &str) -> ReverseResult<&ReverseRoute> {
        self.index
            .get(id)
            .map(|&idx| &self.routes[idx])
            .ok_or_else(|| ReverseError::NoSuchPath { id: id.to_string() })
    }

    pub fn build_path(&self, id: &str, args: &HashMap<String, String>) -> ReverseResult<String> {
        self.get(id)?.build(args)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReverseRoute> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

/// Reconstruction template of a route, one `/`-prefixed segment per pattern.
pub fn route_template(patterns: &[Pattern]) -> String {
    let mut out = String::new();
    for pattern in patterns {
        out.push('/');
        out.push_str(&pattern.template());
    }
    if out.is_empty() {
        out.push('/');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;

    fn entry(id: &str, sources: &[&str]) -> RouteEntry {
        RouteEntry {
            id: id.to_string(),
            patterns: sources
                .iter()
                .map(|source| parse_pattern(source).expect("pattern should parse"))
                .collect(),
        }
    }

    #[test]
    fn builds_from_named_and_positional_arguments() {
        let route = ReverseRoute::compile(&entry("post", &["post", "{id:int}"]), &FunctionRegistry::new())
            .expect("route");
        assert_eq!(route.params(), ["id"]);
        assert_eq!(route.template(), "/post/%s");

        let args = HashMap::from([("id".to_string(), "7".to_string())]);
        assert_eq!(route.build(&args).expect("path"), "/post/7");
        assert_eq!(route.build_with(&["7"]).expect("path"), "/post/7");
    }

    #[test]
    fn optional_segments_collapse_when_absent() {
        let route = ReverseRoute::compile(
            &entry("list", &["articles", "[page:int]", "p{n}[suffix]"]),
            &FunctionRegistry::new(),
        )
        .expect("route");
        assert_eq!(route.params(), ["n"]);
        assert_eq!(route.build_with(&["2"]).expect("path"), "/articles/p2");
    }

    #[test]
    fn default_encoder_escapes_arguments() {
        let route = ReverseRoute::compile(&entry("search", &["q", "{term}"]), &FunctionRegistry::new())
            .expect("route");
        assert_eq!(route.build_with(&["a b/c"]).expect("path"), "/q/a%20b%2Fc");
    }

    #[test]
    fn root_route_renders_slash() {
        let route = ReverseRoute::compile(&entry("home", &[]), &FunctionRegistry::new()).expect("route");
        assert_eq!(route.build_with(&[]).expect("path"), "/");
        assert_eq!(route_template(&[]), "/");
    }

    #[test]
    fn template_keeps_literal_text() {
        let patterns = entry("x", &["user", "u-{id}.html"]).patterns;
        assert_eq!(route_template(&patterns), "/user/u-%s.html");
    }
}
