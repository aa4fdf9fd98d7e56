use crate::ast::node::{NodeId, NodeKind};
use crate::ast::routes::collect_routes;
use crate::ast::tree::Ast;
use crate::ast::{AstError, AstResult};
use crate::pattern::{
    Pattern, PatternResult, parse_function_list, parse_pattern, resolve_type_token, split_route,
};
use crate::spec::{SpecKind, SpecNode};
use hashbrown::HashMap as FastHashMap;
use regex::Regex;

/// Turns a validated route tree into an [`Ast`].
///
/// Blocks are visible to later siblings of their declaration and to everything
/// nested below those siblings.
#[derive(Debug)]
pub struct AstBuilder {
    ast: Ast,
    scopes: Vec<FastHashMap<String, NodeId>>,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self {
            ast: Ast::new(),
            scopes: Vec::new(),
        }
    }

    #[tracing::instrument(level = "trace", skip(self, spec), fields(children = spec.children.len()))]
    pub fn build(mut self, spec: &SpecNode) -> AstResult<Ast> {
        if spec.kind != SpecKind::Router {
            return Err(AstError::UnexpectedNode {
                kind: spec.kind.name(),
                parent: "document",
            });
        }

        let root = self.ast.root();
        self.build_children(spec, root)?;

        let routes = collect_routes(&self.ast)?;
        tracing::debug!(nodes = self.ast.len(), routes = routes.len(), "ast built");
        self.ast.set_routes(routes);
        Ok(self.ast)
    }

    fn build_children(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        self.scopes.push(FastHashMap::new());
        let result = spec
            .children
            .iter()
            .try_for_each(|child| self.build_node(child, parent));
        self.scopes.pop();
        result
    }

    fn build_node(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        match spec.kind {
            SpecKind::Block => self.build_block(spec),
            SpecKind::Ref => self.inline_block(spec, parent),
            SpecKind::Path => self.build_path(spec, parent),
            SpecKind::Set => {
                let name = required(spec, "name")?;
                let value = spec.attribute_or_text("value").unwrap_or_default().to_string();
                self.leaf(spec, parent, NodeKind::Set { name, value })
            }
            SpecKind::Arg => self.build_arg(spec, parent),
            SpecKind::Return => {
                let attributes = spec.attributes.clone();
                self.leaf(spec, parent, NodeKind::Return { attributes })
            }
            SpecKind::Switch => self.build_switch(spec, parent),
            SpecKind::Call => self.build_call(spec, parent),
            SpecKind::Test => self.build_test(spec, parent),
            // declarations were folded into the pattern by `build_path`
            SpecKind::Parameter if self.ast.node(parent).kind.route_pattern().is_some() => Ok(()),
            SpecKind::Router
            | SpecKind::Parameter
            | SpecKind::Value
            | SpecKind::Case
            | SpecKind::Default => Err(self.unexpected(spec, parent)),
        }
    }

    fn build_block(&mut self, spec: &SpecNode) -> AstResult<()> {
        let name = required(spec, "name")?;
        let block = self.ast.alloc(NodeKind::Block { name: name.clone() });
        self.build_children(spec, block)?;

        // registered after its body so a block cannot reference itself
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name, block);
        }
        Ok(())
    }

    fn inline_block(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        let name = required(spec, "name")?;
        let Some(block) = self.lookup_block(&name) else {
            return Err(AstError::UndeclaredBlock { name });
        };

        let values = self.ast.node(block).values.clone();
        let owner = self.ast.scope_owner(parent);
        for (key, value) in values {
            self.ast.node_mut(owner).set_value(key, value);
        }

        let children = self.ast.node(block).children.clone();
        for child in children {
            self.ast.copy_subtree(child, parent)?;
        }
        Ok(())
    }

    fn lookup_block(&self, name: &str) -> Option<NodeId> {
        self.scopes
            .iter()
            .rev()
            .find_map(|scope| scope.get(name).copied())
    }

    /// A multi-segment pattern such as `/post/{id}` becomes a chain of nested
    /// paths; the last one carries the `id`, the declarations and the children.
    fn build_path(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        let id = spec.attribute("id").map(str::to_string);
        let raw = spec.attribute("pattern").unwrap_or_default();
        let mut patterns = split_route(raw)
            .into_iter()
            .map(parse_pattern)
            .collect::<PatternResult<Vec<_>>>()?;

        for declaration in spec
            .children
            .iter()
            .filter(|child| child.kind == SpecKind::Parameter)
        {
            apply_declaration(&mut patterns, raw, declaration)?;
        }

        let Some(last) = patterns.pop() else {
            let node = self.ast.alloc(NodeKind::BlankPath { id });
            self.ast.append_child(parent, node)?;
            return self.build_children(spec, node);
        };

        let mut level = parent;
        for pattern in patterns {
            level = self.append_path(level, pattern, None)?;
        }
        let node = self.append_path(level, last, id)?;
        self.build_children(spec, node)
    }

    fn append_path(
        &mut self,
        parent: NodeId,
        pattern: Pattern,
        id: Option<String>,
    ) -> AstResult<NodeId> {
        let params: Vec<String> = pattern.params.iter().map(|param| param.name.clone()).collect();
        let kind = if pattern.is_literal() {
            NodeKind::Path { pattern, id }
        } else {
            NodeKind::RegexPath { pattern, id }
        };

        let node = self.ast.alloc(kind);
        for name in params {
            self.ast.node_mut(node).add_var(name);
        }
        self.ast.append_child(parent, node)?;
        Ok(node)
    }

    fn build_arg(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        let value = spec.attribute_or_text("value").unwrap_or_default().to_string();
        if matches!(self.ast.node(parent).kind, NodeKind::Call { .. }) {
            return self.leaf(spec, parent, NodeKind::Arg { value });
        }

        let name = required(spec, "name")?;
        let owner = self.ast.scope_owner(parent);
        self.ast.node_mut(owner).set_value(name, value);
        Ok(())
    }

    fn build_switch(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        let switch = self.ast.alloc(NodeKind::Switch { value: None });
        self.ast.append_child(parent, switch)?;

        let mut value = spec.attribute("value").map(str::to_string);
        if value.is_none()
            && let Some(value_spec) = spec.children.iter().find(|c| c.kind == SpecKind::Value)
        {
            match value_spec.children.first() {
                Some(call) if call.kind == SpecKind::Call => self.build_call(call, switch)?,
                Some(other) => {
                    return Err(AstError::UnexpectedNode {
                        kind: other.kind.name(),
                        parent: SpecKind::Value.name(),
                    });
                }
                None => value = Some(value_spec.text.clone().unwrap_or_default()),
            }
        }

        let has_call = !self.ast.node(switch).children.is_empty();
        if value.is_none() && !has_call {
            return Err(AstError::MissingAttribute {
                kind: "switch",
                attribute: "value",
            });
        }
        self.ast.node_mut(switch).kind = NodeKind::Switch { value };

        let mut has_default = false;
        for child in &spec.children {
            match child.kind {
                SpecKind::Value => {}
                SpecKind::Case => {
                    let value = child
                        .attribute_or_text("value")
                        .map(str::to_string)
                        .ok_or(AstError::MissingAttribute {
                            kind: "case",
                            attribute: "value",
                        })?;
                    let case = self.ast.alloc(NodeKind::Case { value });
                    self.ast.append_child(switch, case)?;
                    self.build_children(child, case)?;
                }
                SpecKind::Default if has_default => return Err(self.unexpected(child, switch)),
                SpecKind::Default => {
                    has_default = true;
                    let default = self.ast.alloc(NodeKind::Default);
                    self.ast.append_child(switch, default)?;
                    self.build_children(child, default)?;
                }
                _ => return Err(self.unexpected(child, switch)),
            }
        }
        Ok(())
    }

    fn build_call(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        let function = spec
            .attribute("function")
            .or(spec.text.as_deref())
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(AstError::MissingAttribute {
                kind: "call",
                attribute: "function",
            })?
            .to_string();
        let args = spec.attribute("with").map(split_with).unwrap_or_default();

        let call = self.ast.alloc(NodeKind::Call { function, args });
        self.ast.append_child(parent, call)?;

        for child in &spec.children {
            if child.kind != SpecKind::Arg {
                return Err(self.unexpected(child, call));
            }
            self.build_arg(child, call)?;
        }
        Ok(())
    }

    fn build_test(&mut self, spec: &SpecNode, parent: NodeId) -> AstResult<()> {
        let regex = required(spec, "pattern")?;
        let subject = spec.attribute("subject").unwrap_or_default().to_string();
        let compiled = Regex::new(&regex).map_err(|err| AstError::InvalidTestPattern {
            pattern: regex.clone(),
            error: err.to_string(),
        })?;

        let test = self.ast.alloc(NodeKind::Test { regex, subject });
        {
            let node = self.ast.node_mut(test);
            for group in 0..compiled.captures_len() {
                node.add_var(group.to_string());
            }
            for name in compiled.capture_names().flatten() {
                node.add_var(name.to_string());
            }
        }
        self.ast.append_child(parent, test)?;
        self.build_children(spec, test)
    }

    fn leaf(&mut self, spec: &SpecNode, parent: NodeId, kind: NodeKind) -> AstResult<()> {
        if let Some(child) = spec.children.first() {
            return Err(AstError::UnexpectedNode {
                kind: child.kind.name(),
                parent: spec.kind.name(),
            });
        }
        let node = self.ast.alloc(kind);
        self.ast.append_child(parent, node)
    }

    fn unexpected(&self, spec: &SpecNode, parent: NodeId) -> AstError {
        AstError::UnexpectedNode {
            kind: spec.kind.name(),
            parent: self.ast.node(parent).kind.name(),
        }
    }
}

/// Builds the [`Ast`] for `spec` with a fresh builder.
pub fn build_ast(spec: &SpecNode) -> AstResult<Ast> {
    AstBuilder::new().build(spec)
}

fn required(spec: &SpecNode, attribute: &'static str) -> AstResult<String> {
    spec.attribute(attribute)
        .map(str::to_string)
        .ok_or(AstError::MissingAttribute {
            kind: spec.kind.name(),
            attribute,
        })
}

/// Overrides type and encoder chain of one placeholder from a `parameter` element.
///
/// The innermost segment declaring the placeholder is the one updated.
fn apply_declaration(
    patterns: &mut [Pattern],
    route: &str,
    declaration: &SpecNode,
) -> AstResult<()> {
    let name = required(declaration, "name")?;
    let Some(pattern) = patterns
        .iter_mut()
        .rev()
        .find(|pattern| pattern.param(&name).is_some())
    else {
        return Err(AstError::UnknownParameter {
            name,
            pattern: route.trim_matches('/').to_string(),
        });
    };
    let source = pattern.source.clone();
    let Some(param) = pattern.param_mut(&name) else {
        return Err(AstError::UnknownParameter { name, pattern: source });
    };

    if let Some(token) = declaration.attribute("type") {
        let (hint, inner_groups) = resolve_type_token(&source, token)?;
        param.type_hint = hint;
        param.inner_groups = inner_groups;
    }
    if let Some(raw) = declaration.attribute("function") {
        param.functions = parse_function_list(&source, raw)?;
    }
    Ok(())
}

/// Splits a `with` attribute on commas, honouring double quotes.
fn split_with(raw: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for ch in raw.chars() {
        match ch {
            '"' => quoted = !quoted,
            ',' if !quoted => out.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    out.push(current);

    out.into_iter()
        .map(|arg| arg.trim().to_string())
        .filter(|arg| !arg.is_empty())
        .collect()
}
