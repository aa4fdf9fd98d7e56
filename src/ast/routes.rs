use crate::ast::node::NodeId;
use crate::ast::tree::Ast;
use crate::ast::{AstError, AstResult};
use crate::pattern::Pattern;
use hashbrown::HashMap as FastHashMap;
use serde::Serialize;

/// Route id and the segment patterns from the root down to the identified node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub id: String,
    pub patterns: Vec<Pattern>,
}

#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
    index: FastHashMap<String, usize>,
}

impl RouteTable {
    pub fn insert(&mut self, id: String, patterns: Vec<Pattern>) -> AstResult<()> {
        if self.index.contains_key(&id) {
            return Err(AstError::DuplicateRouteId { id });
        }
        self.index.insert(id.clone(), self.entries.len());
        self.entries.push(RouteEntry { id, patterns });
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&RouteEntry> {
        self.index.get(id).map(|&idx| &self.entries[idx])
    }

    /// Entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &RouteEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Walks the routed tree depth-first and records every node carrying an `id`.
pub(crate) fn collect_routes(ast: &Ast) -> AstResult<RouteTable> {
    let mut table = RouteTable::default();
    let mut stack = Vec::new();
    walk(ast, ast.root(), &mut stack, &mut table)?;
    Ok(table)
}

fn walk(
    ast: &Ast,
    id: NodeId,
    stack: &mut Vec<Pattern>,
    table: &mut RouteTable,
) -> AstResult<()> {
    let kind = &ast.node(id).kind;
    let pushed = match kind.route_pattern() {
        Some(pattern) => {
            stack.push(pattern.clone());
            true
        }
        None => false,
    };

    if let Some(route_id) = kind.route_id() {
        table.insert(route_id.to_string(), stack.clone())?;
    }

    for &child in &ast.node(id).children {
        walk(ast, child, stack, table)?;
    }

    if pushed {
        stack.pop();
    }
    Ok(())
}
