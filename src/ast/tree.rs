use crate::ast::conflict;
use crate::ast::node::{Node, NodeId, NodeKind};
use crate::ast::routes::RouteTable;
use crate::ast::AstResult;

/// Arena holding every node of one compilation.
///
/// Node 0 is the `Router` root. Block subtrees live in the same arena but are
/// detached; `ref` copies them under their use site.
#[derive(Debug, Clone)]
pub struct Ast {
    nodes: Vec<Node>,
    routes: RouteTable,
}

impl Ast {
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Router)],
            routes: RouteTable::default(),
        }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    pub(crate) fn set_routes(&mut self, routes: RouteTable) {
        self.routes = routes;
    }

    pub(crate) fn alloc(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node::new(kind));
        id
    }

    /// Links `child` under `parent`, rejecting a literal path already present at that level.
    pub(crate) fn append_child(&mut self, parent: NodeId, child: NodeId) -> AstResult<()> {
        if let NodeKind::Path { pattern, .. } = &self.node(child).kind
            && let Some(literal) = pattern.literal()
        {
            conflict::check_literal(self, parent, literal)?;
        }

        self.node_mut(child).parent = Some(parent);
        self.node_mut(parent).children.push(child);
        Ok(())
    }

    /// Deep-copies the subtree at `source` under `parent`.
    pub(crate) fn copy_subtree(&mut self, source: NodeId, parent: NodeId) -> AstResult<NodeId> {
        let original = self.node(source);
        let kind = original.kind.clone();
        let values = original.values.clone();
        let local_vars = original.local_vars.clone();
        let children = original.children.clone();

        let copy = self.alloc(kind);
        {
            let node = self.node_mut(copy);
            node.values = values;
            node.local_vars = local_vars;
        }
        self.append_child(parent, copy)?;

        for child in children {
            self.copy_subtree(child, copy)?;
        }
        Ok(copy)
    }

    /// Children of `id` with every `BlankPath` replaced by its own effective children.
    pub fn effective_children(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::with_capacity(self.node(id).children.len());
        self.collect_effective(id, &mut out);
        out
    }

    fn collect_effective(&self, id: NodeId, out: &mut Vec<NodeId>) {
        for &child in &self.node(id).children {
            if self.node(child).is_blank() {
                self.collect_effective(child, out);
            } else {
                out.push(child);
            }
        }
    }

    /// Nearest ancestor-or-self that is not a `BlankPath`.
    pub fn scope_owner(&self, id: NodeId) -> NodeId {
        self.lineage(id)
            .find(|candidate| !self.node(*candidate).is_blank())
            .unwrap_or(id)
    }

    /// `id` followed by its ancestors up to the root.
    pub fn lineage(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(Some(id), move |current| self.node(*current).parent)
    }

    /// Whether some frame bound by `id` or an ancestor may carry `name`.
    pub fn is_visible(&self, id: NodeId, name: &str) -> bool {
        self.lineage(id)
            .any(|ancestor| self.node(ancestor).local_vars.iter().any(|var| var.as_str() == name))
    }
}
