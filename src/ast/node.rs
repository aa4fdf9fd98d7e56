use crate::pattern::Pattern;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Router,
    /// Detached root of a named reusable subtree; never part of the routed tree.
    Block { name: String },
    /// Literal segment pattern.
    Path { pattern: Pattern, id: Option<String> },
    /// Parameterized segment pattern.
    RegexPath { pattern: Pattern, id: Option<String> },
    /// `path` without a pattern; its children act as children of its parent.
    BlankPath { id: Option<String> },
    /// With no value the first child is a `Call` producing it.
    Switch { value: Option<String> },
    Case { value: String },
    Default,
    Test { regex: String, subject: String },
    /// `args` come from the `with` attribute; `Arg` children follow them.
    Call { function: String, args: Vec<String> },
    Set { name: String, value: String },
    Arg { value: String },
    Return { attributes: BTreeMap<String, String> },
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Router => "router",
            NodeKind::Block { .. } => "block",
            NodeKind::Path { .. } => "path",
            NodeKind::RegexPath { .. } => "regex_path",
            NodeKind::BlankPath { .. } => "blank_path",
            NodeKind::Switch { .. } => "switch",
            NodeKind::Case { .. } => "case",
            NodeKind::Default => "default",
            NodeKind::Test { .. } => "test",
            NodeKind::Call { .. } => "call",
            NodeKind::Set { .. } => "set",
            NodeKind::Arg { .. } => "arg",
            NodeKind::Return { .. } => "return",
        }
    }

    /// Segment pattern of `Path` and `RegexPath` nodes.
    pub fn route_pattern(&self) -> Option<&Pattern> {
        match self {
            NodeKind::Path { pattern, .. } | NodeKind::RegexPath { pattern, .. } => Some(pattern),
            _ => None,
        }
    }

    pub fn route_id(&self) -> Option<&str> {
        match self {
            NodeKind::Path { id, .. }
            | NodeKind::RegexPath { id, .. }
            | NodeKind::BlankPath { id } => id.as_deref(),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Context record bound around this node's body, in declaration order.
    pub values: Vec<(String, String)>,
    /// Names this node binds for itself and its descendants.
    pub local_vars: Vec<String>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            values: Vec::new(),
            local_vars: Vec::new(),
        }
    }

    pub fn is_blank(&self) -> bool {
        matches!(self.kind, NodeKind::BlankPath { .. })
    }

    /// Stores `name = value` in the context record, replacing an earlier entry.
    pub fn set_value(&mut self, name: String, value: String) {
        match self.values.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => {
                self.add_var(name.clone());
                self.values.push((name, value));
            }
        }
    }

    pub fn add_var(&mut self, name: String) {
        if !self.local_vars.contains(&name) {
            self.local_vars.push(name);
        }
    }
}
