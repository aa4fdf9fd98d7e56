use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Element kinds of an already validated, fully expanded route tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecKind {
    Router,
    Block,
    Ref,
    Set,
    Arg,
    Return,
    Switch,
    Value,
    Case,
    Default,
    Call,
    Test,
    Path,
    Parameter,
}

impl SpecKind {
    pub fn name(&self) -> &'static str {
        match self {
            SpecKind::Router => "router",
            SpecKind::Block => "block",
            SpecKind::Ref => "ref",
            SpecKind::Set => "set",
            SpecKind::Arg => "arg",
            SpecKind::Return => "return",
            SpecKind::Switch => "switch",
            SpecKind::Value => "value",
            SpecKind::Case => "case",
            SpecKind::Default => "default",
            SpecKind::Call => "call",
            SpecKind::Test => "test",
            SpecKind::Path => "path",
            SpecKind::Parameter => "parameter",
        }
    }
}

impl fmt::Display for SpecKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One element of a route tree document.
///
/// The tree is consumed as-is: loading the raw document, schema validation and
/// resolving inclusions happen before it reaches the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecNode {
    pub kind: SpecKind,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SpecNode>,
}

impl SpecNode {
    pub fn new(kind: SpecKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn from_json(source: &str) -> serde_json::Result<Self> {
        serde_json::from_str(source)
    }

    pub fn router() -> Self {
        Self::new(SpecKind::Router)
    }

    pub fn block<S: Into<String>>(name: S) -> Self {
        Self::new(SpecKind::Block).attr("name", name)
    }

    pub fn reference<S: Into<String>>(name: S) -> Self {
        Self::new(SpecKind::Ref).attr("name", name)
    }

    pub fn path<S: Into<String>>(pattern: S) -> Self {
        Self::new(SpecKind::Path).attr("pattern", pattern)
    }

    /// A `path` without a pattern; its children behave as if declared on the parent.
    pub fn group() -> Self {
        Self::new(SpecKind::Path)
    }

    pub fn parameter<S: Into<String>>(name: S) -> Self {
        Self::new(SpecKind::Parameter).attr("name", name)
    }

    pub fn set<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self::new(SpecKind::Set).attr("name", name).attr("value", value)
    }

    pub fn arg<N: Into<String>, V: Into<String>>(name: N, value: V) -> Self {
        Self::new(SpecKind::Arg).attr("name", name).attr("value", value)
    }

    pub fn returning() -> Self {
        Self::new(SpecKind::Return)
    }

    pub fn switch() -> Self {
        Self::new(SpecKind::Switch)
    }

    pub fn value<S: Into<String>>(text: S) -> Self {
        Self::new(SpecKind::Value).text(text)
    }

    pub fn case<S: Into<String>>(value: S) -> Self {
        Self::new(SpecKind::Case).attr("value", value)
    }

    pub fn default_case() -> Self {
        Self::new(SpecKind::Default)
    }

    pub fn call<S: Into<String>>(function: S) -> Self {
        Self::new(SpecKind::Call).attr("function", function)
    }

    pub fn test<S: Into<String>, P: Into<String>>(subject: S, pattern: P) -> Self {
        Self::new(SpecKind::Test)
            .attr("subject", subject)
            .attr("pattern", pattern)
    }

    pub fn attr<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn child(mut self, child: SpecNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn children<I>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = SpecNode>,
    {
        self.children.extend(children);
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Attribute value, falling back to the element text.
    pub fn attribute_or_text(&self, name: &str) -> Option<&str> {
        self.attribute(name).or(self.text.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_nested_tree_from_json() {
        let spec = SpecNode::from_json(
            r#"{
                "kind": "router",
                "children": [
                    { "kind": "path", "attributes": { "pattern": "team" } },
                    { "kind": "return", "attributes": { "code": "404" } }
                ]
            }"#,
        )
        .expect("json should load");

        assert_eq!(spec.kind, SpecKind::Router);
        assert_eq!(spec.children.len(), 2);
        assert_eq!(spec.children[0].attribute("pattern"), Some("team"));
        assert!(spec.children[0].children.is_empty());
    }

    #[test]
    fn builder_matches_json_shape() {
        let built = SpecNode::router().child(SpecNode::path("team"));
        let json = serde_json::to_string(&built).expect("serialize");
        let loaded = SpecNode::from_json(&json).expect("reload");
        assert_eq!(built, loaded);
    }
}
