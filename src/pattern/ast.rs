use serde::Serialize;

use super::analysis;

/// Marker left in a [`Pattern::template`] where a placeholder used to be.
pub const SUBSTITUTION_MARKER: &str = "%s";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PatternKind {
    Literal,
    Parameterized,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeHint {
    String,
    Int,
    Float,
    Custom(String),
}

impl TypeHint {
    pub fn from_keyword(token: &str) -> Option<Self> {
        match token {
            "string" => Some(Self::String),
            "int" => Some(Self::Int),
            "float" => Some(Self::Float),
            _ => None,
        }
    }

    /// Regex body this hint contributes, without any anchoring or grouping.
    pub fn regex_body(&self) -> &str {
        match self {
            TypeHint::String => ".+",
            TypeHint::Int => "[0-9]+",
            TypeHint::Float => "[-+0-9.eE]+",
            TypeHint::Custom(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Parameter {
    pub name: String,
    pub type_hint: TypeHint,
    /// Encoder chain, first entry applied first.
    pub functions: Vec<String>,
    pub required: bool,
    /// Capture groups the custom regex body opens on its own.
    #[serde(skip)]
    pub(crate) inner_groups: usize,
}

impl Parameter {
    pub fn new(name: String, required: bool) -> Self {
        Self {
            name,
            type_hint: TypeHint::String,
            functions: Vec::new(),
            required,
            inner_groups: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum PatternPart {
    Literal(String),
    /// Index into [`Pattern::params`].
    Param(usize),
}

/// Compiled form of one segment pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pattern {
    pub source: String,
    pub kind: PatternKind,
    pub parts: Vec<PatternPart>,
    pub params: Vec<Parameter>,
}

impl Pattern {
    pub fn is_literal(&self) -> bool {
        self.kind == PatternKind::Literal
    }

    /// The exact segment text a literal pattern matches.
    pub fn literal(&self) -> Option<&str> {
        if !self.is_literal() {
            return None;
        }
        match self.parts.as_slice() {
            [] => Some(""),
            [PatternPart::Literal(text)] => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|param| param.name == name)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|param| param.name == name)
    }

    pub fn required_params(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|param| param.required)
    }

    pub fn template(&self) -> String {
        analysis::to_template(self)
    }

    /// Anchored regex matching one whole segment.
    pub fn match_regex(&self) -> String {
        analysis::to_regex(self)
    }

    /// Unanchored regex body with one capture group per parameter, in declaration order.
    pub fn alternation_body(&self) -> String {
        analysis::alternation_body(self)
    }

    /// Number of capture groups opened by [`Pattern::alternation_body`].
    pub fn group_count(&self) -> usize {
        self.params
            .iter()
            .map(|param| 1 + param.inner_groups)
            .sum()
    }

    /// Parameter name and its capture group index relative to the body (1-based).
    pub fn group_offsets(&self) -> Vec<(&str, usize)> {
        let mut next = 1usize;
        let mut out = Vec::with_capacity(self.params.len());
        for param in &self.params {
            out.push((param.name.as_str(), next));
            next += 1 + param.inner_groups;
        }
        out
    }
}
