use crate::ast::{Ast, NodeId};
use crate::codegen::{CodegenError, CodegenResult};
use crate::functions::{FunctionRef, FunctionRegistry};
use crate::template::{TemplateToken, parse_template};

/// A templated string with its variables and filters resolved at compile time.
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    parts: Vec<TemplatePart>,
}

#[derive(Debug, Clone)]
pub enum TemplatePart {
    Text(String),
    Variable {
        name: String,
        filters: Vec<FunctionRef>,
        /// False when no enclosing frame can bind `name`; lookup then skips the frame stack.
        scoped: bool,
    },
}

impl Template {
    /// Compiles `source` as seen from `node`.
    pub(crate) fn compile(
        source: &str,
        ast: &Ast,
        node: NodeId,
        functions: &FunctionRegistry,
    ) -> CodegenResult<Self> {
        let parts = parse_template(source)
            .into_iter()
            .map(|token| -> CodegenResult<TemplatePart> {
                match token {
                    TemplateToken::Text(text) => Ok(TemplatePart::Text(text)),
                    TemplateToken::Variable { name, filters } => Ok(TemplatePart::Variable {
                        filters: resolve_functions(functions, &filters)?,
                        scoped: ast.is_visible(node, &name),
                        name,
                    }),
                }
            })
            .collect::<CodegenResult<Vec<_>>>()?;

        Ok(Self {
            source: source.to_string(),
            parts,
        })
    }

    pub fn literal<S: Into<String>>(text: S) -> Self {
        let text = text.into();
        Self {
            parts: vec![TemplatePart::Text(text.clone())],
            source: text,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn parts(&self) -> &[TemplatePart] {
        &self.parts
    }
}

pub(crate) fn resolve_functions(
    functions: &FunctionRegistry,
    names: &[String],
) -> CodegenResult<Vec<FunctionRef>> {
    names
        .iter()
        .map(|name| {
            functions
                .get(name)
                .ok_or_else(|| CodegenError::UnknownFunction { name: name.clone() })
        })
        .collect()
}
