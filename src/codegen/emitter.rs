use crate::ast::{Ast, NodeId, NodeKind};
use crate::codegen::batch::{MarkCounter, RegexBatcher};
use crate::codegen::instruction::{
    Block, CallSite, Instruction, LiteralArm, Program, SwitchCase, SwitchValue,
};
use crate::codegen::template::Template;
use crate::codegen::{CodegenError, CodegenResult};
use crate::functions::FunctionRegistry;
use crate::pattern::Pattern;
use hashbrown::HashMap as FastHashMap;
use regex::Regex;

/// Lowers an [`Ast`] into a [`Program`].
///
/// Each node body is emitted as: control children in declaration order, then
/// segment dispatch (literal arms before batched parameterized arms), then
/// the node's `return` children. A non-empty context record wraps the body in
/// a `Scope`.
pub struct Emitter<'a> {
    ast: &'a Ast,
    functions: &'a FunctionRegistry,
    batcher: RegexBatcher,
    marks: MarkCounter,
    regex_groups: usize,
}

impl<'a> Emitter<'a> {
    pub fn new(ast: &'a Ast, functions: &'a FunctionRegistry, batcher: RegexBatcher) -> Self {
        Self {
            ast,
            functions,
            batcher,
            marks: MarkCounter::new(),
            regex_groups: 0,
        }
    }

    #[tracing::instrument(level = "trace", skip(self), fields(nodes = self.ast.len(), limit = self.batcher.limit()))]
    pub fn emit(mut self) -> CodegenResult<Program> {
        let entry = self.emit_body(self.ast.root(), 0)?;
        let program = Program {
            entry,
            regex_groups: self.regex_groups,
            branches: self.marks.issued(),
        };
        tracing::debug!(
            regex_groups = program.regex_groups,
            branches = program.branches,
            "program emitted"
        );
        Ok(program)
    }

    fn emit_body(&mut self, id: NodeId, depth: usize) -> CodegenResult<Block> {
        let ast = self.ast;
        let mut block = Block::new();
        let mut literals = Vec::new();
        let mut patterns = Vec::new();
        let mut returns = Vec::new();

        for child in ast.effective_children(id) {
            match &ast.node(child).kind {
                NodeKind::Path { .. } => literals.push(child),
                NodeKind::RegexPath { .. } => patterns.push(child),
                NodeKind::Return { .. } => returns.push(child),
                _ => {
                    if let Some(instruction) = self.emit_control(child, depth)? {
                        block.push(instruction);
                    }
                }
            }
        }

        if !literals.is_empty() || !patterns.is_empty() {
            block.push(Instruction::Advance { index: depth });
            if !literals.is_empty() {
                block.push(self.emit_literal_dispatch(&literals, depth)?);
            }
            if !patterns.is_empty() {
                block.push(self.emit_pattern_dispatch(&patterns, depth)?);
            }
            block.push(Instruction::Retreat { index: depth });
        }

        for child in returns {
            block.push(self.emit_return(child)?);
        }

        let values = &ast.node(id).values;
        if values.is_empty() {
            return Ok(block);
        }
        let bindings = values
            .iter()
            .map(|(name, value)| -> CodegenResult<(String, Template)> {
                Ok((name.clone(), self.template(value, id)?))
            })
            .collect::<CodegenResult<Vec<_>>>()?;
        Ok(vec![Instruction::Scope {
            bindings,
            body: block,
        }])
    }

    fn emit_control(&mut self, id: NodeId, depth: usize) -> CodegenResult<Option<Instruction>> {
        let ast = self.ast;
        let node = ast.node(id);
        let instruction = match &node.kind {
            NodeKind::Switch { value } => self.emit_switch(id, value.as_deref(), depth)?,
            NodeKind::Test { regex, subject } => {
                let compiled = Regex::new(regex).map_err(|err| CodegenError::Regex {
                    regex: regex.clone(),
                    error: err.to_string(),
                })?;
                let subject = self.template(subject, node.parent.unwrap_or(id))?;
                Instruction::Test {
                    regex: compiled,
                    subject,
                    body: self.emit_body(id, depth)?,
                }
            }
            NodeKind::Call { .. } => Instruction::Call(self.call_site(id)?),
            NodeKind::Set { name, value } => Instruction::Set {
                name: name.clone(),
                value: self.template(value, id)?,
            },
            _ => return Ok(None),
        };
        Ok(Some(instruction))
    }

    fn emit_switch(
        &mut self,
        id: NodeId,
        value: Option<&str>,
        depth: usize,
    ) -> CodegenResult<Instruction> {
        let ast = self.ast;
        let mut children = ast.node(id).children.as_slice();

        let value = match value {
            Some(text) => SwitchValue::Template(self.template(text, id)?),
            None => match children.split_first() {
                Some((&first, rest)) if matches!(ast.node(first).kind, NodeKind::Call { .. }) => {
                    children = rest;
                    SwitchValue::Call(self.call_site(first)?)
                }
                _ => SwitchValue::Template(Template::literal("")),
            },
        };

        let mut cases = Vec::new();
        let mut default = None;
        for &child in children {
            match &ast.node(child).kind {
                NodeKind::Case { value } => cases.push(SwitchCase {
                    value: self.template(value, child)?,
                    body: self.emit_body(child, depth)?,
                }),
                NodeKind::Default => {
                    default = Some(self.emit_body(child, depth)?);
                }
                _ => {}
            }
        }

        Ok(Instruction::Switch {
            value,
            cases,
            default,
        })
    }

    fn emit_literal_dispatch(&mut self, literals: &[NodeId], depth: usize) -> CodegenResult<Instruction> {
        let ast = self.ast;
        let mut arms = Vec::with_capacity(literals.len());
        let mut lookup = FastHashMap::with_capacity(literals.len());

        for &child in literals {
            let Some(literal) = ast.node(child).kind.route_pattern().and_then(Pattern::literal) else {
                continue;
            };
            lookup.entry(literal.to_string()).or_insert(arms.len());
            arms.push(LiteralArm {
                literal: literal.to_string(),
                body: self.emit_body(child, depth + 1)?,
            });
        }

        Ok(Instruction::LiteralDispatch {
            index: depth,
            arms,
            lookup,
        })
    }

    fn emit_pattern_dispatch(&mut self, children: &[NodeId], depth: usize) -> CodegenResult<Instruction> {
        let ast = self.ast;
        let patterns: Vec<&Pattern> = children
            .iter()
            .filter_map(|&child| ast.node(child).kind.route_pattern())
            .collect();

        let groups = self.batcher.batch(&patterns, &mut self.marks)?;
        self.regex_groups += groups.len();

        let arms = children
            .iter()
            .map(|&child| self.emit_body(child, depth + 1))
            .collect::<CodegenResult<Vec<_>>>()?;

        Ok(Instruction::PatternDispatch {
            index: depth,
            groups,
            arms,
        })
    }

    fn emit_return(&mut self, id: NodeId) -> CodegenResult<Instruction> {
        let NodeKind::Return { attributes } = &self.ast.node(id).kind else {
            return Ok(Instruction::Return { fields: Vec::new() });
        };

        let mut fields = Vec::with_capacity(attributes.len() + 1);
        if !attributes.contains_key("code") {
            fields.push(("code".to_string(), Template::literal("200")));
        }
        for (name, value) in attributes {
            fields.push((name.clone(), self.template(value, id)?));
        }
        Ok(Instruction::Return { fields })
    }

    fn call_site(&self, id: NodeId) -> CodegenResult<CallSite> {
        let node = self.ast.node(id);
        let NodeKind::Call { function, args } = &node.kind else {
            return Err(CodegenError::UnknownFunction {
                name: node.kind.name().to_string(),
            });
        };

        let function = self
            .functions
            .get(function)
            .ok_or_else(|| CodegenError::UnknownFunction {
                name: function.clone(),
            })?;

        let mut templates = Vec::with_capacity(args.len() + node.children.len());
        for arg in args {
            templates.push(self.template(arg, id)?);
        }
        for &child in &node.children {
            if let NodeKind::Arg { value } = &self.ast.node(child).kind {
                templates.push(self.template(value, id)?);
            }
        }

        Ok(CallSite {
            function,
            args: templates,
        })
    }

    fn template(&self, source: &str, node: NodeId) -> CodegenResult<Template> {
        Template::compile(source, self.ast, node, self.functions)
    }
}

/// Emits the program for `ast`, batching parameterized siblings into regexes of at most `regex_group_limit` bytes.
pub fn emit_program(
    ast: &Ast,
    functions: &FunctionRegistry,
    regex_group_limit: usize,
) -> CodegenResult<Program> {
    Emitter::new(ast, functions, RegexBatcher::new(regex_group_limit)).emit()
}
