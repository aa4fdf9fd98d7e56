use crate::codegen::{
    BatchGroup, Block, CallSite, Instruction, Program, SwitchValue, Template, TemplatePart,
};
use crate::functions::apply_chain;
use crate::runtime::request::RequestContext;
use crate::runtime::result::{MatchResult, MatchStats};
use crate::runtime::scope::{Frame, MatchScope};
use std::borrow::Cow;
use std::ops::ControlFlow;

/// Interpreter state for one evaluation of a [`Program`].
///
/// The cursor counts consumed segments; a dispatch at `index` runs only when
/// the cursor sits just past that segment.
pub(crate) struct Machine<'r, 'a> {
    request: &'r RequestContext<'a>,
    scope: MatchScope,
    cursor: usize,
    stats: MatchStats,
}

impl<'r, 'a> Machine<'r, 'a> {
    pub(crate) fn new(request: &'r RequestContext<'a>) -> Self {
        Self {
            request,
            scope: MatchScope::new(),
            cursor: 0,
            stats: MatchStats::default(),
        }
    }

    pub(crate) fn run(mut self, program: &Program) -> (MatchResult, MatchStats) {
        let result = match self.exec(program.entry()) {
            ControlFlow::Break(result) => result,
            ControlFlow::Continue(()) => MatchResult::not_found(),
        };
        (result, self.stats)
    }

    fn exec(&mut self, block: &[Instruction]) -> ControlFlow<MatchResult> {
        for instruction in block {
            self.step(instruction)?;
        }
        ControlFlow::Continue(())
    }

    fn step(&mut self, instruction: &Instruction) -> ControlFlow<MatchResult> {
        match instruction {
            Instruction::Advance { index } => {
                if self.cursor == *index && self.request.segment(*index).is_some() {
                    self.cursor = index + 1;
                    self.stats.advances += 1;
                }
            }
            Instruction::Retreat { index } => {
                if self.cursor == index + 1 {
                    self.cursor = *index;
                    self.stats.retreats += 1;
                }
            }
            Instruction::Scope { bindings, body } => {
                let frame: Frame = bindings
                    .iter()
                    .map(|(name, value)| (name.as_str().into(), self.render(value)))
                    .collect();
                return self.scoped(frame, body);
            }
            Instruction::LiteralDispatch {
                index,
                arms,
                lookup,
            } => {
                if let Some(segment) = self.current(*index)
                    && let Some(&arm) = lookup.get(segment)
                {
                    return self.exec(&arms[arm].body);
                }
            }
            Instruction::PatternDispatch {
                index,
                groups,
                arms,
            } => {
                if let Some(segment) = self.current(*index) {
                    return self.dispatch_pattern(segment, groups, arms);
                }
            }
            Instruction::Test {
                regex,
                subject,
                body,
            } => {
                let subject = self.render(subject);
                if let Some(caps) = regex.captures(&subject) {
                    let mut frame: Frame = caps
                        .iter()
                        .enumerate()
                        .map(|(idx, group)| {
                            let value = group.map_or("", |m| m.as_str());
                            (idx.to_string().into_boxed_str(), value.to_string())
                        })
                        .collect();
                    for name in regex.capture_names().flatten() {
                        let value = caps.name(name).map_or("", |m| m.as_str());
                        frame.push((name.into(), value.to_string()));
                    }
                    return self.scoped(frame, body);
                }
            }
            Instruction::Switch {
                value,
                cases,
                default,
            } => {
                let value = match value {
                    SwitchValue::Template(template) => self.render(template),
                    SwitchValue::Call(call) => self.call(call),
                };
                for case in cases {
                    if self.render(&case.value) == value {
                        return self.exec(&case.body);
                    }
                }
                if let Some(body) = default {
                    return self.exec(body);
                }
            }
            Instruction::Set { name, value } => {
                let value = self.render(value);
                self.scope.set(name.clone(), value);
            }
            Instruction::Call(call) => {
                self.call(call);
            }
            Instruction::Return { fields } => {
                let result = MatchResult::from_fields(
                    fields
                        .iter()
                        .map(|(name, value)| (name.clone(), self.render(value))),
                );
                return ControlFlow::Break(result);
            }
        }
        ControlFlow::Continue(())
    }

    /// Runs the branch selected by the first group matching `segment`; later groups are not tried.
    fn dispatch_pattern(
        &mut self,
        segment: &str,
        groups: &[BatchGroup],
        arms: &[Block],
    ) -> ControlFlow<MatchResult> {
        for group in groups {
            let Some(caps) = group.regex.captures(segment) else {
                continue;
            };
            let Some(branch) = group
                .branches
                .iter()
                .find(|branch| caps.get(branch.mark_group).is_some())
            else {
                continue;
            };

            let frame: Frame = branch
                .captures
                .iter()
                .map(|(name, idx)| {
                    let value = caps.get(*idx).map_or("", |m| m.as_str());
                    (name.as_str().into(), value.to_string())
                })
                .collect();
            return self.scoped(frame, &arms[branch.arm]);
        }
        ControlFlow::Continue(())
    }

    fn scoped(&mut self, frame: Frame, body: &[Instruction]) -> ControlFlow<MatchResult> {
        self.scope.push(frame);
        let flow = self.exec(body);
        self.scope.pop();
        flow
    }

    fn current(&self, index: usize) -> Option<&'a str> {
        if self.cursor == index + 1 {
            self.request.segment(index)
        } else {
            None
        }
    }

    fn call(&self, call: &CallSite) -> String {
        let args: Vec<String> = call.args.iter().map(|arg| self.render(arg)).collect();
        call.function.apply(&args)
    }

    fn render(&self, template: &Template) -> String {
        let mut out = String::new();
        for part in template.parts() {
            match part {
                TemplatePart::Text(text) => out.push_str(text),
                TemplatePart::Variable {
                    name,
                    filters,
                    scoped,
                } => {
                    let value = self.resolve(name, *scoped);
                    if filters.is_empty() {
                        out.push_str(&value);
                    } else {
                        out.push_str(&apply_chain(filters, value.into_owned()));
                    }
                }
            }
        }
        out
    }

    /// Frames (innermost first), then `set` variables, query parameters,
    /// request attributes and derived variables; empty when nothing matches.
    fn resolve(&self, name: &str, scoped: bool) -> Cow<'_, str> {
        if scoped && let Some(value) = self.scope.lookup(name) {
            return Cow::Borrowed(value);
        }
        if let Some(value) = self.scope.global(name) {
            return Cow::Borrowed(value);
        }
        if let Some(value) = self.request.query_param(name) {
            return Cow::Borrowed(value);
        }
        if let Some(value) = self.request.attribute(name) {
            return Cow::Borrowed(value);
        }
        self.request.derived(name).unwrap_or(Cow::Borrowed(""))
    }
}
