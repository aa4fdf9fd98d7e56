use crate::codegen::instruction::{CallSite, Instruction, Program, SwitchValue};
use crate::codegen::template::Template;
use std::fmt;

const INDENT: &str = "  ";

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.source())
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_block(f, &self.entry, 0)
    }
}

fn write_block(f: &mut fmt::Formatter<'_>, block: &[Instruction], depth: usize) -> fmt::Result {
    for instruction in block {
        write_instruction(f, instruction, depth)?;
    }
    Ok(())
}

fn line(f: &mut fmt::Formatter<'_>, depth: usize, args: fmt::Arguments<'_>) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    f.write_fmt(args)?;
    f.write_str("\n")
}

fn write_instruction(f: &mut fmt::Formatter<'_>, instruction: &Instruction, depth: usize) -> fmt::Result {
    match instruction {
        Instruction::Advance { index } => line(f, depth, format_args!("advance {index}")),
        Instruction::Retreat { index } => line(f, depth, format_args!("retreat {index}")),
        Instruction::Scope { bindings, body } => {
            line(f, depth, format_args!("scope"))?;
            for (name, value) in bindings {
                line(f, depth + 2, format_args!("{name} = {value}"))?;
            }
            write_block(f, body, depth + 1)
        }
        Instruction::LiteralDispatch { index, arms, .. } => {
            line(f, depth, format_args!("literal segment[{index}]"))?;
            for arm in arms {
                line(f, depth + 1, format_args!("{:?} =>", arm.literal))?;
                write_block(f, &arm.body, depth + 2)?;
            }
            Ok(())
        }
        Instruction::PatternDispatch { index, groups, arms } => {
            line(f, depth, format_args!("pattern segment[{index}]"))?;
            for group in groups {
                line(f, depth + 1, format_args!("group /{}/", group.regex.as_str()))?;
                for branch in &group.branches {
                    let captures: Vec<String> = branch
                        .captures
                        .iter()
                        .map(|(name, idx)| format!("{name}@{idx}"))
                        .collect();
                    line(
                        f,
                        depth + 2,
                        format_args!(
                            "{} @{} -> arm {} [{}]",
                            branch.mark,
                            branch.mark_group,
                            branch.arm,
                            captures.join(", ")
                        ),
                    )?;
                }
            }
            for (i, arm) in arms.iter().enumerate() {
                line(f, depth + 1, format_args!("arm {i} =>"))?;
                write_block(f, arm, depth + 2)?;
            }
            Ok(())
        }
        Instruction::Test {
            regex,
            subject,
            body,
        } => {
            line(f, depth, format_args!("test {subject} ~ /{}/", regex.as_str()))?;
            write_block(f, body, depth + 1)
        }
        Instruction::Switch {
            value,
            cases,
            default,
        } => {
            match value {
                SwitchValue::Template(template) => line(f, depth, format_args!("switch {template}"))?,
                SwitchValue::Call(call) => line(f, depth, format_args!("switch call {call}"))?,
            }
            for case in cases {
                line(f, depth + 1, format_args!("case {}", case.value))?;
                write_block(f, &case.body, depth + 2)?;
            }
            if let Some(body) = default {
                line(f, depth + 1, format_args!("default"))?;
                write_block(f, body, depth + 2)?;
            }
            Ok(())
        }
        Instruction::Set { name, value } => line(f, depth, format_args!("set {name} = {value}")),
        Instruction::Call(call) => line(f, depth, format_args!("call {call}")),
        Instruction::Return { fields } => {
            let rendered: Vec<String> = fields
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect();
            line(f, depth, format_args!("return {}", rendered.join(" ")))
        }
    }
}
