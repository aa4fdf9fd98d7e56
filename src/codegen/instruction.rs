use crate::codegen::template::Template;
use crate::functions::FunctionRef;
use hashbrown::HashMap as FastHashMap;
use regex::Regex;
use std::fmt;

pub type Block = Vec<Instruction>;

/// Executable form of a compiled routing tree.
#[derive(Debug, Clone)]
pub struct Program {
    pub(crate) entry: Block,
    pub(crate) regex_groups: usize,
    pub(crate) branches: u32,
}

impl Program {
    pub fn entry(&self) -> &[Instruction] {
        &self.entry
    }

    /// Number of batched regexes across all parameterized dispatches.
    pub fn regex_groups(&self) -> usize {
        self.regex_groups
    }

    /// Number of branch marks handed out while batching.
    pub fn branches(&self) -> u32 {
        self.branches
    }
}

#[derive(Debug, Clone)]
pub enum Instruction {
    /// Moves the cursor past segment `index` when that segment exists.
    Advance { index: usize },
    /// Moves the cursor back to segment `index` if the matching `Advance` took effect.
    Retreat { index: usize },
    /// Pushes a frame of rendered bindings for the duration of `body`.
    Scope {
        bindings: Vec<(String, Template)>,
        body: Block,
    },
    LiteralDispatch {
        index: usize,
        arms: Vec<LiteralArm>,
        lookup: FastHashMap<String, usize>,
    },
    PatternDispatch {
        index: usize,
        groups: Vec<BatchGroup>,
        arms: Vec<Block>,
    },
    Test {
        regex: Regex,
        subject: Template,
        body: Block,
    },
    Switch {
        value: SwitchValue,
        cases: Vec<SwitchCase>,
        default: Option<Block>,
    },
    Set { name: String, value: Template },
    Call(CallSite),
    Return { fields: Vec<(String, Template)> },
}

#[derive(Debug, Clone)]
pub struct LiteralArm {
    pub literal: String,
    pub body: Block,
}

/// One combined alternation and the branches it can select.
#[derive(Debug, Clone)]
pub struct BatchGroup {
    pub regex: Regex,
    pub branches: Vec<BranchSlot>,
}

#[derive(Debug, Clone)]
pub struct BranchSlot {
    pub mark: BranchMark,
    /// Index into the dispatch's `arms`.
    pub arm: usize,
    /// Capture group that participates only when this branch matched.
    pub mark_group: usize,
    /// Parameter name and absolute capture group index.
    pub captures: Vec<(String, usize)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchMark(pub u32);

impl fmt::Display for BranchMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{:04}", self.0)
    }
}

#[derive(Debug, Clone)]
pub enum SwitchValue {
    Template(Template),
    Call(CallSite),
}

#[derive(Debug, Clone)]
pub struct SwitchCase {
    pub value: Template,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub struct CallSite {
    pub function: FunctionRef,
    pub args: Vec<Template>,
}
