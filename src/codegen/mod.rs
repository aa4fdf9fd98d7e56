mod batch;
mod emitter;
mod error;
mod instruction;
mod listing;
mod template;

pub use batch::{DEFAULT_REGEX_GROUP_LIMIT, MarkCounter, RegexBatcher};
pub use emitter::{Emitter, emit_program};
pub use error::{CodegenError, CodegenResult};
pub use instruction::{
    BatchGroup, Block, BranchMark, BranchSlot, CallSite, Instruction, LiteralArm, Program,
    SwitchCase, SwitchValue,
};
pub use template::{Template, TemplatePart};
pub(crate) use template::resolve_functions;
