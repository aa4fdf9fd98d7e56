mod analysis;
mod ast;
mod error;
mod parser;

pub use ast::{Parameter, Pattern, PatternKind, PatternPart, SUBSTITUTION_MARKER, TypeHint};
pub use error::{PatternError, PatternResult};
pub use parser::{parse_pattern, split_route};
pub(crate) use parser::{parse_function_list, resolve_type_token};
