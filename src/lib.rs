pub mod ast;
pub mod codegen;
pub mod functions;
mod path;
pub mod pattern;
pub mod reverse;
mod router;
pub mod runtime;
pub mod spec;
pub mod template;

pub use functions::{FunctionRegistry, RouteFunction};
pub use reverse::{ReverseError, ReverseRoute};
pub use router::{
    CompiledRouter, DEFAULT_PATH_ATTRIBUTES, DEFAULT_QUERY_ATTRIBUTE, Router, RouterError,
    RouterOptions, RouterOptionsBuilder, RouterOptionsError, RouterResult, compile,
};
pub use runtime::{MatchResult, MatchStats};
pub use spec::{SpecKind, SpecNode};
