mod compiler;
mod errors;
mod options;
mod service;

pub use compiler::{CompiledRouter, compile};
pub use errors::{RouterError, RouterResult};
pub use options::{
    DEFAULT_PATH_ATTRIBUTES, DEFAULT_QUERY_ATTRIBUTE, RouterOptions, RouterOptionsBuilder,
    RouterOptionsError,
};
pub use service::Router;
