mod error;
mod generator;

pub use error::{ReverseError, ReverseResult};
pub use generator::{ReverseRoute, ReverseTable, route_template};
