mod node;

pub use node::{SpecKind, SpecNode};
