mod builder;
mod conflict;
mod error;
mod node;
mod routes;
mod tree;

pub use builder::{AstBuilder, build_ast};
pub use error::{AstError, AstResult};
pub use node::{Node, NodeId, NodeKind};
pub use routes::{RouteEntry, RouteTable};
pub use tree::Ast;
