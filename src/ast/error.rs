use crate::pattern::PatternError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AstError {
    #[error("found a <ref> with no matching <block>: {name}")]
    UndeclaredBlock { name: String },
    #[error("duplicate literal path '{literal}' at the same level")]
    DuplicateLiteral { literal: String },
    #[error("no parameter `{name}` in route '{pattern}'")]
    UnknownParameter { name: String, pattern: String },
    #[error("route id '{id}' is declared more than once")]
    DuplicateRouteId { id: String },
    #[error("<{kind}> requires a '{attribute}' attribute")]
    MissingAttribute {
        kind: &'static str,
        attribute: &'static str,
    },
    #[error("<{kind}> is not allowed inside <{parent}>")]
    UnexpectedNode {
        kind: &'static str,
        parent: &'static str,
    },
    #[error("invalid test pattern '{pattern}': {error}")]
    InvalidTestPattern { pattern: String, error: String },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

pub type AstResult<T> = Result<T, AstError>;
