use crate::ast::AstError;
use crate::codegen::CodegenError;
use crate::pattern::PatternError;
use crate::reverse::ReverseError;
use crate::router::RouterOptionsError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RouterError {
    #[error(transparent)]
    Ast(#[from] AstError),
    #[error(transparent)]
    Codegen(#[from] CodegenError),
    #[error(transparent)]
    Reverse(#[from] ReverseError),
    #[error(transparent)]
    Options(#[from] RouterOptionsError),
    #[error("failed to read route tree: {0}")]
    Spec(#[from] serde_json::Error),
    #[error("router has no compiled routes; call load() first")]
    NotLoaded,
}

impl From<PatternError> for RouterError {
    fn from(err: PatternError) -> Self {
        RouterError::Ast(AstError::Pattern(err))
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
