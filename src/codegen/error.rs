use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CodegenError {
    #[error("unknown function `{name}`")]
    UnknownFunction { name: String },
    #[error("generated regex '{regex}' failed to compile: {error}")]
    Regex { regex: String, error: String },
}

pub type CodegenResult<T> = Result<T, CodegenError>;
