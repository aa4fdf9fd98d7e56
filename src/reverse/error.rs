use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReverseError {
    #[error("missing argument `{name}`")]
    MissingArgument { name: String },
    #[error("no such path `{id}`")]
    NoSuchPath { id: String },
}

pub type ReverseResult<T> = Result<T, ReverseError>;
