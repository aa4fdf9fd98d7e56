use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PatternError {
    #[error("placeholder in pattern '{pattern}' is missing a parameter name")]
    ParameterMissingName { pattern: String },
    #[error(
        "parameter name '{name}' in pattern '{pattern}' must start with an alphabetic character or underscore (found '{found}')"
    )]
    ParameterInvalidStart {
        pattern: String,
        name: String,
        found: char,
    },
    #[error("parameter name '{name}' in pattern '{pattern}' contains invalid character '{invalid}'")]
    ParameterInvalidCharacter {
        pattern: String,
        name: String,
        invalid: char,
    },
    #[error("parameter '{name}' appears more than once in pattern '{pattern}'")]
    DuplicateParameter { pattern: String, name: String },
    #[error("placeholder opened at byte {start} in pattern '{pattern}' is never closed")]
    UnterminatedPlaceholder { pattern: String, start: usize },
    #[error("unexpected '{found}' at byte {index} in pattern '{pattern}'")]
    UnexpectedCloser {
        pattern: String,
        index: usize,
        found: char,
    },
    #[error("lone escape character at byte {index} in pattern '{pattern}'")]
    LoneEscapeCharacter { pattern: String, index: usize },
    #[error("pattern '{pattern}' spans more than one segment ('/' at byte {index})")]
    SegmentSeparator { pattern: String, index: usize },
    #[error("unresolvable parameter token `{token}` in pattern '{pattern}': {reason}")]
    UnresolvableToken {
        pattern: String,
        token: String,
        reason: String,
    },
}

pub type PatternResult<T> = Result<T, PatternError>;
