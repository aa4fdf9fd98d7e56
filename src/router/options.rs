use crate::codegen::DEFAULT_REGEX_GROUP_LIMIT;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const REGEX_GROUP_LIMIT_MIN: usize = 64;
pub const DEFAULT_PATH_ATTRIBUTES: [&str; 2] = ["PATH_INFO", "REQUEST_URI"];
pub const DEFAULT_QUERY_ATTRIBUTE: &str = "QUERY_STRING";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouterOptions {
    /// Upper bound, in bytes, for one batched alternation regex.
    pub regex_group_limit: usize,
    /// Request attributes probed in order for the request path.
    pub path_attributes: Vec<String>,
    pub query_attribute: String,
    pub debug: bool,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            regex_group_limit: DEFAULT_REGEX_GROUP_LIMIT,
            path_attributes: DEFAULT_PATH_ATTRIBUTES
                .iter()
                .map(|name| name.to_string())
                .collect(),
            query_attribute: DEFAULT_QUERY_ATTRIBUTE.to_string(),
            debug: false,
        }
    }
}

impl RouterOptions {
    pub fn builder() -> RouterOptionsBuilder {
        RouterOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), RouterOptionsError> {
        if self.regex_group_limit < REGEX_GROUP_LIMIT_MIN {
            return Err(RouterOptionsError::RegexGroupLimitTooSmall {
                provided: self.regex_group_limit,
                min: REGEX_GROUP_LIMIT_MIN,
            });
        }
        if self
            .path_attributes
            .iter()
            .all(|name| name.trim().is_empty())
        {
            return Err(RouterOptionsError::EmptyPathAttributes);
        }
        if self.query_attribute.trim().is_empty() {
            return Err(RouterOptionsError::EmptyQueryAttribute);
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone)]
pub struct RouterOptionsBuilder {
    options: RouterOptions,
}

impl RouterOptionsBuilder {
    pub fn regex_group_limit(mut self, value: usize) -> Self {
        self.options.regex_group_limit = value;
        self
    }

    pub fn path_attributes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options.path_attributes = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn query_attribute<S: Into<String>>(mut self, name: S) -> Self {
        self.options.query_attribute = name.into();
        self
    }

    pub fn debug(mut self, value: bool) -> Self {
        self.options.debug = value;
        self
    }

    pub fn build(self) -> Result<RouterOptions, RouterOptionsError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouterOptionsError {
    #[error("regex_group_limit must be at least {min} (got {provided})")]
    RegexGroupLimitTooSmall { provided: usize, min: usize },
    #[error("path_attributes must name at least one attribute")]
    EmptyPathAttributes,
    #[error("query_attribute must not be empty")]
    EmptyQueryAttribute,
}
