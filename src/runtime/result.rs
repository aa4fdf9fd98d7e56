use serde::Serialize;
use std::collections::BTreeMap;

pub const NOT_FOUND_CODE: &str = "404";

/// Fields assembled by the `return` that ended a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MatchResult {
    fields: BTreeMap<String, String>,
}

impl MatchResult {
    pub fn not_found() -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("code".to_string(), NOT_FOUND_CODE.to_string());
        Self { fields }
    }

    pub(crate) fn from_fields<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            fields: fields.into_iter().collect(),
        }
    }

    pub fn code(&self) -> &str {
        self.get("code").unwrap_or(NOT_FOUND_CODE)
    }

    pub fn is_not_found(&self) -> bool {
        self.code() == NOT_FOUND_CODE
    }

    pub fn location(&self) -> Option<&str> {
        self.get("location")
    }

    pub fn render(&self) -> Option<&str> {
        self.get("render")
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn fields(&self) -> &BTreeMap<String, String> {
        &self.fields
    }

    pub fn into_fields(self) -> BTreeMap<String, String> {
        self.fields
    }
}

/// Segment cursor movements performed during one match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MatchStats {
    pub advances: usize,
    pub retreats: usize,
}
