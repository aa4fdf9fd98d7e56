use crate::path::{Segments, split_query, split_segments};
use hashbrown::HashMap as FastHashMap;
use std::borrow::Cow;
use std::collections::HashMap;

/// The request attribute map and everything derived from it for one match.
#[derive(Debug)]
pub struct RequestContext<'a> {
    attributes: &'a HashMap<String, String>,
    path: &'a str,
    query: &'a str,
    segments: Segments<'a>,
    query_params: FastHashMap<String, String>,
}

impl<'a> RequestContext<'a> {
    /// Reads the path from the first non-empty attribute in `path_attributes`.
    ///
    /// The query string comes from `query_attribute`, or from whatever follows
    /// `?` in the path attribute when that attribute is absent.
    pub fn new(
        attributes: &'a HashMap<String, String>,
        path_attributes: &[String],
        query_attribute: &str,
    ) -> Self {
        let raw = path_attributes
            .iter()
            .find_map(|name| {
                attributes
                    .get(name)
                    .map(String::as_str)
                    .filter(|value| !value.is_empty())
            })
            .unwrap_or("/");
        let (path, inline_query) = split_query(raw);
        let query = attributes
            .get(query_attribute)
            .map(String::as_str)
            .or(inline_query)
            .unwrap_or("");

        // repeated keys: the last occurrence wins
        let query_params = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .collect();

        Self {
            attributes,
            path,
            query,
            segments: split_segments(path),
            query_params,
        }
    }

    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn query(&self) -> &'a str {
        self.query
    }

    pub fn segments(&self) -> &[&'a str] {
        &self.segments
    }

    #[inline]
    pub fn segment(&self, index: usize) -> Option<&'a str> {
        self.segments.get(index).copied()
    }

    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_params.get(name).map(String::as_str)
    }

    /// Variables computed from the request rather than read from it.
    pub fn derived(&self, name: &str) -> Option<Cow<'a, str>> {
        match name {
            "path" => Some(Cow::Borrowed(self.path)),
            "query" => Some(Cow::Borrowed(self.query)),
            "query_str" if self.query.is_empty() => Some(Cow::Borrowed("")),
            "query_str" => Some(Cow::Owned(format!("?{}", self.query))),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn defaults() -> Vec<String> {
        vec!["PATH_INFO".to_string(), "REQUEST_URI".to_string()]
    }

    #[test]
    fn falls_back_through_path_attributes() {
        let map = attrs(&[("PATH_INFO", ""), ("REQUEST_URI", "/a/b?x=1&x=2")]);
        let request = RequestContext::new(&map, &defaults(), "QUERY_STRING");
        assert_eq!(request.path(), "/a/b");
        assert_eq!(request.segments(), ["a", "b"]);
        assert_eq!(request.query(), "x=1&x=2");
        assert_eq!(request.query_param("x"), Some("2"));
        assert_eq!(request.derived("query_str").as_deref(), Some("?x=1&x=2"));
    }

    #[test]
    fn query_attribute_takes_precedence() {
        let map = attrs(&[("PATH_INFO", "/a?ignored=1"), ("QUERY_STRING", "q=rust+lang")]);
        let request = RequestContext::new(&map, &defaults(), "QUERY_STRING");
        assert_eq!(request.query_param("q"), Some("rust lang"));
        assert_eq!(request.query_param("ignored"), None);
    }

    #[test]
    fn missing_path_is_root() {
        let map = HashMap::new();
        let request = RequestContext::new(&map, &defaults(), "QUERY_STRING");
        assert_eq!(request.path(), "/");
        assert!(request.segments().is_empty());
        assert_eq!(request.derived("query_str").as_deref(), Some(""));
    }
}
