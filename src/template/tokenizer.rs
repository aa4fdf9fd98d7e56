use memchr::memchr;

/// One piece of a templated string such as `/blog/{slug:lowercase}{query_str}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateToken {
    Text(String),
    /// `{name}` or `{name:fn1:fn2}`; filters are listed in declaration order.
    Variable { name: String, filters: Vec<String> },
}

/// Splits a templated string into literal text and variable references.
///
/// Braces that do not enclose a well-formed `{ident(:ident)*}` reference are
/// kept as text. The reserved tokens `{true}`, `{false}` and `{null}` resolve
/// here to `true`, `false` and the empty string.
pub fn parse_template(source: &str) -> Vec<TemplateToken> {
    let bytes = source.as_bytes();
    let mut tokens = Vec::new();
    let mut text = String::new();
    let mut cursor = 0usize;

    while let Some(offset) = memchr(b'{', &bytes[cursor..]) {
        let open = cursor + offset;
        let Some(close_offset) = memchr(b'}', &bytes[open + 1..]) else {
            break;
        };
        let close = open + 1 + close_offset;
        let inner = &source[open + 1..close];

        text.push_str(&source[cursor..open]);
        match parse_reference(inner) {
            Some(Reference::Reserved(value)) => text.push_str(value),
            Some(Reference::Variable { name, filters }) => {
                if !text.is_empty() {
                    tokens.push(TemplateToken::Text(std::mem::take(&mut text)));
                }
                tokens.push(TemplateToken::Variable { name, filters });
            }
            None => {
                // not a reference; keep the brace and rescan after it
                text.push('{');
                cursor = open + 1;
                continue;
            }
        }
        cursor = close + 1;
    }

    text.push_str(&source[cursor..]);
    if !text.is_empty() {
        tokens.push(TemplateToken::Text(text));
    }
    tokens
}

enum Reference {
    Reserved(&'static str),
    Variable { name: String, filters: Vec<String> },
}

fn parse_reference(inner: &str) -> Option<Reference> {
    match inner {
        "true" => return Some(Reference::Reserved("true")),
        "false" => return Some(Reference::Reserved("false")),
        "null" => return Some(Reference::Reserved("")),
        _ => {}
    }

    let mut pieces = inner.split(':');
    let name = pieces.next().filter(|name| is_word(name))?;
    let mut filters = Vec::new();
    for filter in pieces {
        if !is_word(filter) {
            return None;
        }
        filters.push(filter.to_string());
    }

    Some(Reference::Variable {
        name: name.to_string(),
        filters,
    })
}

fn is_word(token: &str) -> bool {
    !token.is_empty()
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str, filters: &[&str]) -> TemplateToken {
        TemplateToken::Variable {
            name: name.to_string(),
            filters: filters.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn splits_text_and_variables_in_order() {
        let tokens = parse_template("/user/{id}/posts{query_str}");
        assert_eq!(
            tokens,
            vec![
                TemplateToken::Text("/user/".to_string()),
                var("id", &[]),
                TemplateToken::Text("/posts".to_string()),
                var("query_str", &[]),
            ]
        );
    }

    #[test]
    fn collects_filter_chain() {
        let tokens = parse_template("{name:trim:lowercase}");
        assert_eq!(tokens, vec![var("name", &["trim", "lowercase"])]);
    }

    #[test]
    fn reserved_tokens_become_text() {
        assert_eq!(
            parse_template("a{true}b{null}c{false}"),
            vec![TemplateToken::Text("atruebcfalse".to_string())]
        );
    }

    #[test]
    fn malformed_braces_stay_literal() {
        assert_eq!(
            parse_template("{not valid} {a-b} {"),
            vec![TemplateToken::Text("{not valid} {a-b} {".to_string())]
        );
        assert_eq!(
            parse_template("{{id}"),
            vec![TemplateToken::Text("{".to_string()), var("id", &[])]
        );
    }

    #[test]
    fn empty_source_yields_no_tokens() {
        assert!(parse_template("").is_empty());
    }
}
