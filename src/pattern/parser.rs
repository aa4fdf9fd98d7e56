use regex::Regex;

use crate::pattern::ast::{Parameter, Pattern, PatternKind, PatternPart, TypeHint};
use crate::pattern::{PatternError, PatternResult};

/// Parses one segment pattern such as `post-{id:int}` or `page[num:int:lowercase]`.
///
/// Surrounding `/` characters are ignored; a `/` anywhere else is rejected.
#[tracing::instrument(level = "trace", fields(pattern = %source))]
pub fn parse_pattern(source: &str) -> PatternResult<Pattern> {
    let trimmed = source.trim_matches('/');
    let mut parser = PatternParser::new(trimmed);
    let parts = parser.parse_sequence()?;
    let kind = if parser.params.is_empty() {
        PatternKind::Literal
    } else {
        PatternKind::Parameterized
    };

    Ok(Pattern {
        source: trimmed.to_string(),
        kind,
        parts,
        params: parser.params,
    })
}

/// Splits a route such as `/post/{id:int}` into its segment patterns.
///
/// A `/` inside a placeholder or after a backslash does not split; empty segments are dropped.
pub fn split_route(source: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut escaped = false;
    let mut start = 0;

    for (index, ch) in source.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '{' | '[' => depth += 1,
            '}' | ']' => depth = depth.saturating_sub(1),
            '/' if depth == 0 => {
                segments.push(&source[start..index]);
                start = index + 1;
            }
            _ => {}
        }
    }
    segments.push(&source[start..]);
    segments.retain(|segment| !segment.is_empty());
    segments
}

/// Resolves a standalone type token: `int`, `float`, `string` or a regex fragment.
pub(crate) fn resolve_type_token(pattern: &str, token: &str) -> PatternResult<(TypeHint, usize)> {
    if let Some(hint) = TypeHint::from_keyword(token) {
        return Ok((hint, 0));
    }
    custom_type(pattern, token)
}

/// Splits a `fn1:fn2` (or comma separated) list of function names.
pub(crate) fn parse_function_list(pattern: &str, raw: &str) -> PatternResult<Vec<String>> {
    let mut out = Vec::new();
    for token in raw.split([':', ',']).map(str::trim) {
        if token.is_empty() {
            continue;
        }
        if !is_identifier(token) {
            return Err(PatternError::UnresolvableToken {
                pattern: pattern.to_string(),
                token: token.to_string(),
                reason: "expected a function name".to_string(),
            });
        }
        out.push(token.to_string());
    }
    Ok(out)
}

pub(crate) fn is_identifier(token: &str) -> bool {
    let bytes = token.as_bytes();
    match bytes.first() {
        Some(first) if first.is_ascii_alphabetic() || *first == b'_' => bytes[1..]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_'),
        _ => false,
    }
}

struct PatternParser<'a> {
    pattern: &'a str,
    chars: Vec<(usize, char)>,
    index: usize,
    params: Vec<Parameter>,
}

impl<'a> PatternParser<'a> {
    fn new(pattern: &'a str) -> Self {
        Self {
            pattern,
            chars: pattern.char_indices().collect(),
            index: 0,
            params: Vec::new(),
        }
    }

    fn parse_sequence(&mut self) -> PatternResult<Vec<PatternPart>> {
        let mut parts = Vec::new();
        let mut literal = String::new();

        while let Some(ch) = self.peek() {
            match ch {
                '{' | '[' => {
                    if !literal.is_empty() {
                        parts.push(PatternPart::Literal(std::mem::take(&mut literal)));
                    }
                    let idx = self.parse_placeholder()?;
                    parts.push(PatternPart::Param(idx));
                }
                '}' | ']' => {
                    return Err(PatternError::UnexpectedCloser {
                        pattern: self.pattern.to_string(),
                        index: self.current_byte_index(),
                        found: ch,
                    });
                }
                '/' => {
                    return Err(PatternError::SegmentSeparator {
                        pattern: self.pattern.to_string(),
                        index: self.current_byte_index(),
                    });
                }
                _ => {
                    if self.is_escape_char(ch) {
                        literal.push(self.consume_escape_char()?);
                    } else {
                        literal.push(ch);
                        self.next();
                    }
                }
            }
        }

        if !literal.is_empty() {
            parts.push(PatternPart::Literal(literal));
        }

        Ok(parts)
    }

    fn parse_placeholder(&mut self) -> PatternResult<usize> {
        let start = self.current_byte_index();
        let required = self.next() == Some('{');
        let closer = if required { '}' } else { ']' };
        let body = self.read_placeholder_body(closer, start)?;

        let mut tokens = split_tokens(&body).into_iter();
        let name = tokens.next().unwrap_or_default();
        self.validate_name(&name)?;

        if self.params.iter().any(|param| param.name == name) {
            return Err(PatternError::DuplicateParameter {
                pattern: self.pattern.to_string(),
                name,
            });
        }

        let mut param = Parameter::new(name, required);
        for (position, token) in tokens.enumerate() {
            if token.is_empty() {
                return Err(self.unresolvable(&token, "empty token"));
            }
            if position == 0
                && let Some(hint) = TypeHint::from_keyword(&token)
            {
                param.type_hint = hint;
                continue;
            }
            if is_identifier(&token) {
                param.functions.push(token);
                continue;
            }
            if position == 0 {
                let (hint, inner_groups) = custom_type(self.pattern, &token)?;
                param.type_hint = hint;
                param.inner_groups = inner_groups;
                continue;
            }
            return Err(self.unresolvable(&token, "expected a function name"));
        }

        self.params.push(param);
        Ok(self.params.len() - 1)
    }

    fn read_placeholder_body(&mut self, closer: char, start: usize) -> PatternResult<String> {
        let mut body = String::new();
        let mut depth = 0usize;

        while let Some(ch) = self.peek() {
            if self.is_escape_char(ch) {
                let escape_index = self.current_byte_index();
                self.next();
                match self.next() {
                    Some(escaped) => {
                        body.push('\\');
                        body.push(escaped);
                    }
                    None => {
                        return Err(PatternError::LoneEscapeCharacter {
                            pattern: self.pattern.to_string(),
                            index: escape_index,
                        });
                    }
                }
                continue;
            }

            self.next();
            match ch {
                '{' | '[' | '(' => {
                    depth += 1;
                    body.push(ch);
                }
                _ if ch == closer && depth == 0 => return Ok(body),
                '}' | ']' | ')' if depth > 0 => {
                    depth -= 1;
                    body.push(ch);
                }
                _ => body.push(ch),
            }
        }

        Err(PatternError::UnterminatedPlaceholder {
            pattern: self.pattern.to_string(),
            start,
        })
    }

    fn validate_name(&self, name: &str) -> PatternResult<()> {
        let bytes = name.as_bytes();
        let Some(&first) = bytes.first() else {
            return Err(PatternError::ParameterMissingName {
                pattern: self.pattern.to_string(),
            });
        };

        if !(first.is_ascii_alphabetic() || first == b'_') {
            return Err(PatternError::ParameterInvalidStart {
                pattern: self.pattern.to_string(),
                name: name.to_string(),
                found: name.chars().next().unwrap_or_default(),
            });
        }

        if let Some(invalid) = name
            .chars()
            .skip(1)
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_'))
        {
            return Err(PatternError::ParameterInvalidCharacter {
                pattern: self.pattern.to_string(),
                name: name.to_string(),
                invalid,
            });
        }

        Ok(())
    }

    fn unresolvable(&self, token: &str, reason: &str) -> PatternError {
        PatternError::UnresolvableToken {
            pattern: self.pattern.to_string(),
            token: token.to_string(),
            reason: reason.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.index).map(|(_, ch)| *ch)
    }

    fn next(&mut self) -> Option<char> {
        let ch = self.peek();
        if ch.is_some() {
            self.index += 1;
        }
        ch
    }

    fn current_byte_index(&self) -> usize {
        self.chars
            .get(self.index)
            .map(|(idx, _)| *idx)
            .unwrap_or(self.pattern.len())
    }

    fn is_escape_char(&self, ch: char) -> bool {
        ch == '\\'
    }

    fn consume_escape_char(&mut self) -> PatternResult<char> {
        let escape_index = self.current_byte_index();
        self.next();
        match self.next() {
            Some(ch) => Ok(ch),
            None => Err(PatternError::LoneEscapeCharacter {
                pattern: self.pattern.to_string(),
                index: escape_index,
            }),
        }
    }
}

/// Splits a placeholder body on `:` outside of any bracket, brace or parenthesis.
fn split_tokens(body: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut depth = 0usize;
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                current.push(ch);
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '{' | '[' | '(' => {
                depth += 1;
                current.push(ch);
            }
            '}' | ']' | ')' => {
                depth = depth.saturating_sub(1);
                current.push(ch);
            }
            ':' if depth == 0 => tokens.push(std::mem::take(&mut current)),
            _ => current.push(ch),
        }
    }
    tokens.push(current);
    tokens
}

fn custom_type(pattern: &str, token: &str) -> PatternResult<(TypeHint, usize)> {
    let compiled = Regex::new(&format!("^(?:{})$", token)).map_err(|err| {
        PatternError::UnresolvableToken {
            pattern: pattern.to_string(),
            token: token.to_string(),
            reason: err.to_string(),
        }
    })?;

    if compiled.capture_names().flatten().next().is_some() {
        return Err(PatternError::UnresolvableToken {
            pattern: pattern.to_string(),
            token: token.to_string(),
            reason: "named capture groups are not allowed in parameter regexes".to_string(),
        });
    }

    Ok((
        TypeHint::Custom(token.to_string()),
        compiled.captures_len().saturating_sub(1),
    ))
}
