use regex::escape;

use super::ast::{Parameter, Pattern, PatternPart, SUBSTITUTION_MARKER};

pub fn to_template(pattern: &Pattern) -> String {
    let mut out = String::with_capacity(pattern.source.len());
    for part in &pattern.parts {
        match part {
            PatternPart::Literal(text) => out.push_str(text),
            PatternPart::Param(_) => out.push_str(SUBSTITUTION_MARKER),
        }
    }
    out
}

pub fn to_regex(pattern: &Pattern) -> String {
    let mut regex = String::from("^");
    regex.push_str(&alternation_body(pattern));
    regex.push('$');
    regex
}

pub fn alternation_body(pattern: &Pattern) -> String {
    let mut out = String::new();
    for part in &pattern.parts {
        match part {
            PatternPart::Literal(text) => out.push_str(&escape(text)),
            PatternPart::Param(idx) => out.push_str(&parameter_to_regex(&pattern.params[*idx])),
        }
    }
    out
}

fn parameter_to_regex(param: &Parameter) -> String {
    let quant = if param.required { "" } else { "?" };
    format!("((?:{})){}", param.type_hint.regex_body(), quant)
}

#[cfg(test)]
mod tests {
    use crate::pattern::parse_pattern;

    #[test]
    fn literal_text_is_escaped() {
        let pattern = parse_pattern("v1.{id:int}").expect("pattern should parse");
        assert_eq!(pattern.match_regex(), r"^v1\.((?:[0-9]+))$");
        assert_eq!(pattern.template(), "v1.%s");
    }

    #[test]
    fn optional_parameter_group_is_quantified() {
        let pattern = parse_pattern("page[num:int]").expect("pattern should parse");
        assert_eq!(pattern.alternation_body(), "page((?:[0-9]+))?");
    }

    #[test]
    fn custom_regex_groups_shift_following_offsets() {
        let pattern = parse_pattern("{a:(x|y)z}-{b}").expect("pattern should parse");
        assert_eq!(pattern.group_count(), 3);
        assert_eq!(pattern.group_offsets(), vec![("a", 1), ("b", 3)]);
    }
}
