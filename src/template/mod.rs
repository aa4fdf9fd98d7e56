mod tokenizer;

pub use tokenizer::{TemplateToken, parse_template};
