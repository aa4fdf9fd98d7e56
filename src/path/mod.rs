mod segments;

pub use segments::{Segments, split_query, split_segments};
