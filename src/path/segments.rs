use memchr::memchr;
use smallvec::SmallVec;

pub type Segments<'a> = SmallVec<[&'a str; 8]>;

/// Splits a request path on `/`, dropping empty components.
#[inline]
#[tracing::instrument(level = "trace", skip(path), fields(path_len = path.len() as u64))]
pub fn split_segments(path: &str) -> Segments<'_> {
    let bytes = path.as_bytes();
    let mut segments = Segments::new();
    let mut start = 0usize;

    while let Some(offset) = memchr(b'/', &bytes[start..]) {
        let end = start + offset;
        if end > start {
            segments.push(&path[start..end]);
        }
        start = end + 1;
    }
    if start < bytes.len() {
        segments.push(&path[start..]);
    }
    segments
}

/// Separates `path?query`; the query is `None` when there is no `?`.
#[inline]
pub fn split_query(raw: &str) -> (&str, Option<&str>) {
    match memchr(b'?', raw.as_bytes()) {
        Some(idx) => (&raw[..idx], Some(&raw[idx + 1..])),
        None => (raw, None),
    }
}
