use hashbrown::HashMap as FastHashMap;
use smallvec::SmallVec;

pub type Frame = SmallVec<[(Box<str>, String); 4]>;

/// Match-context stack plus the variables written by `set`, for one request.
#[derive(Debug, Default)]
pub struct MatchScope {
    frames: Vec<Frame>,
    globals: FastHashMap<String, String>,
}

impl MatchScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost non-empty binding of `name`.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.frames.iter().rev().find_map(|frame| {
            frame
                .iter()
                .find(|(key, value)| &**key == name && !value.is_empty())
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn set(&mut self, name: String, value: String) {
        self.globals.insert(name, value);
    }

    pub fn global(&self, name: &str) -> Option<&str> {
        self.globals.get(name).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use smallvec::smallvec;

    #[test]
    fn innermost_non_empty_binding_wins() {
        let mut scope = MatchScope::new();
        scope.push(smallvec![("id".into(), "outer".to_string())]);
        scope.push(smallvec![("id".into(), String::new())]);
        assert_eq!(scope.lookup("id"), Some("outer"));

        scope.push(smallvec![("id".into(), "inner".to_string())]);
        assert_eq!(scope.lookup("id"), Some("inner"));

        scope.pop();
        scope.pop();
        assert_eq!(scope.lookup("id"), Some("outer"));
        scope.pop();
        assert_eq!(scope.lookup("id"), None);
        assert_eq!(scope.depth(), 0);
    }

    #[test]
    fn globals_survive_frame_pops() {
        let mut scope = MatchScope::new();
        scope.push(Frame::new());
        scope.set("lang".to_string(), "en".to_string());
        scope.pop();
        assert_eq!(scope.global("lang"), Some("en"));
    }
}
