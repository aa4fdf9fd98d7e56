use crate::codegen::instruction::{BatchGroup, BranchMark, BranchSlot};
use crate::codegen::{CodegenError, CodegenResult};
use crate::pattern::Pattern;
use regex::Regex;

pub const DEFAULT_REGEX_GROUP_LIMIT: usize = 16 * 1024;

const GROUP_PREFIX: &str = "^(?:";
const GROUP_SUFFIX: &str = ")$";

/// Hands out branch marks, unique within one compilation.
#[derive(Debug, Default)]
pub struct MarkCounter {
    issued: u32,
}

impl MarkCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_mark(&mut self) -> BranchMark {
        self.issued += 1;
        BranchMark(self.issued)
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}

/// Merges sibling segment patterns into anchored alternations no longer than `limit` bytes.
///
/// Every alternative is wrapped in its own capture group; the group that
/// participates in a match identifies the branch. A pattern longer than the
/// limit still gets a group of its own.
#[derive(Debug, Clone, Copy)]
pub struct RegexBatcher {
    limit: usize,
}

impl RegexBatcher {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    #[tracing::instrument(level = "trace", skip(self, patterns, marks), fields(patterns = patterns.len(), limit = self.limit))]
    pub fn batch(
        &self,
        patterns: &[&Pattern],
        marks: &mut MarkCounter,
    ) -> CodegenResult<Vec<BatchGroup>> {
        let mut groups = Vec::new();
        let mut pending = PendingGroup::new();

        for (arm, pattern) in patterns.iter().enumerate() {
            let alternative = format!("({})", pattern.alternation_body());
            if !pending.is_empty() && pending.size + 1 + alternative.len() > self.limit {
                groups.push(pending.finish()?);
                pending = PendingGroup::new();
            }
            pending.push(alternative, pattern, arm, marks.next_mark());
        }

        if !pending.is_empty() {
            groups.push(pending.finish()?);
        }

        tracing::trace!(groups = groups.len(), "batched parameterized siblings");
        Ok(groups)
    }
}

struct PendingGroup {
    alternatives: Vec<String>,
    size: usize,
    next_group: usize,
    branches: Vec<BranchSlot>,
}

impl PendingGroup {
    fn new() -> Self {
        Self {
            alternatives: Vec::new(),
            size: GROUP_PREFIX.len() + GROUP_SUFFIX.len(),
            next_group: 1,
            branches: Vec::new(),
        }
    }

    fn is_empty(&self) -> bool {
        self.alternatives.is_empty()
    }

    fn push(&mut self, alternative: String, pattern: &Pattern, arm: usize, mark: BranchMark) {
        if !self.alternatives.is_empty() {
            self.size += 1;
        }
        self.size += alternative.len();

        let mark_group = self.next_group;
        let captures = pattern
            .group_offsets()
            .into_iter()
            .map(|(name, offset)| (name.to_string(), mark_group + offset))
            .collect();
        self.next_group += 1 + pattern.group_count();

        self.alternatives.push(alternative);
        self.branches.push(BranchSlot {
            mark,
            arm,
            mark_group,
            captures,
        });
    }

    fn finish(self) -> CodegenResult<BatchGroup> {
        let mut source = String::with_capacity(self.size);
        source.push_str(GROUP_PREFIX);
        source.push_str(&self.alternatives.join("|"));
        source.push_str(GROUP_SUFFIX);

        let regex = Regex::new(&source).map_err(|err| CodegenError::Regex {
            regex: source.clone(),
            error: err.to_string(),
        })?;

        Ok(BatchGroup {
            regex,
            branches: self.branches,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::parse_pattern;

    fn patterns(sources: &[&str]) -> Vec<Pattern> {
        sources
            .iter()
            .map(|source| parse_pattern(source).expect("pattern should parse"))
            .collect()
    }

    /// Arm and bound values of the first branch matching `segment`.
    fn select(groups: &[BatchGroup], segment: &str) -> Option<(usize, Vec<(String, String)>)> {
        for group in groups {
            let Some(caps) = group.regex.captures(segment) else {
                continue;
            };
            let branch = group
                .branches
                .iter()
                .find(|branch| caps.get(branch.mark_group).is_some())?;
            let bound = branch
                .captures
                .iter()
                .map(|(name, idx)| {
                    let value = caps.get(*idx).map(|m| m.as_str()).unwrap_or("");
                    (name.clone(), value.to_string())
                })
                .collect();
            return Some((branch.arm, bound));
        }
        None
    }

    #[test]
    fn small_sets_fit_in_one_group() {
        let owned = patterns(&["{id:int}", "post-{slug}"]);
        let refs: Vec<&Pattern> = owned.iter().collect();
        let groups = RegexBatcher::new(DEFAULT_REGEX_GROUP_LIMIT)
            .batch(&refs, &mut MarkCounter::new())
            .expect("batch");

        assert_eq!(groups.len(), 1);
        assert_eq!(
            groups[0].regex.as_str(),
            r"^(?:(((?:[0-9]+)))|(post\-((?:.+))))$"
        );
        let mark_groups: Vec<usize> = groups[0].branches.iter().map(|b| b.mark_group).collect();
        assert_eq!(mark_groups, vec![1, 3]);
    }

    #[test]
    fn first_declared_branch_wins() {
        let owned = patterns(&["{id:int}", "{slug}"]);
        let refs: Vec<&Pattern> = owned.iter().collect();
        let groups = RegexBatcher::new(DEFAULT_REGEX_GROUP_LIMIT)
            .batch(&refs, &mut MarkCounter::new())
            .expect("batch");

        assert_eq!(
            select(&groups, "42"),
            Some((0, vec![("id".to_string(), "42".to_string())]))
        );
        assert_eq!(
            select(&groups, "hello"),
            Some((1, vec![("slug".to_string(), "hello".to_string())]))
        );
    }

    #[test]
    fn custom_groups_shift_capture_offsets() {
        let owned = patterns(&["{a:(x|y)}", "{b}-{c:int}"]);
        let refs: Vec<&Pattern> = owned.iter().collect();
        let groups = RegexBatcher::new(DEFAULT_REGEX_GROUP_LIMIT)
            .batch(&refs, &mut MarkCounter::new())
            .expect("batch");

        assert_eq!(groups[0].branches[0].captures, vec![("a".to_string(), 2)]);
        assert_eq!(
            groups[0].branches[1].captures,
            vec![("b".to_string(), 5), ("c".to_string(), 6)]
        );
        assert_eq!(
            select(&groups, "zz-9"),
            Some((
                1,
                vec![
                    ("b".to_string(), "zz".to_string()),
                    ("c".to_string(), "9".to_string())
                ]
            ))
        );
    }

    #[test]
    fn limit_splits_groups_without_changing_results() {
        let owned = patterns(&[
            "alpha-{a:int}",
            "beta-{b:int}",
            "gamma-{c:int}",
            "{d:int}",
            "{e}",
        ]);
        let refs: Vec<&Pattern> = owned.iter().collect();

        let mut marks = MarkCounter::new();
        let split = RegexBatcher::new(64).batch(&refs, &mut marks).expect("batch");
        let whole = RegexBatcher::new(DEFAULT_REGEX_GROUP_LIMIT)
            .batch(&refs, &mut marks)
            .expect("batch");

        assert!(split.len() > 1);
        assert_eq!(whole.len(), 1);
        for group in &split {
            assert!(group.regex.as_str().len() <= 64 || group.branches.len() == 1);
        }
        for segment in ["alpha-1", "beta-2", "gamma-3", "4", "delta", "beta-x"] {
            assert_eq!(select(&split, segment), select(&whole, segment), "segment {segment}");
        }
        assert_eq!(marks.issued(), 10);
    }
}
