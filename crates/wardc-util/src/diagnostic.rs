//! Diagnostics (spec.md §3 "Issue").
//!
//! Narrowed from the teacher's four-level `Diagnostic`/`Handler` pair
//! (`faxc-util/src/diagnostic/mod.rs`) to exactly the two severities and
//! four-field dedup rule spec.md §3 specifies. An [`Issue`] is data, not an
//! exception: passes collect them into an [`IssueSet`] and keep going
//! (spec.md §7's non-fatal policy for name binding and typing).

use crate::span::SourceRange;
use std::collections::BTreeSet;

/// Issue severity. Only two levels exist in this core (spec.md §3).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// `(severity, message, range, optional anchor node)` (spec.md §3).
///
/// The anchor is an opaque `u64` rather than a node reference: `wardc-util`
/// sits below `wardc-ast`, so it cannot name a node type. Callers that want
/// an anchor pass the node's arena index cast to `u64`; equality/ordering
/// only ever need that it is `Eq`+`Hash`, never what it "means".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Issue {
    pub severity: Severity,
    pub message: String,
    pub range: SourceRange,
    pub anchor: Option<u64>,
}

impl Issue {
    pub fn error(message: impl Into<String>, range: SourceRange) -> Self {
        Self { severity: Severity::Error, message: message.into(), range, anchor: None }
    }

    pub fn warning(message: impl Into<String>, range: SourceRange) -> Self {
        Self { severity: Severity::Warning, message: message.into(), range, anchor: None }
    }

    pub fn with_anchor(mut self, anchor: u64) -> Self {
        self.anchor = Some(anchor);
        self
    }

    /// Render as `{severity}: {message}` plus a `file:line:col` suffix when
    /// `map` can resolve the range (spec.md §3/§9's issue-rendering gap,
    /// filled per SPEC_FULL.md §2).
    pub fn display(&self, map: &crate::span::SourceMap) -> String {
        format!("{}: {} ({})", self.severity, self.message, map.describe(self.range))
    }
}

/// Per-module collection of [`Issue`]s, deduplicated by all four fields
/// (spec.md §3: "collected per module into an unordered set deduplicated
/// by all four fields").
#[derive(Default, Debug, Clone)]
pub struct IssueSet {
    issues: BTreeSet<Issue>,
}

impl IssueSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, issue: Issue) {
        self.issues.insert(issue);
    }

    pub fn has_errors(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Error)
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Iterate in display order: severity desc, then buffer, then range
    /// start (spec.md §3). `BTreeSet`'s natural order sorts `Severity`
    /// ascending and `SourceRange` by `(buffer, start)`, so we reverse the
    /// severity comparison by iterating high-to-low on that key only.
    pub fn in_display_order(&self) -> Vec<&Issue> {
        let mut v: Vec<&Issue> = self.issues.iter().collect();
        v.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then_with(|| a.range.buffer.cmp(&b.range.buffer))
                .then_with(|| a.range.start.cmp(&b.range.start))
        });
        v
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.issues.iter()
    }

    pub fn extend(&mut self, other: IssueSet) {
        self.issues.extend(other.issues);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::SourceMap;

    fn range(map: &mut SourceMap) -> SourceRange {
        let buf = map.add_buffer("a.ward", "abcdef");
        SourceRange::new(buf, 0, 1)
    }

    #[test]
    fn dedup_by_all_four_fields() {
        let mut map = SourceMap::new();
        let r = range(&mut map);
        let mut set = IssueSet::new();
        set.push(Issue::error("undefined symbol", r));
        set.push(Issue::error("undefined symbol", r));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distinct_message_is_not_deduped() {
        let mut map = SourceMap::new();
        let r = range(&mut map);
        let mut set = IssueSet::new();
        set.push(Issue::error("undefined symbol", r));
        set.push(Issue::error("duplicate declaration", r));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_order_is_severity_desc_then_range() {
        let mut map = SourceMap::new();
        let buf = map.add_buffer("a.ward", "0123456789");
        let mut set = IssueSet::new();
        set.push(Issue::warning("w", SourceRange::new(buf, 5, 6)));
        set.push(Issue::error("e1", SourceRange::new(buf, 2, 3)));
        set.push(Issue::error("e2", SourceRange::new(buf, 0, 1)));
        let ordered = set.in_display_order();
        assert_eq!(ordered[0].message, "e2");
        assert_eq!(ordered[1].message, "e1");
        assert_eq!(ordered[2].message, "w");
    }
}
