use std::collections::HashSet;

/// Attribute listing every node a repair changed
pub const METADATA_CHANGED: &str = "/how/metadata_changed";

/// Nodes changed by a repair, in first-seen order without duplicates
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeLog {
    nodes: Vec<String>,
    seen: HashSet<String>,
}

impl ChangeLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a changed node; `false` if it was already recorded
    pub fn record(&mut self, node: impl Into<String>) -> bool {
        let node = node.into();
        if self.seen.contains(&node) {
            return false;
        }
        self.seen.insert(node.clone());
        self.nodes.push(node);
        true
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, node: &str) -> bool {
        self.seen.contains(node)
    }

    /// Parse a stored `metadata_changed` value
    pub fn parse(text: &str) -> Self {
        let mut log = ChangeLog::new();
        for node in text.split(',').map(str::trim).filter(|n| !n.is_empty()) {
            log.record(node);
        }
        log
    }

    /// `previous` followed by the nodes of `self` it does not list yet
    pub fn merged_after(&self, previous: &ChangeLog) -> ChangeLog {
        let mut merged = previous.clone();
        for node in &self.nodes {
            merged.record(node.as_str());
        }
        merged
    }

    /// Comma-joined form stored in the container
    pub fn joined(&self) -> String {
        self.nodes.join(",")
    }
}

impl<S: Into<String>> FromIterator<S> for ChangeLog {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut log = ChangeLog::new();
        for node in iter {
            log.record(node);
        }
        log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_membership() {
        let mut log = ChangeLog::new();
        assert!(log.record("/how/system2"));
        assert!(log.record("/how/system"));
        assert!(!log.record("/how/system"));
        assert_eq!(log.joined(), "/how/system2,/how/system");
    }

    #[test]
    fn test_merge_keeps_previous_first() {
        let previous = ChangeLog::parse("/what/source, /how/highprf");
        let current: ChangeLog = ["/how/highprf", "/dataset1/testGroup"].into_iter().collect();
        let merged = current.merged_after(&previous);
        assert_eq!(
            merged.nodes(),
            &["/what/source", "/how/highprf", "/dataset1/testGroup"]
        );
    }

    #[test]
    fn test_parse_empty() {
        assert!(ChangeLog::parse("").is_empty());
    }
}
